//! Demonstration CLI: drives `codeatlas::analyze` against a real remote
//! repository and prints the resulting report as JSON. Stands in for the
//! HTTP transport described in spec.md §6, which this crate doesn't own.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use codeatlas::{analyze, AnalysisRequest, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "codeatlas-cli", about = "Analyze a remote C# repository's dependency graph")]
struct Cli {
    /// Repository URL (any form `git clone` accepts).
    repo_url: String,

    /// Branch to check out. Defaults to the remote's default branch.
    #[arg(long)]
    branch: Option<String>,

    /// Root directory for scratch checkouts. Defaults to the OS temp dir.
    #[arg(long)]
    scratch_root: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::default();
    if let Some(scratch_root) = cli.scratch_root {
        config.scratch_root = scratch_root;
    }

    let request = AnalysisRequest {
        repo_url: cli.repo_url,
        branch: cli.branch,
    };

    match analyze(request, &config) {
        Ok(report) => {
            let rendered = if cli.pretty {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string(&report)
            };
            match rendered {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("failed to serialize report: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            eprintln!("{{\"error\":\"{}\",\"message\":\"{}\"}}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}
