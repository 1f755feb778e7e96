//! Triage stage (spec.md §4.2): count source files, reject oversize inputs,
//! classify repository language, locate the solution/project manifest(s).

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::limits;
use crate::errors::CodeAtlasError;
use crate::language::LanguageEvidence;
use crate::model::ManifestSelection;

const SOURCE_EXTENSION: &str = "cs";
const SOLUTION_EXTENSION: &str = "sln";
const PROJECT_EXTENSION: &str = "csproj";

/// Walk the workspace once, counting `.cs` files and collecting language
/// evidence for the error path in the same pass (spec.md §4.2).
fn scan(workspace_root: &Path) -> (usize, LanguageEvidence, Vec<PathBuf>, Vec<PathBuf>) {
    let mut source_file_count = 0usize;
    let mut evidence = LanguageEvidence::default();
    let mut solutions = Vec::new();
    let mut projects = Vec::new();

    for entry in WalkDir::new(workspace_root)
        .into_iter()
        .filter_entry(|e| !is_vcs_metadata_dir(e.file_name().to_string_lossy().as_ref()))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = crate::model::SourceDocument::relative_path_of(workspace_root, path);
        evidence.observe(&relative);

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(SOURCE_EXTENSION) => source_file_count += 1,
            Some(ext) if ext.eq_ignore_ascii_case(SOLUTION_EXTENSION) => {
                solutions.push(path.to_path_buf())
            }
            Some(ext) if ext.eq_ignore_ascii_case(PROJECT_EXTENSION) => {
                projects.push(path.to_path_buf())
            }
            _ => {}
        }
    }

    (source_file_count, evidence, solutions, projects)
}

fn is_vcs_metadata_dir(name: &str) -> bool {
    name == ".git"
}

/// Pure boundary check for the source-file cap (spec.md §4.2, §8's
/// boundary-behavior requirement), split out of `triage` so the exact
/// threshold can be unit-tested without materializing 100,000 fixture files.
fn check_file_count(count: usize) -> Result<(), CodeAtlasError> {
    if count > limits::MAX_SOURCE_FILES {
        Err(CodeAtlasError::LimitsExceeded {
            message: format!(
                "{count} source files exceeds the {} file cap",
                limits::MAX_SOURCE_FILES
            ),
        })
    } else {
        Ok(())
    }
}

/// Run triage over an acquired workspace tree (spec.md §4.2).
pub fn triage(workspace_root: &Path) -> Result<ManifestSelection, CodeAtlasError> {
    let (source_file_count, evidence, solutions, projects) = scan(workspace_root);

    check_file_count(source_file_count)?;

    if let Some(root_solution) = solutions
        .iter()
        .filter(|p| p.parent() == Some(workspace_root))
        .min_by_key(|p| p.to_string_lossy().into_owned())
    {
        return Ok(ManifestSelection::Solution(root_solution.clone()));
    }

    if let Some(any_solution) = solutions
        .iter()
        .min_by_key(|p| p.to_string_lossy().into_owned())
    {
        return Ok(ManifestSelection::Solution(any_solution.clone()));
    }

    if !projects.is_empty() {
        return Ok(ManifestSelection::Projects(projects));
    }

    Err(CodeAtlasError::NoSolutionOrProject {
        detected_languages: evidence.detected_languages(),
        found_files: evidence.found_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn prefers_root_solution_over_nested_or_project_set() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Root.sln", "");
        write(dir.path(), "nested/Other.sln", "");
        write(dir.path(), "src/A.csproj", "");

        match triage(dir.path()).unwrap() {
            ManifestSelection::Solution(path) => {
                assert_eq!(path, dir.path().join("Root.sln"));
            }
            _ => panic!("expected a solution selection"),
        }
    }

    #[test]
    fn falls_back_to_nested_solution_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b/Z.sln", "");
        write(dir.path(), "a/A.sln", "");

        match triage(dir.path()).unwrap() {
            ManifestSelection::Solution(path) => {
                assert_eq!(path, dir.path().join("a/A.sln"));
            }
            _ => panic!("expected a solution selection"),
        }
    }

    #[test]
    fn falls_back_to_project_set_when_no_solution() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/A.csproj", "");
        write(dir.path(), "src/B.csproj", "");

        match triage(dir.path()).unwrap() {
            ManifestSelection::Projects(projects) => assert_eq!(projects.len(), 2),
            _ => panic!("expected a project set selection"),
        }
    }

    #[test]
    fn fails_with_language_evidence_when_nothing_analyzable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", "{}");
        write(dir.path(), "src/index.ts", "export {}");

        let err = triage(dir.path()).unwrap_err();
        match err {
            CodeAtlasError::NoSolutionOrProject {
                detected_languages,
                found_files,
            } => {
                assert!(detected_languages.contains(&"web-scripting".to_string()));
                assert!(!found_files.is_empty());
            }
            other => panic!("expected NoSolutionOrProject, got {other:?}"),
        }
    }

    #[test]
    fn file_count_boundary_is_inclusive_at_the_cap() {
        assert!(check_file_count(limits::MAX_SOURCE_FILES).is_ok());
        assert!(check_file_count(limits::MAX_SOURCE_FILES + 1).is_err());
    }

    #[test]
    fn scan_respects_the_file_count_cap_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            write(dir.path(), &format!("src/F{i}.cs"), "class C {}");
        }
        write(dir.path(), "A.csproj", "");
        assert!(triage(dir.path()).is_ok());
    }
}
