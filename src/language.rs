//! Language detection table used only by triage's error path (spec.md §4.2).

use std::collections::BTreeSet;
use std::path::Path;

/// Coarse language family, used to tell the caller what it *does* have
/// when it doesn't have an analyzable C#-style project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LanguageTag {
    WebScripting,
    Compiled,
    Systems,
    Mobile,
    Shell,
    DocumentationOnly,
}

impl LanguageTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::WebScripting => "web-scripting",
            LanguageTag::Compiled => "compiled",
            LanguageTag::Systems => "systems",
            LanguageTag::Mobile => "mobile",
            LanguageTag::Shell => "shell",
            LanguageTag::DocumentationOnly => "documentation-only",
        }
    }
}

/// (manifest filename or extension) -> language tag. Matched case-insensitively.
const EVIDENCE_TABLE: &[(&str, LanguageTag)] = &[
    ("package.json", LanguageTag::WebScripting),
    ("requirements.txt", LanguageTag::WebScripting),
    ("gemfile", LanguageTag::WebScripting),
    ("js", LanguageTag::WebScripting),
    ("jsx", LanguageTag::WebScripting),
    ("ts", LanguageTag::WebScripting),
    ("tsx", LanguageTag::WebScripting),
    ("py", LanguageTag::WebScripting),
    ("rb", LanguageTag::WebScripting),
    ("php", LanguageTag::WebScripting),
    ("pom.xml", LanguageTag::Compiled),
    ("build.gradle", LanguageTag::Compiled),
    ("go.mod", LanguageTag::Compiled),
    ("java", LanguageTag::Compiled),
    ("kt", LanguageTag::Compiled),
    ("go", LanguageTag::Compiled),
    ("cargo.toml", LanguageTag::Systems),
    ("cmakelists.txt", LanguageTag::Systems),
    ("rs", LanguageTag::Systems),
    ("c", LanguageTag::Systems),
    ("cpp", LanguageTag::Systems),
    ("h", LanguageTag::Systems),
    ("hpp", LanguageTag::Systems),
    ("podfile", LanguageTag::Mobile),
    ("pubspec.yaml", LanguageTag::Mobile),
    ("swift", LanguageTag::Mobile),
    ("dart", LanguageTag::Mobile),
    ("sh", LanguageTag::Shell),
    ("bash", LanguageTag::Shell),
    ("makefile", LanguageTag::Shell),
    ("md", LanguageTag::DocumentationOnly),
    ("rst", LanguageTag::DocumentationOnly),
    ("txt", LanguageTag::DocumentationOnly),
];

/// Evidence found while scanning a workspace tree for triage's error report:
/// detected language tags, plus a short list of representative files.
#[derive(Debug, Default, Clone)]
pub struct LanguageEvidence {
    pub tags: BTreeSet<&'static str>,
    pub found_files: Vec<String>,
}

impl LanguageEvidence {
    pub fn observe(&mut self, relative_path: &str) {
        let path = Path::new(relative_path);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_lowercase();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let matched = EVIDENCE_TABLE
            .iter()
            .find(|(key, _)| *key == file_name || *key == extension);

        if let Some((_, tag)) = matched {
            self.tags.insert(tag.as_str());
            if self.found_files.len() < 10 {
                self.found_files.push(relative_path.to_string());
            }
        }
    }

    pub fn detected_languages(&self) -> Vec<String> {
        self.tags.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_classifies_package_json_and_ts_as_web_scripting() {
        let mut evidence = LanguageEvidence::default();
        evidence.observe("package.json");
        evidence.observe("src/index.ts");
        assert_eq!(evidence.detected_languages(), vec!["web-scripting"]);
        assert_eq!(evidence.found_files, vec!["package.json", "src/index.ts"]);
    }

    #[test]
    fn observe_ignores_files_with_no_table_entry() {
        let mut evidence = LanguageEvidence::default();
        evidence.observe("LICENSE");
        assert!(evidence.detected_languages().is_empty());
    }
}
