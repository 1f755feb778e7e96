//! Edge extraction (spec.md §4.4 steps 1-6): walk every document's syntax
//! tree, resolve identifier occurrences against the project's symbol
//! table, and emit file→file edges under the declaring-file and
//! self-edge rules.

use std::collections::{HashMap, HashSet};

use tree_sitter::Node;

use crate::loader::LoadedProject;
use crate::model::{SourceDocument, SymbolId};

use super::frontend::parse_source;
use super::symbols::{collect_declarations, SymbolTable, DECLARATION_HEADER_KINDS, USE_SITE_KINDS};

/// One loaded project's parsed state: its documents, the namespace each
/// declares (spec.md §4.5's preference order, computed here since the
/// parse already has the tree in hand), and whether it produced a usable
/// compilation at all.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub project_name: String,
    pub documents: Vec<String>,
    pub primary_namespace: HashMap<String, String>,
    pub compiled: bool,
}

/// Aggregate output of the parser & resolver stage.
pub struct ParseOutcome {
    pub file_graph: crate::model::Graph,
    pub units: Vec<CompilationUnit>,
}

pub(super) struct ProjectOutcome {
    pub unit: CompilationUnit,
    pub edges: Vec<(String, String)>,
}

pub(super) fn resolve_project(project: &LoadedProject) -> ProjectOutcome {
    let mut documents = project.documents.clone();
    documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let known_paths: HashSet<&str> = documents.iter().map(|d| d.relative_path.as_str()).collect();

    let mut trees = Vec::with_capacity(documents.len());
    let mut any_parsed_cleanly = false;
    for doc in &documents {
        match parse_source(&doc.text) {
            Some(tree) => {
                if !tree.root_node().has_error() {
                    any_parsed_cleanly = true;
                }
                trees.push(Some(tree));
            }
            None => {
                tracing::debug!(path = %doc.relative_path, "document failed to parse, skipping");
                trees.push(None);
            }
        }
    }

    let mut table = SymbolTable::new();
    let mut primary_namespace = HashMap::new();
    for (doc, tree) in documents.iter().zip(trees.iter()) {
        let Some(tree) = tree else { continue };
        primary_namespace.insert(doc.relative_path.clone(), primary_namespace_of(tree, &doc.text));
        collect_declarations(tree, &doc.text, &doc.relative_path, &mut table);
    }

    let mut edges = Vec::new();
    let mut seen_edges = HashSet::new();
    for (doc, tree) in documents.iter().zip(trees.iter()) {
        let Some(tree) = tree else { continue };
        extract_edges_for_document(doc, tree, &table, &known_paths, &mut edges, &mut seen_edges);
    }

    ProjectOutcome {
        unit: CompilationUnit {
            project_name: project.manifest.name.clone(),
            documents: documents.iter().map(|d| d.relative_path.clone()).collect(),
            primary_namespace,
            compiled: any_parsed_cleanly,
        },
        edges,
    }
}

fn extract_edges_for_document(
    doc: &SourceDocument,
    tree: &tree_sitter::Tree,
    table: &SymbolTable,
    known_paths: &HashSet<&str>,
    edges: &mut Vec<(String, String)>,
    seen: &mut HashSet<(String, String)>,
) {
    let mut identifiers = Vec::new();
    collect_identifier_occurrences(tree.root_node(), &mut identifiers);

    let doc_namespace = primary_namespace_of(tree, &doc.text);
    let doc_file_id = format!("File:{}", doc.relative_path);

    for node in identifiers {
        let text = doc.text.get(node.byte_range()).unwrap_or_default();
        if text.is_empty() {
            continue;
        }
        let Some(symbol_id) = table.resolve_simple_name(text, &doc_namespace) else {
            continue;
        };

        let declaring_file = match first_declaring_file(table, symbol_id, known_paths) {
            Some(path) => path,
            None => continue,
        };

        if declaring_file != doc.relative_path {
            let to_file_id = format!("File:{declaring_file}");
            let key = (doc_file_id.clone(), to_file_id.clone());
            if seen.insert(key) {
                edges.push((doc_file_id.clone(), to_file_id));
            }
        } else if !is_declaration_name(node) && is_use_site(node) {
            let key = (doc_file_id.clone(), doc_file_id.clone());
            if seen.insert(key) {
                edges.push((doc_file_id.clone(), doc_file_id.clone()));
            }
        }
    }
}

/// First declaring file in enumeration order, restricted to known
/// documents (spec.md §4.4 step 4; also covers scenario S6, since a
/// symbol declared only in an excluded/generated document never enters
/// the table in the first place).
fn first_declaring_file(table: &SymbolTable, symbol_id: SymbolId, known_paths: &HashSet<&str>) -> Option<String> {
    table
        .get(symbol_id)
        .declaring_files()
        .into_iter()
        .find(|path| known_paths.contains(path))
        .map(|path| path.to_string())
}

fn collect_identifier_occurrences<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if node.kind() == "using_directive" {
        return;
    }
    if node.kind() == "identifier" {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_identifier_occurrences(child, out);
    }
}

fn is_declaration_name(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    DECLARATION_HEADER_KINDS.contains(&parent.kind())
        && parent.child_by_field_name("name") == Some(node)
}

/// True if some ancestor between `node` and the tree root is a use-site
/// construct (spec.md §4.4 step 5).
fn is_use_site(node: Node) -> bool {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if USE_SITE_KINDS.contains(&ancestor.kind()) {
            return true;
        }
        current = ancestor.parent();
    }
    false
}

/// File→namespace mapping (spec.md §4.5): file-scoped namespace preferred
/// over the first block-form namespace, else `<global>`.
pub fn primary_namespace_of(tree: &tree_sitter::Tree, source: &str) -> String {
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "file_scoped_namespace_declaration" {
            if let Some(name) = child.child_by_field_name("name") {
                return source.get(name.byte_range()).unwrap_or("<global>").to_string();
            }
        }
    }
    if let Some(name) = find_first_block_namespace(root, source) {
        return name;
    }
    "<global>".to_string()
}

fn find_first_block_namespace(node: Node, source: &str) -> Option<String> {
    if node.kind() == "namespace_declaration" {
        if let Some(name) = node.child_by_field_name("name") {
            return Some(source.get(name.byte_range()).unwrap_or_default().to_string());
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_first_block_namespace(child, source) {
            return Some(found);
        }
    }
    None
}

/// Curated substrings indicating an unresolved framework/SDK reference
/// (spec.md §4.4's missing-SDK detection). This reimplementation has no
/// MSBuild/Roslyn diagnostics to scan; callers that do have a diagnostics
/// feed (e.g. a wrapped `dotnet build` invocation) can pass it through
/// this same curated list via [`detect_missing_sdk`].
pub const MISSING_SDK_MARKERS: &[&str] = &[
    "the framework 'microsoft.netcore.app'",
    "the framework 'microsoft.aspnetcore.app'",
    "was not found",
    "reference assemblies for framework",
    "sdk 'microsoft.net.sdk'",
    "netsdk1045",
    "does not support targeting",
];

/// Scan `diagnostics` for a missing-SDK marker; returns the inferred
/// target platform tag to surface in the error (spec.md §4.4, §6).
pub fn detect_missing_sdk(target_platform: Option<&str>, diagnostics: &[String]) -> Option<String> {
    let hit = diagnostics
        .iter()
        .any(|d| {
            let lower = d.to_lowercase();
            MISSING_SDK_MARKERS.iter().any(|marker| lower.contains(marker))
        });
    if hit {
        Some(target_platform.unwrap_or("unknown").to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectManifest;
    use std::path::PathBuf;

    fn project(docs: Vec<(&str, &str)>) -> LoadedProject {
        LoadedProject {
            manifest: ProjectManifest::new(PathBuf::from("/repo/src/A.csproj"), "csharp"),
            documents: docs
                .into_iter()
                .map(|(path, text)| SourceDocument {
                    absolute_path: PathBuf::from(format!("/repo/{path}")),
                    relative_path: path.to_string(),
                    project: "A".to_string(),
                    generated: false,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn s1_tiny_acyclic_project() {
        let p = project(vec![
            ("src/A.cs", "namespace X { class A { void M() { B b = new B(); } } }"),
            ("src/B.cs", "namespace Y { class B {} }"),
        ]);
        let outcome = resolve_project(&p);
        assert_eq!(outcome.edges, vec![("File:src/A.cs".to_string(), "File:src/B.cs".to_string())]);
    }

    #[test]
    fn s2_two_node_cycle() {
        let p = project(vec![
            ("src/A.cs", "namespace X { class A { void M() { B b = new B(); } } }"),
            ("src/B.cs", "namespace Y { class B { void N() { A a = new A(); } } }"),
        ]);
        let outcome = resolve_project(&p);
        let edge_set: HashSet<_> = outcome.edges.into_iter().collect();
        assert!(edge_set.contains(&("File:src/A.cs".to_string(), "File:src/B.cs".to_string())));
        assert!(edge_set.contains(&("File:src/B.cs".to_string(), "File:src/A.cs".to_string())));
    }

    #[test]
    fn s4_partial_class_uses_first_declaring_file_only() {
        let p = project(vec![
            ("src/P1.cs", "namespace X { partial class T {} }"),
            ("src/P2.cs", "namespace X { partial class T {} }"),
            ("src/Q.cs", "namespace X { class Q { void M() { T t = new T(); } } }"),
        ]);
        let outcome = resolve_project(&p);
        assert!(outcome
            .edges
            .contains(&("File:src/Q.cs".to_string(), "File:src/P1.cs".to_string())));
        assert!(!outcome
            .edges
            .contains(&("File:src/Q.cs".to_string(), "File:src/P2.cs".to_string())));
    }

    #[test]
    fn s5_file_scoped_namespace_preferred_over_block_form() {
        let source = "namespace A.B;\nclass C {}\nnamespace Legacy { class D {} }";
        let tree = parse_source(source).unwrap();
        assert_eq!(primary_namespace_of(&tree, source), "A.B");
    }

    #[test]
    fn s8_self_edge_discipline() {
        let source = "namespace X { class C { void Foo() { C.Foo(); } } }";
        let p = project(vec![("src/C.cs", source)]);
        let outcome = resolve_project(&p);
        assert_eq!(
            outcome.edges,
            vec![("File:src/C.cs".to_string(), "File:src/C.cs".to_string())]
        );
    }

    #[test]
    fn declaration_header_names_never_self_loop_alone() {
        let source = "namespace X { class C {} }";
        let p = project(vec![("src/C.cs", source)]);
        let outcome = resolve_project(&p);
        assert!(outcome.edges.is_empty());
    }

    #[test]
    fn missing_sdk_marker_detection_is_case_insensitive() {
        let diagnostics = vec!["error NETSDK1045: The current .NET SDK does not support targeting .NET 9.0".to_string()];
        assert_eq!(
            detect_missing_sdk(Some("net9.0"), &diagnostics),
            Some("net9.0".to_string())
        );
        assert_eq!(detect_missing_sdk(Some("net9.0"), &[]), None);
    }
}
