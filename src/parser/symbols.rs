//! Project-scoped symbol table (spec.md §4.4's "semantic model"): declares
//! are indexed by fully-qualified name and by simple name, with every
//! in-source declaration location recorded per symbol so partial
//! declarations (`partial class`) merge into one `Symbol`.

use std::collections::HashMap;

use tree_sitter::{Node, Tree};

use crate::model::{Symbol, SymbolId, SymbolKind, SymbolLocation};

const NAMESPACE_KINDS: &[&str] = &["namespace_declaration", "file_scoped_namespace_declaration"];

const TYPE_KINDS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "record_struct_declaration",
];

const MEMBER_KINDS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "property_declaration",
    "event_declaration",
    "delegate_declaration",
];

/// Declaration-header node kinds whose `name` field is the declaration
/// itself, not a reference — excluded from self-edge consideration
/// (spec.md §4.4 step 5, §8 property 8 / scenario S8).
pub(super) const DECLARATION_HEADER_KINDS: &[&str] = &[
    "namespace_declaration",
    "file_scoped_namespace_declaration",
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "record_struct_declaration",
    "method_declaration",
    "constructor_declaration",
    "property_declaration",
    "event_declaration",
    "delegate_declaration",
    "variable_declarator",
    "parameter",
];

/// Nearest-ancestor kinds that mark a "real use site" per spec.md §4.4
/// step 5: method/accessor/constructor bodies, field initializers, plain
/// blocks, and expression-bodied members.
pub(super) const USE_SITE_KINDS: &[&str] =
    &["block", "arrow_expression_clause", "equals_value_clause"];

#[derive(Debug, Default)]
pub struct SymbolTable {
    arena: Vec<Symbol>,
    by_fqn: HashMap<String, SymbolId>,
    by_simple_name: HashMap<String, Vec<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.0 as usize]
    }

    /// Enclosing namespace's fully-qualified name for `id`, or `<global>`.
    pub fn namespace_of(&self, id: SymbolId) -> String {
        let mut current = Some(id);
        while let Some(cur) = current {
            let symbol = self.get(cur);
            if symbol.kind == SymbolKind::Namespace {
                return symbol.fqn.clone();
            }
            current = symbol.containing;
        }
        "<global>".to_string()
    }

    /// Resolve a bare identifier text to a symbol (spec.md §4.4 query 1).
    /// When multiple declarations share a simple name, prefer one whose
    /// namespace matches `enclosing_namespace`; otherwise fall back to
    /// the earliest-declared candidate for determinism.
    pub fn resolve_simple_name(
        &self,
        name: &str,
        enclosing_namespace: &str,
    ) -> Option<SymbolId> {
        let candidates = self.by_simple_name.get(name)?;
        if candidates.len() == 1 {
            return Some(candidates[0]);
        }
        candidates
            .iter()
            .find(|&&id| self.namespace_of(id) == enclosing_namespace)
            .or_else(|| candidates.first())
            .copied()
    }

    fn intern(
        &mut self,
        kind: SymbolKind,
        simple_name: &str,
        fqn: String,
        containing: Option<SymbolId>,
        location: SymbolLocation,
    ) -> SymbolId {
        if let Some(&existing) = self.by_fqn.get(&fqn) {
            self.arena[existing.0 as usize].locations.push(location);
            return existing;
        }
        let id = SymbolId(self.arena.len() as u32);
        self.arena.push(Symbol {
            id,
            kind,
            simple_name: simple_name.to_string(),
            fqn: fqn.clone(),
            containing,
            locations: vec![location],
        });
        self.by_fqn.insert(fqn, id);
        self.by_simple_name
            .entry(simple_name.to_string())
            .or_default()
            .push(id);
        id
    }
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or_default()
}

fn location(doc_relative_path: &str, node: Node) -> SymbolLocation {
    let start = node.start_position();
    let end = node.end_position();
    SymbolLocation {
        document: doc_relative_path.to_string(),
        start_line: start.row as u32 + 1,
        start_col: start.column as u32,
        end_line: end.row as u32 + 1,
        end_col: end.column as u32,
    }
}

/// Walk `tree` collecting every declaration into `table`. Call once per
/// document, in deterministic (sorted relative-path) document order, so
/// partial declarations' location lists are themselves deterministic.
pub fn collect_declarations(tree: &Tree, source: &str, doc_relative_path: &str, table: &mut SymbolTable) {
    let mut path = Vec::new();
    walk(tree.root_node(), source, doc_relative_path, &mut path, None, table);
}

fn walk(
    node: Node,
    source: &str,
    doc: &str,
    path: &mut Vec<String>,
    containing: Option<SymbolId>,
    table: &mut SymbolTable,
) {
    let kind = node.kind();

    if NAMESPACE_KINDS.contains(&kind) {
        if let Some(name_node) = node.child_by_field_name("name") {
            let full_name = node_text(name_node, source);
            let segments: Vec<String> = full_name.split('.').map(|s| s.to_string()).collect();
            let mut next_containing = containing;
            for segment in &segments {
                path.push(segment.clone());
                let fqn = path.join(".");
                next_containing = Some(table.intern(
                    SymbolKind::Namespace,
                    segment,
                    fqn,
                    next_containing,
                    location(doc, name_node),
                ));
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, doc, path, next_containing, table);
            }
            for _ in &segments {
                path.pop();
            }
            return;
        }
    }

    if TYPE_KINDS.contains(&kind) || MEMBER_KINDS.contains(&kind) {
        if let Some(name_node) = node.child_by_field_name("name") {
            let name = node_text(name_node, source).to_string();
            let symbol_kind = if TYPE_KINDS.contains(&kind) {
                SymbolKind::Type
            } else {
                SymbolKind::Member
            };
            path.push(name.clone());
            let fqn = path.join(".");
            let id = table.intern(symbol_kind, &name, fqn, containing, location(doc, name_node));
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, doc, path, Some(id), table);
            }
            path.pop();
            return;
        }
    }

    if kind == "variable_declarator" {
        if let Some(name_node) = node.child_by_field_name("name") {
            let name = node_text(name_node, source).to_string();
            let symbol_kind = if nearest_ancestor_is_field(node) {
                SymbolKind::Member
            } else {
                SymbolKind::Local
            };
            path.push(name.clone());
            let fqn = path.join(".");
            table.intern(symbol_kind, &name, fqn, containing, location(doc, name_node));
            path.pop();
        }
        // Still recurse: initializers may contain nested declarations
        // (e.g. lambda parameters) that later passes need to see.
    }

    if kind == "parameter" {
        if let Some(name_node) = node.child_by_field_name("name") {
            let name = node_text(name_node, source).to_string();
            path.push(name.clone());
            let fqn = path.join(".");
            table.intern(SymbolKind::Parameter, &name, fqn, containing, location(doc, name_node));
            path.pop();
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, doc, path, containing, table);
    }
}

fn nearest_ancestor_is_field(node: Node) -> bool {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        match ancestor.kind() {
            "field_declaration" | "event_field_declaration" => return true,
            "local_declaration_statement" | "for_statement" | "using_statement" => return false,
            _ => current = ancestor.parent(),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::frontend::parse_source;

    #[test]
    fn collects_namespace_and_type_declaration() {
        let source = "namespace X { class A {} }";
        let tree = parse_source(source).unwrap();
        let mut table = SymbolTable::new();
        collect_declarations(&tree, source, "src/A.cs", &mut table);

        let id = table.resolve_simple_name("A", "X").unwrap();
        assert_eq!(table.get(id).fqn, "X.A");
        assert_eq!(table.get(id).kind, SymbolKind::Type);
        assert_eq!(table.namespace_of(id), "X");
    }

    #[test]
    fn merges_partial_declarations_across_documents_in_call_order() {
        let source1 = "namespace X { partial class T { void M1() {} } }";
        let source2 = "namespace X { partial class T { void M2() {} } }";
        let tree1 = parse_source(source1).unwrap();
        let tree2 = parse_source(source2).unwrap();

        let mut table = SymbolTable::new();
        collect_declarations(&tree1, source1, "P1.cs", &mut table);
        collect_declarations(&tree2, source2, "P2.cs", &mut table);

        let id = table.resolve_simple_name("T", "X").unwrap();
        let symbol = table.get(id);
        assert_eq!(symbol.locations.len(), 2);
        assert_eq!(symbol.declaring_files(), vec!["P1.cs", "P2.cs"]);
    }

    #[test]
    fn file_scoped_namespace_is_a_single_segment_or_dotted_chain() {
        let source = "namespace A.B; class C {}";
        let tree = parse_source(source).unwrap();
        let mut table = SymbolTable::new();
        collect_declarations(&tree, source, "a.cs", &mut table);

        let id = table.resolve_simple_name("C", "A.B").unwrap();
        assert_eq!(table.namespace_of(id), "A.B");
    }
}
