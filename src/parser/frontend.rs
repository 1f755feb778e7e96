//! Tree-sitter-backed C# frontend (spec.md §9 option (a), SPEC_FULL.md §4.4).
//!
//! Exposes the parse step only; the "semantic model" the spec requires is
//! built on top of the resulting [`tree_sitter::Tree`] by `symbols` and
//! `resolver`, not by this module.

use tree_sitter::{Parser, Tree};

/// Parse `source` as C#. Returns `None` only if the grammar could not be
/// loaded into the parser (not for syntax errors — tree-sitter always
/// produces a tree, marking bad spans with `ERROR`/`MISSING` nodes).
pub fn parse_source(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_c_sharp::language()).ok()?;
    parser.parse(source, None)
}
