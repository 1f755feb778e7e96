//! Symbol & SymbolLocation (spec.md §3): the semantic model's vocabulary.

/// Opaque handle into a `SymbolTable`'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Kind of named declaration a `Symbol` represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Namespace,
    Type,
    Member,
    Parameter,
    Local,
}

/// A (document, span) pair at which a symbol's declaration appears.
#[derive(Debug, Clone)]
pub struct SymbolLocation {
    /// Repository-relative path of the declaring document.
    pub document: String,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

/// A named declaration, possibly declared across multiple locations
/// (C# `partial` types).
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub kind: SymbolKind,
    pub simple_name: String,
    /// Fully-qualified name, dot-separated (e.g. `Foo.Bar.Baz`).
    pub fqn: String,
    pub containing: Option<SymbolId>,
    /// Declaration locations in enumeration order (deterministic: the order
    /// in which the resolver encountered them during the parse). The first
    /// entry is the one used when resolving a reference to a symbol with
    /// multiple declaring files (spec.md §4.4 step 4).
    pub locations: Vec<SymbolLocation>,
}

impl Symbol {
    /// True if at least one declaration location lies inside a known
    /// `SourceDocument` (spec.md §3's "in-source" predicate) — by
    /// construction every `Symbol` built by this crate's resolver only
    /// ever gets locations from accepted documents, so this is always true
    /// for symbols produced here; kept as an explicit predicate because
    /// spec.md defines it as a first-class concept other stages reason about.
    pub fn is_in_source(&self) -> bool {
        !self.locations.is_empty()
    }

    /// Repository-relative paths of this symbol's declaration locations,
    /// in enumeration order, without duplicates.
    pub fn declaring_files(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.locations
            .iter()
            .map(|loc| loc.document.as_str())
            .filter(|doc| seen.insert(*doc))
            .collect()
    }
}
