//! Base tree abstraction: node identity, phase tracking and qualified names.
//!
//! Nodes live in the compile graph's arena; `NodeId` is the only handle that
//! crosses module boundaries. A node owns its children (insertion-ordered)
//! and keeps a non-owning back-reference to its parent used solely for
//! qualified-name derivation and diagnostics.

use crate::nodes::kinds::NodeKind;
use serde::Serialize;

/// Handle into the compile graph's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-node progression through the compile pass.
///
/// The issue marker is orthogonal: a flagged node halts its own progression
/// (and that of strict dependents) without stopping the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum NodePhase {
    Created,
    Initialised,
    Sourced,
    AutoWired,
    TypeLoaded,
    Built,
}

#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Where the composition declared this node, for diagnostics.
    pub location: Option<String>,
    /// Non-owning back-reference; naming and diagnostics only.
    pub parent: Option<NodeId>,
    /// Exclusively owned, insertion-ordered.
    pub children: Vec<NodeId>,
    pub initialised: bool,
    pub phase: NodePhase,
    /// Orthogonal issue marker.
    pub flagged: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            kind,
            location: None,
            parent,
            children: Vec::new(),
            initialised: false,
            phase: NodePhase::Created,
            flagged: false,
        }
    }

    /// Human-readable kind tag used in issue text.
    pub fn kind_tag(&self) -> &'static str {
        self.kind.tag()
    }
}

fn is_blank(segment: Option<&str>) -> bool {
    match segment {
        None => true,
        Some(s) => s.trim().is_empty(),
    }
}

/// Derive a qualified name from ordered name segments.
///
/// Non-blank segments are joined by `.`, with any literal `.` inside a
/// segment rendered as `_`. A non-leading blank or absent segment renders in
/// bracket form (`[null]` when absent, `[<raw>]` otherwise); leading blank
/// or absent segments are suppressed.
pub fn qualify(segments: &[Option<&str>]) -> String {
    let mut out = String::new();
    let mut leading = true;
    for segment in segments {
        if is_blank(*segment) {
            if leading {
                continue;
            }
            out.push('.');
            match segment {
                None => out.push_str("[null]"),
                Some(raw) => {
                    out.push('[');
                    out.push_str(raw);
                    out.push(']');
                }
            }
            continue;
        }
        let name = segment.unwrap_or_default().replace('.', "_");
        if !leading {
            out.push('.');
        }
        out.push_str(&name);
        leading = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_joins_with_dots() {
        assert_eq!(qualify(&[Some("A"), Some("B"), Some("C")]), "A.B.C");
    }

    #[test]
    fn qualify_brackets_non_leading_absent() {
        assert_eq!(qualify(&[Some("A"), None, Some("C")]), "A.[null].C");
        assert_eq!(qualify(&[Some("A"), Some(""), Some("C")]), "A.[].C");
    }

    #[test]
    fn qualify_suppresses_leading_blank() {
        assert_eq!(qualify(&[None, Some("B")]), "B");
        assert_eq!(qualify(&[Some(""), None, Some("B")]), "B");
    }

    #[test]
    fn qualify_escapes_inner_dots() {
        assert_eq!(qualify(&[Some("a.b"), Some("C")]), "a_b.C");
    }
}
