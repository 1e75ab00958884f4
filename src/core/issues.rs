//! Pass-scoped issue accumulator — the sole diagnostics channel.
//!
//! Every mutating operation on the node graph reports configuration-level
//! problems here instead of unwinding the call stack. The collector is
//! append-only for the lifetime of one compile pass; the caller inspects it
//! before deciding whether the runtime sink receives any bind calls.

use serde::Serialize;
use std::cell::RefCell;

/// One structured diagnostic, reported against the offending node.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NodeIssue {
    /// Qualified name of the node the issue is reported against.
    pub node: String,
    /// Kind tag of that node (e.g. "Managed Object Source").
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// Append-only issue collector shared across one compile pass.
///
/// Interior mutability keeps the raise path available to code holding only a
/// shared borrow of the graph (the autowirer, the type caches).
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: RefCell<Vec<NodeIssue>>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self, node: impl Into<String>, kind: &'static str, message: impl Into<String>) {
        self.issues.borrow_mut().push(NodeIssue {
            node: node.into(),
            kind,
            message: message.into(),
            cause: None,
        });
    }

    pub fn raise_with_cause(
        &self,
        node: impl Into<String>,
        kind: &'static str,
        message: impl Into<String>,
        cause: impl Into<String>,
    ) {
        self.issues.borrow_mut().push(NodeIssue {
            node: node.into(),
            kind,
            message: message.into(),
            cause: Some(cause.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.borrow().len()
    }

    /// Snapshot of everything raised so far, in raise order.
    pub fn snapshot(&self) -> Vec<NodeIssue> {
        self.issues.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_order_is_preserved() {
        let issues = IssueCollector::new();
        issues.raise("A", "Team", "first");
        issues.raise_with_cause("B", "Office", "second", "root cause");
        let snap = issues.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].message, "first");
        assert_eq!(snap[1].cause.as_deref(), Some("root cause"));
    }

    #[test]
    fn issues_serialize_without_empty_cause() {
        let issues = IssueCollector::new();
        issues.raise("A", "Team", "oops");
        let json = serde_json::to_value(issues.snapshot()).unwrap();
        assert!(json[0].get("cause").is_none());
        assert_eq!(json[0]["kind"], "Team");
    }
}
