//! Arena-backed compile graph: node factories, tree management and link
//! dispatch, with every configuration-level problem funnelled through the
//! pass-wide issue collector.

use crate::core::error::CompileError;
use crate::core::issues::IssueCollector;
use crate::nodes::kinds::NodeKind;
use crate::nodes::links::{LinkRole, RoleState};
use crate::nodes::node::{qualify, Node, NodeId, NodePhase};
use crate::nodes::office::OfficeFloorState;

pub struct CompileGraph {
    nodes: Vec<Node>,
    root: NodeId,
    issues: IssueCollector,
}

impl CompileGraph {
    /// New graph with an OfficeFloor root. A blank root name is suppressed
    /// from qualified names.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = Node::new(root_name, NodeKind::OfficeFloor(OfficeFloorState), None);
        Self {
            nodes: vec![root],
            root: NodeId(0),
            issues: IssueCollector::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn issues(&self) -> &IssueCollector {
        &self.issues
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Existing child of `parent` with the given name, if any.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).name == name)
    }

    /// Idempotent name-keyed factory: returns the existing child when
    /// present, otherwise creates one in `Created` phase. Raises nothing.
    pub fn node_or_create(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: impl FnOnce() -> NodeKind,
    ) -> NodeId {
        if let Some(existing) = self.child_by_name(parent, name) {
            return existing;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(name, kind(), Some(parent)));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// One-shot initialisation. A second initialisation keeps the first
    /// state, raises `"<kind tag> <name> already added"` and returns false.
    pub fn initialise(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.index()];
        if node.initialised {
            let message = format!("{} {} already added", node.kind_tag(), node.name);
            let identity = self.issue_identity(id);
            self.issues.raise(identity.0, identity.1, message);
            return false;
        }
        node.initialised = true;
        node.phase = NodePhase::Initialised;
        true
    }

    /// Factory + initialise in one step: re-adding a name returns the
    /// existing node and raises exactly one duplicate-add issue.
    pub fn add(&mut self, parent: NodeId, name: &str, kind: impl FnOnce() -> NodeKind) -> NodeId {
        let id = self.node_or_create(parent, name, kind);
        self.initialise(id);
        id
    }

    /// Qualified name of a node: ancestry names joined per the qualify
    /// rules, using only parent back-references.
    pub fn qualified_name(&self, id: NodeId) -> String {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            chain.push(node.name.clone());
            cursor = node.parent;
        }
        chain.reverse();
        let segments: Vec<Option<&str>> = chain.iter().map(|s| Some(s.as_str())).collect();
        qualify(&segments)
    }

    /// (qualified name, kind tag) pair for issue reporting.
    pub fn issue_identity(&self, id: NodeId) -> (String, &'static str) {
        (self.qualified_name(id), self.node(id).kind_tag())
    }

    /// Raise an issue against a node.
    pub fn raise(&self, id: NodeId, message: impl Into<String>) {
        let (node, kind) = self.issue_identity(id);
        self.issues.raise(node, kind, message);
    }

    pub fn raise_with_cause(&self, id: NodeId, message: impl Into<String>, cause: impl Into<String>) {
        let (node, kind) = self.issue_identity(id);
        self.issues.raise_with_cause(node, kind, message, cause);
    }

    /// Mark the node's orthogonal issue flag; flagged nodes (and their
    /// strict dependents) do not reach Built.
    pub fn flag(&mut self, id: NodeId) {
        self.nodes[id.index()].flagged = true;
    }

    pub fn set_phase(&mut self, id: NodeId, phase: NodePhase) {
        self.nodes[id.index()].phase = phase;
    }

    pub fn set_location(&mut self, id: NodeId, location: impl Into<String>) {
        self.nodes[id.index()].location = Some(location.into());
    }

    /// Connect `source`'s link role to `target`.
    ///
    /// Single-valued roles accept exactly one link: a second attempt keeps
    /// the first target, raises `"<kind tag> <name> linked more than once"`
    /// and returns `Ok(false)`. Ordering roles append to a set (idempotent).
    /// A role the source kind does not carry is programmer error.
    pub fn link(
        &mut self,
        source: NodeId,
        role: LinkRole,
        target: NodeId,
    ) -> Result<bool, CompileError> {
        let (qualified, kind_tag) = self.issue_identity(source);
        let simple_name = self.node(source).name.clone();
        let node = &mut self.nodes[source.index()];
        match node.kind.role_state(role) {
            Some(RoleState::Single(slot)) => {
                if slot.link(target) {
                    Ok(true)
                } else {
                    self.issues.raise(
                        qualified,
                        kind_tag,
                        format!("{} {} linked more than once", kind_tag, simple_name),
                    );
                    Ok(false)
                }
            }
            Some(RoleState::Set(set)) => Ok(set.add(target)),
            None => Err(CompileError::UnsupportedLink(qualified, role.as_str())),
        }
    }

    /// Current link of a single-valued role on `source`.
    pub fn linked(&self, source: NodeId, role: LinkRole) -> Option<NodeId> {
        self.node(source).kind.linked(role)
    }
}
