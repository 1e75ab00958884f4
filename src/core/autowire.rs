//! Qualifier + type auto-wiring: the matching key, the symbolic type
//! registry and the scoped resolver.
//!
//! An `AutoWire` is a pure matching key — `(qualifier, type)` — never
//! mutated after construction. The `AutoWirer` resolves a source node's keys
//! against registered target candidates, first satisfying match wins, with a
//! direction policy and parent-shadowing scopes.

use crate::nodes::graph::CompileGraph;
use crate::nodes::node::NodeId;
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};
use std::cell::{OnceCell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Entry in the symbolic type registry: a name-to-capability record
/// populated at startup, standing in for reflective class loading.
///
/// Supertype names are recorded for diagnostics and future assignability
/// matching; the auto-wire matcher never consults them (exact string
/// equality only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,
    pub supertypes: Vec<String>,
}

/// Symbolic-name → type-capability table, resolved once per pass.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    entries: FxHashMap<String, Rc<TypeEntry>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, supertypes: Vec<String>) -> Rc<TypeEntry> {
        let name = name.into();
        let entry = Rc::new(TypeEntry {
            name: name.clone(),
            supertypes,
        });
        self.entries.insert(name, Rc::clone(&entry));
        entry
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<TypeEntry>> {
        self.entries.get(name).cloned()
    }
}

/// Immutable (qualifier, type) matching key.
///
/// Equality and hashing are exact on `(qualifier, type)`. Ordering compares
/// the rendered `qualifier:type` form case-insensitively, tie-broken
/// case-sensitively so `Ord` stays consistent with `Eq`.
#[derive(Debug)]
pub struct AutoWire {
    qualifier: Option<String>,
    type_name: String,
    handle: OnceCell<Rc<TypeEntry>>,
}

impl AutoWire {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            type_name: type_name.into(),
            handle: OnceCell::new(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            type_name: type_name.into(),
            handle: OnceCell::new(),
        }
    }

    /// Construct from an already resolved type handle.
    pub fn from_handle(qualifier: Option<String>, handle: Rc<TypeEntry>) -> Self {
        let cell = OnceCell::new();
        let type_name = handle.name.clone();
        let _ = cell.set(handle);
        Self {
            qualifier,
            type_name,
            handle: cell,
        }
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Best-effort resolution of the runtime type handle; absence is not an
    /// error. Successful lookups are memoized on the key.
    pub fn type_handle(&self, registry: &TypeRegistry) -> Option<Rc<TypeEntry>> {
        if let Some(handle) = self.handle.get() {
            return Some(Rc::clone(handle));
        }
        let handle = registry.lookup(&self.type_name)?;
        let _ = self.handle.set(Rc::clone(&handle));
        Some(handle)
    }
}

impl Clone for AutoWire {
    fn clone(&self) -> Self {
        let cell = OnceCell::new();
        if let Some(handle) = self.handle.get() {
            let _ = cell.set(Rc::clone(handle));
        }
        Self {
            qualifier: self.qualifier.clone(),
            type_name: self.type_name.clone(),
            handle: cell,
        }
    }
}

impl PartialEq for AutoWire {
    fn eq(&self, other: &Self) -> bool {
        self.qualifier == other.qualifier && self.type_name == other.type_name
    }
}

impl Eq for AutoWire {}

impl Hash for AutoWire {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualifier.hash(state);
        self.type_name.hash(state);
    }
}

impl fmt::Display for AutoWire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}:{}", q, self.type_name),
            None => write!(f, "{}", self.type_name),
        }
    }
}

impl PartialOrd for AutoWire {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AutoWire {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.to_string();
        let b = other.to_string();
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(&b))
    }
}

impl Serialize for AutoWire {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Direction policy for auto-wire matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDirection {
    /// The source states a requirement the target must satisfy: types must
    /// match exactly, and when the source specifies a qualifier the target
    /// must carry the same one. Used for dependency injection targets.
    SourceRequiresTarget,
    /// Roles reversed: the target is the classifier (e.g. a team) and the
    /// source is matched into it — a qualifier on the target constrains the
    /// source. Used for responsibility assignment.
    TargetCategorisesSource,
}

/// A resolved (source key, target node) pair.
#[derive(Debug, Clone)]
pub struct AutoWireLink {
    pub source: NodeId,
    pub source_wire: AutoWire,
    pub target: NodeId,
    pub target_wire: AutoWire,
}

type LazyFactory = Box<dyn FnOnce(&mut CompileGraph, NodeId) -> NodeId>;

enum TargetNode {
    Ready(NodeId),
    /// Materialised only on selection, receiving the owning-office context.
    Lazy(Option<LazyFactory>),
}

struct TargetEntry {
    wires: Vec<AutoWire>,
    node: RefCell<TargetNode>,
}

impl TargetEntry {
    /// Node handle, materialising a lazy candidate on first selection.
    fn materialise(&self, graph: &mut CompileGraph, office: NodeId) -> NodeId {
        let factory = {
            let mut node = self.node.borrow_mut();
            match &mut *node {
                TargetNode::Ready(id) => return *id,
                TargetNode::Lazy(factory) => match factory.take() {
                    Some(factory) => factory,
                    // The slot is empty only while its own factory runs.
                    None => panic!("lazy target factory re-entered during materialisation"),
                },
            }
        };
        let id = factory(graph, office);
        *self.node.borrow_mut() = TargetNode::Ready(id);
        id
    }
}

/// Scoped registry resolving a source's auto-wire keys against registered
/// target candidates.
///
/// Matching scans this scope's targets in registration order; on a miss the
/// parent scope is consulted. Scope lookups never mutate ancestors.
pub struct AutoWirer {
    direction: MatchDirection,
    targets: RefCell<Vec<Rc<TargetEntry>>>,
    parent: Option<Rc<AutoWirer>>,
}

impl AutoWirer {
    pub fn new(direction: MatchDirection) -> Rc<Self> {
        Rc::new(Self {
            direction,
            targets: RefCell::new(Vec::new()),
            parent: None,
        })
    }

    /// Child registry consulted first, delegating to `self` on miss.
    pub fn scoped(self: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self {
            direction: self.direction,
            targets: RefCell::new(Vec::new()),
            parent: Some(Rc::clone(self)),
        })
    }

    /// Register a concrete target candidate.
    pub fn add_target(&self, node: NodeId, wires: Vec<AutoWire>) {
        self.targets.borrow_mut().push(Rc::new(TargetEntry {
            wires,
            node: RefCell::new(TargetNode::Ready(node)),
        }));
    }

    /// Register a lazy candidate, materialised only if actually selected.
    ///
    /// Materialisation is not re-entrant: the factory must not resolve
    /// through a wirer that could select this same entry, and panics if it
    /// does.
    pub fn add_lazy_target(
        &self,
        factory: impl FnOnce(&mut CompileGraph, NodeId) -> NodeId + 'static,
        wires: Vec<AutoWire>,
    ) {
        self.targets.borrow_mut().push(Rc::new(TargetEntry {
            wires,
            node: RefCell::new(TargetNode::Lazy(Some(Box::new(factory)))),
        }));
    }

    fn is_match(&self, source: &AutoWire, target: &AutoWire) -> bool {
        if source.type_name() != target.type_name() {
            return false;
        }
        match self.direction {
            MatchDirection::SourceRequiresTarget => match source.qualifier() {
                Some(q) => target.qualifier() == Some(q),
                None => true,
            },
            MatchDirection::TargetCategorisesSource => match target.qualifier() {
                Some(q) => source.qualifier() == Some(q),
                None => true,
            },
        }
    }

    /// First satisfying target for one source key, searching this scope in
    /// registration order before delegating to the parent.
    fn select(&self, wire: &AutoWire) -> Option<(Rc<TargetEntry>, AutoWire)> {
        let targets = self.targets.borrow();
        for entry in targets.iter() {
            if let Some(matched) = entry.wires.iter().find(|t| self.is_match(wire, t)) {
                return Some((Rc::clone(entry), matched.clone()));
            }
        }
        drop(targets);
        self.parent.as_ref()?.select(wire)
    }

    /// Optional wiring: identical matching to [`AutoWirer::get_links`],
    /// silent when a source key has no match.
    pub fn find_links(
        &self,
        graph: &mut CompileGraph,
        office: NodeId,
        source: NodeId,
        wires: &[AutoWire],
    ) -> Vec<AutoWireLink> {
        self.resolve(graph, office, source, wires, None)
    }

    /// Required wiring: one issue per source key with no match.
    pub fn get_links(
        &self,
        graph: &mut CompileGraph,
        office: NodeId,
        source: NodeId,
        wires: &[AutoWire],
    ) -> Vec<AutoWireLink> {
        let identity = graph.issue_identity(source);
        self.resolve(graph, office, source, wires, Some(identity))
    }

    fn resolve(
        &self,
        graph: &mut CompileGraph,
        office: NodeId,
        source: NodeId,
        wires: &[AutoWire],
        required: Option<(String, &'static str)>,
    ) -> Vec<AutoWireLink> {
        let mut links = Vec::new();
        for wire in wires {
            match self.select(wire) {
                Some((entry, target_wire)) => {
                    let target = entry.materialise(graph, office);
                    links.push(AutoWireLink {
                        source,
                        source_wire: wire.clone(),
                        target,
                        target_wire,
                    });
                }
                None => {
                    if let Some((node, kind)) = &required {
                        graph.issues().raise(
                            node.clone(),
                            kind,
                            format!("No target found by auto-wiring {}", wire),
                        );
                        graph.flag(source);
                    }
                }
            }
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_case_sensitive() {
        assert_eq!(AutoWire::new("Connection"), AutoWire::new("Connection"));
        assert_ne!(AutoWire::new("Connection"), AutoWire::new("connection"));
        assert_ne!(
            AutoWire::qualified("db1", "Connection"),
            AutoWire::new("Connection")
        );
    }

    #[test]
    fn ordering_is_case_insensitive_first() {
        let a = AutoWire::new("alpha");
        let b = AutoWire::new("Beta");
        assert!(a < b);
        // Consistent with Eq: distinct keys never compare equal.
        let upper = AutoWire::new("ALPHA");
        assert_ne!(upper.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn display_renders_qualifier_prefix() {
        assert_eq!(AutoWire::qualified("db1", "Connection").to_string(), "db1:Connection");
        assert_eq!(AutoWire::new("Connection").to_string(), "Connection");
    }

    #[test]
    fn from_handle_preseeds_resolution() {
        let handle = Rc::new(TypeEntry {
            name: "Connection".into(),
            supertypes: vec![],
        });
        let wire = AutoWire::from_handle(Some("db1".into()), Rc::clone(&handle));
        assert_eq!(wire.qualifier(), Some("db1"));
        assert_eq!(wire.type_name(), "Connection");
        // No registry consultation needed: the handle rides along.
        let resolved = wire.type_handle(&TypeRegistry::new()).unwrap();
        assert!(Rc::ptr_eq(&resolved, &handle));
        assert_eq!(wire, AutoWire::qualified("db1", "Connection"));
    }

    #[test]
    fn type_handle_resolution_is_best_effort() {
        let mut registry = TypeRegistry::new();
        registry.register("Connection", vec![]);
        let wire = AutoWire::new("Connection");
        assert!(wire.type_handle(&registry).is_some());
        let missing = AutoWire::new("Nope");
        assert!(missing.type_handle(&registry).is_none());
    }
}
