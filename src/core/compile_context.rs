//! Per-pass memoized cache of derived type descriptors.
//!
//! One independent namespace per descriptor kind; entries are written only
//! on successful load. A failing load operation has already raised its own
//! issue — the cache never double-reports. Each node's slot is independent,
//! so a loader recursively touching sibling nodes cannot deadlock on
//! itself; true cross-node cycles must be broken by the caller.

use crate::core::types::{
    AdministrationType, FunctionNamespaceType, GovernanceType, ManagedObjectType,
    SuppliedManagedObjectSourceType, SupplierType, TeamType,
};
use crate::nodes::node::NodeId;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Management registration forwarded toward a process-wide registry.
#[derive(Debug, Clone, Serialize)]
pub struct MBeanRegistration {
    pub kind: String,
    pub name: String,
    pub value: serde_json::Value,
}

#[derive(Default)]
pub struct CompileContext {
    managed_object_types: RefCell<FxHashMap<NodeId, Rc<ManagedObjectType>>>,
    team_types: RefCell<FxHashMap<NodeId, Rc<TeamType>>>,
    governance_types: RefCell<FxHashMap<NodeId, Rc<GovernanceType>>>,
    administration_types: RefCell<FxHashMap<NodeId, Rc<AdministrationType>>>,
    function_namespace_types: RefCell<FxHashMap<NodeId, Rc<FunctionNamespaceType>>>,
    supplier_types: RefCell<FxHashMap<NodeId, Rc<SupplierType>>>,
    supplied_managed_object_source_types:
        RefCell<FxHashMap<NodeId, Rc<SuppliedManagedObjectSourceType>>>,
    mbeans: RefCell<Vec<MBeanRegistration>>,
}

/// Cache-then-load. The cache borrow is released before the loader runs so
/// a loader may recursively consult sibling slots.
fn get_or_load<T>(
    cache: &RefCell<FxHashMap<NodeId, Rc<T>>>,
    node: NodeId,
    load: impl FnOnce() -> Option<T>,
) -> Option<Rc<T>> {
    {
        let cached = cache.borrow();
        if let Some(existing) = cached.get(&node) {
            return Some(Rc::clone(existing));
        }
    }
    let loaded = Rc::new(load()?);
    cache.borrow_mut().insert(node, Rc::clone(&loaded));
    Some(loaded)
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load_managed_object_type(
        &self,
        node: NodeId,
        load: impl FnOnce() -> Option<ManagedObjectType>,
    ) -> Option<Rc<ManagedObjectType>> {
        get_or_load(&self.managed_object_types, node, load)
    }

    pub fn get_or_load_team_type(
        &self,
        node: NodeId,
        load: impl FnOnce() -> Option<TeamType>,
    ) -> Option<Rc<TeamType>> {
        get_or_load(&self.team_types, node, load)
    }

    pub fn get_or_load_governance_type(
        &self,
        node: NodeId,
        load: impl FnOnce() -> Option<GovernanceType>,
    ) -> Option<Rc<GovernanceType>> {
        get_or_load(&self.governance_types, node, load)
    }

    pub fn get_or_load_administration_type(
        &self,
        node: NodeId,
        load: impl FnOnce() -> Option<AdministrationType>,
    ) -> Option<Rc<AdministrationType>> {
        get_or_load(&self.administration_types, node, load)
    }

    pub fn get_or_load_function_namespace_type(
        &self,
        node: NodeId,
        load: impl FnOnce() -> Option<FunctionNamespaceType>,
    ) -> Option<Rc<FunctionNamespaceType>> {
        get_or_load(&self.function_namespace_types, node, load)
    }

    pub fn get_or_load_supplier_type(
        &self,
        node: NodeId,
        load: impl FnOnce() -> Option<SupplierType>,
    ) -> Option<Rc<SupplierType>> {
        get_or_load(&self.supplier_types, node, load)
    }

    pub fn get_or_load_supplied_managed_object_source_type(
        &self,
        node: NodeId,
        load: impl FnOnce() -> Option<SuppliedManagedObjectSourceType>,
    ) -> Option<Rc<SuppliedManagedObjectSourceType>> {
        get_or_load(&self.supplied_managed_object_source_types, node, load)
    }

    /// Cached descriptor without loading, if present.
    pub fn managed_object_type(&self, node: NodeId) -> Option<Rc<ManagedObjectType>> {
        self.managed_object_types.borrow().get(&node).cloned()
    }

    pub fn team_type(&self, node: NodeId) -> Option<Rc<TeamType>> {
        self.team_types.borrow().get(&node).cloned()
    }

    pub fn governance_type(&self, node: NodeId) -> Option<Rc<GovernanceType>> {
        self.governance_types.borrow().get(&node).cloned()
    }

    pub fn administration_type(&self, node: NodeId) -> Option<Rc<AdministrationType>> {
        self.administration_types.borrow().get(&node).cloned()
    }

    /// Unrelated passthrough toward the process-wide management registry.
    pub fn register_possible_mbean(
        &self,
        kind: impl Into<String>,
        name: impl Into<String>,
        value: serde_json::Value,
    ) {
        self.mbeans.borrow_mut().push(MBeanRegistration {
            kind: kind.into(),
            name: name.into(),
            value,
        });
    }

    pub fn registered_mbeans(&self) -> Vec<MBeanRegistration> {
        self.mbeans.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_once_and_memoizes() {
        let ctx = CompileContext::new();
        let mut loads = 0;
        for _ in 0..3 {
            let loaded = ctx.get_or_load_team_type(NodeId(1), || {
                loads += 1;
                Some(TeamType {
                    requires_size: false,
                })
            });
            assert!(loaded.is_some());
        }
        assert_eq!(loads, 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let ctx = CompileContext::new();
        assert!(ctx.get_or_load_team_type(NodeId(1), || None).is_none());
        // Slot stays empty so a later successful load still runs.
        let loaded = ctx.get_or_load_team_type(NodeId(1), || {
            Some(TeamType {
                requires_size: true,
            })
        });
        assert!(loaded.unwrap().requires_size);
    }

    #[test]
    fn namespaces_are_independent() {
        let ctx = CompileContext::new();
        ctx.get_or_load_team_type(NodeId(1), || {
            Some(TeamType {
                requires_size: false,
            })
        });
        assert!(ctx.managed_object_type(NodeId(1)).is_none());
        assert!(ctx.team_type(NodeId(1)).is_some());
    }
}
