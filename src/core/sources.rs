//! Source extension points and their registry.
//!
//! One source capability per node kind, invoked while the node is sourced.
//! Sources are instantiated from a symbolic-name → factory table populated
//! at startup — never a runtime scan. The stock sources cover the common
//! cases so a composition can compile without user-supplied plugins.

use crate::core::autowire::{AutoWire, TypeRegistry};
use crate::core::types::{
    AdministrationType, FunctionNamespaceType, FunctionType, GovernanceType, ManagedObjectType,
    SuppliedManagedObjectSourceType, SupplierType, TeamType,
};
use crate::nodes::graph::CompileGraph;
use crate::nodes::kinds::NodeKind;
use crate::nodes::node::NodeId;
use crate::nodes::section::{
    FunctionObjectState, ManagedFunctionState, SectionInputState, SectionOutputState,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Name/value configuration handed to a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Failure of a source operation. The phase running the source converts
/// this into an issue against the sourced node; sources never raise issues
/// themselves.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub message: String,
    pub cause: Option<String>,
}

impl SourceFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }
}

/// Read-only context available to every source operation.
pub struct SourceContext<'a> {
    properties: &'a [Property],
    types: &'a TypeRegistry,
}

impl<'a> SourceContext<'a> {
    pub fn new(properties: &'a [Property], types: &'a TypeRegistry) -> Self {
        Self { properties, types }
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn required_property(&self, name: &str) -> Result<&str, SourceFailure> {
        self.property(name)
            .ok_or_else(|| SourceFailure::new(format!("Missing property '{}'", name)))
    }

    pub fn types(&self) -> &TypeRegistry {
        self.types
    }
}

/// Narrow builder handle a section source uses to populate its section.
pub struct SectionDesigner<'a> {
    graph: &'a mut CompileGraph,
    section: NodeId,
}

impl<'a> SectionDesigner<'a> {
    pub fn new(graph: &'a mut CompileGraph, section: NodeId) -> Self {
        Self { graph, section }
    }

    pub fn add_input(&mut self, name: &str) -> NodeId {
        self.graph
            .add(self.section, name, || NodeKind::SectionInput(SectionInputState))
    }

    pub fn add_output(&mut self, name: &str) -> NodeId {
        self.graph.add(self.section, name, || {
            NodeKind::SectionOutput(SectionOutputState::default())
        })
    }

    pub fn add_function(&mut self, name: &str, responsibility: Vec<AutoWire>) -> NodeId {
        self.graph.add(self.section, name, || {
            NodeKind::ManagedFunction(ManagedFunctionState {
                responsibility,
                ..ManagedFunctionState::default()
            })
        })
    }

    /// Add a dependency slot to a function with its auto-wire requirement.
    pub fn add_function_object(
        &mut self,
        function: NodeId,
        name: &str,
        requirement: AutoWire,
    ) -> NodeId {
        self.graph.add(function, name, || {
            NodeKind::FunctionObject(FunctionObjectState {
                requirement: Some(requirement),
                ..FunctionObjectState::default()
            })
        })
    }
}

pub trait ManagedObjectSource {
    fn load_type(&self, ctx: &SourceContext<'_>) -> Result<ManagedObjectType, SourceFailure>;
}

pub trait TeamSource {
    fn load_type(&self, ctx: &SourceContext<'_>) -> Result<TeamType, SourceFailure>;
}

pub trait GovernanceSource {
    fn load_type(&self, ctx: &SourceContext<'_>) -> Result<GovernanceType, SourceFailure>;
}

pub trait AdministrationSource {
    fn load_type(&self, ctx: &SourceContext<'_>) -> Result<AdministrationType, SourceFailure>;
}

pub trait SupplierSource {
    fn supply(&self, ctx: &SourceContext<'_>) -> Result<SupplierType, SourceFailure>;
}

pub trait SectionSource {
    /// Populate the section's children and links.
    fn source_section(
        &self,
        designer: &mut SectionDesigner<'_>,
        ctx: &SourceContext<'_>,
    ) -> Result<(), SourceFailure>;

    /// Descriptor of the functions this section contributes.
    fn load_namespace_type(
        &self,
        ctx: &SourceContext<'_>,
    ) -> Result<FunctionNamespaceType, SourceFailure>;
}

type Factory<T> = Box<dyn Fn() -> Rc<T>>;

/// Symbolic-name → source-factory registry, one table per kind.
///
/// The table is the plugin seam: populate it at startup, look sources up by
/// the name the composition declares. An unknown name is a type-load
/// failure on the declaring node, not a crash.
#[derive(Default)]
pub struct SourceRegistry {
    managed_object_sources: FxHashMap<String, Factory<dyn ManagedObjectSource>>,
    team_sources: FxHashMap<String, Factory<dyn TeamSource>>,
    section_sources: FxHashMap<String, Factory<dyn SectionSource>>,
    governance_sources: FxHashMap<String, Factory<dyn GovernanceSource>>,
    administration_sources: FxHashMap<String, Factory<dyn AdministrationSource>>,
    supplier_sources: FxHashMap<String, Factory<dyn SupplierSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the stock sources.
    pub fn with_stock() -> Self {
        let mut registry = Self::new();
        registry.register_managed_object_source("value", || Rc::new(stock::ValueObjectSource));
        registry.register_team_source("passive", || Rc::new(stock::PassiveTeamSource));
        registry.register_team_source("executor", || Rc::new(stock::ExecutorTeamSource));
        registry.register_governance_source("simple", || Rc::new(stock::SimpleGovernanceSource));
        registry
            .register_administration_source("simple", || Rc::new(stock::SimpleAdministrationSource));
        registry.register_supplier_source("properties", || Rc::new(stock::PropertySupplierSource));
        registry.register_section_source("empty", || Rc::new(stock::EmptySectionSource));
        registry
    }

    pub fn register_managed_object_source(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Rc<dyn ManagedObjectSource> + 'static,
    ) {
        self.managed_object_sources
            .insert(name.into(), Box::new(factory));
    }

    pub fn register_team_source(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Rc<dyn TeamSource> + 'static,
    ) {
        self.team_sources.insert(name.into(), Box::new(factory));
    }

    pub fn register_section_source(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Rc<dyn SectionSource> + 'static,
    ) {
        self.section_sources.insert(name.into(), Box::new(factory));
    }

    pub fn register_governance_source(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Rc<dyn GovernanceSource> + 'static,
    ) {
        self.governance_sources.insert(name.into(), Box::new(factory));
    }

    pub fn register_administration_source(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Rc<dyn AdministrationSource> + 'static,
    ) {
        self.administration_sources
            .insert(name.into(), Box::new(factory));
    }

    pub fn register_supplier_source(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Rc<dyn SupplierSource> + 'static,
    ) {
        self.supplier_sources.insert(name.into(), Box::new(factory));
    }

    pub fn managed_object_source(&self, name: &str) -> Option<Rc<dyn ManagedObjectSource>> {
        self.managed_object_sources.get(name).map(|f| f())
    }

    pub fn team_source(&self, name: &str) -> Option<Rc<dyn TeamSource>> {
        self.team_sources.get(name).map(|f| f())
    }

    pub fn section_source(&self, name: &str) -> Option<Rc<dyn SectionSource>> {
        self.section_sources.get(name).map(|f| f())
    }

    pub fn governance_source(&self, name: &str) -> Option<Rc<dyn GovernanceSource>> {
        self.governance_sources.get(name).map(|f| f())
    }

    pub fn administration_source(&self, name: &str) -> Option<Rc<dyn AdministrationSource>> {
        self.administration_sources.get(name).map(|f| f())
    }

    pub fn supplier_source(&self, name: &str) -> Option<Rc<dyn SupplierSource>> {
        self.supplier_sources.get(name).map(|f| f())
    }
}

/// Stock sources backing the common declarative cases.
pub mod stock {
    use super::*;

    /// Managed-object source for a plain value object. Property `type` names
    /// the object type; optional `dependencies` is a comma-separated list of
    /// `[qualifier:]type` requirements.
    pub struct ValueObjectSource;

    impl ManagedObjectSource for ValueObjectSource {
        fn load_type(&self, ctx: &SourceContext<'_>) -> Result<ManagedObjectType, SourceFailure> {
            let object_type = ctx.required_property("type")?.to_string();
            let dependencies = ctx
                .property("dependencies")
                .map(parse_wires)
                .unwrap_or_default();
            Ok(ManagedObjectType {
                object_type,
                dependencies,
                flows: Vec::new(),
                input: ctx.property("input").is_some_and(|v| v == "true"),
            })
        }
    }

    fn parse_wires(spec: &str) -> Vec<AutoWire> {
        spec.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.split_once(':') {
                Some((qualifier, type_name)) => AutoWire::qualified(qualifier, type_name),
                None => AutoWire::new(s),
            })
            .collect()
    }

    /// Team executing work on the caller's thread; carries no size.
    pub struct PassiveTeamSource;

    impl TeamSource for PassiveTeamSource {
        fn load_type(&self, _ctx: &SourceContext<'_>) -> Result<TeamType, SourceFailure> {
            Ok(TeamType {
                requires_size: false,
            })
        }
    }

    /// Thread-pool team; the composition must declare a size.
    pub struct ExecutorTeamSource;

    impl TeamSource for ExecutorTeamSource {
        fn load_type(&self, _ctx: &SourceContext<'_>) -> Result<TeamType, SourceFailure> {
            Ok(TeamType {
                requires_size: true,
            })
        }
    }

    /// Governance over a single extension type named by property `extension`.
    pub struct SimpleGovernanceSource;

    impl GovernanceSource for SimpleGovernanceSource {
        fn load_type(&self, ctx: &SourceContext<'_>) -> Result<GovernanceType, SourceFailure> {
            Ok(GovernanceType {
                extension_type: ctx.required_property("extension")?.to_string(),
            })
        }
    }

    /// Administration over a single extension type named by property
    /// `extension`.
    pub struct SimpleAdministrationSource;

    impl AdministrationSource for SimpleAdministrationSource {
        fn load_type(&self, ctx: &SourceContext<'_>) -> Result<AdministrationType, SourceFailure> {
            Ok(AdministrationType {
                extension_type: ctx.required_property("extension")?.to_string(),
            })
        }
    }

    /// Supplier whose properties enumerate the sources it can supply: each
    /// property is `name = "[qualifier:]type"`, supplied through the stock
    /// value source.
    pub struct PropertySupplierSource;

    impl SupplierSource for PropertySupplierSource {
        fn supply(&self, ctx: &SourceContext<'_>) -> Result<SupplierType, SourceFailure> {
            let supplied = ctx
                .properties
                .iter()
                .map(|p| {
                    let wire = match p.value.split_once(':') {
                        Some((qualifier, type_name)) => AutoWire::qualified(qualifier, type_name),
                        None => AutoWire::new(p.value.as_str()),
                    };
                    SuppliedManagedObjectSourceType {
                        name: p.name.clone(),
                        wire,
                        source_name: "value".to_string(),
                    }
                })
                .collect();
            Ok(SupplierType { supplied })
        }
    }

    /// Section with no contributed structure.
    pub struct EmptySectionSource;

    impl SectionSource for EmptySectionSource {
        fn source_section(
            &self,
            _designer: &mut SectionDesigner<'_>,
            _ctx: &SourceContext<'_>,
        ) -> Result<(), SourceFailure> {
            Ok(())
        }

        fn load_namespace_type(
            &self,
            _ctx: &SourceContext<'_>,
        ) -> Result<FunctionNamespaceType, SourceFailure> {
            Ok(FunctionNamespaceType {
                functions: Vec::<FunctionType>::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_source_name_is_absent_not_fatal() {
        let registry = SourceRegistry::with_stock();
        assert!(registry.managed_object_source("value").is_some());
        assert!(registry.managed_object_source("nope").is_none());
    }

    #[test]
    fn value_source_requires_type_property() {
        let registry_types = TypeRegistry::new();
        let props = vec![Property::new("type", "example.Connection")];
        let ctx = SourceContext::new(&props, &registry_types);
        let loaded = stock::ValueObjectSource.load_type(&ctx).unwrap();
        assert_eq!(loaded.object_type, "example.Connection");

        let empty: Vec<Property> = Vec::new();
        let ctx = SourceContext::new(&empty, &registry_types);
        let failure = stock::ValueObjectSource.load_type(&ctx).unwrap_err();
        assert!(failure.message.contains("Missing property 'type'"));
    }
}
