//! The compile pass driver.
//!
//! Create → Initialise → Source → AutoWire → LoadTypes → Build, single
//! threaded and issue-tolerant: a problem halts only the offending node,
//! the pass keeps going, and the runtime sink is withheld unless the whole
//! pass finishes with zero issues.

use crate::core::autowire::{AutoWire, AutoWirer, MatchDirection, TypeRegistry};
use crate::core::compile_context::{CompileContext, MBeanRegistration};
use crate::core::error::CompileError;
use crate::core::issues::NodeIssue;
use crate::core::sources::{
    AdministrationSource, GovernanceSource, ManagedObjectSource, Property, SectionDesigner,
    SectionSource, SourceContext, SourceFailure, SourceRegistry, SupplierSource, TeamSource,
};
use crate::emit::{emit, RuntimeSink};
use crate::model::{AdministrationOrderModel, CompositionModel};
use crate::nodes::governance::{AdministrationOrder, AdministrationState, GovernanceState};
use crate::nodes::graph::CompileGraph;
use crate::nodes::kinds::NodeKind;
use crate::nodes::links::LinkRole;
use crate::nodes::managed_object::{
    InputManagedObjectState, ManagedObjectPoolState, ManagedObjectSourceState, ManagedObjectState,
};
use crate::nodes::node::{NodeId, NodePhase};
use crate::nodes::office::{ExecutiveState, OfficeInputState, OfficeState};
use crate::nodes::section::{
    FunctionObjectState, ManagedFunctionState, SectionInputState, SectionOutputState, SectionState,
};
use crate::nodes::supplier::{SuppliedManagedObjectSourceState, SupplierState};
use crate::nodes::team::TeamState;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Outcome of one compile pass.
#[derive(Debug, Serialize)]
pub struct CompileReport {
    /// Whether the pass reached Built and the sink received bind calls.
    pub built: bool,
    pub timestamp: String,
    pub node_count: usize,
    pub issues: Vec<NodeIssue>,
    pub mbeans: Vec<MBeanRegistration>,
}

impl CompileReport {
    /// One-line-per-issue terminal rendering, capped at 50 items.
    pub fn render_issues(&self) -> String {
        crate::core::output::render_issues(&self.issues, 50)
    }
}

/// Sources and types instantiated for the nodes of one pass.
#[derive(Default)]
struct PassPlugins {
    managed_object_sources: FxHashMap<NodeId, Rc<dyn ManagedObjectSource>>,
    teams: FxHashMap<NodeId, Rc<dyn TeamSource>>,
    sections: FxHashMap<NodeId, Rc<dyn SectionSource>>,
    governances: FxHashMap<NodeId, Rc<dyn GovernanceSource>>,
    administrations: FxHashMap<NodeId, Rc<dyn AdministrationSource>>,
    suppliers: FxHashMap<NodeId, Rc<dyn SupplierSource>>,
}

fn props(map: &BTreeMap<String, String>) -> Vec<Property> {
    map.iter().map(|(k, v)| Property::new(k, v)).collect()
}

fn wire_of(type_name: &Option<String>, qualifier: &Option<String>) -> Option<AutoWire> {
    let type_name = type_name.as_deref()?;
    Some(match qualifier {
        Some(q) => AutoWire::qualified(q, type_name),
        None => AutoWire::new(type_name),
    })
}

pub struct Compiler {
    sources: SourceRegistry,
    types: TypeRegistry,
}

impl Compiler {
    pub fn new(sources: SourceRegistry, types: TypeRegistry) -> Self {
        Self { sources, types }
    }

    /// Compiler with the stock sources and an empty type registry.
    pub fn stock() -> Self {
        Self::new(SourceRegistry::with_stock(), TypeRegistry::new())
    }

    /// Run one full compile pass over the model, emitting into `sink` only
    /// when the pass raises zero issues.
    pub fn compile(
        &self,
        model: &CompositionModel,
        sink: &mut dyn RuntimeSink,
    ) -> Result<CompileReport, CompileError> {
        let mut types = self.types.clone();
        for declared in &model.types {
            types.register(declared.name.clone(), declared.supertypes.clone());
        }

        let mut graph = self.lower(model)?;
        let ctx = CompileContext::new();
        let mut plugins = PassPlugins::default();

        self.source_phase(&mut graph, &ctx, &mut plugins, &types);
        self.autowire_phase(&mut graph)?;
        self.load_types_phase(&mut graph, &ctx, &mut plugins, &types);

        let built = graph.issues().is_empty();
        if built {
            let emitted = emit(&graph, &ctx, sink)?;
            for id in emitted {
                graph.set_phase(id, NodePhase::Built);
            }
        }

        Ok(CompileReport {
            built,
            timestamp: chrono::Utc::now().to_rfc3339(),
            node_count: graph.len(),
            issues: graph.issues().snapshot(),
            mbeans: ctx.registered_mbeans(),
        })
    }

    /// Parse and compile a TOML composition.
    pub fn compile_str(
        &self,
        toml: &str,
        sink: &mut dyn RuntimeSink,
    ) -> Result<CompileReport, CompileError> {
        let model = CompositionModel::from_toml_str(toml)?;
        self.compile(&model, sink)
    }

    // ----- Create / Initialise -----

    fn lower(&self, model: &CompositionModel) -> Result<CompileGraph, CompileError> {
        let mut graph = CompileGraph::new(model.officefloor.name.clone().unwrap_or_default());
        let root = graph.root();

        for executive in &model.executives {
            graph.add(root, &executive.name, || NodeKind::Executive(ExecutiveState));
        }

        for pool in &model.pools {
            graph.add(root, &pool.name, || {
                NodeKind::ManagedObjectPool(ManagedObjectPoolState)
            });
        }

        for team in &model.teams {
            let state = TeamState {
                source_name: team.source.clone(),
                properties: props(&team.properties),
                size: team.size,
                classifiers: wire_of(&team.type_name, &team.qualifier).into_iter().collect(),
                ..TeamState::default()
            };
            graph.add(root, &team.name, || NodeKind::Team(state));
        }

        for mos in &model.managed_object_sources {
            let state = ManagedObjectSourceState {
                source_name: mos.source.clone(),
                properties: props(&mos.properties),
                ..ManagedObjectSourceState::default()
            };
            graph.add(root, &mos.name, || NodeKind::ManagedObjectSource(state));
        }

        for supplier in &model.suppliers {
            let state = SupplierState {
                source_name: supplier.source.clone(),
                properties: props(&supplier.properties),
            };
            graph.add(root, &supplier.name, || NodeKind::Supplier(state));
        }

        for office in &model.offices {
            let office_id = graph.add(root, &office.name, || NodeKind::Office(OfficeState));
            for input in &office.inputs {
                graph.add(office_id, &input.name, || {
                    NodeKind::OfficeInput(OfficeInputState::default())
                });
            }
            for section in &office.sections {
                let state = SectionState {
                    source_name: section.source.clone(),
                    properties: props(&section.properties),
                };
                let section_id = graph.add(office_id, &section.name, || NodeKind::Section(state));
                if let Some(location) = &section.location {
                    graph.set_location(section_id, location.clone());
                }
                for input in &section.inputs {
                    graph.add(section_id, input, || {
                        NodeKind::SectionInput(SectionInputState)
                    });
                }
                for output in &section.outputs {
                    graph.add(section_id, &output.name, || {
                        NodeKind::SectionOutput(SectionOutputState::default())
                    });
                }
                for function in &section.functions {
                    let responsibility =
                        wire_of(&function.team_type, &function.team_qualifier)
                            .into_iter()
                            .collect();
                    let function_id = graph.add(section_id, &function.name, || {
                        NodeKind::ManagedFunction(ManagedFunctionState {
                            responsibility,
                            ..ManagedFunctionState::default()
                        })
                    });
                    for object in &function.objects {
                        let requirement = wire_of(
                            &Some(object.type_name.clone()),
                            &object.qualifier,
                        );
                        graph.add(function_id, &object.name, || {
                            NodeKind::FunctionObject(FunctionObjectState {
                                requirement,
                                ..FunctionObjectState::default()
                            })
                        });
                    }
                }
            }
        }

        for mo in &model.managed_objects {
            let scope = match &mo.office {
                Some(office_name) => match graph.child_by_name(root, office_name) {
                    Some(office) => office,
                    None => {
                        // No node identity yet to report against; create at
                        // root so the reference issue lands on the object.
                        root
                    }
                },
                None => root,
            };
            let offered = wire_of(&mo.type_name, &mo.qualifier).into_iter().collect();
            let mo_id = graph.add(scope, &mo.name, || {
                NodeKind::ManagedObject(ManagedObjectState {
                    source: None,
                    offered,
                })
            });
            if mo.office.is_some() && scope == root {
                graph.raise(
                    mo_id,
                    format!("Unknown Office '{}'", mo.office.as_deref().unwrap_or_default()),
                );
                graph.flag(mo_id);
            }
        }

        for input in &model.input_managed_objects {
            graph.add(root, &input.name, || {
                NodeKind::InputManagedObject(InputManagedObjectState::default())
            });
        }

        for governance in &model.governances {
            let state = GovernanceState {
                source_name: governance.source.clone(),
                properties: props(&governance.properties),
                ..GovernanceState::default()
            };
            graph.add(root, &governance.name, || NodeKind::Governance(state));
        }

        for administration in &model.administrations {
            let state = AdministrationState {
                source_name: administration.source.clone(),
                properties: props(&administration.properties),
                order: match administration.order {
                    AdministrationOrderModel::Pre => AdministrationOrder::Pre,
                    AdministrationOrderModel::Post => AdministrationOrder::Post,
                },
                ..AdministrationState::default()
            };
            graph.add(root, &administration.name, || {
                NodeKind::Administration(state)
            });
        }

        self.wire_declared(&mut graph, model)?;
        Ok(graph)
    }

    /// Apply the explicit, by-name links the composition declares. Unknown
    /// references are issues on the declaring node.
    fn wire_declared(
        &self,
        graph: &mut CompileGraph,
        model: &CompositionModel,
    ) -> Result<(), CompileError> {
        let root = graph.root();

        for team in &model.teams {
            let Some(team_id) = graph.child_by_name(root, &team.name) else {
                continue;
            };
            if let Some(oversight) = &team.oversight {
                match graph.child_by_name(root, oversight) {
                    Some(executive) => {
                        graph.link(team_id, LinkRole::TeamOversight, executive)?;
                    }
                    None => {
                        graph.raise(team_id, format!("Unknown Executive '{}'", oversight));
                        graph.flag(team_id);
                    }
                }
            }
        }

        for mos in &model.managed_object_sources {
            let Some(mos_id) = graph.child_by_name(root, &mos.name) else {
                continue;
            };
            if let Some(pool) = &mos.pool {
                match graph.child_by_name(root, pool) {
                    Some(pool_id) => {
                        graph.link(mos_id, LinkRole::Pool, pool_id)?;
                    }
                    None => {
                        graph.raise(mos_id, format!("Unknown Managed Object Pool '{}'", pool));
                        graph.flag(mos_id);
                    }
                }
            }
            if let Some(office) = &mos.managing_office {
                match graph.child_by_name(root, office) {
                    Some(office_id) => {
                        graph.link(mos_id, LinkRole::Office, office_id)?;
                    }
                    None => {
                        graph.raise(mos_id, format!("Unknown Office '{}'", office));
                        graph.flag(mos_id);
                    }
                }
            }
            let orderings = [
                (LinkRole::StartBefore, &mos.start_before),
                (LinkRole::StartAfter, &mos.start_after),
                (LinkRole::StartupBefore, &mos.startup_before),
                (LinkRole::StartupAfter, &mos.startup_after),
            ];
            for (role, peers) in orderings {
                for peer in peers {
                    match graph.child_by_name(root, peer) {
                        Some(peer_id) => {
                            graph.link(mos_id, role, peer_id)?;
                        }
                        None => {
                            graph.raise(
                                mos_id,
                                format!("Unknown Managed Object Source '{}'", peer),
                            );
                            graph.flag(mos_id);
                        }
                    }
                }
            }
        }

        for mo in &model.managed_objects {
            let scope = mo
                .office
                .as_ref()
                .and_then(|o| graph.child_by_name(root, o))
                .unwrap_or(root);
            let Some(mo_id) = graph.child_by_name(scope, &mo.name) else {
                continue;
            };
            match graph.child_by_name(root, &mo.source) {
                Some(source_id) => {
                    if let NodeKind::ManagedObject(state) = &mut graph.node_mut(mo_id).kind {
                        state.source = Some(source_id);
                    }
                }
                None => {
                    graph.raise(
                        mo_id,
                        format!("Unknown Managed Object Source '{}'", mo.source),
                    );
                    graph.flag(mo_id);
                }
            }
        }

        for input in &model.input_managed_objects {
            let Some(input_id) = graph.child_by_name(root, &input.name) else {
                continue;
            };
            for source in &input.sources {
                match graph.child_by_name(root, source) {
                    Some(source_id) => {
                        graph.link(input_id, LinkRole::Object, source_id)?;
                    }
                    None => {
                        graph.raise(
                            input_id,
                            format!("Unknown Managed Object Source '{}'", source),
                        );
                        graph.flag(input_id);
                    }
                }
            }
        }

        for office in &model.offices {
            let Some(office_id) = graph.child_by_name(root, &office.name) else {
                continue;
            };
            for input in &office.inputs {
                let Some(input_id) = graph.child_by_name(office_id, &input.name) else {
                    continue;
                };
                let target = graph
                    .child_by_name(office_id, &input.section)
                    .and_then(|s| graph.child_by_name(s, &input.input));
                match target {
                    Some(section_input) => {
                        graph.link(input_id, LinkRole::Flow, section_input)?;
                    }
                    None => {
                        graph.raise(
                            input_id,
                            format!(
                                "Unknown Section Input '{}.{}'",
                                input.section, input.input
                            ),
                        );
                        graph.flag(input_id);
                    }
                }
            }
            for section in &office.sections {
                let Some(section_id) = graph.child_by_name(office_id, &section.name) else {
                    continue;
                };
                for output in &section.outputs {
                    let Some(output_id) = graph.child_by_name(section_id, &output.name) else {
                        continue;
                    };
                    let Some(link) = &output.link else { continue };
                    let target = link.split_once('.').and_then(|(section_name, input_name)| {
                        graph
                            .child_by_name(office_id, section_name)
                            .and_then(|s| graph.child_by_name(s, input_name))
                    });
                    match target {
                        Some(section_input) => {
                            graph.link(output_id, LinkRole::Flow, section_input)?;
                        }
                        None => {
                            graph.raise(output_id, format!("Unknown Section Input '{}'", link));
                            graph.flag(output_id);
                        }
                    }
                }
            }
        }

        let crosscutting: Vec<(&str, Option<&str>, &Vec<String>)> = model
            .governances
            .iter()
            .map(|g| (g.name.as_str(), g.team.as_deref(), &g.governs))
            .chain(
                model
                    .administrations
                    .iter()
                    .map(|a| (a.name.as_str(), a.team.as_deref(), &a.administers)),
            )
            .collect();
        for (name, team, objects) in crosscutting {
            let Some(id) = graph.child_by_name(root, name) else {
                continue;
            };
            if let Some(team_name) = team {
                match graph.child_by_name(root, team_name) {
                    Some(team_id) => {
                        graph.link(id, LinkRole::Team, team_id)?;
                    }
                    None => {
                        graph.raise(id, format!("Unknown Team '{}'", team_name));
                        graph.flag(id);
                    }
                }
            }
            for object_name in objects {
                match self.find_object(graph, object_name) {
                    Some(object_id) => match &mut graph.node_mut(id).kind {
                        NodeKind::Governance(state) => state.governed.push(object_id),
                        NodeKind::Administration(state) => state.administered.push(object_id),
                        _ => {}
                    },
                    None => {
                        graph.raise(id, format!("Unknown Managed Object '{}'", object_name));
                        graph.flag(id);
                    }
                }
            }
        }

        Ok(())
    }

    /// Managed object by name, searching the OfficeFloor scope then each
    /// office scope.
    fn find_object(&self, graph: &CompileGraph, name: &str) -> Option<NodeId> {
        let root = graph.root();
        let is_object =
            |id: NodeId| matches!(graph.node(id).kind, NodeKind::ManagedObject(_));
        if let Some(id) = graph.child_by_name(root, name).filter(|&id| is_object(id)) {
            return Some(id);
        }
        graph
            .children(root)
            .iter()
            .copied()
            .filter(|&c| matches!(graph.node(c).kind, NodeKind::Office(_)))
            .find_map(|office| graph.child_by_name(office, name).filter(|&id| is_object(id)))
    }

    // ----- Source -----

    fn source_phase(
        &self,
        graph: &mut CompileGraph,
        ctx: &CompileContext,
        plugins: &mut PassPlugins,
        types: &TypeRegistry,
    ) {
        let ids: Vec<NodeId> = graph.ids().collect();
        for id in ids {
            match &graph.node(id).kind {
                NodeKind::ManagedObjectSource(state) => {
                    let source_name = state.source_name.clone();
                    match self.sources.managed_object_source(&source_name) {
                        Some(plugin) => {
                            plugins.managed_object_sources.insert(id, plugin);
                        }
                        None => self.unknown_source(graph, id, &source_name),
                    }
                }
                NodeKind::Team(state) => {
                    let source_name = state.source_name.clone();
                    match self.sources.team_source(&source_name) {
                        Some(plugin) => {
                            plugins.teams.insert(id, plugin);
                        }
                        None => self.unknown_source(graph, id, &source_name),
                    }
                }
                NodeKind::Governance(state) => {
                    let source_name = state.source_name.clone();
                    match self.sources.governance_source(&source_name) {
                        Some(plugin) => {
                            plugins.governances.insert(id, plugin);
                        }
                        None => self.unknown_source(graph, id, &source_name),
                    }
                }
                NodeKind::Administration(state) => {
                    let source_name = state.source_name.clone();
                    match self.sources.administration_source(&source_name) {
                        Some(plugin) => {
                            plugins.administrations.insert(id, plugin);
                        }
                        None => self.unknown_source(graph, id, &source_name),
                    }
                }
                NodeKind::Section(state) => {
                    let Some(source_name) = state.source_name.clone() else {
                        continue;
                    };
                    let properties = state.properties.clone();
                    match self.sources.section_source(&source_name) {
                        Some(plugin) => {
                            plugins.sections.insert(id, Rc::clone(&plugin));
                            let result = {
                                let source_ctx = SourceContext::new(&properties, types);
                                let mut designer = SectionDesigner::new(graph, id);
                                plugin.source_section(&mut designer, &source_ctx)
                            };
                            if let Err(failure) = result {
                                self.source_failed(graph, id, &failure);
                            }
                        }
                        None => self.unknown_source(graph, id, &source_name),
                    }
                }
                NodeKind::Supplier(state) => {
                    let source_name = state.source_name.clone();
                    let properties = state.properties.clone();
                    match self.sources.supplier_source(&source_name) {
                        Some(plugin) => {
                            plugins.suppliers.insert(id, Rc::clone(&plugin));
                            self.source_supplier(graph, ctx, id, &plugin, &properties, types);
                        }
                        None => self.unknown_source(graph, id, &source_name),
                    }
                }
                _ => {}
            }
        }

        let ids: Vec<NodeId> = graph.ids().collect();
        for id in ids {
            if !graph.node(id).flagged {
                graph.set_phase(id, NodePhase::Sourced);
            }
        }
    }

    /// Load the supplier's type and materialise one child node per supplied
    /// managed-object source.
    fn source_supplier(
        &self,
        graph: &mut CompileGraph,
        ctx: &CompileContext,
        supplier: NodeId,
        plugin: &Rc<dyn SupplierSource>,
        properties: &[Property],
        types: &TypeRegistry,
    ) {
        let supplier_type = ctx.get_or_load_supplier_type(supplier, || {
            let source_ctx = SourceContext::new(properties, types);
            match plugin.supply(&source_ctx) {
                Ok(loaded) => Some(loaded),
                Err(failure) => {
                    self.source_failed(graph, supplier, &failure);
                    None
                }
            }
        });
        let Some(supplier_type) = supplier_type else {
            return;
        };
        for supplied in &supplier_type.supplied {
            let child = graph.add(supplier, &supplied.name, || {
                NodeKind::SuppliedManagedObjectSource(SuppliedManagedObjectSourceState {
                    wire: Some(supplied.wire.clone()),
                    source_name: supplied.source_name.clone(),
                })
            });
            ctx.get_or_load_supplied_managed_object_source_type(child, || Some(supplied.clone()));
        }
    }

    fn unknown_source(&self, graph: &mut CompileGraph, id: NodeId, source_name: &str) {
        graph.raise(id, format!("Unknown source '{}'", source_name));
        graph.flag(id);
    }

    fn source_failed(&self, graph: &mut CompileGraph, id: NodeId, failure: &SourceFailure) {
        match &failure.cause {
            Some(cause) => graph.raise_with_cause(id, failure.message.clone(), cause.clone()),
            None => graph.raise(id, failure.message.clone()),
        }
        graph.flag(id);
    }

    // ----- AutoWire -----

    fn autowire_phase(&self, graph: &mut CompileGraph) -> Result<(), CompileError> {
        let root = graph.root();

        // Object wiring: OfficeFloor-level objects plus supplier-supplied
        // sources, shadowed per office by office-scoped objects.
        let object_wirer = AutoWirer::new(MatchDirection::SourceRequiresTarget);
        for &child in graph.children(root) {
            if let NodeKind::ManagedObject(state) = &graph.node(child).kind {
                if !state.offered.is_empty() {
                    object_wirer.add_target(child, state.offered.clone());
                }
            }
        }
        let suppliers: Vec<NodeId> = graph
            .children(root)
            .iter()
            .copied()
            .filter(|&c| matches!(graph.node(c).kind, NodeKind::Supplier(_)))
            .collect();
        for supplier in suppliers {
            for &supplied in graph.children(supplier).to_vec().iter() {
                let NodeKind::SuppliedManagedObjectSource(state) = &graph.node(supplied).kind
                else {
                    continue;
                };
                let Some(wire) = state.wire.clone() else { continue };
                let supplied_source = state.source_name.clone();
                let supplied_name = graph.node(supplied).name.clone();
                let factory_wire = wire.clone();
                object_wirer.add_lazy_target(
                    move |graph: &mut CompileGraph, _office: NodeId| {
                        let root = graph.root();
                        let mos = graph.add(root, &supplied_name, || {
                            NodeKind::ManagedObjectSource(ManagedObjectSourceState {
                                source_name: supplied_source,
                                properties: vec![Property::new(
                                    "type",
                                    factory_wire.type_name(),
                                )],
                                ..ManagedObjectSourceState::default()
                            })
                        });
                        let object_name = format!("{}_OBJECT", supplied_name);
                        graph.add(root, &object_name, || {
                            NodeKind::ManagedObject(ManagedObjectState {
                                source: Some(mos),
                                offered: vec![factory_wire.clone()],
                            })
                        })
                    },
                    vec![wire],
                );
            }
        }

        // Responsibility wiring: teams categorise functions.
        let team_wirer = AutoWirer::new(MatchDirection::TargetCategorisesSource);
        for &child in graph.children(root) {
            if let NodeKind::Team(state) = &graph.node(child).kind {
                if !state.classifiers.is_empty() {
                    team_wirer.add_target(child, state.classifiers.clone());
                }
            }
        }

        let offices: Vec<NodeId> = graph
            .children(root)
            .iter()
            .copied()
            .filter(|&c| matches!(graph.node(c).kind, NodeKind::Office(_)))
            .collect();
        for office in offices {
            let scope = object_wirer.scoped();
            for &child in graph.children(office) {
                if let NodeKind::ManagedObject(state) = &graph.node(child).kind {
                    if !state.offered.is_empty() {
                        scope.add_target(child, state.offered.clone());
                    }
                }
            }

            let sections: Vec<NodeId> = graph
                .children(office)
                .iter()
                .copied()
                .filter(|&c| matches!(graph.node(c).kind, NodeKind::Section(_)))
                .collect();
            for section in sections {
                let functions: Vec<NodeId> = graph
                    .children(section)
                    .iter()
                    .copied()
                    .filter(|&c| matches!(graph.node(c).kind, NodeKind::ManagedFunction(_)))
                    .collect();
                for function in functions {
                    let responsibility = match &graph.node(function).kind {
                        NodeKind::ManagedFunction(state) => state.responsibility.clone(),
                        _ => Vec::new(),
                    };
                    if !responsibility.is_empty()
                        && graph.linked(function, LinkRole::Team).is_none()
                    {
                        for link in team_wirer.get_links(graph, office, function, &responsibility)
                        {
                            graph.link(function, LinkRole::Team, link.target)?;
                        }
                    }

                    let objects: Vec<NodeId> = graph.children(function).to_vec();
                    for object in objects {
                        let requirement = match &graph.node(object).kind {
                            NodeKind::FunctionObject(state) => state.requirement.clone(),
                            _ => None,
                        };
                        let Some(requirement) = requirement else { continue };
                        if graph.linked(object, LinkRole::Object).is_some() {
                            continue;
                        }
                        for link in
                            scope.get_links(graph, office, object, &[requirement.clone()])
                        {
                            graph.link(object, LinkRole::Object, link.target)?;
                        }
                    }
                }
            }
        }

        let ids: Vec<NodeId> = graph.ids().collect();
        for id in ids {
            if !graph.node(id).flagged {
                graph.set_phase(id, NodePhase::AutoWired);
            }
        }
        Ok(())
    }

    // ----- Load types -----

    fn load_types_phase(
        &self,
        graph: &mut CompileGraph,
        ctx: &CompileContext,
        plugins: &mut PassPlugins,
        types: &TypeRegistry,
    ) {
        let ids: Vec<NodeId> = graph.ids().collect();
        for id in ids {
            if graph.node(id).flagged {
                continue;
            }
            match &graph.node(id).kind {
                NodeKind::ManagedObjectSource(state) => {
                    let source_name = state.source_name.clone();
                    let properties = state.properties.clone();
                    let plugin = match plugins.managed_object_sources.get(&id) {
                        Some(plugin) => Rc::clone(plugin),
                        // Supplier-materialised sources appear after the
                        // Source phase; instantiate on first load.
                        None => match self.sources.managed_object_source(&source_name) {
                            Some(plugin) => {
                                plugins.managed_object_sources.insert(id, Rc::clone(&plugin));
                                plugin
                            }
                            None => {
                                self.unknown_source(graph, id, &source_name);
                                continue;
                            }
                        },
                    };
                    let loaded = ctx.get_or_load_managed_object_type(id, || {
                        let source_ctx = SourceContext::new(&properties, types);
                        match plugin.load_type(&source_ctx) {
                            Ok(loaded) => Some(loaded),
                            Err(failure) => {
                                self.source_failed(graph, id, &failure);
                                None
                            }
                        }
                    });
                    if let Some(loaded) = loaded {
                        self.register_mbean(graph, ctx, id, &*loaded);
                        graph.set_phase(id, NodePhase::TypeLoaded);
                    }
                }
                NodeKind::Team(state) => {
                    let properties = state.properties.clone();
                    let size = state.size;
                    let Some(plugin) = plugins.teams.get(&id).map(Rc::clone) else {
                        continue;
                    };
                    let loaded = ctx.get_or_load_team_type(id, || {
                        let source_ctx = SourceContext::new(&properties, types);
                        match plugin.load_type(&source_ctx) {
                            Ok(loaded) => Some(loaded),
                            Err(failure) => {
                                self.source_failed(graph, id, &failure);
                                None
                            }
                        }
                    });
                    if let Some(loaded) = loaded {
                        if loaded.requires_size && size.is_none() {
                            graph.raise(id, "Team size must be specified");
                            graph.flag(id);
                            continue;
                        }
                        self.register_mbean(graph, ctx, id, &*loaded);
                        graph.set_phase(id, NodePhase::TypeLoaded);
                    }
                }
                NodeKind::Governance(state) => {
                    let properties = state.properties.clone();
                    let Some(plugin) = plugins.governances.get(&id).map(Rc::clone) else {
                        continue;
                    };
                    let loaded = ctx.get_or_load_governance_type(id, || {
                        let source_ctx = SourceContext::new(&properties, types);
                        match plugin.load_type(&source_ctx) {
                            Ok(loaded) => Some(loaded),
                            Err(failure) => {
                                self.source_failed(graph, id, &failure);
                                None
                            }
                        }
                    });
                    if loaded.is_some() {
                        graph.set_phase(id, NodePhase::TypeLoaded);
                    }
                }
                NodeKind::Administration(state) => {
                    let properties = state.properties.clone();
                    let Some(plugin) = plugins.administrations.get(&id).map(Rc::clone) else {
                        continue;
                    };
                    let loaded = ctx.get_or_load_administration_type(id, || {
                        let source_ctx = SourceContext::new(&properties, types);
                        match plugin.load_type(&source_ctx) {
                            Ok(loaded) => Some(loaded),
                            Err(failure) => {
                                self.source_failed(graph, id, &failure);
                                None
                            }
                        }
                    });
                    if loaded.is_some() {
                        graph.set_phase(id, NodePhase::TypeLoaded);
                    }
                }
                NodeKind::Section(state) => {
                    let properties = state.properties.clone();
                    let Some(plugin) = plugins.sections.get(&id).map(Rc::clone) else {
                        // Inline sections have no namespace to load.
                        graph.set_phase(id, NodePhase::TypeLoaded);
                        continue;
                    };
                    let loaded = ctx.get_or_load_function_namespace_type(id, || {
                        let source_ctx = SourceContext::new(&properties, types);
                        match plugin.load_namespace_type(&source_ctx) {
                            Ok(loaded) => Some(loaded),
                            Err(failure) => {
                                self.source_failed(graph, id, &failure);
                                None
                            }
                        }
                    });
                    if loaded.is_some() {
                        graph.set_phase(id, NodePhase::TypeLoaded);
                    }
                }
                _ => {
                    graph.set_phase(id, NodePhase::TypeLoaded);
                }
            }
        }
    }

    fn register_mbean<T: Serialize>(
        &self,
        graph: &CompileGraph,
        ctx: &CompileContext,
        id: NodeId,
        descriptor: &T,
    ) {
        let value = serde_json::to_value(descriptor).unwrap_or(serde_json::Value::Null);
        ctx.register_possible_mbean(graph.node(id).kind_tag(), graph.qualified_name(id), value);
    }
}
