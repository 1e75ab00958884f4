//! Build-phase emission: ordered traversal calling into the external
//! runtime-builder sink.
//!
//! Emission only runs for a pass with zero issues, so every reference is
//! already resolved; each bind call is one-shot. Ordering obligations:
//! teams before anything assigning responsibility to them, managed-object
//! sources before the objects they back, governance/administration for an
//! object only after the object itself.

use crate::core::compile_context::CompileContext;
use crate::core::error::CompileError;
use crate::core::types::{AdministrationType, GovernanceType, ManagedObjectType, TeamType};
use crate::nodes::graph::CompileGraph;
use crate::nodes::governance::AdministrationOrder;
use crate::nodes::kinds::NodeKind;
use crate::nodes::links::LinkRole;
use crate::nodes::node::NodeId;
use serde::Serialize;

/// Link and ordering state of a managed-object source, rendered to
/// qualified names for the sink.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceBinding {
    pub pool: Option<String>,
    pub managing_office: Option<String>,
    pub start_before: Vec<String>,
    pub start_after: Vec<String>,
    pub startup_before: Vec<String>,
    pub startup_after: Vec<String>,
}

/// The runtime builder boundary: the only write surface toward the
/// executable runtime.
pub trait RuntimeSink {
    fn bind_executive(&mut self, name: &str);
    fn bind_managed_object_pool(&mut self, name: &str);
    fn bind_team(&mut self, name: &str, team: &TeamType, size: Option<u32>, oversight: Option<&str>);
    fn bind_managed_object_source(
        &mut self,
        name: &str,
        mo_type: &ManagedObjectType,
        binding: &SourceBinding,
    );
    fn bind_managed_object(&mut self, name: &str, source: &str);
    fn bind_input_managed_object(&mut self, name: &str, bound_source: Option<&str>);
    fn bind_office(&mut self, name: &str);
    fn bind_office_input(&mut self, office: &str, name: &str, flow: Option<&str>);
    fn bind_section(&mut self, office: &str, name: &str);
    fn bind_function(&mut self, section: &str, name: &str, team: Option<&str>);
    fn bind_governance(
        &mut self,
        name: &str,
        governance: &GovernanceType,
        team: Option<&str>,
        governed: &[String],
    );
    fn bind_administration(
        &mut self,
        name: &str,
        administration: &AdministrationType,
        pre: bool,
        team: Option<&str>,
        administered: &[String],
    );
}

fn descriptor_missing(graph: &CompileGraph, id: NodeId) -> CompileError {
    CompileError::ValidationError(format!(
        "No type descriptor loaded for {} {}",
        graph.node(id).kind_tag(),
        graph.qualified_name(id)
    ))
}

fn linked_name(graph: &CompileGraph, id: NodeId, role: LinkRole) -> Option<String> {
    graph.linked(id, role).map(|t| graph.qualified_name(t))
}

fn set_names(graph: &CompileGraph, peers: &[NodeId]) -> Vec<String> {
    peers.iter().map(|&p| graph.qualified_name(p)).collect()
}

/// Depth-first, declaration-ordered emission of the whole graph.
pub fn emit(
    graph: &CompileGraph,
    ctx: &CompileContext,
    sink: &mut dyn RuntimeSink,
) -> Result<Vec<NodeId>, CompileError> {
    let root = graph.root();
    let mut emitted = Vec::new();

    for &child in graph.children(root) {
        if matches!(graph.node(child).kind, NodeKind::Executive(_)) {
            sink.bind_executive(&graph.qualified_name(child));
            emitted.push(child);
        }
    }

    for &child in graph.children(root) {
        if matches!(graph.node(child).kind, NodeKind::ManagedObjectPool(_)) {
            sink.bind_managed_object_pool(&graph.qualified_name(child));
            emitted.push(child);
        }
    }

    for &child in graph.children(root) {
        if let NodeKind::Team(state) = &graph.node(child).kind {
            let team_type = ctx
                .team_type(child)
                .ok_or_else(|| descriptor_missing(graph, child))?;
            let oversight = linked_name(graph, child, LinkRole::TeamOversight);
            sink.bind_team(
                &graph.qualified_name(child),
                &team_type,
                state.size,
                oversight.as_deref(),
            );
            emitted.push(child);
        }
    }

    for &child in graph.children(root) {
        if let NodeKind::ManagedObjectSource(state) = &graph.node(child).kind {
            let mo_type = ctx
                .managed_object_type(child)
                .ok_or_else(|| descriptor_missing(graph, child))?;
            let binding = SourceBinding {
                pool: linked_name(graph, child, LinkRole::Pool),
                managing_office: linked_name(graph, child, LinkRole::Office),
                start_before: set_names(graph, state.start_before.peers()),
                start_after: set_names(graph, state.start_after.peers()),
                startup_before: set_names(graph, state.startup_before.peers()),
                startup_after: set_names(graph, state.startup_after.peers()),
            };
            sink.bind_managed_object_source(&graph.qualified_name(child), &mo_type, &binding);
            emitted.push(child);
        }
    }

    // Managed objects: OfficeFloor scope first, then office-scoped ones, in
    // declaration order. Sources are already bound above.
    let mut object_scopes = vec![root];
    object_scopes.extend(
        graph
            .children(root)
            .iter()
            .copied()
            .filter(|&c| matches!(graph.node(c).kind, NodeKind::Office(_))),
    );
    for scope in object_scopes {
        for &child in graph.children(scope) {
            match &graph.node(child).kind {
                NodeKind::ManagedObject(state) => {
                    let source = state
                        .source
                        .map(|s| graph.qualified_name(s))
                        .unwrap_or_default();
                    sink.bind_managed_object(&graph.qualified_name(child), &source);
                    emitted.push(child);
                }
                NodeKind::InputManagedObject(_) => {
                    let bound = linked_name(graph, child, LinkRole::Object);
                    sink.bind_input_managed_object(&graph.qualified_name(child), bound.as_deref());
                    emitted.push(child);
                }
                _ => {}
            }
        }
    }

    for &office in graph.children(root) {
        if !matches!(graph.node(office).kind, NodeKind::Office(_)) {
            continue;
        }
        let office_name = graph.qualified_name(office);
        sink.bind_office(&office_name);
        emitted.push(office);
        for &child in graph.children(office) {
            match &graph.node(child).kind {
                NodeKind::OfficeInput(_) => {
                    let flow = linked_name(graph, child, LinkRole::Flow);
                    sink.bind_office_input(
                        &office_name,
                        &graph.node(child).name,
                        flow.as_deref(),
                    );
                    emitted.push(child);
                }
                NodeKind::Section(_) => {
                    let section_name = graph.qualified_name(child);
                    sink.bind_section(&office_name, &section_name);
                    emitted.push(child);
                    for &member in graph.children(child) {
                        if matches!(graph.node(member).kind, NodeKind::ManagedFunction(_)) {
                            let team = linked_name(graph, member, LinkRole::Team);
                            sink.bind_function(
                                &section_name,
                                &graph.node(member).name,
                                team.as_deref(),
                            );
                            emitted.push(member);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    for &child in graph.children(root) {
        if let NodeKind::Governance(state) = &graph.node(child).kind {
            let governance = ctx
                .governance_type(child)
                .ok_or_else(|| descriptor_missing(graph, child))?;
            let team = linked_name(graph, child, LinkRole::Team);
            sink.bind_governance(
                &graph.qualified_name(child),
                &governance,
                team.as_deref(),
                &set_names(graph, &state.governed),
            );
            emitted.push(child);
        }
    }

    for &child in graph.children(root) {
        if let NodeKind::Administration(state) = &graph.node(child).kind {
            let administration = ctx
                .administration_type(child)
                .ok_or_else(|| descriptor_missing(graph, child))?;
            let team = linked_name(graph, child, LinkRole::Team);
            sink.bind_administration(
                &graph.qualified_name(child),
                &administration,
                state.order == AdministrationOrder::Pre,
                team.as_deref(),
                &set_names(graph, &state.administered),
            );
            emitted.push(child);
        }
    }

    Ok(emitted)
}

/// Sink recording every bind call as one line, for tests and benches.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the first call line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.calls.iter().position(|c| c.contains(needle))
    }
}

impl RuntimeSink for RecordingSink {
    fn bind_executive(&mut self, name: &str) {
        self.calls.push(format!("executive {}", name));
    }

    fn bind_managed_object_pool(&mut self, name: &str) {
        self.calls.push(format!("pool {}", name));
    }

    fn bind_team(
        &mut self,
        name: &str,
        team: &TeamType,
        size: Option<u32>,
        oversight: Option<&str>,
    ) {
        self.calls.push(format!(
            "team {} requires_size={} size={:?} oversight={:?}",
            name, team.requires_size, size, oversight
        ));
    }

    fn bind_managed_object_source(
        &mut self,
        name: &str,
        mo_type: &ManagedObjectType,
        binding: &SourceBinding,
    ) {
        self.calls.push(format!(
            "managed_object_source {} type={} pool={:?} start_before={:?} start_after={:?} startup_before={:?} startup_after={:?}",
            name,
            mo_type.object_type,
            binding.pool,
            binding.start_before,
            binding.start_after,
            binding.startup_before,
            binding.startup_after,
        ));
    }

    fn bind_managed_object(&mut self, name: &str, source: &str) {
        self.calls
            .push(format!("managed_object {} source={}", name, source));
    }

    fn bind_input_managed_object(&mut self, name: &str, bound_source: Option<&str>) {
        self.calls
            .push(format!("input_managed_object {} bound={:?}", name, bound_source));
    }

    fn bind_office(&mut self, name: &str) {
        self.calls.push(format!("office {}", name));
    }

    fn bind_office_input(&mut self, office: &str, name: &str, flow: Option<&str>) {
        self.calls
            .push(format!("office_input {}.{} flow={:?}", office, name, flow));
    }

    fn bind_section(&mut self, office: &str, name: &str) {
        self.calls.push(format!("section {} in {}", name, office));
    }

    fn bind_function(&mut self, section: &str, name: &str, team: Option<&str>) {
        self.calls
            .push(format!("function {}.{} team={:?}", section, name, team));
    }

    fn bind_governance(
        &mut self,
        name: &str,
        governance: &GovernanceType,
        team: Option<&str>,
        governed: &[String],
    ) {
        self.calls.push(format!(
            "governance {} extension={} team={:?} governed={:?}",
            name, governance.extension_type, team, governed
        ));
    }

    fn bind_administration(
        &mut self,
        name: &str,
        administration: &AdministrationType,
        pre: bool,
        team: Option<&str>,
        administered: &[String],
    ) {
        self.calls.push(format!(
            "administration {} extension={} pre={} team={:?} administered={:?}",
            name, administration.extension_type, pre, team, administered
        ));
    }
}
