//! The tagged variant over every concrete node kind.
//!
//! Each variant embeds the subset of link-capability state relevant to it;
//! role access is dispatched by pattern match rather than virtual calls.

use crate::nodes::governance::{AdministrationState, GovernanceState};
use crate::nodes::links::{LinkRole, RoleState};
use crate::nodes::managed_object::{
    InputManagedObjectState, ManagedObjectPoolState, ManagedObjectSourceState, ManagedObjectState,
};
use crate::nodes::node::NodeId;
use crate::nodes::office::{ExecutiveState, OfficeFloorState, OfficeInputState, OfficeState};
use crate::nodes::section::{
    FunctionObjectState, ManagedFunctionState, SectionInputState, SectionOutputState, SectionState,
};
use crate::nodes::supplier::{SuppliedManagedObjectSourceState, SupplierState};
use crate::nodes::team::TeamState;

#[derive(Debug, Clone)]
pub enum NodeKind {
    OfficeFloor(OfficeFloorState),
    Office(OfficeState),
    OfficeInput(OfficeInputState),
    Executive(ExecutiveState),
    Section(SectionState),
    SectionInput(SectionInputState),
    SectionOutput(SectionOutputState),
    ManagedFunction(ManagedFunctionState),
    FunctionObject(FunctionObjectState),
    ManagedObject(ManagedObjectState),
    ManagedObjectSource(ManagedObjectSourceState),
    InputManagedObject(InputManagedObjectState),
    ManagedObjectPool(ManagedObjectPoolState),
    Team(TeamState),
    Governance(GovernanceState),
    Administration(AdministrationState),
    Supplier(SupplierState),
    SuppliedManagedObjectSource(SuppliedManagedObjectSourceState),
}

impl NodeKind {
    /// Kind tag used verbatim in issue text.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::OfficeFloor(_) => "OfficeFloor",
            NodeKind::Office(_) => "Office",
            NodeKind::OfficeInput(_) => "Office Input",
            NodeKind::Executive(_) => "Executive",
            NodeKind::Section(_) => "Section",
            NodeKind::SectionInput(_) => "Section Input",
            NodeKind::SectionOutput(_) => "Section Output",
            NodeKind::ManagedFunction(_) => "Managed Function",
            NodeKind::FunctionObject(_) => "Function Object",
            NodeKind::ManagedObject(_) => "Managed Object",
            NodeKind::ManagedObjectSource(_) => "Managed Object Source",
            NodeKind::InputManagedObject(_) => "Input Managed Object",
            NodeKind::ManagedObjectPool(_) => "Managed Object Pool",
            NodeKind::Team(_) => "Team",
            NodeKind::Governance(_) => "Governance",
            NodeKind::Administration(_) => "Administration",
            NodeKind::Supplier(_) => "Supplier",
            NodeKind::SuppliedManagedObjectSource(_) => "Supplied Managed Object Source",
        }
    }

    /// Mutable view of one link role's state, when this kind carries it.
    pub fn role_state(&mut self, role: LinkRole) -> Option<RoleState<'_>> {
        match (self, role) {
            (NodeKind::OfficeInput(s), LinkRole::Flow) => Some(RoleState::Single(&mut s.flow)),
            (NodeKind::SectionOutput(s), LinkRole::Flow) => Some(RoleState::Single(&mut s.flow)),
            (NodeKind::ManagedFunction(s), LinkRole::Team) => Some(RoleState::Single(&mut s.team)),
            (NodeKind::FunctionObject(s), LinkRole::Object) => {
                Some(RoleState::Single(&mut s.object))
            }
            (NodeKind::InputManagedObject(s), LinkRole::Object) => {
                Some(RoleState::Single(&mut s.bound_source))
            }
            (NodeKind::ManagedObjectSource(s), LinkRole::Pool) => {
                Some(RoleState::Single(&mut s.pool))
            }
            (NodeKind::ManagedObjectSource(s), LinkRole::Office) => {
                Some(RoleState::Single(&mut s.managing_office))
            }
            (NodeKind::ManagedObjectSource(s), LinkRole::StartBefore) => {
                Some(RoleState::Set(&mut s.start_before))
            }
            (NodeKind::ManagedObjectSource(s), LinkRole::StartAfter) => {
                Some(RoleState::Set(&mut s.start_after))
            }
            (NodeKind::ManagedObjectSource(s), LinkRole::StartupBefore) => {
                Some(RoleState::Set(&mut s.startup_before))
            }
            (NodeKind::ManagedObjectSource(s), LinkRole::StartupAfter) => {
                Some(RoleState::Set(&mut s.startup_after))
            }
            (NodeKind::Team(s), LinkRole::TeamOversight) => {
                Some(RoleState::Single(&mut s.oversight))
            }
            (NodeKind::Governance(s), LinkRole::Team) => Some(RoleState::Single(&mut s.team)),
            (NodeKind::Administration(s), LinkRole::Team) => Some(RoleState::Single(&mut s.team)),
            _ => None,
        }
    }

    /// Read-only view of a single-valued role's current link.
    pub fn linked(&self, role: LinkRole) -> Option<NodeId> {
        match (self, role) {
            (NodeKind::OfficeInput(s), LinkRole::Flow) => s.flow.get(),
            (NodeKind::SectionOutput(s), LinkRole::Flow) => s.flow.get(),
            (NodeKind::ManagedFunction(s), LinkRole::Team) => s.team.get(),
            (NodeKind::FunctionObject(s), LinkRole::Object) => s.object.get(),
            (NodeKind::InputManagedObject(s), LinkRole::Object) => s.bound_source.get(),
            (NodeKind::ManagedObjectSource(s), LinkRole::Pool) => s.pool.get(),
            (NodeKind::ManagedObjectSource(s), LinkRole::Office) => s.managing_office.get(),
            (NodeKind::Team(s), LinkRole::TeamOversight) => s.oversight.get(),
            (NodeKind::Governance(s), LinkRole::Team) => s.team.get(),
            (NodeKind::Administration(s), LinkRole::Team) => s.team.get(),
            _ => None,
        }
    }
}
