//! Top-level composition kinds: the deployable OfficeFloor root, offices,
//! office inputs and the executive.

use crate::nodes::links::LinkSlot;

/// Root of the composition tree; owns every other node transitively.
#[derive(Debug, Default, Clone)]
pub struct OfficeFloorState;

/// A deployed office: composition unit grouping sections, functions and the
/// objects scoped to them.
#[derive(Debug, Default, Clone)]
pub struct OfficeState;

/// Externally invocable entry into an office; its flow links to exactly one
/// section input.
#[derive(Debug, Default, Clone)]
pub struct OfficeInputState {
    pub flow: LinkSlot,
}

/// Oversight provider; teams link to it through the TeamOversight role.
#[derive(Debug, Default, Clone)]
pub struct ExecutiveState;
