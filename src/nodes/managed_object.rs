//! Managed-object family: sources, the objects they back, input objects fed
//! by external events, and pools.

use crate::core::autowire::AutoWire;
use crate::core::sources::Property;
use crate::nodes::links::{LinkSet, LinkSlot};
use crate::nodes::node::NodeId;

/// A managed-object source: the extension point that can supply object
/// instances at runtime. Carries several independent link roles at once —
/// its pool, its managing office and the four start-ordering sets.
#[derive(Debug, Default, Clone)]
pub struct ManagedObjectSourceState {
    pub source_name: String,
    pub properties: Vec<Property>,
    pub pool: LinkSlot,
    pub managing_office: LinkSlot,
    pub start_before: LinkSet,
    pub start_after: LinkSet,
    pub startup_before: LinkSet,
    pub startup_after: LinkSet,
}

/// An injectable dependency backed by a managed-object source.
#[derive(Debug, Default, Clone)]
pub struct ManagedObjectState {
    /// Backing source, fixed at initialisation (not a link role).
    pub source: Option<NodeId>,
    /// Keys under which this object offers itself to auto-wiring.
    pub offered: Vec<AutoWire>,
}

/// A managed object whose instances arrive from outside the runtime; bound
/// to exactly one of the sources that can feed it.
#[derive(Debug, Default, Clone)]
pub struct InputManagedObjectState {
    pub bound_source: LinkSlot,
}

/// Pooling target for managed-object sources (Pool role).
#[derive(Debug, Default, Clone)]
pub struct ManagedObjectPoolState;
