//! Cross-cutting kinds: governance (enforcement over managed objects) and
//! administration (pre/post-processing around functions and objects).

use crate::core::sources::Property;
use crate::nodes::links::LinkSlot;
use crate::nodes::node::NodeId;

#[derive(Debug, Default, Clone)]
pub struct GovernanceState {
    pub source_name: String,
    pub properties: Vec<Property>,
    pub team: LinkSlot,
    /// Managed objects this governance extends over; association recorded at
    /// lowering, not a link role.
    pub governed: Vec<NodeId>,
}

/// Whether administration runs before or after the work it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdministrationOrder {
    #[default]
    Pre,
    Post,
}

#[derive(Debug, Default, Clone)]
pub struct AdministrationState {
    pub source_name: String,
    pub properties: Vec<Property>,
    pub order: AdministrationOrder,
    pub team: LinkSlot,
    pub administered: Vec<NodeId>,
}
