//! Teams: units of concurrency responsibility.

use crate::core::autowire::AutoWire;
use crate::core::sources::Property;
use crate::nodes::links::LinkSlot;

#[derive(Debug, Default, Clone)]
pub struct TeamState {
    pub source_name: String,
    pub properties: Vec<Property>,
    pub size: Option<u32>,
    /// Classifier keys: functions whose responsibility matches are assigned
    /// to this team (TargetCategorisesSource).
    pub classifiers: Vec<AutoWire>,
    pub oversight: LinkSlot,
}
