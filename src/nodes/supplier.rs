//! Suppliers: extension points contributing whole managed-object sources.

use crate::core::autowire::AutoWire;
use crate::core::sources::Property;

#[derive(Debug, Default, Clone)]
pub struct SupplierState {
    pub source_name: String,
    pub properties: Vec<Property>,
}

/// One source contributed by a supplier, keyed by the auto-wire it can
/// satisfy. Children of the supplier node.
#[derive(Debug, Default, Clone)]
pub struct SuppliedManagedObjectSourceState {
    pub wire: Option<AutoWire>,
    /// Symbolic source to instantiate when the wire is selected.
    pub source_name: String,
}
