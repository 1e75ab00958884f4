//! Derived type descriptors produced by source extension points and
//! memoized per pass in the [`CompileContext`](crate::core::compile_context::CompileContext).

use crate::core::autowire::AutoWire;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagedObjectFlowType {
    pub name: String,
}

/// Descriptor of what a managed-object source provides and requires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagedObjectType {
    pub object_type: String,
    pub dependencies: Vec<AutoWire>,
    pub flows: Vec<ManagedObjectFlowType>,
    /// Whether instances arrive from outside the runtime.
    pub input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamType {
    /// A sized team must be given a size by the composition.
    pub requires_size: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GovernanceType {
    /// Managed-object extension interface the governance enforces over.
    pub extension_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdministrationType {
    pub extension_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionType {
    pub name: String,
    /// Auto-wire requirement per function parameter.
    pub parameters: Vec<AutoWire>,
}

/// Descriptor of the functions a section contributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionNamespaceType {
    pub functions: Vec<FunctionType>,
}

/// One managed-object source a supplier can contribute, keyed by the
/// auto-wire it satisfies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppliedManagedObjectSourceType {
    pub name: String,
    pub wire: AutoWire,
    /// Symbolic name of the source to instantiate when selected.
    pub source_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierType {
    pub supplied: Vec<SuppliedManagedObjectSourceType>,
}
