//! Section-family kinds: sections, their inputs/outputs, managed functions
//! and per-dependency function objects.

use crate::core::autowire::AutoWire;
use crate::core::sources::Property;
use crate::nodes::links::LinkSlot;

/// Composition unit of functions inside an office. May be populated by a
/// section source plugin or declared inline.
#[derive(Debug, Default, Clone)]
pub struct SectionState {
    pub source_name: Option<String>,
    pub properties: Vec<Property>,
}

/// Entry point into a section.
#[derive(Debug, Default, Clone)]
pub struct SectionInputState;

/// Exit point of a section; its flow links to a section input or function.
#[derive(Debug, Default, Clone)]
pub struct SectionOutputState {
    pub flow: LinkSlot,
}

/// A unit of work within a section. Responsibility keys categorise the
/// function into a team during auto-wiring.
#[derive(Debug, Default, Clone)]
pub struct ManagedFunctionState {
    pub team: LinkSlot,
    /// Keys matched against team classifiers (TargetCategorisesSource).
    pub responsibility: Vec<AutoWire>,
}

/// One dependency of a managed function: a single-valued Object link plus
/// the requirement key used to auto-wire it when not linked explicitly.
#[derive(Debug, Default, Clone)]
pub struct FunctionObjectState {
    pub object: LinkSlot,
    pub requirement: Option<AutoWire>,
}
