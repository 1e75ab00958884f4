//! Declarative application composition, parsed from TOML.
//!
//! The model is pure data; lowering it into the compile graph is the
//! compiler's Create/Initialise phase. Every cross-reference is by name and
//! resolved during lowering — an unknown reference is an issue on the
//! declaring node, never a parse failure.

use crate::core::error::CompileError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositionModel {
    #[serde(default)]
    pub officefloor: OfficeFloorModel,
    /// Symbolic types known to this composition, fed to the type registry.
    #[serde(default)]
    pub types: Vec<TypeModel>,
    #[serde(default)]
    pub executives: Vec<ExecutiveModel>,
    #[serde(default)]
    pub teams: Vec<TeamModel>,
    #[serde(default)]
    pub pools: Vec<PoolModel>,
    #[serde(default)]
    pub managed_object_sources: Vec<ManagedObjectSourceModel>,
    #[serde(default)]
    pub managed_objects: Vec<ManagedObjectModel>,
    #[serde(default)]
    pub input_managed_objects: Vec<InputManagedObjectModel>,
    #[serde(default)]
    pub suppliers: Vec<SupplierModel>,
    #[serde(default)]
    pub offices: Vec<OfficeModel>,
    #[serde(default)]
    pub governances: Vec<GovernanceModel>,
    #[serde(default)]
    pub administrations: Vec<AdministrationModel>,
}

impl CompositionModel {
    pub fn from_toml_str(input: &str) -> Result<Self, CompileError> {
        toml::from_str(input).map_err(|e| CompileError::ModelParseError(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let input = fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfficeFloorModel {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeModel {
    pub name: String,
    #[serde(default)]
    pub supertypes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveModel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamModel {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub size: Option<u32>,
    /// Classifier key: functions whose responsibility matches are assigned
    /// to this team.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub oversight: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolModel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedObjectSourceModel {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub managing_office: Option<String>,
    #[serde(default)]
    pub start_before: Vec<String>,
    #[serde(default)]
    pub start_after: Vec<String>,
    #[serde(default)]
    pub startup_before: Vec<String>,
    #[serde(default)]
    pub startup_after: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedObjectModel {
    pub name: String,
    /// Backing managed-object source.
    pub source: String,
    /// Auto-wire key under which the object offers itself.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub qualifier: Option<String>,
    /// When set, the object is scoped to that office and shadows same-key
    /// OfficeFloor-level objects there.
    #[serde(default)]
    pub office: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputManagedObjectModel {
    pub name: String,
    /// Candidate feeding sources; the input object binds to exactly one.
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierModel {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeModel {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<OfficeInputModel>,
    #[serde(default)]
    pub sections: Vec<SectionModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeInputModel {
    pub name: String,
    /// Target section and section input of the flow.
    pub section: String,
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionModel {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Where the section's configuration lives, handed to the source.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<SectionOutputModel>,
    #[serde(default)]
    pub functions: Vec<FunctionModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionOutputModel {
    pub name: String,
    /// Flow target as `SECTION.INPUT` within the same office.
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionModel {
    pub name: String,
    /// Responsibility key matched against team classifiers.
    #[serde(default)]
    pub team_type: Option<String>,
    #[serde(default)]
    pub team_qualifier: Option<String>,
    #[serde(default)]
    pub objects: Vec<FunctionObjectModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionObjectModel {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub qualifier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceModel {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub governs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrationModel {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub administers: Vec<String>,
    #[serde(default)]
    pub order: AdministrationOrderModel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrationOrderModel {
    #[default]
    Pre,
    Post,
}
