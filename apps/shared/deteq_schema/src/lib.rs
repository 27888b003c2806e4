//! Detection Equipment definition records
//!
//! Plain data describing sensors, countermeasures, countermeasure emitters and
//! control blocks. Each record validates itself through [`Definition::verify`]
//! and may declare named delegate slots that a simulation mod fills in after
//! registration.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub mod bundled;
pub mod catalog;
pub mod control_block;
pub mod countermeasure;
pub mod definition;
pub mod delegates;
pub mod emitter;
pub mod error;
pub mod math;
pub mod pack;
pub mod sensor;

pub use catalog::{EmptyCatalog, ItemCatalog, ItemId};
pub use control_block::{ControlBlockDefinition, LogicType};
pub use countermeasure::{CountermeasureDefinition, CountermeasureType, FalloffType};
pub use definition::{Definition, DefinitionId, DefinitionKind, Verification};
pub use delegates::{
    BlockRef, Delegate, DelegateSet, DelegateSignature, DelegateSlot, DrfmAdjustment,
    DrfmContact, DrfmEffects, DrfmGenerator, DrfmSource, FalseTarget,
};
pub use emitter::{CountermeasureEmitterDefinition, MIN_POWER_DRAW};
pub use error::{DelegateError, Result, SchemaError};
pub use math::Vector3;
pub use pack::{DefinitionPack, PackFinding};
pub use sensor::{RadarProperties, SensorDefinition, SensorMovement, SensorType};

/// Hand-authored JSON documents such as definition packs and item catalogs.
///
/// The document is checked against the schema generated from the Rust type
/// before it is deserialized. Every violation is reported with its JSON path,
/// so a pack author sees all broken definitions at once.
pub trait Validatable: JsonSchema + DeserializeOwned {
    fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::IoError(path.display().to_string(), e))?;

        Self::from_json_str(&content)
    }

    fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let schema = serde_json::to_value(schemars::schema_for!(Self))?;
        let validator = jsonschema::validator_for(&schema).map_err(|e| {
            SchemaError::ValidationError(format!("schema of {}: {}", Self::schema_name(), e))
        })?;

        let violations: Vec<String> = validator
            .iter_errors(&value)
            .map(|e| describe_violation(&e))
            .collect();
        if !violations.is_empty() {
            return Err(SchemaError::ValidationError(violations.join("; ")));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Pretty-printed JSON Schema, for editors and `deteq_check --schema`
    fn schema_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&schemars::schema_for!(Self))?)
    }
}

fn describe_violation(error: &jsonschema::ValidationError<'_>) -> String {
    let path = error.instance_path.to_string();
    if path.is_empty() {
        error.to_string()
    } else {
        format!("{}: {}", path, error)
    }
}
