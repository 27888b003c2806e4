//! Definition packs
//!
//! A pack is the full set of definitions one mod contributes in a single
//! loading pass. Packs are usually authored in code (see [`crate::bundled`])
//! but can also be loaded from JSON validated against the generated schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Validatable;
use crate::catalog::ItemCatalog;
use crate::control_block::ControlBlockDefinition;
use crate::countermeasure::CountermeasureDefinition;
use crate::definition::{Definition, DefinitionId, DefinitionKind, Verification};
use crate::emitter::CountermeasureEmitterDefinition;
use crate::sensor::SensorDefinition;

/// Verification outcome of one definition in a pack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackFinding {
    pub kind: DefinitionKind,
    pub id: DefinitionId,
    pub name: String,
    pub verification: Verification,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Definition Pack")]
#[schemars(description = "Sensor, countermeasure, emitter and control block definitions registered by one mod")]
pub struct DefinitionPack {
    /// Lower numbers load first; to override another mod's definition, use the
    /// same name and a higher priority
    #[serde(default)]
    pub load_priority: i32,
    #[serde(default)]
    pub sensors: Vec<SensorDefinition>,
    #[serde(default)]
    pub countermeasures: Vec<CountermeasureDefinition>,
    #[serde(default)]
    pub emitters: Vec<CountermeasureEmitterDefinition>,
    #[serde(default)]
    pub control_blocks: Vec<ControlBlockDefinition>,
}

impl Validatable for DefinitionPack {}

impl DefinitionPack {
    pub fn len(&self) -> usize {
        self.sensors.len() + self.countermeasures.len() + self.emitters.len() + self.control_blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify every definition and drop the invalid ones.
    ///
    /// Returns one finding per definition that produced diagnostics, valid or not.
    pub fn retain_valid(&mut self, catalog: &dyn ItemCatalog) -> Vec<PackFinding> {
        let mut findings = Vec::new();
        retain_kind(&mut self.sensors, catalog, &mut findings);
        retain_kind(&mut self.countermeasures, catalog, &mut findings);
        retain_kind(&mut self.emitters, catalog, &mut findings);
        retain_kind(&mut self.control_blocks, catalog, &mut findings);
        findings
    }
}

fn retain_kind<T: Definition>(
    definitions: &mut Vec<T>,
    catalog: &dyn ItemCatalog,
    findings: &mut Vec<PackFinding>,
) {
    definitions.retain_mut(|def| {
        let verification = def.verify(catalog);
        let is_valid = verification.is_valid;
        if !verification.diagnostics.is_empty() {
            findings.push(PackFinding {
                kind: T::KIND,
                id: def.id(),
                name: def.name().to_string(),
                verification,
            });
        }
        is_valid
    });
}
