//! Control block logic definitions

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::definition::{Definition, DefinitionKind, Verification, check_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum LogicType {
    #[default]
    None,
    Aggregator,
    IffAggregator,
    HudController,
    IffReflector,
    Searcher,
    Tracker,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ControlBlockDefinition {
    #[schemars(length(min = 1))]
    pub name: String,
    /// Conveyor sorter subtypes; one logic per block
    pub subtype_ids: Vec<String>,
    pub logic_type: LogicType,
}

impl Definition for ControlBlockDefinition {
    const KIND: DefinitionKind = DefinitionKind::ControlBlock;

    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&mut self, _catalog: &dyn ItemCatalog) -> Verification {
        let mut result = Verification::new();
        check_name(&self.name, &mut result);

        if self.subtype_ids.is_empty() {
            result.fail("Invalid SubtypeId array!");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EmptyCatalog;

    #[test]
    fn test_subtypes_required() {
        let mut def = ControlBlockDefinition {
            name: "Reflector".to_string(),
            logic_type: LogicType::IffReflector,
            ..Default::default()
        };
        assert!(!def.verify(&EmptyCatalog).is_valid);

        def.subtype_ids.push("YourSubtypeHere".to_string());
        assert!(def.verify(&EmptyCatalog).is_valid);
    }

    #[test]
    fn test_unnamed_definition_is_invalid() {
        let mut def = ControlBlockDefinition {
            subtype_ids: vec!["Sorter".to_string()],
            ..Default::default()
        };
        let result = def.verify(&EmptyCatalog);
        assert!(!result.is_valid);
        assert!(result.diagnostics.contains("Name"));
    }
}
