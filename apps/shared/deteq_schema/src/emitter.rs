//! Countermeasure emitter definitions
//!
//! An emitter is the block countermeasures are launched from. Field order is
//! the serialized layout.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{ItemCatalog, ItemId};
use crate::definition::{Definition, DefinitionKind, Verification, check_name};

/// Smallest power draw an emitter may declare; non-positive values are raised to this
pub const MIN_POWER_DRAW: f32 = f32::EPSILON;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CountermeasureEmitterDefinition {
    #[schemars(length(min = 1))]
    pub name: String,
    /// Block subtypes this emitter is attached to
    pub block_subtypes: Vec<String>,
    /// Muzzle dummies to fire from; the block center is used when empty
    pub muzzles: Option<Vec<String>>,
    /// Countermeasures to fire, in order
    pub countermeasure_ids: Vec<String>,
    /// Whether countermeasures stick to this emitter
    pub is_countermeasure_attached: bool,
    /// Fractional shots per second
    pub shots_per_second: f32,
    /// Shots per magazine; zero or less ignores magazines
    pub magazine_size: i32,
    /// Seconds; at or below one tick ignores reloading
    pub reload_time: f32,
    /// Additive ejection velocity
    pub ejection_velocity: f32,
    /// Particle triggered on firing
    pub fire_particle: Option<String>,
    /// Item subtype consumed on reload
    pub magazine_item: Option<String>,
    /// Active power draw, in megawatts
    pub active_power_draw: f32,
    /// Inventory volume, in cubic meters
    pub inventory_size: f32,

    /// Engine item resolved from `magazine_item` during verification
    #[serde(skip)]
    pub magazine_item_id: Option<ItemId>,
}

impl Definition for CountermeasureEmitterDefinition {
    const KIND: DefinitionKind = DefinitionKind::CountermeasureEmitter;

    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&mut self, catalog: &dyn ItemCatalog) -> Verification {
        let mut result = Verification::new();
        check_name(&self.name, &mut result);

        if self.block_subtypes.is_empty() {
            result.fail("BlockSubtypes unset!");
        }

        if self.muzzles.as_ref().is_none_or(|m| m.is_empty()) {
            self.muzzles = Some(Vec::new());
            result.note("Muzzles unset! Defaulting to center of block.");
        }

        if self.countermeasure_ids.is_empty() {
            result.fail("CountermeasureIds unset!");
        }

        if self.shots_per_second.is_nan() || self.shots_per_second <= 0.0 {
            result.fail("ShotsPerSecond must be greater than zero!");
        }

        if self.active_power_draw.is_nan() || self.active_power_draw <= 0.0 {
            self.active_power_draw = MIN_POWER_DRAW;
            result.note("ActivePowerDraw unset! Defaulting to minimum.");
        }

        self.magazine_item_id = None;
        if let Some(item) = self.magazine_item.as_deref().filter(|i| !i.is_empty()) {
            match catalog.find_item(item) {
                Some(id) => {
                    debug!("Emitter '{}' consumes magazine item {}", self.name, id);
                    self.magazine_item_id = Some(id);
                }
                None => result.fail(format!("MagazineItem \"{}\" not found!", item)),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EmptyCatalog;
    use std::collections::HashMap;

    fn emitter() -> CountermeasureEmitterDefinition {
        CountermeasureEmitterDefinition {
            name: "TestEmitter".to_string(),
            block_subtypes: vec!["SimpleJammer".to_string()],
            muzzles: Some(vec!["muzzle".to_string()]),
            countermeasure_ids: vec!["DetEq_SimpleAreaJammer".to_string()],
            shots_per_second: 60.0,
            active_power_draw: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_emitter_has_no_diagnostics() {
        let mut def = emitter();
        let result = def.verify(&EmptyCatalog);
        assert!(result.is_valid);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_muzzles_default_to_empty_list() {
        let mut def = emitter();
        def.muzzles = Some(Vec::new());
        let result = def.verify(&EmptyCatalog);
        assert!(result.is_valid);
        assert_eq!(def.muzzles, Some(Vec::new()));
        assert!(result.diagnostics.contains("Muzzles"));
    }

    #[test]
    fn test_unset_muzzles_default_to_empty_list() {
        let mut def = emitter();
        def.muzzles = None;
        let result = def.verify(&EmptyCatalog);
        assert!(result.is_valid);
        assert_eq!(def.muzzles, Some(Vec::new()));
    }

    #[test]
    fn test_zero_power_draw_clamped() {
        let mut def = emitter();
        def.active_power_draw = 0.0;
        let result = def.verify(&EmptyCatalog);
        assert!(result.is_valid);
        assert_eq!(def.active_power_draw, MIN_POWER_DRAW);
        assert!(def.active_power_draw > 0.0);
    }

    #[test]
    fn test_nan_power_draw_clamped() {
        let mut def = emitter();
        def.active_power_draw = f32::NAN;
        let result = def.verify(&EmptyCatalog);
        assert!(result.is_valid);
        assert_eq!(def.active_power_draw, MIN_POWER_DRAW);
    }

    #[test]
    fn test_power_draw_does_not_mask_other_failures() {
        let mut def = emitter();
        def.active_power_draw = -5.0;
        def.countermeasure_ids.clear();
        let result = def.verify(&EmptyCatalog);
        assert!(!result.is_valid);
        assert!(result.diagnostics.contains("CountermeasureIds"));
        assert_eq!(def.active_power_draw, MIN_POWER_DRAW);
    }

    #[test]
    fn test_missing_lists_are_invalid() {
        let mut def = CountermeasureEmitterDefinition {
            name: "Bare".to_string(),
            shots_per_second: 1.0,
            active_power_draw: 1.0,
            ..Default::default()
        };
        let result = def.verify(&EmptyCatalog);
        assert!(!result.is_valid);
        assert!(result.diagnostics.contains("BlockSubtypes"));
        assert!(result.diagnostics.contains("CountermeasureIds"));
    }

    #[test]
    fn test_magazine_item_resolved() {
        let mut catalog = HashMap::new();
        catalog.insert(
            "FlareMagazine".to_string(),
            ItemId::new("MyObjectBuilder_AmmoMagazine", "FlareMagazine"),
        );

        let mut def = emitter();
        def.magazine_item = Some("FlareMagazine".to_string());
        let result = def.verify(&catalog);
        assert!(result.is_valid);
        assert_eq!(
            def.magazine_item_id,
            Some(ItemId::new("MyObjectBuilder_AmmoMagazine", "FlareMagazine"))
        );
        assert_eq!(def.magazine_item.as_deref(), Some("FlareMagazine"));
    }

    #[test]
    fn test_unknown_magazine_item_is_invalid() {
        let mut def = emitter();
        def.magazine_item = Some("Nonexistent".to_string());
        let result = def.verify(&EmptyCatalog);
        assert!(!result.is_valid);
        assert!(result.diagnostics.contains("Nonexistent"));
        assert!(def.magazine_item_id.is_none());
    }
}
