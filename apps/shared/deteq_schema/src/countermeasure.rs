//! Countermeasure definitions
//!
//! A countermeasure adds noise to sensors that can see it and may alter their
//! returns through DRFM delegates. Field order is the serialized layout.

use std::ops::BitOr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::definition::{Definition, DefinitionKind, Verification, check_name};
use crate::delegates::{DelegateSet, DrfmEffects, DrfmGenerator, assign_delegate, insert_delegate};
use crate::error::DelegateError;

/// Delegate slot for direct sensor return modification
pub const DRFM_EFFECTS_SLOT: &str = "DrfmEffects";
/// Delegate slot for false target generation
pub const DRFM_GENERATOR_SLOT: &str = "DrfmGenerator";

/// Sensor types a countermeasure affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CountermeasureType(pub u32);

impl CountermeasureType {
    pub const NONE: Self = Self(0);
    pub const RADAR: Self = Self(1 << 0);
    pub const OPTICAL: Self = Self(1 << 1);
    pub const INFRARED: Self = Self(1 << 2);
    /// Applies to antenna sensors only, not to grid communication
    pub const ANTENNA: Self = Self(1 << 3);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CountermeasureType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Noise falloff curve.
///
/// Linear: `noise = falloff_scalar * (max_range - range) + min_noise`.
/// Otherwise: `noise = -falloff_scalar / range^falloff_type + min_noise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum FalloffType {
    #[default]
    None,
    Linear,
    Quadratic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CountermeasureDefinition {
    #[schemars(length(min = 1))]
    pub name: String,
    pub countermeasure_type: CountermeasureType,
    /// Longest range at which sensors are affected; zero disables noise
    pub max_range: f32,
    pub falloff_scalar: f32,
    /// Sensor noise at maximum range
    pub min_noise: f32,
    pub falloff_type: FalloffType,
    /// Radians
    pub min_effect_aperture: f32,
    /// Radians; default aperture
    pub max_effect_aperture: f32,
    /// Lifetime in ticks; `u32::MAX` keeps attached countermeasures alive
    pub max_lifetime: u32,
    /// Affected by velocity, gravity and drag
    pub has_physics: bool,
    pub drag_multiplier: f32,
    /// Continuous particle effect id
    pub particle_effect: Option<String>,
    /// Range at which DRFM delegates run; independent of `max_range`
    pub max_drfm_range: f32,
    /// Run DRFM on targets this countermeasure is not attached to
    pub apply_drfm_to_other_targets: bool,
    /// Affect sensors regardless of the countermeasure's own visibility
    pub apply_outside_sensor_cone: bool,

    #[serde(skip)]
    pub drfm_effects: Option<DrfmEffects>,
    #[serde(skip)]
    pub drfm_generator: Option<DrfmGenerator>,
}

impl Definition for CountermeasureDefinition {
    const KIND: DefinitionKind = DefinitionKind::Countermeasure;

    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&mut self, _catalog: &dyn ItemCatalog) -> Verification {
        let mut result = Verification::new();
        check_name(&self.name, &mut result);

        if self.countermeasure_type.is_empty() {
            result.fail("CountermeasureType is undefined!");
        }

        result
    }

    fn generate_delegates(&self) -> Option<DelegateSet> {
        let mut delegates = DelegateSet::new();
        insert_delegate(&mut delegates, DRFM_EFFECTS_SLOT, &self.drfm_effects);
        insert_delegate(&mut delegates, DRFM_GENERATOR_SLOT, &self.drfm_generator);
        (!delegates.is_empty()).then_some(delegates)
    }

    fn assign_delegates(&mut self, delegates: &DelegateSet) -> Result<(), DelegateError> {
        let effects = assign_delegate(delegates, DRFM_EFFECTS_SLOT)?;
        let generator = assign_delegate(delegates, DRFM_GENERATOR_SLOT)?;
        self.drfm_effects = effects;
        self.drfm_generator = generator;
        Ok(())
    }
}
