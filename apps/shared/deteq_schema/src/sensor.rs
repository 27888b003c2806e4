//! Sensor definitions
//!
//! Field order is the serialized layout. New fields go at the end.

use std::f64::consts::PI;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::definition::{Definition, DefinitionKind, Verification, check_name};

/// Power draw used when a sensor leaves `max_power_draw` unset
pub const DEFAULT_SENSOR_POWER_DRAW: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum SensorType {
    #[default]
    None,
    Radar,
    PassiveRadar,
    Optical,
    Infrared,
    Antenna,
}

/// Properties for subpart-based movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SensorMovement {
    /// Azimuth subpart name. Can be anywhere in hierarchy.
    pub azimuth_part: String,
    /// Elevation subpart name, required for movement.
    pub elevation_part: String,
    /// Radians
    pub min_azimuth: f64,
    pub max_azimuth: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    /// Radians per second
    pub azimuth_rate: f64,
    pub elevation_rate: f64,
    /// Rest orientation
    pub home_azimuth: f64,
    pub home_elevation: f64,
}

impl Default for SensorMovement {
    fn default() -> Self {
        Self {
            azimuth_part: String::new(),
            elevation_part: String::new(),
            min_azimuth: -PI,
            max_azimuth: PI,
            min_elevation: -PI / 2.0,
            max_elevation: PI,
            azimuth_rate: 8.0 * PI / 60.0,
            elevation_rate: 8.0 * PI / 60.0,
            home_azimuth: 0.0,
            home_elevation: 0.0,
        }
    }
}

impl SensorMovement {
    pub fn can_rotate_full(&self) -> bool {
        self.max_azimuth >= PI && self.min_azimuth <= -PI
    }

    pub fn can_elevate_full(&self) -> bool {
        self.max_elevation >= PI && self.min_elevation <= -PI
    }
}

/// Radar-specific properties for passive and active radars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RadarProperties {
    /// Receiver area in square meters
    pub receiver_area: f64,
    /// Power output per power input; active radars only
    pub power_efficiency_modifier: f64,
    /// Active radars only
    pub bandwidth: f64,
    /// Active radars only
    pub frequency: f64,
    /// Whether the cone angle matters for receiver area in gain calculations
    pub account_for_radar_angle: bool,
}

impl Default for RadarProperties {
    fn default() -> Self {
        Self {
            receiver_area: 2.5 * 2.5,
            power_efficiency_modifier: 2.5e-16,
            bandwidth: 1.67e6,
            frequency: 2800e6,
            account_for_radar_angle: true,
        }
    }
}

/// Definition of a single sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SensorDefinition {
    #[schemars(length(min = 1))]
    pub name: String,
    /// Block subtypes this sensor is attached to
    pub block_subtypes: Vec<String>,
    pub sensor_type: SensorType,
    /// Maximum aperture cone radius, in radians
    pub max_aperture: f64,
    /// Minimum aperture cone radius, in radians
    pub min_aperture: f64,
    pub movement: Option<SensorMovement>,
    /// Minimum detection threshold; meaning varies by sensor type
    pub detection_threshold: f64,
    /// Maximum active power draw
    pub max_power_draw: f64,
    pub bearing_error_modifier: f64,
    pub range_error_modifier: f64,
    pub radar_properties: Option<RadarProperties>,
    /// Dummy empty used as the sensor origin; blank falls back to the elevation subpart
    pub sensor_empty: Option<String>,
    /// Name shown in the sensor's terminal
    pub terminal_name: Option<String>,
}

impl Default for SensorDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            block_subtypes: Vec::new(),
            sensor_type: SensorType::None,
            max_aperture: 0.0,
            min_aperture: 0.0,
            movement: None,
            detection_threshold: 0.0,
            max_power_draw: 0.0,
            bearing_error_modifier: 1.0,
            range_error_modifier: 1.0,
            radar_properties: Some(RadarProperties::default()),
            sensor_empty: None,
            terminal_name: None,
        }
    }
}

impl Definition for SensorDefinition {
    const KIND: DefinitionKind = DefinitionKind::Sensor;

    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&mut self, _catalog: &dyn ItemCatalog) -> Verification {
        let mut result = Verification::new();
        check_name(&self.name, &mut result);

        if self.block_subtypes.is_empty() {
            result.fail("BlockSubtypes unset!");
        }

        let apertures_finite = self.min_aperture.is_finite() && self.max_aperture.is_finite();
        if !apertures_finite
            || self.min_aperture > self.max_aperture
            || self.min_aperture < 0.0
            || self.max_aperture < 0.0
        {
            result.fail(
                "Aperture invalid! Make sure both Min and Max are greater than zero, and min is less than max.",
            );
        }

        if self.radar_properties.is_none() && self.sensor_type == SensorType::Radar {
            result.fail("Radar properties are null on a radar sensor!");
        }

        if let Some(movement) = &self.movement {
            if movement.azimuth_part.starts_with("subpart") {
                result.fail("Azimuth subpart starts with \"subpart_\" - this will likely result in part location failure.");
            }
            if movement.elevation_part.starts_with("subpart") {
                result.fail("Elevation subpart starts with \"subpart_\" - this will likely result in part location failure.");
            }
        }

        if self.max_power_draw.is_nan() || self.max_power_draw <= 0.0 {
            self.max_power_draw = DEFAULT_SENSOR_POWER_DRAW;
            result.note("MaxPowerDraw unset! Defaulting to 1.");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EmptyCatalog;

    fn radar(min_aperture: f64, max_aperture: f64) -> SensorDefinition {
        SensorDefinition {
            name: "TestRadar".to_string(),
            block_subtypes: vec!["LargeCameraBlock".to_string()],
            sensor_type: SensorType::Radar,
            min_aperture,
            max_aperture,
            max_power_draw: 25000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_inverted_aperture_is_invalid() {
        let mut def = radar(0.7, 0.5);
        let result = def.verify(&EmptyCatalog);
        assert!(!result.is_valid);
        assert!(result.diagnostics.contains("Aperture"));
    }

    #[test]
    fn test_ordered_aperture_is_valid() {
        let mut def = radar(0.3, 0.5);
        let result = def.verify(&EmptyCatalog);
        assert!(result.is_valid, "{}", result.diagnostics);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_negative_aperture_is_invalid() {
        let mut def = radar(-0.1, 0.5);
        assert!(!def.verify(&EmptyCatalog).is_valid);
    }

    #[test]
    fn test_all_violations_reported() {
        let mut def = SensorDefinition {
            name: "Broken".to_string(),
            sensor_type: SensorType::Radar,
            min_aperture: 1.0,
            max_aperture: 0.5,
            radar_properties: None,
            movement: Some(SensorMovement {
                azimuth_part: "subpart_azimuth".to_string(),
                elevation_part: "subpart_elevation".to_string(),
                ..Default::default()
            }),
            max_power_draw: 10.0,
            ..Default::default()
        };

        let result = def.verify(&EmptyCatalog);
        assert!(!result.is_valid);
        assert_eq!(result.lines().count(), 5);
        assert!(result.diagnostics.contains("BlockSubtypes"));
        assert!(result.diagnostics.contains("Radar properties"));
        assert!(result.diagnostics.contains("Azimuth subpart"));
        assert!(result.diagnostics.contains("Elevation subpart"));
    }

    #[test]
    fn test_power_draw_defaults() {
        let mut def = radar(0.3, 0.5);
        def.max_power_draw = -1.0;
        let result = def.verify(&EmptyCatalog);
        assert!(result.is_valid);
        assert_eq!(def.max_power_draw, DEFAULT_SENSOR_POWER_DRAW);
        assert!(result.diagnostics.contains("MaxPowerDraw"));
    }

    #[test]
    fn test_nan_power_draw_defaults() {
        let mut def = radar(0.3, 0.5);
        def.max_power_draw = f64::NAN;
        let result = def.verify(&EmptyCatalog);
        assert!(result.is_valid);
        assert_eq!(def.max_power_draw, DEFAULT_SENSOR_POWER_DRAW);
    }

    #[test]
    fn test_movement_limits() {
        let movement = SensorMovement::default();
        assert!(movement.can_rotate_full());
        assert!(!movement.can_elevate_full());
    }
}
