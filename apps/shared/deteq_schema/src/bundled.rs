//! Definitions shipped with this mod
//!
//! Use these as templates. To override another mod's definition, reuse its
//! name and raise [`LOAD_PRIORITY`].

use std::f64::consts::PI;

use tracing::debug;

use crate::control_block::{ControlBlockDefinition, LogicType};
use crate::countermeasure::{CountermeasureDefinition, CountermeasureType, FalloffType};
use crate::delegates::{DrfmAdjustment, DrfmEffects, DrfmGenerator, FalseTarget};
use crate::emitter::CountermeasureEmitterDefinition;
use crate::math::Vector3;
use crate::pack::DefinitionPack;
use crate::sensor::{RadarProperties, SensorDefinition, SensorType};

/// Built-in definitions have minimum priority and are always overridden if possible.
pub const LOAD_PRIORITY: i32 = i32::MIN + 1;

/// Every bundled definition as one pack
pub fn example_pack() -> DefinitionPack {
    DefinitionPack {
        load_priority: LOAD_PRIORITY,
        sensors: vec![example_sensor(), vanilla_camera_override()],
        countermeasures: vec![example_countermeasure()],
        emitters: vec![example_emitter()],
        control_blocks: vec![example_control_block()],
    }
}

pub fn example_sensor() -> SensorDefinition {
    SensorDefinition {
        name: "ExampleSensorDef".to_string(),
        // Camera blocks only for now
        block_subtypes: vec!["LargeCameraBlock".to_string()],
        sensor_type: SensorType::Radar,
        max_aperture: 45f64.to_radians(),
        min_aperture: 35f64.to_radians(),
        movement: None,
        detection_threshold: 30.0,
        bearing_error_modifier: 1.0,
        range_error_modifier: 1.0,
        max_power_draw: 25000.0,
        radar_properties: Some(RadarProperties {
            receiver_area: 1.0,
            power_efficiency_modifier: 2.5e-16,
            bandwidth: 1.67e6,
            frequency: 2800e6,
            account_for_radar_angle: true,
        }),
        ..Default::default()
    }
}

/// Replaces the internal vanilla camera definition
pub fn vanilla_camera_override() -> SensorDefinition {
    SensorDefinition {
        name: "DetEq_VanillaCamera".to_string(),
        block_subtypes: vec![
            "LargeCameraBlock".to_string(),
            "LargeCameraTopMounted".to_string(),
            "SmallCameraBlock".to_string(),
            "SmallCameraTopMounted".to_string(),
        ],
        sensor_type: SensorType::Infrared,
        max_aperture: PI / 2.0,
        min_aperture: PI / 16.0,
        detection_threshold: 0.00001,
        bearing_error_modifier: 0.05,
        range_error_modifier: 0.05,
        max_power_draw: -1.0,
        movement: None,
        ..Default::default()
    }
}

pub fn example_countermeasure() -> CountermeasureDefinition {
    CountermeasureDefinition {
        name: "ExampleCountermeasureDef".to_string(),
        countermeasure_type: CountermeasureType::RADAR,
        max_range: 50000.0,
        falloff_scalar: 1.0e12,
        min_noise: 0.0,
        falloff_type: FalloffType::Quadratic,
        min_effect_aperture: std::f32::consts::PI,
        max_effect_aperture: std::f32::consts::PI,
        max_lifetime: u32::MAX,
        has_physics: false,
        drag_multiplier: 0.0,
        particle_effect: None,
        max_drfm_range: 50000.0,
        apply_drfm_to_other_targets: true,
        apply_outside_sensor_cone: false,
        drfm_effects: Some(DrfmEffects::new(|contact| {
            debug!(
                "DrfmEffects: sensor {} countermeasure {} emitter {} target {} range {}",
                contact.sensor_id,
                contact.countermeasure_id,
                contact
                    .emitter
                    .as_ref()
                    .map(|e| e.custom_name.as_str())
                    .unwrap_or("none"),
                contact.target_entity_id,
                contact.target_range,
            );
            DrfmAdjustment::unchanged(contact)
        })),
        drfm_generator: Some(DrfmGenerator::new(|_source| {
            vec![FalseTarget {
                entity_id: 100,
                cross_section: 500.0,
                range: 500.0,
                max_range_error: 0.0,
                bearing: Vector3::FORWARD,
                max_bearing_error: 0.0,
                iff_codes: Vec::new(),
            }]
        })),
    }
}

pub fn example_emitter() -> CountermeasureEmitterDefinition {
    CountermeasureEmitterDefinition {
        name: "ExampleCountermeasureEmitterDef".to_string(),
        // Conveyor sorters only
        block_subtypes: vec!["SimpleJammer".to_string()],
        muzzles: Some(vec!["muzzle".to_string()]),
        countermeasure_ids: vec!["DetEq_SimpleAreaJammer".to_string()],
        is_countermeasure_attached: true,
        shots_per_second: 60.0,
        magazine_size: 0,
        reload_time: 0.0,
        magazine_item: None,
        ejection_velocity: 0.0,
        fire_particle: None,
        active_power_draw: 10.0,
        inventory_size: 0.0,
        magazine_item_id: None,
    }
}

pub fn example_control_block() -> ControlBlockDefinition {
    ControlBlockDefinition {
        name: "ExampleControlDef".to_string(),
        // Conveyor sorters only, one logic per block
        subtype_ids: vec!["YourSubtypeHere".to_string()],
        logic_type: LogicType::IffReflector,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EmptyCatalog;
    use crate::definition::Definition;
    use crate::delegates::DrfmSource;

    #[test]
    fn test_example_pack_is_valid() {
        let mut pack = example_pack();
        let before = pack.len();
        let findings = pack.retain_valid(&EmptyCatalog);
        assert_eq!(pack.len(), before);
        assert!(findings.iter().all(|f| f.verification.is_valid));
    }

    #[test]
    fn test_override_power_draw_defaulted() {
        let mut camera = vanilla_camera_override();
        assert!(camera.verify(&EmptyCatalog).is_valid);
        assert_eq!(camera.max_power_draw, 1.0);
    }

    #[test]
    fn test_example_countermeasure_delegates() {
        let countermeasure = example_countermeasure();
        let delegates = countermeasure.generate_delegates().unwrap();
        assert_eq!(delegates.len(), 2);

        let targets = countermeasure
            .drfm_generator
            .as_ref()
            .unwrap()
            .call(&DrfmSource::default());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].range, 500.0);
    }
}
