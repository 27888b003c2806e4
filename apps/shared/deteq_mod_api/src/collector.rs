//! Definition collector
//!
//! Session component for a mod that only contributes definitions: it waits
//! for the definition API, then verifies and registers a whole pack.

use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;

use deteq_protocol::{ApiError, ModChannel, ModMessage, ProtocolError};
use deteq_schema::{Definition, DefinitionPack, ItemCatalog};
use tracing::debug;

use crate::client::DefinitionApi;
use crate::console::ModConsole;

/// Outcome of registering one pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistrationSummary {
    pub registered: usize,
    pub skipped: usize,
    pub delegate_sets: usize,
}

/// Verify every definition in `pack` and register the valid ones.
///
/// Invalid definitions are skipped with a warning and do not affect the
/// rest. Definitions are registered under their own names, followed by any
/// delegates they provide.
pub fn register_pack(
    api: &DefinitionApi,
    pack: &DefinitionPack,
    catalog: &dyn ItemCatalog,
) -> Result<RegistrationSummary, ProtocolError> {
    let mut pack = pack.clone();
    let mut summary = RegistrationSummary::default();

    for finding in pack.retain_valid(catalog) {
        if finding.verification.is_valid {
            debug!(
                "{} \"{}\": {}",
                finding.kind, finding.name, finding.verification.diagnostics
            );
        } else {
            summary.skipped += 1;
            ModConsole::warn(
                api.mod_name(),
                &format!(
                    "Skipping invalid {} \"{}\":\n{}",
                    finding.kind, finding.name, finding.verification.diagnostics
                ),
            );
        }
    }

    register_kind(api, &pack.sensors, &mut summary)?;
    register_kind(api, &pack.countermeasures, &mut summary)?;
    register_kind(api, &pack.emitters, &mut summary)?;
    register_kind(api, &pack.control_blocks, &mut summary)?;

    api.log_info(&format!(
        "Registered {} definitions ({} skipped).",
        summary.registered, summary.skipped
    ));
    Ok(summary)
}

fn register_kind<T: Definition>(
    api: &DefinitionApi,
    definitions: &[T],
    summary: &mut RegistrationSummary,
) -> Result<(), ProtocolError> {
    for definition in definitions {
        api.register_definition(definition.name(), definition)?;
        summary.registered += 1;

        if let Some(delegates) = definition.generate_delegates() {
            api.register_delegates::<T>(definition.name(), delegates);
            summary.delegate_sets += 1;
        }
    }
    Ok(())
}

/// Registers a pack every time the definition API becomes ready
pub struct DefinitionCollector {
    api: DefinitionApi,
    last_summary: Rc<Cell<Option<RegistrationSummary>>>,
}

impl DefinitionCollector {
    pub fn new(mod_name: impl Into<String>) -> Self {
        Self {
            api: DefinitionApi::new(mod_name),
            last_summary: Rc::new(Cell::new(None)),
        }
    }

    pub fn load(
        &mut self,
        channel: Rc<dyn ModChannel>,
        pack: DefinitionPack,
        catalog: Rc<dyn ItemCatalog>,
    ) -> Result<(), ApiError> {
        ModConsole::info(self.api.mod_name(), "Preparing DefinitionApi.");

        let last_summary = self.last_summary.clone();
        self.api.init(
            channel,
            Some(Box::new(move |api: &DefinitionApi| -> Result<(), Box<dyn Error>> {
                let summary = register_pack(api, &pack, catalog.as_ref())?;
                last_summary.set(Some(summary));
                Ok(())
            })),
        )
    }

    pub fn handle_message(&mut self, message: &ModMessage) -> Result<(), ApiError> {
        self.api.handle_message(message)
    }

    pub fn api(&self) -> &DefinitionApi {
        &self.api
    }

    /// Summary of the most recent registration, if the API has been ready
    pub fn last_summary(&self) -> Option<RegistrationSummary> {
        self.last_summary.get()
    }

    pub fn unload(&mut self) {
        self.api.unload();
        ModConsole::info(self.api.mod_name(), "DefinitionApi unloaded.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_host::{LocalHost, LoopbackChannel};
    use deteq_schema::bundled;
    use deteq_schema::{
        CountermeasureDefinition, DefinitionKind, EmptyCatalog, SensorDefinition,
    };

    fn load(host: &LocalHost, pack: DefinitionPack) -> (DefinitionCollector, Rc<LoopbackChannel>) {
        let channel = Rc::new(LoopbackChannel::new());
        let mut collector = DefinitionCollector::new("ExampleMod");
        collector
            .load(channel.clone(), pack, Rc::new(EmptyCatalog))
            .unwrap();
        host.pump(&channel, |m| collector.handle_message(m)).unwrap();
        (collector, channel)
    }

    #[test]
    fn test_bundled_pack_registered_on_ready() {
        let host = LocalHost::new();
        let pack = bundled::example_pack();
        let expected = pack.len();

        let (collector, _channel) = load(&host, pack);

        assert!(collector.api().is_ready());
        assert_eq!(host.definition_count(), expected);
        assert_eq!(
            collector.last_summary(),
            Some(RegistrationSummary {
                registered: expected,
                skipped: 0,
                delegate_sets: 1,
            })
        );
        assert!(host.has_delegates(DefinitionKind::Countermeasure, "ExampleCountermeasureDef"));
        assert!(
            host.log_lines()
                .iter()
                .any(|line| line.starts_with("[ExampleMod] Registered"))
        );
    }

    #[test]
    fn test_registered_definitions_carry_verified_defaults() {
        let host = LocalHost::new();
        let (collector, _channel) = load(&host, bundled::example_pack());

        let camera: SensorDefinition = collector
            .api()
            .get_definition("DetEq_VanillaCamera")
            .unwrap()
            .unwrap();
        assert_eq!(camera.max_power_draw, 1.0);
    }

    #[test]
    fn test_invalid_definitions_are_skipped() {
        let host = LocalHost::new();
        let mut pack = bundled::example_pack();
        let mut broken = bundled::example_sensor();
        broken.name = "BrokenSensor".to_string();
        broken.min_aperture = 0.7;
        broken.max_aperture = 0.5;
        pack.sensors.push(broken);

        let (collector, _channel) = load(&host, pack);

        let summary = collector.last_summary().unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(!collector.api().has_definition::<SensorDefinition>("BrokenSensor"));
        assert!(collector.api().has_definition::<SensorDefinition>("ExampleSensorDef"));
        assert!(
            collector
                .api()
                .has_definition::<CountermeasureDefinition>("ExampleCountermeasureDef")
        );
    }

    #[test]
    fn test_nothing_registered_before_ready() {
        let host = LocalHost::new();
        let channel = Rc::new(LoopbackChannel::new());
        let mut collector = DefinitionCollector::new("ExampleMod");
        collector
            .load(channel.clone(), bundled::example_pack(), Rc::new(EmptyCatalog))
            .unwrap();

        assert!(collector.last_summary().is_none());
        assert_eq!(host.definition_count(), 0);

        collector.unload();
        host.pump(&channel, |m| collector.handle_message(m)).unwrap();
        assert!(collector.last_summary().is_none());
    }
}
