//! Registration dry run
//!
//! Loads a pack through a [`DefinitionCollector`] against an in-process
//! registry, the same way a mod does in a live session.

use std::rc::Rc;

use deteq_mod_api::{DefinitionCollector, LocalHost, LoopbackChannel, RegistrationSummary};
use deteq_protocol::ApiError;
use deteq_schema::{DefinitionKind, DefinitionPack, ItemCatalog};
use tracing::{debug, info};

/// What the registry holds after a dry run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunReport {
    pub summary: Option<RegistrationSummary>,
    pub stored: Vec<(DefinitionKind, usize)>,
}

pub fn run(
    mod_name: &str,
    pack: DefinitionPack,
    catalog: Rc<dyn ItemCatalog>,
) -> Result<DryRunReport, ApiError> {
    let host = LocalHost::new();
    let channel = Rc::new(LoopbackChannel::new());
    let mut collector = DefinitionCollector::new(mod_name);

    collector.load(channel.clone(), pack, catalog)?;
    let delivered = host.pump(&channel, |message| collector.handle_message(message))?;
    debug!("Delivered {} messages", delivered);

    let stored = DefinitionKind::ALL
        .into_iter()
        .map(|kind| (kind, collector_count(&collector, kind)))
        .collect();
    let report = DryRunReport {
        summary: collector.last_summary(),
        stored,
    };

    for line in host.log_lines() {
        info!("registry: {}", line);
    }

    collector.unload();
    Ok(report)
}

fn collector_count(collector: &DefinitionCollector, kind: DefinitionKind) -> usize {
    use deteq_schema::{
        ControlBlockDefinition, CountermeasureDefinition, CountermeasureEmitterDefinition,
        SensorDefinition,
    };

    let api = collector.api();
    match kind {
        DefinitionKind::Sensor => api.get_definitions_of_type::<SensorDefinition>().len(),
        DefinitionKind::Countermeasure => {
            api.get_definitions_of_type::<CountermeasureDefinition>().len()
        }
        DefinitionKind::CountermeasureEmitter => api
            .get_definitions_of_type::<CountermeasureEmitterDefinition>()
            .len(),
        DefinitionKind::ControlBlock => api.get_definitions_of_type::<ControlBlockDefinition>().len(),
    }
}
