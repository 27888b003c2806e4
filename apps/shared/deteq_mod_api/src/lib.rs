//! Detection Equipment definition API for client mods
//!
//! [`DefinitionApi`] negotiates with the registry mod over the shared channel
//! and forwards definition calls once bound. [`DefinitionCollector`] wraps it
//! for mods that only contribute a pack. [`LocalHost`] runs the registry side
//! in process.

pub mod client;
pub mod collector;
pub mod console;
pub mod local_host;

pub use client::{ApiState, DefinitionApi, ReadyCallback};
pub use collector::{DefinitionCollector, RegistrationSummary, register_pack};
pub use console::ModConsole;
pub use local_host::{LocalHost, LoopbackChannel};
