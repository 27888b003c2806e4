//! Mod-scoped logging
//!
//! Bridges messages about a specific mod to tracing with a `mod_name` field,
//! which the deteq_log formatter renders as `mod::<name>:`.

use tracing::{debug, error, info, warn};

/// Console API implementation
#[derive(Clone)]
pub struct ModConsole;

impl ModConsole {
    /// Log an info message
    pub fn info(mod_name: &str, message: &str) {
        info!(mod_name = mod_name, "{}", message);
    }

    /// Log an error message
    pub fn error(mod_name: &str, message: &str) {
        error!(mod_name = mod_name, "{}", message);
    }

    /// Log a warning message
    pub fn warn(mod_name: &str, message: &str) {
        warn!(mod_name = mod_name, "{}", message);
    }

    /// Log a debug message
    pub fn debug(mod_name: &str, message: &str) {
        debug!(mod_name = mod_name, "{}", message);
    }
}
