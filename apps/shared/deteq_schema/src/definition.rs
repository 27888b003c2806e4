//! Common definition contract
//!
//! Every definition kind is identified on the wire by its [`DefinitionKind`]
//! and by its name. Hosts that replicate definitions over the network use the
//! compact [`DefinitionId`] derived from the name instead.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::catalog::ItemCatalog;
use crate::delegates::DelegateSet;
use crate::error::DelegateError;

/// Runtime type tag sent alongside every definition call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum DefinitionKind {
    Sensor = 1,
    Countermeasure = 2,
    CountermeasureEmitter = 3,
    ControlBlock = 4,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 4] = [
        DefinitionKind::Sensor,
        DefinitionKind::Countermeasure,
        DefinitionKind::CountermeasureEmitter,
        DefinitionKind::ControlBlock,
    ];

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(DefinitionKind::Sensor),
            2 => Some(DefinitionKind::Countermeasure),
            3 => Some(DefinitionKind::CountermeasureEmitter),
            4 => Some(DefinitionKind::ControlBlock),
            _ => None,
        }
    }

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    /// Type name shared with the registry mod
    pub fn type_name(self) -> &'static str {
        match self {
            DefinitionKind::Sensor => "SensorDefinition",
            DefinitionKind::Countermeasure => "CountermeasureDefinition",
            DefinitionKind::CountermeasureEmitter => "CountermeasureEmitterDefinition",
            DefinitionKind::ControlBlock => "ControlBlockDefinition",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Compact identity of a definition: a stable hash of its name.
///
/// Never serialized with the definition; each side derives it from the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(pub u32);

impl DefinitionId {
    pub fn from_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        DefinitionId(u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]))
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Outcome of [`Definition::verify`]
///
/// Diagnostics hold one line per finding. Notes do not affect validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub is_valid: bool,
    pub diagnostics: String,
}

impl Default for Verification {
    fn default() -> Self {
        Self::new()
    }
}

impl Verification {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            diagnostics: String::new(),
        }
    }

    /// Record a violated constraint
    pub fn fail(&mut self, line: impl AsRef<str>) {
        self.is_valid = false;
        self.push_line(line.as_ref());
    }

    /// Record a non-fatal correction
    pub fn note(&mut self, line: impl AsRef<str>) {
        self.push_line(line.as_ref());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.lines()
    }

    fn push_line(&mut self, line: &str) {
        self.diagnostics.push_str(line);
        self.diagnostics.push('\n');
    }
}

/// Shared behaviour of all definition kinds
pub trait Definition: Serialize + DeserializeOwned + Clone + fmt::Debug {
    const KIND: DefinitionKind;

    /// Unique name; overriding definitions reuse the name of the one they replace.
    fn name(&self) -> &str;

    /// Check every constraint and apply documented defaults.
    fn verify(&mut self, catalog: &dyn ItemCatalog) -> Verification;

    /// Delegates this definition carries, if any are set.
    fn generate_delegates(&self) -> Option<DelegateSet> {
        None
    }

    /// Fill delegate slots from a set received through the API.
    fn assign_delegates(&mut self, _delegates: &DelegateSet) -> Result<(), DelegateError> {
        Ok(())
    }

    fn id(&self) -> DefinitionId {
        DefinitionId::from_name(self.name())
    }
}

/// Shared name check; every registration is keyed by name.
pub(crate) fn check_name(name: &str, result: &mut Verification) {
    if name.trim().is_empty() {
        result.fail("Name unset!");
    }
}
