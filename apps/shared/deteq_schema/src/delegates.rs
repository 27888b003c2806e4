//! Delegate capabilities
//!
//! A delegate is a named callback attached to a definition and filled in by a
//! cooperating mod. Each supported callback shape is its own newtype, and
//! [`Delegate`] tags them so the concrete shape can be checked once at the
//! boundary.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::DelegateError;
use crate::math::Vector3;

/// Named delegates exchanged for one definition
pub type DelegateSet = HashMap<String, Delegate>;

/// Handle to a block in the host world
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockRef {
    pub entity_id: i64,
    pub custom_name: String,
}

/// A sensor return that a countermeasure may alter
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrfmContact {
    pub sensor_id: u32,
    pub countermeasure_id: u32,
    /// Emitter the countermeasure is attached to, if any
    pub emitter: Option<BlockRef>,
    pub target_entity_id: i64,
    pub target_cross_section: f64,
    pub target_range: f64,
    pub max_range_error: f64,
    pub target_bearing: Vector3,
    pub max_bearing_error: f64,
    pub iff_codes: Vec<String>,
}

/// Offsets applied to a sensor return
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrfmAdjustment {
    pub cross_section_offset: f64,
    pub range_offset: f64,
    pub max_range_error_offset: f64,
    pub bearing: Vector3,
    pub max_bearing_error_offset: f64,
    pub iff_codes: Vec<String>,
}

impl DrfmAdjustment {
    /// Adjustment that leaves the contact as seen
    pub fn unchanged(contact: &DrfmContact) -> Self {
        Self {
            bearing: contact.target_bearing,
            iff_codes: contact.iff_codes.clone(),
            ..Default::default()
        }
    }
}

/// Sensor/countermeasure pairing handed to a false target generator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrfmSource {
    pub sensor_id: u32,
    pub sensor_block: BlockRef,
    pub countermeasure_id: u32,
    pub emitter: Option<BlockRef>,
}

/// A fabricated contact injected into a sensor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FalseTarget {
    pub entity_id: i64,
    pub cross_section: f64,
    pub range: f64,
    pub max_range_error: f64,
    pub bearing: Vector3,
    pub max_bearing_error: f64,
    pub iff_codes: Vec<String>,
}

/// Call shapes a delegate slot can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegateSignature {
    DrfmEffects,
    DrfmGenerator,
}

impl fmt::Display for DelegateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegateSignature::DrfmEffects => f.write_str("Fn(&DrfmContact) -> DrfmAdjustment"),
            DelegateSignature::DrfmGenerator => f.write_str("Fn(&DrfmSource) -> Vec<FalseTarget>"),
        }
    }
}

/// Modifies sensor returns directly
#[derive(Clone)]
pub struct DrfmEffects(pub Rc<dyn Fn(&DrfmContact) -> DrfmAdjustment>);

impl DrfmEffects {
    pub fn new(f: impl Fn(&DrfmContact) -> DrfmAdjustment + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, contact: &DrfmContact) -> DrfmAdjustment {
        (self.0)(contact)
    }
}

/// Produces false targets for a sensor
#[derive(Clone)]
pub struct DrfmGenerator(pub Rc<dyn Fn(&DrfmSource) -> Vec<FalseTarget>>);

impl DrfmGenerator {
    pub fn new(f: impl Fn(&DrfmSource) -> Vec<FalseTarget> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, source: &DrfmSource) -> Vec<FalseTarget> {
        (self.0)(source)
    }
}

impl fmt::Debug for DrfmEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DrfmEffects(..)")
    }
}

impl fmt::Debug for DrfmGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DrfmGenerator(..)")
    }
}

/// A delegate of any supported shape
#[derive(Debug, Clone)]
pub enum Delegate {
    DrfmEffects(DrfmEffects),
    DrfmGenerator(DrfmGenerator),
}

impl Delegate {
    pub fn signature(&self) -> DelegateSignature {
        match self {
            Delegate::DrfmEffects(_) => DelegateSignature::DrfmEffects,
            Delegate::DrfmGenerator(_) => DelegateSignature::DrfmGenerator,
        }
    }
}

/// A concrete callback type that can occupy a named slot
pub trait DelegateSlot: Sized + Clone {
    const SIGNATURE: DelegateSignature;

    fn from_delegate(delegate: &Delegate) -> Option<Self>;

    fn into_delegate(self) -> Delegate;
}

impl DelegateSlot for DrfmEffects {
    const SIGNATURE: DelegateSignature = DelegateSignature::DrfmEffects;

    fn from_delegate(delegate: &Delegate) -> Option<Self> {
        match delegate {
            Delegate::DrfmEffects(inner) => Some(inner.clone()),
            _ => None,
        }
    }

    fn into_delegate(self) -> Delegate {
        Delegate::DrfmEffects(self)
    }
}

impl DelegateSlot for DrfmGenerator {
    const SIGNATURE: DelegateSignature = DelegateSignature::DrfmGenerator;

    fn from_delegate(delegate: &Delegate) -> Option<Self> {
        match delegate {
            Delegate::DrfmGenerator(inner) => Some(inner.clone()),
            _ => None,
        }
    }

    fn into_delegate(self) -> Delegate {
        Delegate::DrfmGenerator(self)
    }
}

/// Resolve one slot from a delegate set.
///
/// A missing key resolves to `None`; a key holding the wrong shape is an error.
pub fn assign_delegate<T: DelegateSlot>(
    delegates: &DelegateSet,
    key: &str,
) -> Result<Option<T>, DelegateError> {
    let Some(delegate) = delegates.get(key) else {
        return Ok(None);
    };

    T::from_delegate(delegate)
        .map(Some)
        .ok_or_else(|| DelegateError::SignatureMismatch {
            key: key.to_string(),
            expected: T::SIGNATURE,
            found: delegate.signature(),
        })
}

/// Insert a slot into a delegate set when it is set.
pub fn insert_delegate<T: DelegateSlot>(delegates: &mut DelegateSet, key: &str, slot: &Option<T>) {
    if let Some(slot) = slot {
        delegates.insert(key.to_string(), slot.clone().into_delegate());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_matching_delegate() {
        let mut set = DelegateSet::new();
        set.insert(
            "DrfmEffects".to_string(),
            Delegate::DrfmEffects(DrfmEffects::new(DrfmAdjustment::unchanged)),
        );

        let effects: Option<DrfmEffects> = assign_delegate(&set, "DrfmEffects").unwrap();
        let contact = DrfmContact {
            target_bearing: Vector3::FORWARD,
            iff_codes: vec!["BLUE".to_string()],
            ..Default::default()
        };
        let adjusted = effects.unwrap().call(&contact);
        assert_eq!(adjusted.bearing, Vector3::FORWARD);
        assert_eq!(adjusted.iff_codes, vec!["BLUE".to_string()]);
    }

    #[test]
    fn test_assign_missing_delegate_is_none() {
        let set = DelegateSet::new();
        let generator: Option<DrfmGenerator> = assign_delegate(&set, "DrfmGenerator").unwrap();
        assert!(generator.is_none());
    }

    #[test]
    fn test_assign_mismatched_delegate_fails() {
        let mut set = DelegateSet::new();
        set.insert(
            "DrfmEffects".to_string(),
            Delegate::DrfmGenerator(DrfmGenerator::new(|_| Vec::new())),
        );

        let err = assign_delegate::<DrfmEffects>(&set, "DrfmEffects").unwrap_err();
        assert_eq!(
            err,
            DelegateError::SignatureMismatch {
                key: "DrfmEffects".to_string(),
                expected: DelegateSignature::DrfmEffects,
                found: DelegateSignature::DrfmGenerator,
            }
        );
    }
}
