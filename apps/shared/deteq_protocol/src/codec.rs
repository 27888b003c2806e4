//! Definition byte format
//!
//! Definitions travel as bincode. Field order is the layout, so fields are
//! only ever appended. Delegates and runtime-only fields are skipped.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Serialize a definition to bytes using bincode
pub fn encode_definition<T: Serialize>(definition: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(definition)?)
}

/// Deserialize a definition from bytes using bincode
pub fn decode_definition<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deteq_schema::bundled;
    use deteq_schema::{CountermeasureDefinition, CountermeasureEmitterDefinition, ItemId};

    #[test]
    fn test_delegates_are_not_encoded() {
        let original = bundled::example_countermeasure();
        assert!(original.drfm_effects.is_some());

        let bytes = encode_definition(&original).unwrap();
        let decoded: CountermeasureDefinition = decode_definition(&bytes).unwrap();
        assert_eq!(decoded.name, original.name);
        assert_eq!(decoded.max_lifetime, u32::MAX);
        assert!(decoded.drfm_effects.is_none());
        assert!(decoded.drfm_generator.is_none());
    }

    #[test]
    fn test_runtime_item_id_is_not_encoded() {
        let mut emitter = bundled::example_emitter();
        emitter.magazine_item = Some("FlareMagazine".to_string());
        emitter.magazine_item_id = Some(ItemId::new("MyObjectBuilder_AmmoMagazine", "FlareMagazine"));

        let bytes = encode_definition(&emitter).unwrap();
        let decoded: CountermeasureEmitterDefinition = decode_definition(&bytes).unwrap();
        assert_eq!(decoded.magazine_item.as_deref(), Some("FlareMagazine"));
        assert!(decoded.magazine_item_id.is_none());
    }

    #[test]
    fn test_truncated_bytes_fail() {
        let bytes = encode_definition(&bundled::example_sensor()).unwrap();
        let result: Result<deteq_schema::SensorDefinition> = decode_definition(&bytes[..bytes.len() / 2]);
        assert!(result.is_err());
    }
}
