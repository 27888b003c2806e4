//! Item catalog collaborator
//!
//! Emitter validation resolves a magazine item by name against the engine's
//! physical item definitions. The engine owns that catalog; this module only
//! describes the lookup.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Concrete engine identifier of a physical item (type id + subtype id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ItemId {
    pub type_id: String,
    pub subtype_id: String,
}

impl ItemId {
    pub fn new(type_id: impl Into<String>, subtype_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            subtype_id: subtype_id.into(),
        }
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.type_id, self.subtype_id)
    }
}

/// Lookup of physical items by subtype name.
pub trait ItemCatalog {
    fn find_item(&self, subtype_name: &str) -> Option<ItemId>;
}

/// Catalog with no items; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl ItemCatalog for EmptyCatalog {
    fn find_item(&self, _subtype_name: &str) -> Option<ItemId> {
        None
    }
}

impl ItemCatalog for HashMap<String, ItemId> {
    fn find_item(&self, subtype_name: &str) -> Option<ItemId> {
        self.get(subtype_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_catalog_lookup() {
        let mut catalog = HashMap::new();
        catalog.insert(
            "FlareMagazine".to_string(),
            ItemId::new("MyObjectBuilder_AmmoMagazine", "FlareMagazine"),
        );

        let found = catalog.find_item("FlareMagazine").unwrap();
        assert_eq!(found.to_string(), "MyObjectBuilder_AmmoMagazine/FlareMagazine");
        assert!(catalog.find_item("Missing").is_none());
        assert!(EmptyCatalog.find_item("FlareMagazine").is_none());
    }
}
