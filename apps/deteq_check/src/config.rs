use std::collections::HashMap;
use std::rc::Rc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use deteq_schema::{
    DefinitionPack, EmptyCatalog, ItemCatalog, ItemId, Result, Validatable, bundled,
};

/// Engine items that definitions may refer to by subtype
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Item Catalog")]
#[schemars(description = "Engine items available to definitions, such as ammo magazines")]
pub struct ItemCatalogFile {
    #[serde(default)]
    pub items: Vec<ItemId>,
}

impl Validatable for ItemCatalogFile {}

impl ItemCatalogFile {
    /// Index items by subtype; later entries win
    pub fn into_catalog(self) -> HashMap<String, ItemId> {
        self.items
            .into_iter()
            .map(|item| (item.subtype_id.clone(), item))
            .collect()
    }
}

/// Pack from `path`, or the bundled definitions when no path is given
pub fn load_pack(path: Option<&str>) -> Result<DefinitionPack> {
    match path {
        Some(path) => DefinitionPack::from_json_file(path),
        None => Ok(bundled::example_pack()),
    }
}

/// Catalog from `path`, or one with no items
pub fn load_catalog(path: Option<&str>) -> Result<Rc<dyn ItemCatalog>> {
    match path {
        Some(path) => Ok(Rc::new(ItemCatalogFile::from_json_file(path)?.into_catalog())),
        None => Ok(Rc::new(EmptyCatalog)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_file_indexes_by_subtype() {
        let json = r#"{
            "items": [
                { "type_id": "MyObjectBuilder_AmmoMagazine", "subtype_id": "FlareMagazine" },
                { "type_id": "MyObjectBuilder_AmmoMagazine", "subtype_id": "ChaffMagazine" }
            ]
        }"#;
        let catalog = ItemCatalogFile::from_json_str(json).unwrap().into_catalog();
        assert_eq!(
            catalog.find_item("FlareMagazine"),
            Some(ItemId::new("MyObjectBuilder_AmmoMagazine", "FlareMagazine"))
        );
        assert!(catalog.find_item("Missing").is_none());
    }

    #[test]
    fn test_catalog_file_rejects_bad_items() {
        let json = r#"{ "items": [ { "type_id": 5 } ] }"#;
        assert!(ItemCatalogFile::from_json_str(json).is_err());
    }

    #[test]
    fn test_default_pack_is_bundled() {
        let pack = load_pack(None).unwrap();
        assert_eq!(pack.load_priority, bundled::LOAD_PRIORITY);
        assert!(!pack.is_empty());
    }

    #[test]
    fn test_missing_pack_file_is_an_error() {
        assert!(load_pack(Some("/nonexistent/pack.json")).is_err());
    }
}
