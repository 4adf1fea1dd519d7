//! # Inventory Commands
//!
//! The facility's stock as loaded at startup, plus the backend calls that
//! change it.
//!
//! ## Catalog Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  startup ──► load_catalog(facility) ──► Catalog (in memory)            │
//! │                                             │                           │
//! │                     items [query] ◄─────────┤ search (local filter)     │
//! │                     add <id>      ◄─────────┤ find                      │
//! │                     new-item ───────────────┤ create_item ──► insert    │
//! │                     delete-item <id> ───────┘ delete_item ──► remove    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use vital_client::ApiClient;
use vital_core::search::filter_items;
use vital_core::validation::{validate_new_item, validate_search_query};
use vital_core::{FacilityStats, InventoryItem, NewInventoryItem};

use crate::error::UserError;

/// In-memory copy of a facility's inventory.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<InventoryItem>,
}

impl Catalog {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Catalog { items }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items matching `query` on name, category or description.
    pub fn search(&self, query: &str) -> Result<Vec<&InventoryItem>, UserError> {
        let query = validate_search_query(query)?;
        Ok(filter_items(&self.items, &query))
    }

    pub fn insert(&mut self, item: InventoryItem) {
        self.items.push(item);
    }

    pub fn remove(&mut self, id: &str) -> Option<InventoryItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }
}

/// Fetches the inventory of one facility.
pub async fn load_catalog(api: &ApiClient, facility_id: &str) -> Result<Catalog, UserError> {
    let items = api.facility_inventory(facility_id).await?;
    info!(facility_id, count = items.len(), "Inventory loaded");
    Ok(Catalog::new(items))
}

/// Validates and creates an inventory item owned by `facility_id`.
pub async fn create_item(
    api: &ApiClient,
    facility_id: &str,
    mut draft: NewInventoryItem,
) -> Result<InventoryItem, UserError> {
    draft.hospital = facility_id.to_string();
    validate_new_item(&draft)?;

    let created = api.create_item(&draft).await?;
    info!(item_id = %created.id, name = %created.name, "Inventory item created");
    Ok(created)
}

/// Deletes an inventory item on the backend.
pub async fn delete_item(api: &ApiClient, item_id: &str) -> Result<(), UserError> {
    api.delete_item(item_id).await?;
    info!(item_id, "Inventory item deleted");
    Ok(())
}

/// Dashboard figures for a facility.
pub async fn facility_stats(api: &ApiClient, facility_id: &str) -> Result<FacilityStats, UserError> {
    debug!(facility_id, "Fetching stats");
    Ok(api.facility_stats(facility_id).await?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn catalog() -> Catalog {
        Catalog::new(
            serde_json::from_value(json!([
                {"id": 1, "name": "Surgical Gloves", "category": "PPE", "description": "Box of 100", "price": 10.5, "quantity": 40},
                {"id": 2, "name": "Gauze Roll", "category": "Dressings", "description": "Sterile", "price": "3.25", "quantity": 12},
                {"id": 3, "name": "Thermometer", "category": "Devices", "description": "Digital", "quantity": 3}
            ]))
            .unwrap(),
        )
    }

    #[test]
    fn test_find_and_search() {
        let catalog = catalog();
        assert_eq!(catalog.find("2").unwrap().name, "Gauze Roll");
        assert!(catalog.find("9").is_none());

        let hits = catalog.search("ppe").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
        assert_eq!(catalog.search("").unwrap().len(), 3);
    }

    #[test]
    fn test_overlong_query_rejected() {
        assert!(catalog().search(&"a".repeat(200)).is_err());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut catalog = catalog();
        let removed = catalog.remove("3").unwrap();
        assert_eq!(removed.name, "Thermometer");
        assert_eq!(catalog.len(), 2);
        assert!(catalog.remove("3").is_none());

        catalog.insert(removed);
        assert_eq!(catalog.items().last().unwrap().id, "3");
    }
}
