//! Inventory search: case-insensitive substring match on name, category and
//! description. An empty query matches everything.

use crate::types::InventoryItem;

/// Items whose name, category or description contains `query`.
pub fn filter_items<'a>(items: &'a [InventoryItem], query: &str) -> Vec<&'a InventoryItem> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            [&item.name, &item.category, &item.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}
