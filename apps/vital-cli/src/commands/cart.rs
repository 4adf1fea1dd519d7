//! # Cart Commands
//!
//! Cart manipulation on behalf of the shell.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│   Bill   │       │
//! │  │  Cart    │     │          │     │  prompts │     │ printed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │             │
//! │                   add_to_cart                        clear_cart         │
//! │                   update_cart_item                  (back to empty)     │
//! │                   remove_from_cart                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use vital_core::validation::validate_cart_quantity;
use vital_core::{compute_totals, CartLedger, CartTotals};

use crate::commands::inventory::Catalog;
use crate::error::UserError;
use crate::state::{BillingConfig, CartStore};

/// Cart contents with totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub ledger: CartLedger,
    pub totals: CartTotals,
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartStore, billing: &BillingConfig) -> CartView {
    cart.with_cart(|ledger| CartView {
        ledger: ledger.clone(),
        totals: compute_totals(ledger, billing.tax_rate),
    })
}

/// Adds one unit of a catalog item.
///
/// ## Behavior
/// - If the item is already in the cart: quantity increases by one
/// - Otherwise: added with quantity 1, as a snapshot of the catalog record
pub fn add_to_cart(cart: &CartStore, catalog: &Catalog, item_id: &str) -> Result<(), UserError> {
    debug!(item_id, "add_to_cart command");

    let item = catalog
        .find(item_id)
        .ok_or_else(|| UserError::not_found("Item", item_id))?;

    cart.update(|ledger| ledger.add(item));
    Ok(())
}

/// Sets the quantity of a cart line. Zero or less removes the line; more
/// than a line can hold is rejected.
pub fn update_cart_item(cart: &CartStore, item_id: &str, quantity: i64) -> Result<(), UserError> {
    debug!(item_id, quantity, "update_cart_item command");
    ensure_in_cart(cart, item_id)?;
    validate_cart_quantity(quantity)?;

    cart.update(|ledger| ledger.set_quantity(item_id, quantity));
    Ok(())
}

/// Removes a line from the cart.
pub fn remove_from_cart(cart: &CartStore, item_id: &str) -> Result<(), UserError> {
    debug!(item_id, "remove_from_cart command");
    ensure_in_cart(cart, item_id)?;

    cart.update(|ledger| ledger.remove(item_id));
    Ok(())
}

/// Empties the cart.
pub fn clear_cart(cart: &CartStore) {
    debug!("clear_cart command");
    cart.update(CartLedger::clear);
}

fn ensure_in_cart(cart: &CartStore, item_id: &str) -> Result<(), UserError> {
    if cart.with_cart(|ledger| ledger.get(item_id).is_none()) {
        return Err(UserError::not_found("Cart item", item_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use vital_core::{InventoryItem, TaxRate};

    fn catalog() -> Catalog {
        let items: Vec<InventoryItem> = serde_json::from_value(json!([
            {"id": "A", "name": "Gloves", "price": 10.5},
            {"id": "B", "name": "Gauze", "price": "3.25"},
            {"id": "C", "name": "Unpriced"}
        ]))
        .unwrap();
        Catalog::new(items)
    }

    #[test]
    fn test_add_twice_then_set_quantity() {
        let cart = CartStore::new();
        let catalog = catalog();

        add_to_cart(&cart, &catalog, "A").unwrap();
        add_to_cart(&cart, &catalog, "A").unwrap();
        update_cart_item(&cart, "A", 1).unwrap();

        let view = get_cart(&cart, &BillingConfig::default());
        assert_eq!(view.ledger.size(), 1);
        assert_eq!(view.ledger.get("A").unwrap().selected_quantity, 1);
    }

    #[test]
    fn test_mixed_prices_total() {
        let cart = CartStore::new();
        let catalog = catalog();

        add_to_cart(&cart, &catalog, "A").unwrap();
        add_to_cart(&cart, &catalog, "A").unwrap();
        add_to_cart(&cart, &catalog, "B").unwrap();
        add_to_cart(&cart, &catalog, "C").unwrap();

        let view = get_cart(&cart, &BillingConfig::default());
        assert_eq!(view.totals.subtotal.to_display_string(), "24.25");
        assert_eq!(view.totals.total.to_display_string(), "24.25");
    }

    #[test]
    fn test_configured_tax_applies() {
        let cart = CartStore::new();
        add_to_cart(&cart, &catalog(), "A").unwrap();

        let billing = BillingConfig {
            tax_rate: TaxRate::from_bps(1000),
            ..BillingConfig::default()
        };
        let view = get_cart(&cart, &billing);
        assert_eq!(view.totals.tax.to_display_string(), "1.05");
        assert_eq!(view.totals.total.to_display_string(), "11.55");
    }

    #[test]
    fn test_zero_and_negative_quantity_remove() {
        let cart = CartStore::new();
        let catalog = catalog();
        add_to_cart(&cart, &catalog, "A").unwrap();
        add_to_cart(&cart, &catalog, "B").unwrap();

        update_cart_item(&cart, "A", 0).unwrap();
        update_cart_item(&cart, "B", -1).unwrap();
        assert!(cart.with_cart(CartLedger::is_empty));
    }

    #[test]
    fn test_unknown_ids_reported() {
        let cart = CartStore::new();
        let err = add_to_cart(&cart, &catalog(), "Z").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        assert!(remove_from_cart(&cart, "A").is_err());
        assert!(update_cart_item(&cart, "A", 2).is_err());
    }

    #[test]
    fn test_oversize_quantity_rejected_and_totals_saturate() {
        let items: Vec<InventoryItem> = serde_json::from_value(json!([
            {"id": "H", "name": "Imaging suite", "price": "100000000000000000000"},
            {"id": "M", "name": "Max", "price": "79228162514264337593543950335"}
        ]))
        .unwrap();
        let catalog = Catalog::new(items);
        let cart = CartStore::new();

        add_to_cart(&cart, &catalog, "H").unwrap();
        let err = update_cart_item(&cart, "H", 9_999_999_999).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Quantity must be at most 4294967295");
        assert_eq!(cart.with_cart(|c| c.get("H").unwrap().selected_quantity), 1);

        update_cart_item(&cart, "H", i64::from(u32::MAX)).unwrap();
        add_to_cart(&cart, &catalog, "M").unwrap();
        add_to_cart(&cart, &catalog, "M").unwrap();

        let view = get_cart(&cart, &BillingConfig::default());
        assert_eq!(view.totals.total, view.totals.subtotal);
        assert!(!view.totals.subtotal.is_negative());
    }

    #[test]
    fn test_clear() {
        let cart = CartStore::new();
        add_to_cart(&cart, &catalog(), "A").unwrap();
        clear_cart(&cart);
        assert_eq!(cart.with_cart(CartLedger::size), 0);
    }
}
