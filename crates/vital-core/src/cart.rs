//! # Cart Ledger
//!
//! The in-memory set of items a customer intends to buy.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Ledger Operations                               │
//! │                                                                         │
//! │  UI Action              Ledger Operation        Ledger Change           │
//! │  ─────────              ────────────────        ─────────────           │
//! │                                                                         │
//! │  "Add to Cart" ───────► add(item) ────────────► qty += 1 or new line   │
//! │                                                                         │
//! │  [-] / [+] ───────────► set_quantity(id, n) ──► n <= 0 removes line    │
//! │                                                                         │
//! │  Trash icon ──────────► remove(id) ───────────► line deleted           │
//! │                                                                         │
//! │  Cancel sale ─────────► clear() ──────────────► no lines               │
//! │                                                                         │
//! │  NOTE: none of these fail. Unknown ids are no-ops.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per item id (adding again merges quantities)
//! - Every line has `selected_quantity >= 1`
//! - Lines keep the order in which items were first added
//!
//! The ledger is a plain value: `Clone` it to hand a snapshot to an observer.

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::money::Money;
use crate::types::InventoryItem;

/// One item in the cart plus the quantity the customer wants.
///
/// `item` is a frozen snapshot taken when the item was first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item: InventoryItem,
    pub selected_quantity: u32,
}

impl CartLine {
    /// Item identifier; also the line's identity.
    #[inline]
    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Normalized unit price.
    #[inline]
    pub fn unit_price(&self) -> Money {
        self.item.price
    }

    /// Unit price × selected quantity, unrounded.
    pub fn line_amount(&self) -> Money {
        self.item.price.multiply_quantity(self.selected_quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLedger {
    lines: Vec<CartLine>,
}

impl CartLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        CartLedger::default()
    }

    /// Adds one unit of `item`.
    ///
    /// ```rust
    /// # use vital_core::cart::CartLedger;
    /// # use vital_core::types::InventoryItem;
    /// # let item: InventoryItem = serde_json::from_value(
    /// #     serde_json::json!({"id": "A", "name": "Gauze", "price": 2})).unwrap();
    /// let mut cart = CartLedger::new();
    /// cart.add(&item);
    /// cart.add(&item);
    /// assert_eq!(cart.size(), 1);
    /// assert_eq!(cart.get("A").unwrap().selected_quantity, 2);
    /// ```
    pub fn add(&mut self, item: &InventoryItem) {
        if let Some(line) = self.line_mut(&item.id) {
            line.selected_quantity = line.selected_quantity.saturating_add(1);
            return;
        }

        self.lines.push(CartLine {
            item: item.clone(),
            selected_quantity: 1,
        });
    }

    /// Sets the quantity of an existing line; `quantity <= 0` removes it.
    ///
    /// Unknown ids are ignored, and so are quantities above `u32::MAX`: the
    /// line keeps its current quantity.
    pub fn set_quantity(&mut self, item_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(item_id);
            return;
        }

        let Ok(quantity) = u32::try_from(quantity) else {
            warn!(item_id, quantity, "quantity out of range ignored");
            return;
        };
        if let Some(line) = self.line_mut(item_id) {
            line.selected_quantity = quantity;
        }
    }

    /// Removes the line for `item_id` if present.
    pub fn remove(&mut self, item_id: &str) {
        self.lines.retain(|line| line.item.id != item_id);
    }

    /// Empties the ledger.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of distinct lines (not units).
    pub fn size(&self) -> usize {
        self.lines.len()
    }

    /// Sum of selected quantities across all lines.
    pub fn total_units(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.selected_quantity))
            .sum()
    }

    /// Checks if the ledger has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up the line for an item id.
    pub fn get(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item.id == item_id)
    }

    fn line_mut(&mut self, item_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.item.id == item_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn item(id: &str, price: serde_json::Value) -> InventoryItem {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("Item {id}"),
            "quantity": 50,
            "category": "Supplies",
            "description": "",
            "price": price,
            "hospital": "1"
        }))
        .unwrap()
    }

    #[test]
    fn test_add_new_item() {
        let mut cart = CartLedger::new();
        cart.add(&item("A", json!(10.5)));

        assert_eq!(cart.size(), 1);
        assert_eq!(cart.get("A").unwrap().selected_quantity, 1);
    }

    #[test]
    fn test_add_same_item_merges() {
        let mut cart = CartLedger::new();
        let a = item("A", json!(10.5));
        cart.add(&a);
        cart.add(&a);

        assert_eq!(cart.size(), 1);
        assert_eq!(cart.get("A").unwrap().selected_quantity, 2);
        assert_eq!(cart.total_units(), 2);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        for qty in [0, -1, -40] {
            let mut cart = CartLedger::new();
            cart.add(&item("A", json!(1)));
            cart.set_quantity("A", qty);
            assert!(cart.is_empty(), "quantity {qty}");
        }
    }

    #[test]
    fn test_remove_and_set_zero_converge() {
        let mut via_remove = CartLedger::new();
        via_remove.add(&item("A", json!(1)));
        via_remove.add(&item("B", json!(2)));
        let mut via_zero = via_remove.clone();

        via_remove.remove("A");
        via_zero.set_quantity("A", 0);

        assert_eq!(via_remove, via_zero);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut cart = CartLedger::new();
        cart.add(&item("A", json!(1)));
        let before = cart.clone();

        cart.set_quantity("missing", 5);
        cart.remove("missing");

        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_twice_then_set_one() {
        let mut cart = CartLedger::new();
        let a = item("A", json!(4));
        cart.add(&a);
        cart.add(&a);
        cart.set_quantity("A", 1);

        assert_eq!(cart.size(), 1);
        assert_eq!(cart.get("A").unwrap().selected_quantity, 1);
    }

    #[test]
    fn test_oversize_quantity_is_ignored() {
        let mut cart = CartLedger::new();
        cart.add(&item("A", json!("100000000000000000000")));
        cart.set_quantity("A", 3);
        cart.set_quantity("A", 9_999_999_999);

        assert_eq!(cart.get("A").unwrap().selected_quantity, 3);

        cart.set_quantity("A", i64::from(u32::MAX));
        assert_eq!(cart.get("A").unwrap().selected_quantity, u32::MAX);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = CartLedger::new();
        cart.add(&item("B", json!(1)));
        cart.add(&item("A", json!(1)));
        cart.add(&item("B", json!(1)));

        let ids: Vec<&str> = cart.lines().iter().map(CartLine::id).collect();
        assert_eq!(ids, ["B", "A"]);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartLedger::new();
        cart.add(&item("A", json!(1)));
        cart.add(&item("B", json!(1)));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.size(), 0);
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let mut original = item("A", json!(5));
        let mut cart = CartLedger::new();
        cart.add(&original);

        original.price = Money::from_cents(99_999);
        cart.add(&original);

        assert_eq!(cart.get("A").unwrap().unit_price(), Money::from_cents(500));
    }
}
