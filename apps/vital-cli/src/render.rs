//! Plain-text rendering for the terminal.

use vital_core::{CartTotals, Facility, FacilityStats, InventoryItem};

use crate::commands::cart::CartView;
use crate::commands::nearby::NearbyRow;

pub const HELP: &str = "\
Commands:
  items [query]      list inventory, optionally filtered
  add <id>           add one unit of an item to the cart
  qty <id> <n>       set the quantity of a cart line (0 removes it)
  rm <id>            remove a cart line
  clear              empty the cart
  cart               show the cart
  checkout           enter customer and payment details, print the bill
  new-item           create an inventory item
  delete-item <id>   delete an inventory item
  stats              facility dashboard figures
  help               this text
  quit               leave
";

pub fn items_table(items: &[&InventoryItem]) -> String {
    if items.is_empty() {
        return "No items found.\n".to_string();
    }

    let mut out = format!(
        "{:<8} {:<30} {:<16} {:>6} {:>10}\n",
        "ID", "Name", "Category", "Stock", "Price"
    );
    for item in items {
        out.push_str(&format!(
            "{:<8} {:<30} {:<16} {:>6} {:>10}\n",
            item.id,
            truncate(&item.name, 30),
            truncate(&item.category, 16),
            item.quantity,
            item.price.to_string()
        ));
    }
    out
}

pub fn cart_table(view: &CartView) -> String {
    if view.ledger.is_empty() {
        return "Cart is empty.\n".to_string();
    }

    let mut out = format!(
        "{:<8} {:<30} {:>5} {:>10} {:>10}\n",
        "ID", "Item", "Qty", "Price", "Amount"
    );
    for line in view.ledger.lines() {
        out.push_str(&format!(
            "{:<8} {:<30} {:>5} {:>10} {:>10}\n",
            line.id(),
            truncate(&line.item.name, 30),
            line.selected_quantity,
            line.unit_price().to_string(),
            line.line_amount().to_string()
        ));
    }
    out.push_str(&totals_line(&view.totals));
    out.push('\n');
    out
}

/// One-line summary printed after every cart change.
pub fn totals_line(totals: &CartTotals) -> String {
    format!(
        "Cart: {} line(s), {} unit(s) | Subtotal {} | Tax ({}%) {} | Total {}",
        totals.item_count,
        totals.total_units,
        totals.subtotal,
        totals.tax_rate.percentage(),
        totals.tax,
        totals.total
    )
}

pub fn facility_card(facility: &Facility) -> String {
    let mut out = format!("{} (#{})\n", facility.name, facility.id);

    let address = facility.full_address();
    if !address.is_empty() {
        out.push_str(&format!("  {address}\n"));
    }
    if !facility.phone_number.is_empty() {
        out.push_str(&format!("  Phone: {}\n", facility.phone_number));
    }
    if !facility.email.is_empty() {
        out.push_str(&format!("  Email: {}\n", facility.email));
    }
    if !facility.contact_person.is_empty() {
        out.push_str(&format!("  Contact: {}\n", facility.contact_person));
    }
    out
}

pub fn nearby_table(rows: &[NearbyRow]) -> String {
    if rows.is_empty() {
        return "No facilities with a known location.\n".to_string();
    }

    let mut out = String::new();
    for (rank, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:<32} {:>8.1} km  {}\n",
            rank + 1,
            truncate(&row.facility.name, 32),
            row.distance_km,
            row.facility.full_address()
        ));
    }
    out
}

pub fn stats_block(stats: &FacilityStats) -> String {
    let mut out = format!(
        "Items: {}  Units in stock: {}  Transactions: {}  Sales: {}\n",
        stats.total_items, stats.total_quantity, stats.total_transactions, stats.total_sales
    );
    for category in &stats.items_by_category {
        out.push_str(&format!(
            "  {:<20} {:>4} item(s) {:>6} unit(s)\n",
            category.category, category.count, category.total_quantity
        ));
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
