//! Aggregates derived from the cart.
//!
//! Both are recomputed from the full collection every time; neither is ever
//! patched incrementally.

use crate::types::CartItem;

/// Sum of quantities across the cart
#[must_use]
pub fn total_item_count(items: &[CartItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |total, item| total.saturating_add(item.quantity))
}

/// Sum of `price × quantity` across the cart
#[must_use]
pub fn total_price(items: &[CartItem]) -> f64 {
    items.iter().map(CartItem::line_total).sum()
}
