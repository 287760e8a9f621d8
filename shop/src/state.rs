//! Shop state: the product catalog, the cart, and the cart's derived count.
//!
//! Readers get slices and copies. Mutation is crate-private and only reached
//! from the reducer, so every change goes through a settled action.

use crate::aggregate;
use crate::types::{CartItem, CartItemId, Product, ProductId};

/// Result of merging one unit of a product into the cart
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Merge {
    /// An existing row gained one unit
    Incremented,
    /// A new single-unit row was appended
    Inserted,
}

/// Result of taking one unit of a product out of the cart
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Decrement {
    /// No row references the product
    Missing,
    /// The row is still there with `remaining` units
    Decremented { remaining: u32 },
    /// The last unit was taken and the row is gone
    Removed,
}

/// Everything the shop keeps in memory
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShopState {
    products: Vec<Product>,
    cart: Vec<CartItem>,
    total_items_count: u32,
}

impl ShopState {
    /// Product catalog in display order
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Cart rows in insertion order
    #[must_use]
    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    /// Sum of quantities across the cart
    #[must_use]
    pub const fn total_items_count(&self) -> u32 {
        self.total_items_count
    }

    /// Sum of line totals across the cart
    #[must_use]
    pub fn total_price(&self) -> f64 {
        aggregate::total_price(&self.cart)
    }

    /// Looks up a product by id
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// The cart row for a product, if any
    #[must_use]
    pub fn cart_item_for(&self, product_id: ProductId) -> Option<&CartItem> {
        self.cart.iter().find(|item| item.product_id() == product_id)
    }

    pub(crate) fn set_products(&mut self, products: Vec<Product>) {
        self.products = products.into_iter().map(Product::normalized).collect();
    }

    pub(crate) fn prepend_product(&mut self, product: Product) {
        self.products.insert(0, product.normalized());
    }

    /// Substitutes the product with the same id, leaving every other entry
    /// where it was. Unknown ids are ignored.
    pub(crate) fn replace_product(&mut self, product: Product) {
        if let Some(slot) = self.products.iter_mut().find(|p| p.id == product.id) {
            *slot = product.normalized();
        }
    }

    pub(crate) fn remove_product(&mut self, id: ProductId) {
        self.products.retain(|p| p.id != id);
    }

    /// Replaces the cart wholesale
    ///
    /// Rows for the same product are folded into the first of them and rows
    /// with no units are dropped, so a bad payload cannot break the
    /// one-row-per-product rule.
    pub(crate) fn set_cart(&mut self, items: Vec<CartItem>) {
        let mut cart: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart
                .iter_mut()
                .find(|existing| existing.product_id() == item.product_id())
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                },
                None => cart.push(item),
            }
        }
        self.cart = cart;
        self.recompute_total();
    }

    /// Adds one unit of `product`, reusing its row when there is one
    ///
    /// `new_id` is only called when a row has to be created.
    pub(crate) fn merge_cart_item(
        &mut self,
        product: Product,
        new_id: impl FnOnce() -> CartItemId,
    ) -> Merge {
        let merge = match self.row_mut(product.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                Merge::Incremented
            },
            None => {
                self.cart.push(CartItem::new(new_id(), product.normalized()));
                Merge::Inserted
            },
        };
        self.recompute_total();
        merge
    }

    /// Records a row the server reported as newly created, keeping its id
    ///
    /// The row is stored with a single unit. A stale local row for the same
    /// product is overwritten in place rather than kept alongside.
    pub(crate) fn insert_cart_item(&mut self, server_item: CartItem) {
        let row = CartItem {
            quantity: 1,
            ..server_item
        };
        match self.row_mut(row.product_id()) {
            Some(existing) => *existing = row,
            None => self.cart.push(row),
        }
        self.recompute_total();
    }

    /// Applies an increment the server reported against an existing row
    ///
    /// When the row is unknown locally the server's row is adopted as is.
    pub(crate) fn apply_server_increment(&mut self, server_item: CartItem) -> Merge {
        let merge = match self.row_mut(server_item.product_id()) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                Merge::Incremented
            },
            None => {
                let mut adopted = server_item;
                adopted.quantity = adopted.quantity.max(1);
                self.cart.push(adopted);
                Merge::Inserted
            },
        };
        self.recompute_total();
        merge
    }

    /// Takes one unit of a product out of the cart, dropping the row at zero
    pub(crate) fn decrement_cart_item(&mut self, product_id: ProductId) -> Decrement {
        let Some(index) = self
            .cart
            .iter()
            .position(|item| item.product_id() == product_id)
        else {
            return Decrement::Missing;
        };

        let remaining = self.cart[index].quantity.saturating_sub(1);
        let outcome = if remaining == 0 {
            self.cart.remove(index);
            Decrement::Removed
        } else {
            self.cart[index].quantity = remaining;
            Decrement::Decremented { remaining }
        };
        self.recompute_total();
        outcome
    }

    /// Drops a cart row by its id. Unknown ids are ignored.
    pub(crate) fn remove_cart_item(&mut self, id: &CartItemId) {
        self.cart.retain(|item| &item.id != id);
        self.recompute_total();
    }

    fn row_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.cart
            .iter_mut()
            .find(|item| item.product_id() == product_id)
    }

    fn recompute_total(&mut self) {
        self.total_items_count = aggregate::total_item_count(&self.cart);
    }
}
