//! Remote side of the shop.
//!
//! Every call resolves exactly once, to a payload or a [`ChannelError`].
//! Nothing here retries; the reducer decides what a failure means.

use crate::error::ChannelError;
use crate::types::{CartItem, CartItemId, Product, ProductId};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`RemoteChannel`] methods
pub type ChannelFuture<T> = Pin<Box<dyn Future<Output = Result<T, ChannelError>> + Send>>;

/// What the server did with an add-to-cart request
///
/// Both variants carry the server's row, so its id is the one later
/// removals must use.
#[derive(Clone, Debug, PartialEq)]
pub enum CartAddition {
    /// The server created a new single-unit row
    Inserted(CartItem),
    /// The server incremented a row it already had
    Incremented(CartItem),
}

impl CartAddition {
    /// The server's row after the add
    #[must_use]
    pub const fn row(&self) -> &CartItem {
        match self {
            Self::Inserted(row) | Self::Incremented(row) => row,
        }
    }
}

/// Request/response access to the product and cart resources
pub trait RemoteChannel: Send + Sync {
    /// Fetches the full product catalog
    fn fetch_products(&self) -> ChannelFuture<Vec<Product>>;

    /// Fetches the bundled baseline catalog
    ///
    /// Only called after [`fetch_products`](Self::fetch_products) failed.
    fn fetch_fallback_products(&self) -> ChannelFuture<Vec<Product>>;

    /// Submits a new product and returns the id the server assigned
    fn create_product(&self, product: Product) -> ChannelFuture<ProductId>;

    /// Submits a patch for an existing product
    fn patch_product(&self, id: ProductId, product: Product) -> ChannelFuture<()>;

    /// Deletes a product
    fn delete_product(&self, id: ProductId) -> ChannelFuture<()>;

    /// Fetches the full cart
    fn fetch_cart(&self) -> ChannelFuture<Vec<CartItem>>;

    /// Adds one unit of a product to the server-side cart
    ///
    /// Resolves to the server's row, tagged with whether it was created or
    /// incremented.
    fn add_to_cart(&self, product_id: ProductId) -> ChannelFuture<CartAddition>;

    /// Removes one unit of a product from the server-side cart
    fn reduce_quantity(&self, product_id: ProductId) -> ChannelFuture<()>;

    /// Deletes a cart row
    fn delete_cart_item(&self, id: CartItemId) -> ChannelFuture<()>;
}

const BUNDLED_PRODUCTS: &str = include_str!("../assets/products.json");

/// Catalog shipped with the crate, used when the product service is down
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCatalog;

impl BundledCatalog {
    /// Parses the bundled catalog
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Decode`] if the bundled file is malformed.
    pub fn products() -> Result<Vec<Product>, ChannelError> {
        serde_json::from_str(BUNDLED_PRODUCTS).map_err(|e| ChannelError::Decode(e.to_string()))
    }
}
