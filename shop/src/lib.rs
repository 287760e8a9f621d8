//! # Cartsync Shop
//!
//! Product catalog and shopping cart kept in sync with a remote REST service.
//!
//! Each operation issues exactly one remote call and changes local state only
//! once that call settles. What a failure means depends on the operation:
//!
//! | Operation | On failure |
//! |---|---|
//! | load products | bundled catalog |
//! | create, update, delete product | applied anyway |
//! | add to cart | merged locally |
//! | decrease quantity | applied anyway |
//! | remove from cart | not applied |
//! | load cart | emptied |
//!
//! The cart never holds two rows for the same product, never holds a row with
//! zero units, and its total item count is recomputed after every change.
//!
//! ## Example
//!
//! ```no_run
//! use cartsync_shop::{HttpChannel, ShopService};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), cartsync_shop::ServiceError> {
//! let shop = ShopService::new(Arc::new(HttpChannel::new("http://localhost:8080/api")));
//! shop.load_products().await?;
//!
//! if let Some(product) = shop.products().await.first().cloned() {
//!     shop.add_to_cart(product).await?;
//! }
//! println!("{} item(s) in cart", shop.total_items_count().await);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod aggregate;
pub mod channel;
pub mod config;
pub mod error;
pub mod http;
pub mod mocks;
pub mod policy;
pub mod reducer;
pub mod service;
pub mod state;
pub mod types;

pub use action::ShopAction;
pub use channel::{BundledCatalog, CartAddition, ChannelFuture, RemoteChannel};
pub use config::ShopConfig;
pub use error::{ChannelError, ConfigError, ServiceError};
pub use http::HttpChannel;
pub use policy::{FailurePolicy, Operation, Settlement};
pub use reducer::{ShopEnvironment, ShopReducer};
pub use service::ShopService;
pub use state::ShopState;
pub use types::{CartItem, CartItemId, InventoryStatus, Product, ProductId, RequestId};
