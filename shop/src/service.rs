//! Public entry point of the shop.
//!
//! [`ShopService`] wraps a store and turns each operation into a single call
//! that resolves once the operation's store change is visible.

use crate::action::ShopAction;
use crate::channel::RemoteChannel;
use crate::config::ShopConfig;
use crate::error::ServiceError;
use crate::policy::Settlement;
use crate::reducer::{ShopEnvironment, ShopReducer};
use crate::state::ShopState;
use crate::types::{CartItem, CartItemId, Product, ProductId, RequestId};
use cartsync_core::environment::UuidGenerator;
use cartsync_runtime::{Store, StoreConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Store specialised for the shop
type ShopStore = Store<ShopState, ShopAction, ShopEnvironment, ShopReducer>;

/// Product catalog and cart, kept in sync with a remote channel
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct ShopService {
    store: ShopStore,
}

impl ShopService {
    /// Creates a service over `channel` with default settings
    #[must_use]
    pub fn new(channel: Arc<dyn RemoteChannel>) -> Self {
        Self::with_environment(
            ShopEnvironment::new(channel, Arc::new(UuidGenerator)),
            StoreConfig::default(),
        )
    }

    /// Creates a service over `channel` using configured store settings
    #[must_use]
    pub fn from_config(config: &ShopConfig, channel: Arc<dyn RemoteChannel>) -> Self {
        Self::with_environment(
            ShopEnvironment::new(channel, Arc::new(UuidGenerator)),
            config.store_config(),
        )
    }

    /// Creates a service with explicit dependencies
    #[must_use]
    pub fn with_environment(environment: ShopEnvironment, config: StoreConfig) -> Self {
        Self {
            store: Store::with_config(
                ShopState::default(),
                ShopReducer::new(),
                environment,
                config,
            ),
        }
    }

    /// Reloads the catalog, falling back to the bundled one on failure
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store is shutting down.
    pub async fn load_products(&self) -> Result<Settlement, ServiceError> {
        self.run(|request| ShopAction::LoadProducts { request }).await
    }

    /// Creates a product and puts it at the front of the catalog
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store is shutting down.
    pub async fn create_product(&self, product: Product) -> Result<Settlement, ServiceError> {
        self.run(|request| ShopAction::CreateProduct { request, product })
            .await
    }

    /// Replaces a product in place
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store is shutting down.
    pub async fn update_product(&self, product: Product) -> Result<Settlement, ServiceError> {
        self.run(|request| ShopAction::UpdateProduct { request, product })
            .await
    }

    /// Removes a product from the catalog
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store is shutting down.
    pub async fn delete_product(&self, id: ProductId) -> Result<Settlement, ServiceError> {
        self.run(|request| ShopAction::DeleteProduct { request, id })
            .await
    }

    /// Adds one unit of a product to the cart
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store is shutting down.
    pub async fn add_to_cart(&self, product: Product) -> Result<Settlement, ServiceError> {
        self.run(|request| ShopAction::AddToCart { request, product })
            .await
    }

    /// Takes one unit of a product out of the cart
    ///
    /// Resolves to [`Settlement::Rejected`] without contacting the channel
    /// when the product is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store is shutting down.
    pub async fn decrease_quantity(&self, product: Product) -> Result<Settlement, ServiceError> {
        self.run(|request| ShopAction::DecreaseQuantity { request, product })
            .await
    }

    /// Drops a whole cart row
    ///
    /// The row stays when the remote deletion fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store is shutting down.
    pub async fn remove_from_cart(&self, id: CartItemId) -> Result<Settlement, ServiceError> {
        self.run(|request| ShopAction::RemoveFromCart { request, id })
            .await
    }

    /// Reloads the cart, emptying it on failure
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store is shutting down.
    pub async fn load_cart(&self) -> Result<Settlement, ServiceError> {
        self.run(|request| ShopAction::LoadCart { request }).await
    }

    /// Current catalog
    pub async fn products(&self) -> Vec<Product> {
        self.store.state(|s| s.products().to_vec()).await
    }

    /// Current cart
    pub async fn cart(&self) -> Vec<CartItem> {
        self.store.state(|s| s.cart().to_vec()).await
    }

    /// Current sum of cart quantities
    pub async fn total_items_count(&self) -> u32 {
        self.store.state(ShopState::total_items_count).await
    }

    /// Current sum of cart line totals
    pub async fn total_price(&self) -> f64 {
        self.store.state(ShopState::total_price).await
    }

    /// Consistent copy of the whole state
    pub async fn snapshot(&self) -> ShopState {
        self.store.state(ShopState::clone).await
    }

    /// Settlements as they are applied
    ///
    /// Each received action is already reflected in the state.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ShopAction> {
        self.store.subscribe_actions()
    }

    /// Stops accepting operations and waits for in-flight ones to settle
    ///
    /// Uses the configured shutdown timeout when `timeout` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if calls are still in flight when the
    /// timeout expires.
    pub async fn shutdown(&self, timeout: Option<Duration>) -> Result<(), ServiceError> {
        let timeout = timeout.unwrap_or(self.store.config().default_shutdown_timeout);
        self.store.shutdown(timeout).await?;
        Ok(())
    }

    /// Sends a request and waits for its settlement
    ///
    /// There is no deadline here: a channel that never answers keeps the
    /// caller waiting. Bound the wait at the channel instead.
    async fn run<F>(&self, build: F) -> Result<Settlement, ServiceError>
    where
        F: FnOnce(RequestId) -> ShopAction,
    {
        let request = RequestId::new();
        let action = build(request);
        let operation = action.operation();
        tracing::debug!(%request, operation = operation.name(), "Operation started");

        let settled = self
            .store
            .send_and_wait_for(
                action,
                move |a: &ShopAction| a.settlement().is_some_and(|(r, _)| r == request),
                None,
            )
            .await?;

        let settlement = settled
            .settlement()
            .map_or(Settlement::Rejected, |(_, settlement)| settlement);
        tracing::debug!(%request, operation = operation.name(), ?settlement, "Operation settled");
        Ok(settlement)
    }
}
