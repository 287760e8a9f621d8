//! Reducer for the shop.
//!
//! A request never touches state. It returns one [`Effect::Future`] that
//! performs the remote call when polled and resolves to the matching
//! settlement. The settlement is then applied according to the operation's
//! [`FailurePolicy`](crate::policy::FailurePolicy).

use crate::action::ShopAction;
use crate::channel::{CartAddition, RemoteChannel};
use crate::error::ChannelError;
use crate::policy::Operation;
use crate::state::{Decrement, Merge, ShopState};
use crate::types::CartItemId;
use cartsync_core::{
    effect::Effect, environment::IdGenerator, reducer::Reducer, smallvec, SmallVec,
};
use std::sync::Arc;

/// Environment dependencies for the shop reducer
#[derive(Clone)]
pub struct ShopEnvironment {
    /// Remote product and cart resources
    pub channel: Arc<dyn RemoteChannel>,
    /// Source of ids for locally created cart rows
    pub ids: Arc<dyn IdGenerator>,
}

impl ShopEnvironment {
    /// Creates a new `ShopEnvironment`
    #[must_use]
    pub fn new(channel: Arc<dyn RemoteChannel>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { channel, ids }
    }

    fn new_cart_item_id(&self) -> CartItemId {
        CartItemId::from(self.ids.generate())
    }
}

/// Reducer for the shop
#[derive(Clone, Debug, Default)]
pub struct ShopReducer;

impl ShopReducer {
    /// Creates a new `ShopReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn record_failure(operation: Operation, error: &ChannelError) {
        let policy = operation.on_failure();
        tracing::warn!(
            operation = operation.name(),
            policy = policy.name(),
            error = %error,
            "Remote call failed"
        );
        metrics::counter!(
            "shop.channel.failures",
            "operation" => operation.name(),
            "policy" => policy.name()
        )
        .increment(1);
    }
}

fn call<A>(fut: impl std::future::Future<Output = A> + Send + 'static) -> Effect<A>
where
    A: Send + 'static,
{
    Effect::future(async move { Some(fut.await) })
}

impl Reducer for ShopReducer {
    type State = ShopState;
    type Action = ShopAction;
    type Environment = ShopEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Requests ==========
            ShopAction::LoadProducts { request } => {
                let channel = Arc::clone(&env.channel);
                smallvec![call(async move {
                    ShopAction::ProductsLoaded {
                        request,
                        result: channel.fetch_products().await,
                    }
                })]
            },

            ShopAction::CreateProduct { request, product } => {
                let channel = Arc::clone(&env.channel);
                smallvec![call(async move {
                    let result = channel.create_product(product.clone()).await;
                    ShopAction::ProductCreated {
                        request,
                        product,
                        result,
                    }
                })]
            },

            ShopAction::UpdateProduct { request, product } => {
                let channel = Arc::clone(&env.channel);
                smallvec![call(async move {
                    let result = channel.patch_product(product.id, product.clone()).await;
                    ShopAction::ProductUpdated {
                        request,
                        product,
                        result,
                    }
                })]
            },

            ShopAction::DeleteProduct { request, id } => {
                let channel = Arc::clone(&env.channel);
                smallvec![call(async move {
                    ShopAction::ProductDeleted {
                        request,
                        id,
                        result: channel.delete_product(id).await,
                    }
                })]
            },

            ShopAction::AddToCart { request, product } => {
                let channel = Arc::clone(&env.channel);
                smallvec![call(async move {
                    let result = channel.add_to_cart(product.id).await;
                    ShopAction::AddedToCart {
                        request,
                        product,
                        result,
                    }
                })]
            },

            ShopAction::DecreaseQuantity { request, product } => {
                let product_id = product.id;
                if state.cart_item_for(product_id).is_none() {
                    tracing::debug!(%product_id, "Nothing to decrease, skipping remote call");
                    return smallvec![call(async move {
                        ShopAction::DecreaseSkipped {
                            request,
                            product_id,
                        }
                    })];
                }
                let channel = Arc::clone(&env.channel);
                smallvec![call(async move {
                    ShopAction::QuantityDecreased {
                        request,
                        product_id,
                        result: channel.reduce_quantity(product_id).await,
                    }
                })]
            },

            ShopAction::RemoveFromCart { request, id } => {
                let channel = Arc::clone(&env.channel);
                smallvec![call(async move {
                    let result = channel.delete_cart_item(id.clone()).await;
                    ShopAction::RemovedFromCart {
                        request,
                        id,
                        result,
                    }
                })]
            },

            ShopAction::LoadCart { request } => {
                let channel = Arc::clone(&env.channel);
                smallvec![call(async move {
                    ShopAction::CartLoaded {
                        request,
                        result: channel.fetch_cart().await,
                    }
                })]
            },

            // ========== Settlements ==========
            ShopAction::ProductsLoaded { request, result } => match result {
                Ok(products) => {
                    tracing::info!(count = products.len(), "Catalog loaded");
                    state.set_products(products);
                    SmallVec::new()
                },
                Err(error) => {
                    Self::record_failure(Operation::LoadProducts, &error);
                    let channel = Arc::clone(&env.channel);
                    smallvec![call(async move {
                        ShopAction::FallbackProductsLoaded {
                            request,
                            result: channel.fetch_fallback_products().await,
                        }
                    })]
                },
            },

            ShopAction::FallbackProductsLoaded { result, .. } => {
                match result {
                    Ok(products) => {
                        tracing::info!(count = products.len(), "Bundled catalog loaded");
                        state.set_products(products);
                    },
                    Err(error) => {
                        tracing::error!(%error, "Fallback catalog unavailable, keeping current products");
                    },
                }
                SmallVec::new()
            },

            ShopAction::ProductCreated {
                product, result, ..
            } => {
                match result {
                    Ok(assigned) => {
                        tracing::debug!(%assigned, submitted = %product.id, "Product created");
                    },
                    Err(error) => {
                        Self::record_failure(Operation::CreateProduct, &error);
                    },
                }
                state.prepend_product(product);
                SmallVec::new()
            },

            ShopAction::ProductUpdated {
                product, result, ..
            } => {
                if let Err(error) = result {
                    Self::record_failure(Operation::UpdateProduct, &error);
                }
                state.replace_product(product);
                SmallVec::new()
            },

            ShopAction::ProductDeleted { id, result, .. } => {
                if let Err(error) = result {
                    Self::record_failure(Operation::DeleteProduct, &error);
                }
                state.remove_product(id);
                SmallVec::new()
            },

            ShopAction::AddedToCart {
                product, result, ..
            } => {
                match result {
                    Ok(CartAddition::Incremented(existing)) => {
                        let merge = state.apply_server_increment(existing);
                        if merge == Merge::Inserted {
                            tracing::debug!(product_id = %product.id, "Adopted server cart row");
                        }
                    },
                    Ok(CartAddition::Inserted(row)) => state.insert_cart_item(row),
                    Err(error) => {
                        Self::record_failure(Operation::AddToCart, &error);
                        state.merge_cart_item(product, || env.new_cart_item_id());
                    },
                }
                SmallVec::new()
            },

            ShopAction::QuantityDecreased {
                product_id, result, ..
            } => {
                if let Err(error) = result {
                    Self::record_failure(Operation::DecreaseQuantity, &error);
                }
                match state.decrement_cart_item(product_id) {
                    Decrement::Missing => {
                        tracing::debug!(%product_id, "Row vanished before the decrease settled");
                    },
                    Decrement::Decremented { remaining } => {
                        tracing::debug!(%product_id, remaining, "Cart row decremented");
                    },
                    Decrement::Removed => {
                        tracing::debug!(%product_id, "Cart row removed at zero");
                    },
                }
                SmallVec::new()
            },

            ShopAction::RemovedFromCart { id, result, .. } => {
                match result {
                    Ok(()) => state.remove_cart_item(&id),
                    Err(error) => {
                        Self::record_failure(Operation::RemoveFromCart, &error);
                    },
                }
                SmallVec::new()
            },

            ShopAction::CartLoaded { result, .. } => {
                match result {
                    Ok(items) => {
                        tracing::info!(rows = items.len(), "Cart loaded");
                        state.set_cart(items);
                    },
                    Err(error) => {
                        Self::record_failure(Operation::LoadCart, &error);
                        state.set_cart(Vec::new());
                    },
                }
                SmallVec::new()
            },

            ShopAction::DecreaseSkipped { .. } => SmallVec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{ChannelCall, ScriptedChannel};
    use crate::types::{CartItem, Product, ProductId, RequestId};
    use cartsync_testing::{assertions, mocks::SequentialIdGenerator, ReducerTest};

    fn product(id: i64) -> Product {
        Product::new(ProductId::new(id), format!("product-{id}"), 4.0)
    }

    fn env_with(channel: ScriptedChannel) -> ShopEnvironment {
        ShopEnvironment::new(Arc::new(channel), Arc::new(SequentialIdGenerator::new()))
    }

    fn env() -> ShopEnvironment {
        env_with(ScriptedChannel::new())
    }

    fn down() -> ChannelError {
        ChannelError::Unavailable("down".to_string())
    }

    fn cart_with(product_id: i64, quantity: u32) -> ShopState {
        let mut state = ShopState::default();
        state.set_cart(vec![CartItem {
            id: CartItemId::new("row"),
            product: product(product_id),
            quantity,
        }]);
        state
    }

    async fn settle(effect: Effect<ShopAction>) -> Option<ShopAction> {
        match effect {
            Effect::Future(fut) => fut.await,
            Effect::None => None,
        }
    }

    #[test]
    fn requests_leave_state_untouched() {
        ReducerTest::new(ShopReducer::new(), env())
            .given_state(cart_with(1, 2))
            .when_action(ShopAction::AddToCart {
                request: RequestId::new(),
                product: product(1),
            })
            .then_state(|state| {
                assert_eq!(state.total_items_count(), 2);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_only_future_effects(effects);
            })
            .run();
    }

    #[test]
    fn failed_create_still_prepends() {
        ReducerTest::new(ShopReducer::new(), env())
            .given_state(ShopState::default())
            .when_action(ShopAction::ProductCreated {
                request: RequestId::new(),
                product: product(5),
                result: Err(down()),
            })
            .then_state(|state| {
                assert_eq!(state.products(), &[product(5)]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failed_removal_keeps_row() {
        ReducerTest::new(ShopReducer::new(), env())
            .given_state(cart_with(1, 1))
            .when_action(ShopAction::RemovedFromCart {
                request: RequestId::new(),
                id: CartItemId::new("row"),
                result: Err(down()),
            })
            .then_state(|state| {
                assert_eq!(state.cart().len(), 1);
                assert_eq!(state.total_items_count(), 1);
            })
            .run();
    }

    #[test]
    fn failed_cart_load_empties_cart() {
        ReducerTest::new(ShopReducer::new(), env())
            .given_state(cart_with(1, 3))
            .when_action(ShopAction::CartLoaded {
                request: RequestId::new(),
                result: Err(down()),
            })
            .then_state(|state| {
                assert!(state.cart().is_empty());
                assert_eq!(state.total_items_count(), 0);
            })
            .run();
    }

    #[test]
    fn failed_add_merges_locally() {
        ReducerTest::new(ShopReducer::new(), env())
            .given_state(cart_with(1, 1))
            .when_action(ShopAction::AddedToCart {
                request: RequestId::new(),
                product: product(1),
                result: Err(down()),
            })
            .then_state(|state| {
                assert_eq!(state.cart().len(), 1);
                assert_eq!(state.cart()[0].id, CartItemId::new("row"));
                assert_eq!(state.total_items_count(), 2);
            })
            .run();
    }

    #[test]
    fn new_row_from_server_keeps_server_id() {
        ReducerTest::new(ShopReducer::new(), env())
            .given_state(ShopState::default())
            .when_action(ShopAction::AddedToCart {
                request: RequestId::new(),
                product: product(1),
                result: Ok(CartAddition::Inserted(CartItem::new(
                    CartItemId::new("row-1"),
                    product(1),
                ))),
            })
            .then_state(|state| {
                assert_eq!(state.cart().len(), 1);
                assert_eq!(state.cart()[0].id, CartItemId::new("row-1"));
                assert_eq!(state.total_items_count(), 1);
            })
            .run();
    }

    #[test]
    fn failed_add_to_empty_cart_uses_generated_id() {
        ReducerTest::new(ShopReducer::new(), env())
            .given_state(ShopState::default())
            .when_action(ShopAction::AddedToCart {
                request: RequestId::new(),
                product: product(1),
                result: Err(down()),
            })
            .then_state(|state| {
                assert_eq!(
                    state.cart()[0].id.as_str(),
                    "00000000-0000-0000-0000-000000000001"
                );
            })
            .run();
    }

    #[test]
    fn failed_decrease_still_decrements() {
        ReducerTest::new(ShopReducer::new(), env())
            .given_state(cart_with(1, 1))
            .when_action(ShopAction::QuantityDecreased {
                request: RequestId::new(),
                product_id: ProductId::new(1),
                result: Err(down()),
            })
            .then_state(|state| {
                assert!(state.cart().is_empty());
                assert_eq!(state.total_items_count(), 0);
            })
            .run();
    }

    #[tokio::test]
    async fn decrease_without_row_never_calls_channel() {
        let channel = ScriptedChannel::new();
        let env = env_with(channel.clone());
        let mut state = ShopState::default();
        let request = RequestId::new();

        let mut effects = ShopReducer::new().reduce(
            &mut state,
            ShopAction::DecreaseQuantity {
                request,
                product: product(9),
            },
            &env,
        );

        let settled = settle(effects.remove(0)).await.unwrap();
        assert!(matches!(settled, ShopAction::DecreaseSkipped { .. }));
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_catalog_fetch_falls_back() {
        let channel = ScriptedChannel::new().with_fallback(vec![product(1000)]);
        channel.fail(Operation::LoadProducts);
        let env = env_with(channel.clone());
        let reducer = ShopReducer::new();
        let mut state = ShopState::default();
        let request = RequestId::new();

        let mut effects = reducer.reduce(&mut state, ShopAction::LoadProducts { request }, &env);
        let loaded = settle(effects.remove(0)).await.unwrap();

        let mut effects = reducer.reduce(&mut state, loaded, &env);
        assert!(state.products().is_empty());
        let fallback = settle(effects.remove(0)).await.unwrap();

        reducer.reduce(&mut state, fallback, &env);
        assert_eq!(state.products(), &[product(1000)]);
        assert_eq!(
            channel.calls(),
            vec![ChannelCall::FetchProducts, ChannelCall::FetchFallbackProducts]
        );
    }
}
