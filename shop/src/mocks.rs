//! In-memory [`RemoteChannel`] for tests and demos.
//!
//! [`ScriptedChannel`] keeps a tiny server-side catalog and cart, records every
//! call it receives, and can be told to fail any operation on demand.

use crate::channel::{CartAddition, ChannelFuture, RemoteChannel};
use crate::error::ChannelError;
use crate::policy::Operation;
use crate::types::{CartItem, CartItemId, Product, ProductId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call received by [`ScriptedChannel`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelCall {
    /// `fetch_products`
    FetchProducts,
    /// `fetch_fallback_products`
    FetchFallbackProducts,
    /// `create_product`
    CreateProduct(ProductId),
    /// `patch_product`
    PatchProduct(ProductId),
    /// `delete_product`
    DeleteProduct(ProductId),
    /// `fetch_cart`
    FetchCart,
    /// `add_to_cart`
    AddToCart(ProductId),
    /// `reduce_quantity`
    ReduceQuantity(ProductId),
    /// `delete_cart_item`
    DeleteCartItem(CartItemId),
}

#[derive(Debug, Default)]
struct Server {
    products: Vec<Product>,
    fallback: Vec<Product>,
    cart: Vec<CartItem>,
    failing: HashSet<Operation>,
    fallback_failing: bool,
    calls: Vec<ChannelCall>,
    next_row: u64,
}

/// Scriptable in-memory server
///
/// Clones share the same server, so a test can keep one handle for scripting
/// and assertions while the store owns another.
#[derive(Clone, Debug, Default)]
pub struct ScriptedChannel {
    server: Arc<Mutex<Server>>,
}

impl ScriptedChannel {
    /// Creates an empty server with every operation succeeding
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the server catalog
    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products = products;
        self
    }

    /// Seeds the bundled catalog
    #[must_use]
    pub fn with_fallback(self, products: Vec<Product>) -> Self {
        self.lock().fallback = products;
        self
    }

    /// Seeds the server cart
    #[must_use]
    pub fn with_cart(self, cart: Vec<CartItem>) -> Self {
        self.lock().cart = cart;
        self
    }

    /// Makes every call belonging to `operation` fail from now on
    pub fn fail(&self, operation: Operation) {
        self.lock().failing.insert(operation);
    }

    /// Undoes [`fail`](Self::fail)
    pub fn recover(&self, operation: Operation) {
        self.lock().failing.remove(&operation);
    }

    /// Makes the bundled catalog unavailable too
    pub fn fail_fallback(&self) {
        self.lock().fallback_failing = true;
    }

    /// Every call received so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ChannelCall> {
        self.lock().calls.clone()
    }

    /// Current server-side cart
    #[must_use]
    pub fn server_cart(&self) -> Vec<CartItem> {
        self.lock().cart.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Server> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `call` and runs `respond` unless `operation` is scripted to fail
    fn handle<T, F>(&self, operation: Operation, call: ChannelCall, respond: F) -> ChannelFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Server) -> Result<T, ChannelError>,
    {
        let result = {
            let mut server = self.lock();
            server.calls.push(call);
            if server.failing.contains(&operation) {
                Err(ChannelError::Unavailable(format!("{operation} is scripted to fail")))
            } else {
                respond(&mut *server)
            }
        };
        Box::pin(async move { result })
    }
}

impl RemoteChannel for ScriptedChannel {
    fn fetch_products(&self) -> ChannelFuture<Vec<Product>> {
        self.handle(Operation::LoadProducts, ChannelCall::FetchProducts, |server| {
            Ok(server.products.clone())
        })
    }

    fn fetch_fallback_products(&self) -> ChannelFuture<Vec<Product>> {
        let result = {
            let mut server = self.lock();
            server.calls.push(ChannelCall::FetchFallbackProducts);
            if server.fallback_failing {
                Err(ChannelError::Unavailable("bundled catalog missing".to_string()))
            } else {
                Ok(server.fallback.clone())
            }
        };
        Box::pin(async move { result })
    }

    fn create_product(&self, product: Product) -> ChannelFuture<ProductId> {
        self.handle(
            Operation::CreateProduct,
            ChannelCall::CreateProduct(product.id),
            move |server| {
                let id = product.id;
                server.products.insert(0, product);
                Ok(id)
            },
        )
    }

    fn patch_product(&self, id: ProductId, product: Product) -> ChannelFuture<()> {
        self.handle(
            Operation::UpdateProduct,
            ChannelCall::PatchProduct(id),
            move |server| {
                let slot = server
                    .products
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| ChannelError::Status {
                        status: 404,
                        message: format!("product {id} not found"),
                    })?;
                *slot = product;
                Ok(())
            },
        )
    }

    fn delete_product(&self, id: ProductId) -> ChannelFuture<()> {
        self.handle(
            Operation::DeleteProduct,
            ChannelCall::DeleteProduct(id),
            move |server| {
                server.products.retain(|p| p.id != id);
                Ok(())
            },
        )
    }

    fn fetch_cart(&self) -> ChannelFuture<Vec<CartItem>> {
        self.handle(Operation::LoadCart, ChannelCall::FetchCart, |server| {
            Ok(server.cart.clone())
        })
    }

    fn add_to_cart(&self, product_id: ProductId) -> ChannelFuture<CartAddition> {
        self.handle(
            Operation::AddToCart,
            ChannelCall::AddToCart(product_id),
            move |server| {
                if let Some(row) = server
                    .cart
                    .iter_mut()
                    .find(|row| row.product_id() == product_id)
                {
                    row.quantity += 1;
                    return Ok(CartAddition::Incremented(row.clone()));
                }

                let product = server
                    .products
                    .iter()
                    .find(|p| p.id == product_id)
                    .cloned()
                    .unwrap_or_else(|| Product::new(product_id, String::new(), 0.0));
                server.next_row += 1;
                let id = CartItemId::new(format!("server-{}", server.next_row));
                let row = CartItem::new(id, product);
                server.cart.push(row.clone());
                Ok(CartAddition::Inserted(row))
            },
        )
    }

    fn reduce_quantity(&self, product_id: ProductId) -> ChannelFuture<()> {
        self.handle(
            Operation::DecreaseQuantity,
            ChannelCall::ReduceQuantity(product_id),
            move |server| {
                if let Some(index) = server
                    .cart
                    .iter()
                    .position(|row| row.product_id() == product_id)
                {
                    if server.cart[index].quantity <= 1 {
                        server.cart.remove(index);
                    } else {
                        server.cart[index].quantity -= 1;
                    }
                }
                Ok(())
            },
        )
    }

    fn delete_cart_item(&self, id: CartItemId) -> ChannelFuture<()> {
        self.handle(
            Operation::RemoveFromCart,
            ChannelCall::DeleteCartItem(id.clone()),
            move |server| {
                let index = server
                    .cart
                    .iter()
                    .position(|row| row.id == id)
                    .ok_or_else(|| ChannelError::Status {
                        status: 404,
                        message: format!("cart row {id} not found"),
                    })?;
                server.cart.remove(index);
                Ok(())
            },
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_reports_existing_row_on_second_call() {
        let channel = ScriptedChannel::new()
            .with_products(vec![Product::new(ProductId::new(1), "Mug", 3.0)]);

        let first = channel.add_to_cart(ProductId::new(1)).await.unwrap();
        assert_eq!(first.row().id, CartItemId::new("server-1"));
        assert!(matches!(first, CartAddition::Inserted(_)));

        let second = channel.add_to_cart(ProductId::new(1)).await.unwrap();
        assert!(matches!(second, CartAddition::Incremented(ref row) if row.quantity == 2));
        assert_eq!(channel.server_cart().len(), 1);
    }

    #[tokio::test]
    async fn deleting_an_unknown_row_is_not_found() {
        let channel = ScriptedChannel::new()
            .with_products(vec![Product::new(ProductId::new(1), "Mug", 3.0)]);
        channel.add_to_cart(ProductId::new(1)).await.unwrap();

        let err = channel
            .delete_cart_item(CartItemId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Status { status: 404, .. }));
        assert_eq!(channel.server_cart().len(), 1);

        channel
            .delete_cart_item(CartItemId::new("server-1"))
            .await
            .unwrap();
        assert!(channel.server_cart().is_empty());
    }

    #[tokio::test]
    async fn scripted_failure_is_recorded_and_recoverable() {
        let channel = ScriptedChannel::new();
        channel.fail(Operation::LoadCart);
        assert!(channel.fetch_cart().await.is_err());

        channel.recover(Operation::LoadCart);
        assert!(channel.fetch_cart().await.unwrap().is_empty());
        assert_eq!(
            channel.calls(),
            vec![ChannelCall::FetchCart, ChannelCall::FetchCart]
        );
    }
}
