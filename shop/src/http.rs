//! HTTP implementation of [`RemoteChannel`].

use crate::channel::{BundledCatalog, CartAddition, ChannelFuture, RemoteChannel};
use crate::config::ShopConfig;
use crate::error::ChannelError;
use crate::types::{CartItem, CartItemId, Product, ProductId};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Talks to the product and cart REST resources
///
/// Routes, relative to the base url:
///
/// | Call | Route |
/// |---|---|
/// | fetch products | `GET /products` |
/// | create product | `POST /products` |
/// | patch product | `PATCH /products/{id}` |
/// | delete product | `DELETE /products/{id}` |
/// | fetch cart | `GET /cart` |
/// | add to cart | `POST /cart/add?productId={id}` |
/// | reduce quantity | `PATCH /cart/reduce-product-quantity?productId={id}` |
/// | delete cart row | `DELETE /cart/remove/{id}` |
///
/// The fallback catalog is the bundled one and never touches the network.
#[derive(Clone, Debug)]
pub struct HttpChannel {
    client: Client,
    base_url: String,
}

impl HttpChannel {
    /// Creates a channel with a default client
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a channel with a caller-provided client
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Creates a channel from configuration, applying its request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Unavailable`] if the HTTP client cannot be built.
    pub fn from_config(config: &ShopConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ChannelError::Unavailable(e.to_string()))?;
        Ok(Self::with_client(client, config.api_base_url.clone()))
    }

    /// Base url every route is resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

async fn check(response: Response) -> Result<Response, ChannelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ChannelError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ChannelError> {
    check(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ChannelError::Decode(e.to_string()))
}

impl RemoteChannel for HttpChannel {
    fn fetch_products(&self) -> ChannelFuture<Vec<Product>> {
        let request = self.client.get(self.url("products"));
        Box::pin(async move { decode(request.send().await?).await })
    }

    fn fetch_fallback_products(&self) -> ChannelFuture<Vec<Product>> {
        Box::pin(async { BundledCatalog::products() })
    }

    fn create_product(&self, product: Product) -> ChannelFuture<ProductId> {
        let request = self.client.post(self.url("products")).json(&product);
        Box::pin(async move {
            let created: Product = decode(request.send().await?).await?;
            Ok(created.id)
        })
    }

    fn patch_product(&self, id: ProductId, product: Product) -> ChannelFuture<()> {
        let request = self
            .client
            .patch(self.url(&format!("products/{id}")))
            .json(&product);
        Box::pin(async move {
            check(request.send().await?).await?;
            Ok(())
        })
    }

    fn delete_product(&self, id: ProductId) -> ChannelFuture<()> {
        let request = self.client.delete(self.url(&format!("products/{id}")));
        Box::pin(async move {
            check(request.send().await?).await?;
            Ok(())
        })
    }

    fn fetch_cart(&self) -> ChannelFuture<Vec<CartItem>> {
        let request = self.client.get(self.url("cart"));
        Box::pin(async move { decode(request.send().await?).await })
    }

    fn add_to_cart(&self, product_id: ProductId) -> ChannelFuture<CartAddition> {
        let request = self
            .client
            .post(self.url(&format!("cart/add?productId={product_id}")));
        Box::pin(async move {
            let row: CartItem = decode(request.send().await?).await?;
            // The server answers with the row after the add; a single unit
            // means the row was just created.
            Ok(if row.quantity > 1 {
                CartAddition::Incremented(row)
            } else {
                CartAddition::Inserted(row)
            })
        })
    }

    fn reduce_quantity(&self, product_id: ProductId) -> ChannelFuture<()> {
        let request = self.client.patch(self.url(&format!(
            "cart/reduce-product-quantity?productId={product_id}"
        )));
        Box::pin(async move {
            check(request.send().await?).await?;
            Ok(())
        })
    }

    fn delete_cart_item(&self, id: CartItemId) -> ChannelFuture<()> {
        let request = self.client.delete(self.url(&format!("cart/remove/{id}")));
        Box::pin(async move {
            check(request.send().await?).await?;
            Ok(())
        })
    }
}
