//! Shop demo binary
//!
//! Loads the catalog and cart from the configured service, adds the first
//! product to the cart, and prints what the store ends up holding. With no
//! service running every call degrades according to its failure policy.

use cartsync_shop::{HttpChannel, ShopConfig, ShopService};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cartsync_shop=info,cartsync_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ShopConfig::from_env()?;
    tracing::info!(api = %config.api_base_url, "Starting shop demo");

    let channel = HttpChannel::from_config(&config)?;
    let shop = ShopService::from_config(&config, Arc::new(channel));

    let settlement = shop.load_products().await?;
    println!("Catalog loaded ({settlement:?}):");
    for product in shop.products().await {
        println!("  #{:<6} {:<24} {:>8.2}", product.id.get(), product.name, product.price);
    }

    let settlement = shop.load_cart().await?;
    println!("\nCart loaded ({settlement:?}), {} item(s)", shop.total_items_count().await);

    if let Some(product) = shop.products().await.into_iter().next() {
        let settlement = shop.add_to_cart(product.clone()).await?;
        println!("\nAdded {} ({settlement:?})", product.name);
    }

    for item in shop.cart().await {
        println!(
            "  {} x{} = {:.2}",
            item.product.name,
            item.quantity,
            item.line_total()
        );
    }
    println!(
        "Total: {} item(s), {:.2}",
        shop.total_items_count().await,
        shop.total_price().await
    );

    shop.shutdown(None).await?;
    Ok(())
}
