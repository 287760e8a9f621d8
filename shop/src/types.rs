//! Domain types for the shop.
//!
//! Products are identified by a server-assigned numeric id. Cart items carry a
//! copy of the product they reference and a strictly positive quantity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Server-assigned product identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stock level shown next to a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryStatus {
    /// Plenty left
    InStock,
    /// Running out
    LowStock,
    /// Nothing left
    OutOfStock,
}

/// A catalog product
///
/// Everything except `id` and `price` is display data that the engine never
/// inspects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identity, compared by equality
    pub id: ProductId,
    /// Catalog code
    #[serde(default)]
    pub code: String,
    /// Display name
    pub name: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Image reference
    #[serde(default)]
    pub image: String,
    /// Category label
    #[serde(default)]
    pub category: String,
    /// Unit price, never negative
    ///
    /// Negative values are clamped when deserializing and when the product
    /// enters the store.
    #[serde(deserialize_with = "non_negative_price")]
    pub price: f64,
    /// Units in stock
    #[serde(default)]
    pub quantity: u32,
    /// Internal reference code
    #[serde(default)]
    pub internal_reference: Option<String>,
    /// Shelf identifier
    #[serde(default)]
    pub shell_id: Option<i64>,
    /// Stock level
    #[serde(default)]
    pub inventory_status: Option<InventoryStatus>,
    /// Average rating
    #[serde(default)]
    pub rating: Option<f64>,
    /// Creation time on the server
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time on the server
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(|price| price.max(0.0))
}

impl Product {
    /// Creates a product with only the fields the engine cares about
    ///
    /// Negative prices are clamped to zero.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            code: String::new(),
            name: name.into(),
            description: String::new(),
            image: String::new(),
            category: String::new(),
            price: price.max(0.0),
            quantity: 0,
            internal_reference: None,
            shell_id: None,
            inventory_status: None,
            rating: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// The same product with a negative price clamped to zero
    #[must_use]
    pub(crate) fn normalized(mut self) -> Self {
        self.price = self.price.max(0.0);
        self
    }

    /// Sets the category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the stock level
    #[must_use]
    pub fn with_inventory_status(mut self, status: InventoryStatus) -> Self {
        self.inventory_status = Some(status);
        self
    }
}

/// Cart item identity
///
/// Either issued by the server or generated locally from a UUID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(String);

impl CartItemId {
    /// Wraps a raw id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for CartItemId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for CartItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cart row
///
/// `quantity` is at least 1 for as long as the row exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Row identity
    pub id: CartItemId,
    /// The product this row is for
    pub product: Product,
    /// Units in the cart
    pub quantity: u32,
}

impl CartItem {
    /// Creates a row holding a single unit
    #[must_use]
    pub const fn new(id: CartItemId, product: Product) -> Self {
        Self {
            id,
            product,
            quantity: 1,
        }
    }

    /// Identity of the referenced product
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// `price × quantity`
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Correlates an operation with its settlement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn product_deserializes_from_camel_case() {
        let json = r#"{
            "id": 1000,
            "code": "f230fh0g3",
            "name": "Bamboo Watch",
            "description": "Product Description",
            "image": "bamboo-watch.jpg",
            "category": "Accessories",
            "price": 65,
            "quantity": 24,
            "internalReference": "REF-123-456",
            "shellId": 15,
            "inventoryStatus": "INSTOCK",
            "rating": 5,
            "createdAt": "2024-01-01T10:00:00Z"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1000));
        assert_eq!(product.internal_reference.as_deref(), Some("REF-123-456"));
        assert_eq!(product.inventory_status, Some(InventoryStatus::InStock));
        assert!(product.updated_at.is_none());
        assert!((product.price - 65.0).abs() < f64::EPSILON);
    }

    #[test]
    fn product_tolerates_missing_display_fields() {
        let product: Product =
            serde_json::from_str(r#"{"id": 3, "name": "Plain", "price": 1.5}"#).unwrap();
        assert_eq!(product, Product::new(ProductId::new(3), "Plain", 1.5));
    }

    #[test]
    fn negative_price_is_clamped() {
        let product = Product::new(ProductId::new(1), "Refund", -4.0);
        assert!(product.price.abs() < f64::EPSILON);
    }

    #[test]
    fn negative_price_in_payload_is_clamped() {
        let product: Product =
            serde_json::from_str(r#"{"id": 9, "name": "Refund", "price": -12.5}"#).unwrap();
        assert!(product.price.abs() < f64::EPSILON);

        let row: CartItem = serde_json::from_str(
            r#"{"id": "r", "product": {"id": 9, "name": "Refund", "price": -1}, "quantity": 2}"#,
        )
        .unwrap();
        assert!(row.line_total().abs() < f64::EPSILON);
    }

    #[test]
    fn cart_item_line_total() {
        let mut item = CartItem::new(
            CartItemId::new("row-1"),
            Product::new(ProductId::new(1), "Mug", 2.5),
        );
        item.quantity = 4;
        assert!((item.line_total() - 10.0).abs() < f64::EPSILON);
        assert_eq!(item.product_id(), ProductId::new(1));
    }

    #[test]
    fn cart_item_id_from_uuid() {
        let id = CartItemId::from(Uuid::from_u128(1));
        assert_eq!(id.as_str(), "00000000-0000-0000-0000-000000000001");
    }
}
