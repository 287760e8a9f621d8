//! Actions processed by [`ShopReducer`](crate::ShopReducer).
//!
//! Request actions come from callers and only start remote calls. Settlement
//! actions come back from those calls and are the only ones that change
//! state. Every action carries the [`RequestId`] of the operation it belongs
//! to.

use crate::error::ChannelError;
use crate::policy::{Operation, Settlement};
use crate::channel::CartAddition;
use crate::types::{CartItem, CartItemId, Product, ProductId, RequestId};

/// Shop actions
///
/// Outside this crate only the request variants can be built:
///
/// ```compile_fail
/// use cartsync_shop::{RequestId, ShopAction};
///
/// let forged = ShopAction::CartLoaded {
///     request: RequestId::new(),
///     result: Ok(vec![]),
/// };
/// ```
#[derive(Clone, Debug)]
pub enum ShopAction {
    // Requests
    /// Reload the product catalog
    LoadProducts {
        /// Correlation id
        request: RequestId,
    },
    /// Create a product
    CreateProduct {
        /// Correlation id
        request: RequestId,
        /// Product as the caller built it
        product: Product,
    },
    /// Patch a product
    UpdateProduct {
        /// Correlation id
        request: RequestId,
        /// Full replacement
        product: Product,
    },
    /// Delete a product
    DeleteProduct {
        /// Correlation id
        request: RequestId,
        /// Product to delete
        id: ProductId,
    },
    /// Add one unit of a product to the cart
    AddToCart {
        /// Correlation id
        request: RequestId,
        /// Product to add
        product: Product,
    },
    /// Remove one unit of a product from the cart
    DecreaseQuantity {
        /// Correlation id
        request: RequestId,
        /// Product to take out
        product: Product,
    },
    /// Drop a whole cart row
    RemoveFromCart {
        /// Correlation id
        request: RequestId,
        /// Row to drop
        id: CartItemId,
    },
    /// Reload the cart
    LoadCart {
        /// Correlation id
        request: RequestId,
    },

    // Settlements, only constructible inside this crate
    /// Catalog fetch settled
    #[non_exhaustive]
    ProductsLoaded {
        /// Correlation id
        request: RequestId,
        /// Fetched catalog
        result: Result<Vec<Product>, ChannelError>,
    },
    /// Bundled catalog fetch settled
    #[non_exhaustive]
    FallbackProductsLoaded {
        /// Correlation id
        request: RequestId,
        /// Baseline catalog
        result: Result<Vec<Product>, ChannelError>,
    },
    /// Product creation settled
    #[non_exhaustive]
    ProductCreated {
        /// Correlation id
        request: RequestId,
        /// Product as submitted
        product: Product,
        /// Id assigned by the server
        result: Result<ProductId, ChannelError>,
    },
    /// Product patch settled
    #[non_exhaustive]
    ProductUpdated {
        /// Correlation id
        request: RequestId,
        /// Product as submitted
        product: Product,
        /// Remote outcome
        result: Result<(), ChannelError>,
    },
    /// Product deletion settled
    #[non_exhaustive]
    ProductDeleted {
        /// Correlation id
        request: RequestId,
        /// Deleted product
        id: ProductId,
        /// Remote outcome
        result: Result<(), ChannelError>,
    },
    /// Cart add settled
    #[non_exhaustive]
    AddedToCart {
        /// Correlation id
        request: RequestId,
        /// Product that was added
        product: Product,
        /// Server row after the add
        result: Result<CartAddition, ChannelError>,
    },
    /// Quantity reduction settled
    #[non_exhaustive]
    QuantityDecreased {
        /// Correlation id
        request: RequestId,
        /// Product that was reduced
        product_id: ProductId,
        /// Remote outcome
        result: Result<(), ChannelError>,
    },
    /// Quantity reduction skipped because no row references the product
    #[non_exhaustive]
    DecreaseSkipped {
        /// Correlation id
        request: RequestId,
        /// Product that had no row
        product_id: ProductId,
    },
    /// Cart row deletion settled
    #[non_exhaustive]
    RemovedFromCart {
        /// Correlation id
        request: RequestId,
        /// Row that was deleted
        id: CartItemId,
        /// Remote outcome
        result: Result<(), ChannelError>,
    },
    /// Cart fetch settled
    #[non_exhaustive]
    CartLoaded {
        /// Correlation id
        request: RequestId,
        /// Fetched cart
        result: Result<Vec<CartItem>, ChannelError>,
    },
}

impl ShopAction {
    /// Correlation id of the operation this action belongs to
    #[must_use]
    pub const fn request(&self) -> RequestId {
        match self {
            Self::LoadProducts { request }
            | Self::CreateProduct { request, .. }
            | Self::UpdateProduct { request, .. }
            | Self::DeleteProduct { request, .. }
            | Self::AddToCart { request, .. }
            | Self::DecreaseQuantity { request, .. }
            | Self::RemoveFromCart { request, .. }
            | Self::LoadCart { request }
            | Self::ProductsLoaded { request, .. }
            | Self::FallbackProductsLoaded { request, .. }
            | Self::ProductCreated { request, .. }
            | Self::ProductUpdated { request, .. }
            | Self::ProductDeleted { request, .. }
            | Self::AddedToCart { request, .. }
            | Self::QuantityDecreased { request, .. }
            | Self::DecreaseSkipped { request, .. }
            | Self::RemovedFromCart { request, .. }
            | Self::CartLoaded { request, .. } => *request,
        }
    }

    /// Operation this action belongs to
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::LoadProducts { .. }
            | Self::ProductsLoaded { .. }
            | Self::FallbackProductsLoaded { .. } => Operation::LoadProducts,
            Self::CreateProduct { .. } | Self::ProductCreated { .. } => Operation::CreateProduct,
            Self::UpdateProduct { .. } | Self::ProductUpdated { .. } => Operation::UpdateProduct,
            Self::DeleteProduct { .. } | Self::ProductDeleted { .. } => Operation::DeleteProduct,
            Self::AddToCart { .. } | Self::AddedToCart { .. } => Operation::AddToCart,
            Self::DecreaseQuantity { .. }
            | Self::QuantityDecreased { .. }
            | Self::DecreaseSkipped { .. } => Operation::DecreaseQuantity,
            Self::RemoveFromCart { .. } | Self::RemovedFromCart { .. } => {
                Operation::RemoveFromCart
            },
            Self::LoadCart { .. } | Self::CartLoaded { .. } => Operation::LoadCart,
        }
    }

    /// The final outcome carried by this action, if it ends its operation
    ///
    /// Requests return `None`. So does a failed catalog fetch, because the
    /// bundled catalog is still to come.
    #[must_use]
    pub fn settlement(&self) -> Option<(RequestId, Settlement)> {
        let policy = self.operation().on_failure();
        let outcome = |ok: bool| {
            if ok {
                Settlement::Confirmed
            } else {
                Settlement::after_failure(policy)
            }
        };

        let settlement = match self {
            Self::ProductsLoaded { result, .. } => {
                if result.is_err() {
                    return None;
                }
                Settlement::Confirmed
            },
            Self::FallbackProductsLoaded { result, .. } => {
                if result.is_ok() {
                    Settlement::Degraded
                } else {
                    Settlement::Rejected
                }
            },
            Self::ProductCreated { result, .. } => outcome(result.is_ok()),
            Self::ProductUpdated { result, .. }
            | Self::ProductDeleted { result, .. }
            | Self::QuantityDecreased { result, .. }
            | Self::RemovedFromCart { result, .. } => outcome(result.is_ok()),
            Self::AddedToCart { result, .. } => outcome(result.is_ok()),
            Self::CartLoaded { result, .. } => outcome(result.is_ok()),
            Self::DecreaseSkipped { .. } => Settlement::Rejected,
            _ => return None,
        };
        Some((self.request(), settlement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ChannelError {
        ChannelError::Unavailable("down".to_string())
    }

    #[test]
    fn requests_do_not_settle() {
        let action = ShopAction::LoadCart {
            request: RequestId::new(),
        };
        assert!(action.settlement().is_none());
        assert_eq!(action.operation(), Operation::LoadCart);
    }

    #[test]
    fn failed_catalog_fetch_is_not_final() {
        let request = RequestId::new();
        let failed = ShopAction::ProductsLoaded {
            request,
            result: Err(failure()),
        };
        assert!(failed.settlement().is_none());

        let fallback = ShopAction::FallbackProductsLoaded {
            request,
            result: Ok(vec![]),
        };
        assert_eq!(fallback.settlement(), Some((request, Settlement::Degraded)));
    }

    #[test]
    fn failures_follow_operation_policy() {
        let request = RequestId::new();
        let removed = ShopAction::RemovedFromCart {
            request,
            id: CartItemId::new("a"),
            result: Err(failure()),
        };
        assert_eq!(removed.settlement(), Some((request, Settlement::Rejected)));

        let deleted = ShopAction::ProductDeleted {
            request,
            id: ProductId::new(1),
            result: Err(failure()),
        };
        assert_eq!(deleted.settlement(), Some((request, Settlement::Degraded)));

        let loaded = ShopAction::CartLoaded {
            request,
            result: Err(failure()),
        };
        assert_eq!(loaded.settlement(), Some((request, Settlement::Degraded)));
    }

    #[test]
    fn skipped_decrease_is_rejected() {
        let request = RequestId::new();
        let skipped = ShopAction::DecreaseSkipped {
            request,
            product_id: ProductId::new(3),
        };
        assert_eq!(skipped.settlement(), Some((request, Settlement::Rejected)));
    }
}
