//! Per-operation failure policy.
//!
//! Each operation decides on its own what happens to local state when its
//! remote call fails. The table is deliberately asymmetric: writes that only
//! add information are applied anyway, a cart removal is suppressed, and
//! loads degrade to a fixed baseline instead of inventing data.

use std::fmt;

/// Externally visible operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Reload the product catalog
    LoadProducts,
    /// Create a product
    CreateProduct,
    /// Patch a product
    UpdateProduct,
    /// Delete a product
    DeleteProduct,
    /// Add one unit of a product to the cart
    AddToCart,
    /// Remove one unit of a product from the cart
    DecreaseQuantity,
    /// Drop a whole cart row
    RemoveFromCart,
    /// Reload the cart
    LoadCart,
}

impl Operation {
    /// Every operation, in declaration order
    pub const ALL: [Self; 8] = [
        Self::LoadProducts,
        Self::CreateProduct,
        Self::UpdateProduct,
        Self::DeleteProduct,
        Self::AddToCart,
        Self::DecreaseQuantity,
        Self::RemoveFromCart,
        Self::LoadCart,
    ];

    /// Stable name used in logs and metric labels
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LoadProducts => "load_products",
            Self::CreateProduct => "create_product",
            Self::UpdateProduct => "update_product",
            Self::DeleteProduct => "delete_product",
            Self::AddToCart => "add_to_cart",
            Self::DecreaseQuantity => "decrease_quantity",
            Self::RemoveFromCart => "remove_from_cart",
            Self::LoadCart => "load_cart",
        }
    }

    /// What to do locally when this operation's remote call fails
    #[must_use]
    pub const fn on_failure(self) -> FailurePolicy {
        match self {
            Self::LoadProducts => FailurePolicy::Baseline,
            Self::CreateProduct
            | Self::UpdateProduct
            | Self::DeleteProduct
            | Self::DecreaseQuantity => FailurePolicy::FailOpen,
            Self::AddToCart => FailurePolicy::LocalMerge,
            Self::RemoveFromCart => FailurePolicy::FailClosed,
            Self::LoadCart => FailurePolicy::Empty,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Local reaction to a channel failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Apply the attempted mutation anyway
    FailOpen,
    /// Re-derive the mutation from local state
    LocalMerge,
    /// Leave local state untouched
    FailClosed,
    /// Replace the collection with the bundled baseline
    Baseline,
    /// Replace the collection with nothing
    Empty,
}

impl FailurePolicy {
    /// Stable name used in logs and metric labels
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FailOpen => "fail_open",
            Self::LocalMerge => "local_merge",
            Self::FailClosed => "fail_closed",
            Self::Baseline => "baseline",
            Self::Empty => "empty",
        }
    }

    /// Whether local state changes after a failure
    #[must_use]
    pub const fn applies_locally(self) -> bool {
        !matches!(self, Self::FailClosed)
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one operation, reported once its store change is visible
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Settlement {
    /// The remote call succeeded and its result was applied
    Confirmed,
    /// The remote call failed and the fallback was applied locally
    Degraded,
    /// Nothing was applied
    Rejected,
}

impl Settlement {
    /// Settlement for a failed remote call under `policy`
    #[must_use]
    pub const fn after_failure(policy: FailurePolicy) -> Self {
        if policy.applies_locally() {
            Self::Degraded
        } else {
            Self::Rejected
        }
    }

    /// Whether local state reflects the operation
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Confirmed | Self::Degraded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cart_removal_is_fail_closed() {
        let closed: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| !op.on_failure().applies_locally())
            .collect();
        assert_eq!(closed, vec![Operation::RemoveFromCart]);
    }

    #[test]
    fn loads_degrade_to_baselines() {
        assert_eq!(Operation::LoadProducts.on_failure(), FailurePolicy::Baseline);
        assert_eq!(Operation::LoadCart.on_failure(), FailurePolicy::Empty);
        assert_eq!(Operation::AddToCart.on_failure(), FailurePolicy::LocalMerge);
    }

    #[test]
    fn settlement_after_failure() {
        assert_eq!(
            Settlement::after_failure(FailurePolicy::FailOpen),
            Settlement::Degraded
        );
        assert_eq!(
            Settlement::after_failure(FailurePolicy::FailClosed),
            Settlement::Rejected
        );
        assert!(Settlement::Degraded.is_applied());
        assert!(!Settlement::Rejected.is_applied());
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Operation::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Operation::ALL.len());
        assert_eq!(Operation::DecreaseQuantity.to_string(), "decrease_quantity");
    }
}
