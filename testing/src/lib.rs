//! # Cartsync Testing
//!
//! Testing utilities and helpers for cartsync reducers and stores.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use cartsync_testing::{ReducerTest, SequentialIdGenerator};
//!
//! ReducerTest::new(ShopReducer::new(), test_environment())
//!     .given_state(ShopState::default())
//!     .when_action(ShopAction::LoadCart { request })
//!     .then_effects(assertions::assert_only_future_effects)
//!     .run();
//! ```


pub use reducer_test::{ReducerTest, assertions};

/// Deterministic implementations of Environment traits
pub mod mocks {
    use cartsync_core::environment::IdGenerator;
    use std::sync::atomic::{AtomicU64, Ordering};
    use uuid::Uuid;

    /// Predictable identifiers for tests
    ///
    /// Yields `00000000-0000-0000-0000-000000000001`, then `...0002`, and so on.
    ///
    /// # Example
    ///
    /// ```
    /// use cartsync_core::environment::IdGenerator;
    /// use cartsync_testing::mocks::SequentialIdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.generate().as_u128(), 1);
    /// assert_eq!(ids.generate().as_u128(), 2);
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator starting at 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }

        /// How many identifiers have been handed out
        #[must_use]
        pub fn issued(&self) -> u64 {
            self.next.load(Ordering::SeqCst)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn generate(&self) -> Uuid {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            Uuid::from_u128(u128::from(n))
        }
    }
}

// Re-export commonly used items
pub use mocks::SequentialIdGenerator;

#[cfg(test)]
mod tests {
    use super::*;
    use cartsync_core::environment::IdGenerator;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        let first = ids.generate();
        let second = ids.generate();
        assert_ne!(first, second);
        assert_eq!(second.as_u128(), 2);
        assert_eq!(ids.issued(), 2);
    }
}
