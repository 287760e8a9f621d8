//! # Cartsync Core
//!
//! Core traits and types for the cartsync state synchronization engine.
//!
//! This crate provides the abstractions every feature is written against:
//!
//! - **State**: The in-memory collections a feature owns
//! - **Action**: All possible inputs to a reducer (requests and settlements)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! Remote calls never run inside a reducer. A reducer returns an
//! [`Effect::Future`](effect::Effect::Future) describing the call, the runtime
//! executes it, and the settlement comes back as another action. That action is
//! the only place the store is allowed to change in response to the remote
//! side.
//!
//! ## Example
//!
//! ```ignore
//! use cartsync_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = CartEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CartState,
//!         action: CartAction,
//!         env: &CartEnvironment,
//!     ) -> SmallVec<[Effect<CartAction>; 4]> {
//!         // Business logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CartReducer {
    ///     type State = CartState;
    ///     type Action = CartAction;
    ///     type Environment = CartEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut CartState,
    ///         action: CartAction,
    ///         env: &CartEnvironment,
    ///     ) -> SmallVec<[Effect<CartAction>; 4]> {
    ///         match action {
    ///             CartAction::Clear => {
    ///                 state.clear();
    ///                 SmallVec::new()
    ///             }
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values, not execution.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// Resolves exactly once. If it yields `Some`, the action is fed back
        /// into the reducer.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation whose result is fed back as an action
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use uuid::Uuid;

    /// `IdGenerator` trait - abstracts identity generation for testability
    ///
    /// Only uniqueness within the process lifetime is required.
    ///
    /// # Examples
    ///
    /// ```
    /// use cartsync_core::environment::{IdGenerator, UuidGenerator};
    ///
    /// let ids = UuidGenerator;
    /// assert_ne!(ids.generate(), ids.generate());
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh identifier
        fn generate(&self) -> Uuid;
    }

    /// Random v4 UUIDs
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidGenerator;

    impl IdGenerator for UuidGenerator {
        fn generate(&self) -> Uuid {
            Uuid::new_v4()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{IdGenerator, UuidGenerator};
    use std::collections::HashSet;

    #[test]
    fn uuid_generator_does_not_repeat() {
        let ids = UuidGenerator;
        let generated: HashSet<_> = (0..100).map(|_| ids.generate()).collect();
        assert_eq!(generated.len(), 100);
    }

    #[test]
    fn effect_debug_hides_future() {
        let effect: Effect<u8> = Effect::future(async { Some(1) });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
        assert!(!effect.is_none());
        assert!(Effect::<u8>::None.is_none());
    }

    #[tokio::test]
    async fn future_effect_resolves_to_action() {
        let effect: Effect<u8> = Effect::future(async { Some(7) });
        let Effect::Future(fut) = effect else {
            unreachable!("constructed as a future");
        };
        assert_eq!(fut.await, Some(7));
    }
}
