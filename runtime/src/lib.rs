//! # Cartsync Runtime
//!
//! Runtime implementation for the cartsync state synchronization engine.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect settlement.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state, runs the reducer, executes effects
//! - **Effect Executor**: Runs effect descriptions and feeds their settlement back to the reducer
//! - **Action Broadcast**: Notifies observers after a settlement has been applied
//!
//! ## Example
//!
//! ```ignore
//! use cartsync_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use cartsync_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned when `send()` is called after shutdown was initiated.
        /// Settlements of effects already in flight are still applied.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` and `EffectHandle::wait_with_timeout`.
        #[error("Timeout waiting for action")]
        Timeout,

        /// The store went away before a waited-for action settled
        #[error("Store closed before the action settled")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use cartsync_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(10));
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of settled actions buffered for slow observers
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting until every effect spawned
/// by that action has settled and its feedback action has been reduced.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The settlement of Action::Start is now visible in the state
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle with its internal tracking half
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Whether every tracked effect has settled
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.effects.load(Ordering::SeqCst) == 0
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// The counter is updated even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution and effect settlement.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, Ordering, Reducer, RwLock, StoreConfig, StoreError,
    };
    use std::sync::{Mutex, PoisonError};
    use tokio::sync::{broadcast, oneshot};

    /// A caller of `send_and_wait_for` still waiting for its action
    struct Waiter<A> {
        matches: Box<dyn Fn(&A) -> bool + Send + Sync>,
        reply: oneshot::Sender<A>,
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, the reducer is its only writer)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Every action is reduced while holding the write lock, so readers never
    /// see a partially applied mutation.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        config: StoreConfig,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Settled actions, broadcast after the reducer applied them.
        action_broadcast: broadcast::Sender<A>,
        /// Pending `send_and_wait_for` callers. Unlike the broadcast this never drops.
        waiters: Arc<Mutex<Vec<Waiter<A>>>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        ///
        /// # Example
        ///
        /// ```ignore
        /// let config = StoreConfig::default().with_broadcast_capacity(256);
        /// let store = Store::with_config(MyState::default(), MyReducer, env, config);
        /// ```
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
                waiters: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Number of effects currently in flight
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Waits for pending effects to settle (with timeout)
        ///
        /// Effects already in flight are never cancelled; their settlements are
        /// still reduced while the store drains.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects settled, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running",
                        pending
                    );
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(
                    pending_effects = pending,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Waiting for effects to settle"
                );

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Spawns the returned effects
        /// 4. Effect results are reduced in turn (feedback loop)
        ///
        /// `send()` returns after the reducer ran and effects were started, not
        /// after they settled. Wait on the returned [`EffectHandle`] for that.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            Ok(self.dispatch(action).await)
        }

        /// Send an action and wait for a matching settled action
        ///
        /// The waiter is registered before sending and is handed the first
        /// matching feedback action directly, so it cannot be missed however
        /// far broadcast subscribers fall behind. When this returns, the
        /// matching action has already been applied to the state.
        ///
        /// With `timeout: None` the wait is unbounded; it resolves only when a
        /// matching action is settled.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before a matching action was received
        /// - [`StoreError::ChannelClosed`]: The store was dropped while waiting
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Option<Duration>,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool + Send + Sync + 'static,
        {
            let (reply, settled) = oneshot::channel();
            self.lock_waiters().push(Waiter {
                matches: Box::new(predicate),
                reply,
            });

            // A rejected send drops `settled`; the waiter is pruned on the next settlement
            self.send(action).await?;

            let matching = async move { settled.await.map_err(|_| StoreError::ChannelClosed) };

            match timeout {
                Some(timeout) => tokio::time::timeout(timeout, matching)
                    .await
                    .map_err(|_| StoreError::Timeout)?,
                None => matching.await,
            }
        }

        fn lock_waiters(&self) -> std::sync::MutexGuard<'_, Vec<Waiter<A>>> {
            self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Hands a settled action to every waiter it matches
        ///
        /// Waiters whose caller gave up are dropped on the way.
        fn resolve_waiters(&self, action: &A) {
            let mut waiters = self.lock_waiters();
            let mut index = 0;
            while index < waiters.len() {
                if waiters[index].reply.is_closed() {
                    waiters.swap_remove(index);
                } else if (waiters[index].matches)(action) {
                    let waiter = waiters.swap_remove(index);
                    let _ = waiter.reply.send(action.clone());
                } else {
                    index += 1;
                }
            }
        }

        /// Subscribe to settled actions
        ///
        /// Every action produced by an effect is broadcast once the reducer has
        /// applied it, so a receiver that reads state after `recv()` sees the
        /// post-settlement state. Actions passed to `send` directly are not
        /// broadcast.
        ///
        /// A receiver more than `broadcast_capacity` actions behind skips the
        /// oldest ones (`RecvError::Lagged`). Use
        /// [`send_and_wait_for`](Self::send_and_wait_for) to wait on a specific settlement.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let item_count = store.state(|s| s.cart().len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Reduce an action and start its effects
        ///
        /// Shared by `send` and effect feedback. Feedback skips the shutdown
        /// check so in-flight settlements are always applied.
        async fn dispatch(&self, action: A) -> EffectHandle
        where
            R: Clone,
            E: Clone,
        {
            tracing::debug!("Processing action");
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }

            handle
        }

        /// Execute an effect with tracking
        ///
        /// - `None`: No-op
        /// - `Future`: Spawned; a resulting action is reduced and then broadcast
        ///
        /// Reducer panics propagate. A panicking effect task is dropped; the
        /// [`DecrementGuard`] keeps the counters correct.
        #[allow(clippy::needless_pass_by_value)] // tracking is moved into the spawned task
        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    // Track global pending effects for shutdown
                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking);
                        let _pending_guard = pending_guard;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future settled, reducing feedback action");
                            let _ = store.dispatch(action.clone()).await;

                            // Waiters and observers only ever see actions whose mutation is visible
                            store.resolve_waiters(&action);
                            let _ = store.action_broadcast.send(action);
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                config: self.config.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
                waiters: Arc::clone(&self.waiters),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cartsync_core::{SmallVec, smallvec};

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TestAction {
        Increment,
        NoOp,
        ProduceEffect,
        ProduceSilentEffect,
        ProduceSlowEffect(u64),
        Ping(u32),
        Pong(u32),
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::NoOp => smallvec![Effect::None],
                TestAction::ProduceEffect => {
                    smallvec![Effect::future(async { Some(TestAction::Increment) })]
                },
                TestAction::ProduceSilentEffect => smallvec![Effect::future(async { None })],
                TestAction::ProduceSlowEffect(millis) => {
                    smallvec![Effect::future(async move {
                        tokio::time::sleep(Duration::from_millis(millis)).await;
                        Some(TestAction::Increment)
                    })]
                },
                TestAction::Ping(n) => {
                    smallvec![Effect::future(async move {
                        tokio::task::yield_now().await;
                        Some(TestAction::Pong(n))
                    })]
                },
                TestAction::Pong(_) => {
                    state.value += 1;
                    SmallVec::new()
                },
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState { value: 0 }, TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = store();
        assert_eq!(store.state(|s| s.value).await, 0);
        assert_eq!(store.config().broadcast_capacity, 64);
    }

    #[tokio::test]
    async fn test_send_action() {
        let store = store();
        let handle = store.send(TestAction::Increment).await.unwrap();
        assert!(handle.is_complete());
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_none() {
        let store = store();
        let _ = store.send(TestAction::NoOp).await;
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_future_feedback_applied_before_handle_completes() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceEffect).await.unwrap();
        handle
            .wait_with_timeout(Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn test_silent_future_produces_nothing() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceSilentEffect).await.unwrap();
        handle.wait().await;
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_sees_applied_state() {
        let store = store();
        let settled = store
            .send_and_wait_for(
                TestAction::ProduceEffect,
                |a| matches!(a, TestAction::Increment),
                Some(Duration::from_secs(1)),
            )
            .await
            .unwrap();

        assert_eq!(settled, TestAction::Increment);
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_unbounded() {
        let store = store();
        let settled = store
            .send_and_wait_for(
                TestAction::ProduceSlowEffect(20),
                |a| matches!(a, TestAction::Increment),
                None,
            )
            .await
            .unwrap();
        assert_eq!(settled, TestAction::Increment);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_timeout() {
        let store = store();
        let result = store
            .send_and_wait_for(
                TestAction::NoOp,
                |a| matches!(a, TestAction::Increment),
                Some(Duration::from_millis(20)),
            )
            .await;
        assert_eq!(result.unwrap_err(), StoreError::Timeout);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_send_and_wait_for_survives_broadcast_overflow() {
        let config = StoreConfig::default().with_broadcast_capacity(1);
        let store = Store::with_config(TestState { value: 0 }, TestReducer, TestEnv, config);
        let _slow_observer = store.subscribe_actions();

        let callers: Vec<_> = (0..300)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .send_and_wait_for(
                            TestAction::Ping(n),
                            move |a| *a == TestAction::Pong(n),
                            None,
                        )
                        .await
                })
            })
            .collect();

        let all = tokio::time::timeout(Duration::from_secs(5), async {
            let mut settled = Vec::new();
            for caller in callers {
                settled.push(caller.await.unwrap().unwrap());
            }
            settled
        })
        .await
        .unwrap();

        for (n, action) in (0..300).zip(&all) {
            assert_eq!(*action, TestAction::Pong(n));
        }
        assert_eq!(store.state(|s| s.value).await, 300);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_after_shutdown_is_rejected() {
        let store = store();
        store.shutdown(Duration::from_millis(100)).await.unwrap();

        let result = store
            .send_and_wait_for(TestAction::ProduceEffect, |_| true, None)
            .await;

        assert_eq!(result.unwrap_err(), StoreError::ShutdownInProgress);
    }

    #[tokio::test]
    async fn test_subscribe_actions_only_sees_settlements() {
        let store = store();
        let mut rx = store.subscribe_actions();

        let _ = store.send(TestAction::Increment).await;
        let mut handle = store.send(TestAction::ProduceEffect).await.unwrap();
        handle.wait().await;

        assert_eq!(rx.recv().await.unwrap(), TestAction::Increment);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_actions() {
        let store = store();
        store.shutdown(Duration::from_millis(100)).await.unwrap();

        let result = store.send(TestAction::Increment).await;
        assert_eq!(result.unwrap_err(), StoreError::ShutdownInProgress);
    }

    #[tokio::test]
    async fn test_shutdown_applies_in_flight_settlement() {
        let store = store();
        let _ = store.send(TestAction::ProduceSlowEffect(30)).await.unwrap();

        store.shutdown(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_shutdown_timeout() {
        let store = store();
        let _ = store.send(TestAction::ProduceSlowEffect(500)).await.unwrap();

        let result = store.shutdown(Duration::from_millis(20)).await;
        assert_eq!(result.unwrap_err(), StoreError::ShutdownTimeout(1));
    }

    #[tokio::test]
    async fn test_completed_handle() {
        let mut handle = EffectHandle::completed();
        assert!(handle.is_complete());
        handle.wait().await;
    }

    #[test]
    fn test_zero_broadcast_capacity_is_clamped() {
        let config = StoreConfig::default().with_broadcast_capacity(0);
        let store = Store::with_config(TestState { value: 0 }, TestReducer, TestEnv, config);
        let _rx = store.subscribe_actions();
    }
}
