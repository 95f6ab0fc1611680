//! # Rifa Runtime
//!
//! Runtime implementation for the rifa checkout architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Cancellation Registry**: Tracks cancellable effects so a later
//!   `Effect::Cancel` can abort them
//!
//! ## Example
//!
//! ```ignore
//! use rifa_runtime::Store;
//! use rifa_core::reducer::Reducer;
//!
//! let store = Store::new(
//!     initial_state,
//!     my_reducer,
//!     environment,
//! );
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use rifa_core::effect::{Effect, EffectId};
use rifa_core::environment::Clock;
use rifa_core::reducer::Reducer;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::AbortHandle;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Production clock backed by the system time.
///
/// Injected into environments that need wall-clock time; tests substitute
/// the deterministic clocks from `rifa-testing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for effects to complete.
/// Each action gets a handle that can be awaited to know when its
/// immediate effects are done.
///
/// # Example
///
/// ```ignore
/// let handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All effects from Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle
    ///
    /// # Returns
    ///
    /// A tuple of `(EffectHandle, EffectTracking)` where:
    /// - `EffectHandle` is returned to the caller for waiting
    /// - `EffectTracking` is used internally for effect execution
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
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all effects to complete
    ///
    /// Blocks until the effect counter reaches zero.
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            let _ = self.completion.changed().await;
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Arguments
    ///
    /// - `timeout`: Maximum duration to wait
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
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
///
/// Carries the completion counter through effect execution so waiters on
/// the corresponding [`EffectHandle`] are notified when it reaches zero.
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

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Ensures the effect counter is always decremented, even if the effect
/// panics or its task is aborted mid-await.
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

/// Internal: a cancellable-effect registration.
///
/// The sequence number distinguishes a task's own registration from a
/// replacement armed later under the same id, so a finished task only
/// cleans up its own entry.
struct CancellableEntry {
    seq: u64,
    abort: AbortHandle,
}

type CancellationRegistry = Arc<Mutex<HashMap<EffectId, CancellableEntry>>>;

/// The Store - runtime for reducers
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop and cancellation)
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let store = Store::new(
///     CheckoutState::default(),
///     CheckoutReducer::new(),
///     production_environment(),
/// );
///
/// store.send(CheckoutAction::ConfirmReservation).await?;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
    cancellations: CancellationRegistry,
    cancellation_seq: Arc<AtomicU64>,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// All actions produced by effects (e.g., from `Effect::Future`) are
    /// broadcast to observers. This enables request-response patterns and
    /// UI layers reacting to completion events.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Creates a Store with default configuration:
    /// - Action broadcast capacity: 16 (increase with `with_broadcast_capacity`)
    ///
    /// # Arguments
    ///
    /// - `initial_state`: The starting state for the store
    /// - `reducer`: The reducer implementation (business logic)
    /// - `environment`: Injected dependencies
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new Store with custom action broadcast capacity
    ///
    /// Use this constructor when observers may lag behind a burst of
    /// effect-produced actions. Default capacity is 16.
    ///
    /// # Arguments
    ///
    /// - `initial_state`: The starting state for the store
    /// - `reducer`: The reducer implementation (business logic)
    /// - `environment`: Injected dependencies
    /// - `capacity`: Action broadcast channel capacity (number of actions buffered)
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            cancellations: Arc::new(Mutex::new(HashMap::new())),
            cancellation_seq: Arc::new(AtomicU64::new(0)),
            action_broadcast,
        }
    }

    /// Send an action to the store
    ///
    /// This is the primary way to interact with the store:
    /// 1. Acquires write lock on state
    /// 2. Calls reducer with (state, action, environment)
    /// 3. Executes returned effects asynchronously
    /// 4. Effects may produce more actions (feedback loop)
    ///
    /// # Concurrency and Effect Execution
    ///
    /// - The reducer executes synchronously while holding a write lock
    /// - Effects execute asynchronously in spawned tasks
    /// - `send()` returns after starting effect execution, not completion
    /// - Multiple concurrent `send()` calls serialize at the reducer level
    /// - Effects may complete in non-deterministic order
    ///
    /// # Returns
    ///
    /// An [`EffectHandle`] that can be used to wait for effect completion.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(StoreError::ShutdownInProgress);
        }

        metrics::counter!("store.actions.sent").increment(1);

        let (handle, tracking) = EffectHandle::new();

        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        for effect in effects {
            self.execute_effect(effect, tracking.clone());
        }

        Ok(handle)
    }

    /// Send an action and wait for a matching result action
    ///
    /// This method is designed for request-response patterns. It subscribes
    /// to the action broadcast, sends the initial action, then waits for an
    /// action matching the predicate.
    ///
    /// # How It Works
    ///
    /// 1. Subscribe to action broadcast BEFORE sending (avoids race conditions)
    /// 2. Send the initial action through the store
    /// 3. Wait for actions produced by effects
    /// 4. Return the first action matching the predicate
    ///
    /// # Arguments
    ///
    /// - `action`: The initial action to send
    /// - `predicate`: Function to test if an action is the terminal result
    /// - `timeout`: Maximum time to wait for matching action
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: Timeout expired before matching action received
    /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
    ///
    /// # Notes
    ///
    /// - Only actions produced by effects are broadcast (not the initial action)
    /// - If the channel lags and drops actions, waiting continues (timeout catches it)
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut receiver = self.action_broadcast.subscribe();
        let _ = self.send(action).await?;

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(StoreError::Timeout);
            }

            match tokio::time::timeout(remaining, receiver.recv()).await {
                Ok(Ok(candidate)) => {
                    if predicate(&candidate) {
                        return Ok(candidate);
                    }
                },
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "Action broadcast lagged, continuing to wait");
                },
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    return Err(StoreError::ChannelClosed);
                },
                Err(_) => return Err(StoreError::Timeout),
            }
        }
    }

    /// Subscribe to actions produced by effects
    ///
    /// Observers receive every action fed back into the store by effect
    /// execution (not actions passed directly to `send`).
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Read state through a closure
    ///
    /// Acquires a read lock and applies `f` to the current state.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let phase = store.state(|s| s.phase.clone()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Initiate graceful shutdown of the store
    ///
    /// This method:
    /// 1. Sets the shutdown flag (rejecting new actions)
    /// 2. Waits for pending effects to complete (with timeout)
    ///
    /// # Arguments
    ///
    /// - `timeout`: Maximum time to wait for effects to complete
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
    /// all pending effects complete.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        metrics::counter!("store.shutdown.initiated").increment(1);

        self.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(100);

        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
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

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Feed an effect-produced action back into the store.
    ///
    /// Broadcasts the action to observers, then sends it through the
    /// reducer. Send failures during shutdown are expected and logged at
    /// debug level.
    async fn feedback(&self, action: A) {
        let _ = self.action_broadcast.send(action.clone());

        if let Err(error) = self.send(action).await {
            tracing::debug!(%error, "Dropping effect-produced action");
        }
    }

    /// Execute a single effect description.
    ///
    /// Leaf effects spawn their own task; composite effects either fan out
    /// (`Parallel`) or run their children in order within one task
    /// (`Sequential`). `Cancellable` registers the spawned task under its
    /// id so a later `Cancel` can abort it.
    fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Future(fut) => {
                tracing::trace!("Executing Effect::Future");
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                let store = self.clone();
                self.spawn_tracked(tracking, async move {
                    if let Some(action) = fut.await {
                        tracing::trace!("Effect::Future produced an action, sending to store");
                        store.feedback(action).await;
                    } else {
                        tracing::trace!("Effect::Future completed with no action");
                    }
                });
            },
            Effect::Delay { duration, action } => {
                tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                metrics::counter!("store.effects.executed", "type" => "delay").increment(1);

                let store = self.clone();
                self.spawn_tracked(tracking, async move {
                    tokio::time::sleep(duration).await;
                    tracing::trace!("Effect::Delay completed, sending action");
                    store.feedback(*action).await;
                });
            },
            Effect::Parallel(effects) => {
                tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                for effect in effects {
                    self.execute_effect(effect, tracking.clone());
                }
            },
            Effect::Sequential(effects) => {
                tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);

                let store = self.clone();
                self.spawn_tracked(tracking.clone(), async move {
                    for effect in effects {
                        store.run_inline(effect, tracking.clone()).await;
                    }
                    tracing::trace!("Effect::Sequential completed");
                });
            },
            Effect::Cancellable { id, effect } => {
                self.execute_cancellable(id, *effect, tracking);
            },
            Effect::Cancel(id) => {
                self.cancel_registered(&id);
            },
        }
    }

    /// Spawn an effect task with handle and shutdown tracking attached.
    fn spawn_tracked<F>(&self, tracking: EffectTracking, fut: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracking.increment();
        self.pending_effects.fetch_add(1, Ordering::SeqCst);
        let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

        let task = tokio::spawn(async move {
            let _guard = DecrementGuard(tracking);
            let _pending_guard = pending_guard; // Decrement on drop
            fut.await;
        });

        task.abort_handle()
    }

    /// Run a cancellable effect as one abortable task registered under `id`.
    ///
    /// Arming an id that is already registered aborts and replaces the
    /// previous task. A task that runs to completion removes its own
    /// registration (and only its own, via the sequence number).
    fn execute_cancellable(&self, id: EffectId, effect: Effect<A>, tracking: EffectTracking) {
        tracing::trace!(effect_id = %id, "Executing Effect::Cancellable");
        metrics::counter!("store.effects.executed", "type" => "cancellable").increment(1);

        let seq = self.cancellation_seq.fetch_add(1, Ordering::Relaxed);
        let store = self.clone();
        let registry = Arc::clone(&self.cancellations);
        let cleanup_id = id.clone();

        let abort = self.spawn_tracked(tracking.clone(), async move {
            store.run_inline(effect, tracking).await;

            // Deregister ourselves unless a newer effect took over the id.
            #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
            let mut entries = registry.lock().unwrap();
            if entries.get(&cleanup_id).is_some_and(|entry| entry.seq == seq) {
                entries.remove(&cleanup_id);
            }
        });

        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let previous = self
            .cancellations
            .lock()
            .unwrap()
            .insert(id.clone(), CancellableEntry { seq, abort });

        if let Some(previous) = previous {
            tracing::debug!(effect_id = %id, "Replacing previously armed cancellable effect");
            previous.abort.abort();
        }
    }

    /// Abort the cancellable effect registered under `id`, if any.
    fn cancel_registered(&self, id: &EffectId) {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let entry = self.cancellations.lock().unwrap().remove(id);

        if let Some(entry) = entry {
            tracing::trace!(effect_id = %id, "Cancelling effect");
            metrics::counter!("store.effects.cancelled").increment(1);
            entry.abort.abort();
        } else {
            tracing::trace!(effect_id = %id, "Cancel for unregistered effect (no-op)");
        }
    }

    /// Execute an effect within the current task (no new spawn for leaves).
    ///
    /// Used for `Sequential` bodies and for `Cancellable`, where the whole
    /// nested effect must live inside one abortable task.
    fn run_inline(
        &self,
        effect: Effect<A>,
        tracking: EffectTracking,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let store = self.clone();
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        store.feedback(action).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    store.feedback(*action).await;
                },
                Effect::Parallel(effects) => {
                    futures::future::join_all(
                        effects
                            .into_iter()
                            .map(|effect| store.run_inline(effect, tracking.clone())),
                    )
                    .await;
                },
                Effect::Sequential(effects) => {
                    for effect in effects {
                        store.run_inline(effect, tracking.clone()).await;
                    }
                },
                Effect::Cancellable { id, effect } => {
                    // Nested cancellables get their own task so the id can
                    // outlive the enclosing sequence.
                    store.execute_cancellable(id, *effect, tracking.clone());
                },
                Effect::Cancel(id) => {
                    store.cancel_registered(&id);
                },
            }
        })
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
            shutdown: Arc::clone(&self.shutdown),
            pending_effects: Arc::clone(&self.pending_effects),
            cancellations: Arc::clone(&self.cancellations),
            cancellation_seq: Arc::clone(&self.cancellation_seq),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use rifa_core::effect::Effect;
    use rifa_core::{SmallVec, smallvec};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TickState {
        ticks: u32,
        echoes: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TickAction {
        Tick,
        TickAndEcho,
        Echoed,
        DelayedEcho(Duration),
        ArmCancellable { id: EffectId, delay: Duration },
        Disarm(EffectId),
    }

    #[derive(Clone)]
    struct TickReducer;

    impl Reducer for TickReducer {
        type State = TickState;
        type Action = TickAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TickAction::Tick => {
                    state.ticks += 1;
                    smallvec![Effect::None]
                },
                TickAction::TickAndEcho => {
                    state.ticks += 1;
                    smallvec![Effect::Future(Box::pin(async {
                        Some(TickAction::Echoed)
                    }))]
                },
                TickAction::Echoed => {
                    state.echoes += 1;
                    smallvec![Effect::None]
                },
                TickAction::DelayedEcho(duration) => {
                    smallvec![Effect::Delay {
                        duration,
                        action: Box::new(TickAction::Echoed),
                    }]
                },
                TickAction::ArmCancellable { id, delay } => {
                    smallvec![
                        Effect::Delay {
                            duration: delay,
                            action: Box::new(TickAction::Echoed),
                        }
                        .cancellable(id)
                    ]
                },
                TickAction::Disarm(id) => smallvec![Effect::Cancel(id)],
            }
        }
    }

    fn store() -> Store<TickState, TickAction, (), TickReducer> {
        Store::new(TickState::default(), TickReducer, ())
    }

    #[tokio::test]
    async fn send_runs_reducer_and_updates_state() {
        let store = store();

        store.send(TickAction::Tick).await.unwrap();
        store.send(TickAction::Tick).await.unwrap();

        assert_eq!(store.state(|s| s.ticks).await, 2);
    }

    #[tokio::test]
    async fn future_effect_feeds_action_back() {
        let store = store();

        let mut handle = store.send(TickAction::TickAndEcho).await.unwrap();
        handle
            .wait_with_timeout(Duration::from_secs(1))
            .await
            .unwrap();

        // The feedback action runs through the reducer again.
        let state = store.state(Clone::clone).await;
        assert_eq!(state, TickState { ticks: 1, echoes: 1 });
    }

    #[tokio::test]
    async fn effect_actions_are_broadcast_to_observers() {
        let store = store();
        let mut actions = store.subscribe_actions();

        let mut handle = store.send(TickAction::TickAndEcho).await.unwrap();
        handle
            .wait_with_timeout(Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(actions.recv().await.unwrap(), TickAction::Echoed);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_effect_fires_after_duration() {
        let store = store();

        let mut handle = store
            .send(TickAction::DelayedEcho(Duration::from_secs(30)))
            .await
            .unwrap();
        handle
            .wait_with_timeout(Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.state(|s| s.echoes).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_pending_delay() {
        let store = store();
        let id = EffectId::new("echo-timer");

        store
            .send(TickAction::ArmCancellable {
                id: id.clone(),
                delay: Duration::from_secs(60),
            })
            .await
            .unwrap();
        store.send(TickAction::Disarm(id)).await.unwrap();

        // Let virtual time run well past the delay; nothing should fire.
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(store.state(|s| s.echoes).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancellable_replaces_previous_timer() {
        let store = store();
        let id = EffectId::new("echo-timer");

        store
            .send(TickAction::ArmCancellable {
                id: id.clone(),
                delay: Duration::from_secs(10),
            })
            .await
            .unwrap();
        store
            .send(TickAction::ArmCancellable {
                id,
                delay: Duration::from_secs(40),
            })
            .await
            .unwrap();

        // Past the first delay but before the second: the first was replaced.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(store.state(|s| s.echoes).await, 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.state(|s| s.echoes).await, 1);
    }

    #[tokio::test]
    async fn send_and_wait_for_returns_matching_action() {
        let store = store();

        let result = store
            .send_and_wait_for(
                TickAction::TickAndEcho,
                |a| matches!(a, TickAction::Echoed),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(result, TickAction::Echoed);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = store();

        store.shutdown(Duration::from_secs(1)).await.unwrap();

        assert!(matches!(
            store.send(TickAction::Tick).await,
            Err(StoreError::ShutdownInProgress)
        ));
    }
}
