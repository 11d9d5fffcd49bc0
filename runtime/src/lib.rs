//! # Tasklist Runtime
//!
//! Runtime implementation for the tasklist reducer architecture.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling. Unlike a background executor, the Store runs everything
//! on the caller's thread: [`Store::send`] reduces the action, executes the
//! returned effects in order, feeds any resulting actions back into the
//! reducer and only returns once nothing is left to do.
//!
//! ## Example
//!
//! ```
//! use tasklist_core::{effect::Effect, reducer::Reducer, SmallVec};
//! use tasklist_runtime::Store;
//!
//! struct Adder;
//!
//! impl Reducer for Adder {
//!     type State = u32;
//!     type Action = u32;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut u32, action: u32, _env: &()) -> SmallVec<[Effect<u32>; 4]> {
//!         *state += action;
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut store = Store::new(0, Adder, ());
//! store.send(2).unwrap();
//! store.send(3).unwrap();
//! assert_eq!(store.state(|s| *s), 5);
//! ```

use std::collections::VecDeque;
use tasklist_core::{effect::Effect, reducer::Reducer};

/// Metric names and descriptions
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The reducer kept feeding actions back past the configured limit
        ///
        /// State changes made before the limit was hit are kept.
        #[error("Feedback limit exceeded: more than {0} actions from a single send")]
        FeedbackLimitExceeded(usize),
    }
}

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use tasklist_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_max_actions_per_send(8);
/// assert_eq!(config.max_actions_per_send, 8);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upper bound on actions processed by one `send`, feedback included
    pub max_actions_per_send: usize,
}

impl StoreConfig {
    /// Set the per-send action limit
    #[must_use]
    pub const fn with_max_actions_per_send(mut self, limit: usize) -> Self {
        self.max_actions_per_send = limit;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_actions_per_send: 64,
        }
    }
}

/// Summary of the work a single [`Store::send`] performed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOutcome {
    /// Actions reduced, including the one that was sent
    pub actions_processed: usize,
    /// Storage reads executed
    pub storage_reads: usize,
    /// Storage writes executed (successful or not)
    pub storage_writes: usize,
    /// Storage operations that returned an error
    pub storage_failures: usize,
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{Effect, Reducer, SendOutcome, StoreConfig, VecDeque};
    use crate::error::StoreError;
    use crate::metrics::names;
    use tasklist_core::effect::StorageOperation;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store owns:
    /// 1. State (mutated only through `send`)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
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
        state: S,
        reducer: R,
        environment: E,
        config: StoreConfig,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub const fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            Self {
                state: initial_state,
                reducer,
                environment,
                config,
            }
        }

        /// Send an action to the store
        ///
        /// The action is reduced, its effects are executed in order, and every
        /// action produced by those effects is reduced in turn (breadth first)
        /// until the queue is empty.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] if more than
        /// `max_actions_per_send` actions would be processed. Remaining queued
        /// actions are dropped; state changes already made are kept.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&mut self, action: A) -> Result<SendOutcome, StoreError> {
            let mut outcome = SendOutcome::default();
            let mut queue = VecDeque::from([action]);

            while let Some(action) = queue.pop_front() {
                if outcome.actions_processed >= self.config.max_actions_per_send {
                    tracing::error!(
                        limit = self.config.max_actions_per_send,
                        dropped = queue.len() + 1,
                        "Feedback limit exceeded"
                    );
                    return Err(StoreError::FeedbackLimitExceeded(
                        self.config.max_actions_per_send,
                    ));
                }
                outcome.actions_processed += 1;
                metrics::counter!(names::ACTIONS_TOTAL).increment(1);

                let effects = {
                    let span = tracing::debug_span!("reducer_execution");
                    let _enter = span.enter();

                    let start = std::time::Instant::now();
                    let effects = self.reducer.reduce(&mut self.state, action, &self.environment);
                    metrics::histogram!(names::REDUCER_DURATION)
                        .record(start.elapsed().as_secs_f64());
                    effects
                };

                tracing::trace!("Reducer returned {} effects", effects.len());
                for effect in effects {
                    Self::execute_effect(effect, &mut queue, &mut outcome);
                }
            }

            tracing::debug!(
                actions = outcome.actions_processed,
                writes = outcome.storage_writes,
                failures = outcome.storage_failures,
                "Action processing completed"
            );
            Ok(outcome)
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.tasks.len());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&self.state)
        }

        /// Injected dependencies the reducer runs with
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Active configuration
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        fn execute_effect(effect: Effect<A>, queue: &mut VecDeque<A>, outcome: &mut SendOutcome) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Sequential(effects) => {
                    tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                    for effect in effects {
                        Self::execute_effect(effect, queue, outcome);
                    }
                },
                Effect::Storage(op) => {
                    let kind = op.kind();
                    metrics::counter!(names::EFFECTS_EXECUTED, "type" => kind).increment(1);
                    let feedback = Self::execute_storage(op, outcome);
                    if let Some(action) = feedback {
                        tracing::trace!(kind, "Storage effect produced an action");
                        queue.push_back(action);
                    }
                },
            }
        }

        fn execute_storage(op: StorageOperation<A>, outcome: &mut SendOutcome) -> Option<A> {
            match op {
                StorageOperation::Read {
                    storage,
                    key,
                    on_success,
                    on_error,
                } => {
                    outcome.storage_reads += 1;
                    match storage.get(&key) {
                        Ok(value) => {
                            tracing::debug!(key = %key, found = value.is_some(), "read succeeded");
                            on_success(value)
                        },
                        Err(error) => {
                            tracing::warn!(key = %key, error = %error, "read failed");
                            outcome.storage_failures += 1;
                            metrics::counter!(names::STORAGE_FAILURES, "type" => "read").increment(1);
                            on_error(error)
                        },
                    }
                },
                StorageOperation::Write {
                    storage,
                    key,
                    value,
                    on_success,
                    on_error,
                } => {
                    outcome.storage_writes += 1;
                    match storage.set(&key, &value) {
                        Ok(()) => {
                            tracing::debug!(key = %key, bytes = value.len(), "write succeeded");
                            on_success()
                        },
                        Err(error) => {
                            tracing::warn!(key = %key, error = %error, "write failed");
                            outcome.storage_failures += 1;
                            metrics::counter!(names::STORAGE_FAILURES, "type" => "write").increment(1);
                            on_error(error)
                        },
                    }
                },
            }
        }
    }
}

pub use error::StoreError;
pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tasklist_core::effect::StorageOperation;
    use tasklist_core::storage::{KeyValueStore, StorageKey};
    use tasklist_core::{SmallVec, smallvec};
    use tasklist_testing::InMemoryStorage;

    #[derive(Debug, Default)]
    struct NotesState {
        notes: Vec<String>,
        saved: usize,
        last_failure: Option<String>,
    }

    #[derive(Debug, Clone)]
    enum NotesAction {
        Add(String),
        Saved,
        SaveFailed(String),
        Echo(usize),
        AddTwiceThenSave(String),
    }

    #[derive(Clone)]
    struct NotesEnv {
        storage: Arc<InMemoryStorage>,
    }

    struct NotesReducer;

    impl NotesReducer {
        fn save(state: &NotesState, env: &NotesEnv) -> Effect<NotesAction> {
            let storage: Arc<dyn KeyValueStore> = env.storage.clone();
            Effect::Storage(StorageOperation::Write {
                storage,
                key: StorageKey::new("notes"),
                value: state.notes.join(","),
                on_success: Box::new(|| Some(NotesAction::Saved)),
                on_error: Box::new(|error| Some(NotesAction::SaveFailed(error.to_string()))),
            })
        }
    }

    impl Reducer for NotesReducer {
        type State = NotesState;
        type Action = NotesAction;
        type Environment = NotesEnv;

        fn reduce(
            &self,
            state: &mut NotesState,
            action: NotesAction,
            env: &NotesEnv,
        ) -> SmallVec<[Effect<NotesAction>; 4]> {
            match action {
                NotesAction::Add(note) => {
                    state.notes.push(note);
                    smallvec![Self::save(state, env)]
                },
                NotesAction::AddTwiceThenSave(note) => {
                    state.notes.push(note.clone());
                    state.notes.push(note);
                    smallvec![Effect::chain(vec![Effect::None, Self::save(state, env)])]
                },
                NotesAction::Saved => {
                    state.saved += 1;
                    SmallVec::new()
                },
                NotesAction::SaveFailed(error) => {
                    state.last_failure = Some(error);
                    SmallVec::new()
                },
                NotesAction::Echo(n) => {
                    // Feeds itself back through a read
                    let storage: Arc<dyn KeyValueStore> = env.storage.clone();
                    smallvec![Effect::Storage(StorageOperation::Read {
                        storage,
                        key: StorageKey::new("notes"),
                        on_success: Box::new(move |_| Some(NotesAction::Echo(n + 1))),
                        on_error: Box::new(|_| None),
                    })]
                },
            }
        }
    }

    fn store() -> (Store<NotesState, NotesAction, NotesEnv, NotesReducer>, Arc<InMemoryStorage>) {
        let storage = Arc::new(InMemoryStorage::new());
        let env = NotesEnv {
            storage: Arc::clone(&storage),
        };
        (Store::new(NotesState::default(), NotesReducer, env), storage)
    }

    #[test]
    fn write_completes_before_send_returns() {
        let (mut store, storage) = store();

        let outcome = store.send(NotesAction::Add("milk".to_string())).unwrap();

        assert_eq!(outcome.actions_processed, 2);
        assert_eq!(outcome.storage_writes, 1);
        assert_eq!(outcome.storage_failures, 0);
        assert_eq!(store.state(|s| s.saved), 1);
        assert_eq!(
            storage.get(&StorageKey::new("notes")).unwrap().as_deref(),
            Some("milk")
        );
    }

    #[test]
    fn failed_write_is_fed_back_and_state_kept() {
        let (mut store, storage) = store();
        storage.fail_writes(true);

        let outcome = store.send(NotesAction::Add("milk".to_string())).unwrap();

        assert_eq!(outcome.storage_failures, 1);
        assert_eq!(store.state(|s| s.notes.len()), 1);
        assert_eq!(store.state(|s| s.saved), 0);
        assert!(store.state(|s| s.last_failure.clone()).is_some());
    }

    #[test]
    fn sequential_effects_run_in_order() {
        let (mut store, storage) = store();

        store
            .send(NotesAction::AddTwiceThenSave("eggs".to_string()))
            .unwrap();

        assert_eq!(
            storage.get(&StorageKey::new("notes")).unwrap().as_deref(),
            Some("eggs,eggs")
        );
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn runaway_feedback_is_stopped() {
        let storage = Arc::new(InMemoryStorage::new());
        let env = NotesEnv { storage };
        let config = StoreConfig::default().with_max_actions_per_send(5);
        let mut store = Store::with_config(NotesState::default(), NotesReducer, env, config);

        let result = store.send(NotesAction::Echo(0));

        assert_eq!(result, Err(StoreError::FeedbackLimitExceeded(5)));
    }

    #[test]
    fn state_reader_sees_latest_state() {
        let (mut store, _) = store();
        store.send(NotesAction::Add("a".to_string())).unwrap();
        store.send(NotesAction::Add("b".to_string())).unwrap();

        assert_eq!(store.state(|s| s.notes.clone()), vec!["a", "b"]);
        assert_eq!(store.config().max_actions_per_send, 64);
    }
}
