//! # Tasklist Core
//!
//! Core traits and types for the tasklist reducer architecture.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer (commands and events)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! The runtime executes effects synchronously, so a reducer that returns a
//! storage write can rely on the write having happened (or failed, with the
//! failure fed back as an action) before the caller regains control.
//!
//! ## Example
//!
//! ```
//! use tasklist_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut state = CounterState::default();
//! let effects = CounterReducer.reduce(&mut state, CounterAction::Increment, &());
//! assert_eq!(state.count, 1);
//! assert!(effects.is_empty());
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Key-value storage abstraction used by storage effects
pub mod storage;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
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
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
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
/// They are values (not execution) and are composable.
pub mod effect {
    use crate::storage::{KeyValueStore, StorageError, StorageKey};
    use std::sync::Arc;

    /// Callback mapping a successful read to an optional feedback action
    pub type OnRead<Action> = Box<dyn FnOnce(Option<String>) -> Option<Action>>;

    /// Callback mapping a successful write to an optional feedback action
    pub type OnWrite<Action> = Box<dyn FnOnce() -> Option<Action>>;

    /// Callback mapping a storage failure to an optional feedback action
    pub type OnStorageError<Action> = Box<dyn FnOnce(StorageError) -> Option<Action>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects one after another, in order
        Sequential(Vec<Effect<Action>>),

        /// Key-value storage operation
        Storage(StorageOperation<Action>),
    }

    /// A storage operation carried by [`Effect::Storage`]
    ///
    /// The operation owns the storage handle it runs against, so a reducer
    /// builds it from its environment and the runtime needs no knowledge of
    /// the backend.
    pub enum StorageOperation<Action> {
        /// Read the value stored under `key`
        Read {
            /// Backend to read from
            storage: Arc<dyn KeyValueStore>,
            /// Key to read
            key: StorageKey,
            /// Called with the value (`None` when the key is absent)
            on_success: OnRead<Action>,
            /// Called when the backend fails
            on_error: OnStorageError<Action>,
        },

        /// Replace the value stored under `key`
        Write {
            /// Backend to write to
            storage: Arc<dyn KeyValueStore>,
            /// Key to write
            key: StorageKey,
            /// Complete new value
            value: String,
            /// Called once the value is stored
            on_success: OnWrite<Action>,
            /// Called when the backend fails
            on_error: OnStorageError<Action>,
        },
    }

    impl<Action> StorageOperation<Action> {
        /// Key this operation targets
        #[must_use]
        pub const fn key(&self) -> &StorageKey {
            match self {
                Self::Read { key, .. } | Self::Write { key, .. } => key,
            }
        }

        /// Short operation name, used for logging and metric labels
        #[must_use]
        pub const fn kind(&self) -> &'static str {
            match self {
                Self::Read { .. } => "read",
                Self::Write { .. } => "write",
            }
        }
    }

    // Manual Debug implementation since callbacks don't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Storage(op) => f.debug_tuple("Effect::Storage").field(op).finish(),
            }
        }
    }

    impl<Action> std::fmt::Debug for StorageOperation<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Read { key, .. } => f.debug_struct("Read").field("key", key).finish_non_exhaustive(),
                Self::Write { key, value, .. } => f
                    .debug_struct("Write")
                    .field("key", key)
                    .field("bytes", &value.len())
                    .finish_non_exhaustive(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Sequential(effects) => effects.iter().all(Effect::is_none),
                Effect::Storage(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use tasklist_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
