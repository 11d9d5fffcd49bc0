//! # Tasklist Testing
//!
//! Testing utilities and helpers for the tasklist reducer architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (`FixedClock`, `InMemoryStorage`)
//! - A Given-When-Then harness for reducers (`ReducerTest`)
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```
//! use tasklist_core::environment::Clock;
//! use tasklist_core::storage::{KeyValueStore, StorageKey};
//! use tasklist_testing::{test_clock, InMemoryStorage};
//!
//! let clock = test_clock();
//! assert_eq!(clock.now(), clock.now());
//!
//! let storage = InMemoryStorage::new();
//! storage.fail_writes(true);
//! assert!(storage.set(&StorageKey::new("todos"), "[]").is_err());
//! ```

use chrono::{DateTime, Utc};
use tasklist_core::environment::Clock;

mod storage_mocks;

pub use reducer_test::{ReducerTest, assertions};
pub use storage_mocks::InMemoryStorage;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tasklist_testing::mocks::FixedClock;
    /// use tasklist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 12:00:00 UTC)
    ///
    /// Noon keeps the local calendar date on 2025-01-01 in every timezone
    /// between UTC-11 and UTC+11.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_732_800, 0).unwrap_or_default())
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
