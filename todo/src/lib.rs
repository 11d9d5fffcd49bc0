//! Single-user task list with filtering and local persistence.
//!
//! Tasks have a title, a due date and a completion flag. The list is kept in
//! a [`TodoStore`], persisted as a JSON array after every change, and shown
//! through a [`TodoView`] that can narrow it to pending or completed tasks.
//!
//! # Architecture
//!
//! ```text
//! input ──► TodoView ──► TodoStore ──► Store::send ──► TodoReducer
//!              ▲                            │
//!              │                            ▼
//!           render ◄──── state ◄──── storage effect ──► KeyValueStore
//! ```
//!
//! Every command runs to completion, including the storage write, before the
//! view re-renders and the next input is read.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tasklist_core::environment::SystemClock;
//! use tasklist_testing::InMemoryStorage;
//! use todo::{TodoEnvironment, TodoStore};
//!
//! let env = TodoEnvironment::new(Arc::new(SystemClock), Arc::new(InMemoryStorage::new()));
//! let mut store = TodoStore::open(env);
//!
//! let task = store.add("Buy milk", "2024-01-15").unwrap();
//! assert_eq!(task.display_date(), "01/15/2024");
//! assert_eq!(store.pending_count(), 1);
//! ```

pub mod config;
pub mod dialogs;
pub mod error;
pub mod reducer;
pub mod shell;
pub mod storage;
pub mod store;
pub mod types;
pub mod view;

pub use config::Config;
pub use dialogs::{Dialogs, ScriptedDialogs, TerminalDialogs};
pub use error::{TodoError, ValidationError};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use shell::{InputError, run_shell};
pub use storage::FileStorage;
pub use store::TodoStore;
pub use types::{Filter, Task, TaskId, TodoAction, TodoState};
pub use view::{Frame, TodoView, ViewCommand};
