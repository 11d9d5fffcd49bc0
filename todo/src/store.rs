//! The task store: the only sanctioned way to read or change the task list.
//!
//! [`TodoStore`] wraps the runtime [`Store`] with one method per operation.
//! Each method sends a command, lets the runtime run the reducer and the
//! storage write to completion, then reads the command's outcome back out of
//! state.

use crate::error::TodoError;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Filter, Task, TaskId, TodoAction, TodoState};
use chrono::NaiveDate;
use tasklist_runtime::Store;

/// Owned task list with persistence
pub struct TodoStore {
    inner: Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>,
}

impl TodoStore {
    /// Creates an empty store without touching storage
    #[must_use]
    pub fn new(env: TodoEnvironment) -> Self {
        Self {
            inner: Store::new(TodoState::new(), TodoReducer::new(), env),
        }
    }

    /// Creates a store and loads the persisted task list into it
    #[must_use]
    pub fn open(env: TodoEnvironment) -> Self {
        let mut store = Self::new(env);
        store.load();
        store
    }

    /// Replaces the in-memory task list with the persisted one
    ///
    /// Never fails: absent or malformed data loads as an empty list. The
    /// active filter is left alone.
    pub fn load(&mut self) {
        match self.inner.send(TodoAction::LoadTasks) {
            Ok(_) => tracing::info!(tasks = self.len(), "Task list loaded"),
            Err(error) => tracing::error!(%error, "Loading task list did not complete"),
        }
    }

    /// Appends a new pending task and persists the list
    ///
    /// # Errors
    ///
    /// - [`TodoError::Validation`] for a blank title or a missing/invalid
    ///   date; nothing changes
    /// - [`TodoError::Persistence`] when the write failed; the task is
    ///   still added for this session
    pub fn add(&mut self, title: &str, due_date: &str) -> Result<Task, TodoError> {
        self.dispatch(TodoAction::AddTask {
            title: title.to_string(),
            due_date: due_date.to_string(),
        })?;
        let task = self.inner.state(|s| s.tasks.last().cloned());
        task.ok_or_else(|| TodoError::Persistence {
            reason: "task missing after add".to_string(),
        })
    }

    /// Flips the completion flag of task `id` and persists the list
    ///
    /// Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// [`TodoError::Persistence`] when the write failed; the flag is still
    /// flipped for this session.
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<(), TodoError> {
        self.dispatch(TodoAction::ToggleTask { id })
    }

    /// Removes task `id` and persists the list
    ///
    /// Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// [`TodoError::Persistence`] when the write failed; the task is still
    /// removed for this session.
    pub fn delete(&mut self, id: TaskId) -> Result<(), TodoError> {
        self.dispatch(TodoAction::DeleteTask { id })
    }

    /// Removes every task and persists the empty list
    ///
    /// # Errors
    ///
    /// [`TodoError::Persistence`] when the write failed; the list is still
    /// empty for this session.
    pub fn delete_all(&mut self) -> Result<(), TodoError> {
        self.dispatch(TodoAction::DeleteAllTasks)
    }

    /// Selects which tasks [`visible_tasks`](Self::visible_tasks) returns
    ///
    /// # Errors
    ///
    /// [`TodoError::Validation`] when `filter` is not `all`, `pending` or
    /// `completed`.
    pub fn set_filter(&mut self, filter: &str) -> Result<Filter, TodoError> {
        self.dispatch(TodoAction::SelectFilter {
            filter: filter.to_string(),
        })?;
        Ok(self.filter())
    }

    /// Tasks passing the active filter, in list order
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<Task> {
        self.inner.state(|s| s.visible_tasks().cloned().collect())
    }

    /// Every task, in list order
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.state(|s| s.tasks.clone())
    }

    /// Active filter
    #[must_use]
    pub fn filter(&self) -> Filter {
        self.inner.state(|s| s.filter)
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state(TodoState::count)
    }

    /// Whether the list has no tasks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pending tasks
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.state(TodoState::pending_count)
    }

    /// Number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.inner.state(TodoState::completed_count)
    }

    /// Today's local calendar date according to the environment clock
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.inner.environment().today()
    }

    fn dispatch(&mut self, action: TodoAction) -> Result<(), TodoError> {
        self.inner.send(action)?;
        self.inner.state(|s| {
            if let Some(error) = &s.last_error {
                return Err(TodoError::Validation(error.clone()));
            }
            if let Some(reason) = &s.persistence_error {
                return Err(TodoError::Persistence {
                    reason: reason.clone(),
                });
            }
            Ok(())
        })
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.state(|s| {
            f.debug_struct("TodoStore")
                .field("tasks", &s.tasks.len())
                .field("filter", &s.filter)
                .finish()
        })
    }
}
