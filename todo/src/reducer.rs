//! Reducer logic for the task list.
//!
//! Commands are validated, turned into events and applied to state; every
//! command that changes the task list returns a storage write of the whole
//! list. Filter selection never touches storage.

use crate::error::ValidationError;
use crate::types::{
    Filter, Task, TaskId, TodoAction, TodoState, decode_tasks, encode_tasks, parse_due_date,
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tasklist_core::{
    SmallVec,
    effect::{Effect, StorageOperation},
    environment::Clock,
    reducer::Reducer,
    smallvec,
    storage::{KeyValueStore, StorageKey},
};

/// Default storage key for the task list
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Environment dependencies for the task list reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for generating ids and today's date
    pub clock: Arc<dyn Clock>,
    /// Where the task list is persisted
    pub storage: Arc<dyn KeyValueStore>,
    /// Key the task list is stored under
    pub storage_key: StorageKey,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` using the default storage key
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            storage,
            storage_key: StorageKey::new(DEFAULT_STORAGE_KEY),
        }
    }

    /// Stores the task list under `key` instead
    #[must_use]
    pub fn with_storage_key(mut self, key: StorageKey) -> Self {
        self.storage_key = key;
        self
    }

    /// Current calendar date in the local timezone
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&Local).date_naive()
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

/// Reducer for the task list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates an `AddTask` command, returning the trimmed title and parsed date
    fn validate_add_task(title: &str, due_date: &str) -> Result<(String, NaiveDate), ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let due_date = parse_due_date(due_date)?;
        Ok((title.to_string(), due_date))
    }

    /// Applies an event to state
    fn apply_event(state: &mut TodoState, action: &TodoAction) {
        match action {
            TodoAction::TasksLoaded { tasks } => {
                state.tasks.clone_from(tasks);
            },
            TodoAction::TaskAdded { task } => {
                state.tasks.push(task.clone());
            },
            TodoAction::TaskToggled { id } => {
                if let Some(task) = state.tasks.iter_mut().find(|t| t.id == *id) {
                    task.completed = !task.completed;
                }
            },
            TodoAction::TaskDeleted { id } => {
                state.tasks.retain(|t| t.id != *id);
            },
            TodoAction::AllTasksDeleted => {
                state.tasks.clear();
            },
            TodoAction::FilterSelected { filter } => {
                state.filter = *filter;
            },
            TodoAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },
            TodoAction::TasksPersisted => {
                state.persistence_error = None;
            },
            TodoAction::PersistFailed { error } => {
                state.persistence_error = Some(error.clone());
            },
            // Commands are not applied to state
            TodoAction::LoadTasks
            | TodoAction::AddTask { .. }
            | TodoAction::ToggleTask { .. }
            | TodoAction::DeleteTask { .. }
            | TodoAction::DeleteAllTasks
            | TodoAction::SelectFilter { .. } => {},
        }
    }

    /// Clears the outcome of the previous command
    fn begin_command(state: &mut TodoState) {
        state.last_error = None;
        state.persistence_error = None;
    }

    fn reject(state: &mut TodoState, error: ValidationError) -> SmallVec<[Effect<TodoAction>; 4]> {
        tracing::debug!(field = error.field(), %error, "Command rejected");
        metrics::counter!("todo.validation.failures", "field" => error.field()).increment(1);
        Self::apply_event(state, &TodoAction::ValidationFailed { error });
        SmallVec::new()
    }

    /// Effect writing the whole task list to storage
    fn persist(state: &mut TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        match encode_tasks(&state.tasks) {
            Ok(value) => Effect::Storage(StorageOperation::Write {
                storage: Arc::clone(&env.storage),
                key: env.storage_key.clone(),
                value,
                on_success: Box::new(|| Some(TodoAction::TasksPersisted)),
                on_error: Box::new(|error| {
                    Some(TodoAction::PersistFailed {
                        error: error.to_string(),
                    })
                }),
            }),
            Err(error) => {
                tracing::error!(%error, "Failed to encode task list");
                Self::apply_event(
                    state,
                    &TodoAction::PersistFailed {
                        error: error.to_string(),
                    },
                );
                Effect::None
            },
        }
    }

    /// Effect reading the task list from storage
    ///
    /// Never fails: a missing key, an unreadable backend and a malformed
    /// value all load as an empty list.
    fn load(env: &TodoEnvironment) -> Effect<TodoAction> {
        Effect::Storage(StorageOperation::Read {
            storage: Arc::clone(&env.storage),
            key: env.storage_key.clone(),
            on_success: Box::new(|raw| {
                let tasks = match raw.as_deref().map(decode_tasks) {
                    None => Vec::new(),
                    Some(Ok(tasks)) => tasks,
                    Some(Err(error)) => {
                        tracing::warn!(%error, "Ignoring malformed task list");
                        Vec::new()
                    },
                };
                Some(TodoAction::TasksLoaded { tasks })
            }),
            on_error: Box::new(|error| {
                tracing::warn!(%error, "Could not read task list, starting empty");
                Some(TodoAction::TasksLoaded { tasks: Vec::new() })
            }),
        })
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::LoadTasks => {
                Self::begin_command(state);
                smallvec![Self::load(env)]
            },

            TodoAction::AddTask { title, due_date } => {
                Self::begin_command(state);
                let (title, due_date) = match Self::validate_add_task(&title, &due_date) {
                    Ok(valid) => valid,
                    Err(error) => return Self::reject(state, error),
                };

                let id = TaskId::next(env.clock.now(), state.last_id());
                let event = TodoAction::TaskAdded {
                    task: Task::new(id, title, due_date),
                };
                Self::apply_event(state, &event);

                smallvec![Self::persist(state, env)]
            },

            TodoAction::ToggleTask { id } => {
                Self::begin_command(state);
                if !state.exists(id) {
                    tracing::debug!(%id, "Toggle for unknown task ignored");
                    return SmallVec::new();
                }

                Self::apply_event(state, &TodoAction::TaskToggled { id });
                smallvec![Self::persist(state, env)]
            },

            TodoAction::DeleteTask { id } => {
                Self::begin_command(state);
                if !state.exists(id) {
                    tracing::debug!(%id, "Delete for unknown task ignored");
                    return SmallVec::new();
                }

                Self::apply_event(state, &TodoAction::TaskDeleted { id });
                smallvec![Self::persist(state, env)]
            },

            TodoAction::DeleteAllTasks => {
                Self::begin_command(state);
                Self::apply_event(state, &TodoAction::AllTasksDeleted);
                smallvec![Self::persist(state, env)]
            },

            TodoAction::SelectFilter { filter } => {
                Self::begin_command(state);
                match filter.parse::<Filter>() {
                    Ok(filter) => {
                        Self::apply_event(state, &TodoAction::FilterSelected { filter });
                        SmallVec::new()
                    },
                    Err(error) => Self::reject(state, error),
                }
            },

            // ========== Events ==========
            TodoAction::TasksLoaded { .. }
            | TodoAction::TaskAdded { .. }
            | TodoAction::TaskToggled { .. }
            | TodoAction::TaskDeleted { .. }
            | TodoAction::AllTasksDeleted
            | TodoAction::FilterSelected { .. }
            | TodoAction::ValidationFailed { .. }
            | TodoAction::TasksPersisted
            | TodoAction::PersistFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::DATE_FORMAT;
    use tasklist_testing::{InMemoryStorage, ReducerTest, assertions, test_clock};

    fn create_test_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(test_clock()), Arc::new(InMemoryStorage::new()))
    }

    fn task(id: u64, title: &str, completed: bool) -> Task {
        Task {
            completed,
            ..Task::new(
                TaskId::new(id),
                title.to_string(),
                NaiveDate::parse_from_str("2024-01-15", DATE_FORMAT).unwrap(),
            )
        }
    }

    #[test]
    fn test_add_task_success() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::AddTask {
                title: "  Buy milk ".to_string(),
                due_date: "2024-01-15".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 1);
                let task = &state.tasks[0];
                assert_eq!(task.title, "Buy milk");
                assert_eq!(task.due_date.to_string(), "2024-01-15");
                assert!(!task.completed);
                assert_eq!(state.last_error, None);
            })
            .then_effects(|effects| {
                assertions::assert_has_storage_write(effects);
                let written = assertions::written_value(effects).unwrap();
                assert!(written.contains(r#""title":"Buy milk""#));
            })
            .run();
    }

    #[test]
    fn test_add_task_ids_are_unique_under_fixed_clock() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::AddTask {
                title: "first".to_string(),
                due_date: "2024-01-15".to_string(),
            })
            .when_action(TodoAction::AddTask {
                title: "second".to_string(),
                due_date: "2024-01-16".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 2);
                assert!(state.tasks[0].id < state.tasks[1].id);
            })
            .run();
    }

    #[test]
    fn test_add_task_empty_title() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::AddTask {
                title: "   ".to_string(),
                due_date: "2024-01-15".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 0);
                assert_eq!(state.last_error, Some(ValidationError::EmptyTitle));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_task_invalid_date() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::AddTask {
                title: "Buy milk".to_string(),
                due_date: "15/01/2024".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 0);
                assert!(matches!(
                    state.last_error,
                    Some(ValidationError::InvalidDueDate(_))
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_toggle_flips_and_persists() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::with_tasks(vec![task(1, "a", false)]))
            .when_action(TodoAction::ToggleTask { id: TaskId::new(1) })
            .then_state(|state| assert!(state.tasks[0].completed))
            .then_effects(assertions::assert_has_storage_write)
            .run();
    }

    #[test]
    fn test_toggle_unknown_task_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::with_tasks(vec![task(1, "a", false)]))
            .when_action(TodoAction::ToggleTask { id: TaskId::new(99) })
            .then_state(|state| {
                assert!(!state.tasks[0].completed);
                assert_eq!(state.last_error, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_delete_preserves_order_of_rest() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::with_tasks(vec![
                task(1, "a", false),
                task(2, "b", true),
                task(3, "c", false),
            ]))
            .when_action(TodoAction::DeleteTask { id: TaskId::new(2) })
            .then_state(|state| {
                let titles: Vec<_> = state.tasks.iter().map(|t| t.title.as_str()).collect();
                assert_eq!(titles, vec!["a", "c"]);
            })
            .then_effects(assertions::assert_has_storage_write)
            .run();
    }

    #[test]
    fn test_delete_all_persists_even_when_empty() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::DeleteAllTasks)
            .then_state(|state| assert_eq!(state.count(), 0))
            .then_effects(|effects| {
                assertions::assert_has_storage_write(effects);
                assert_eq!(assertions::written_value(effects).as_deref(), Some("[]"));
            })
            .run();
    }

    #[test]
    fn test_select_filter_does_not_persist() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::SelectFilter {
                filter: "completed".to_string(),
            })
            .then_state(|state| assert_eq!(state.filter, Filter::Completed))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_select_unknown_filter_is_rejected() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::SelectFilter {
                filter: "urgent".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.filter, Filter::All);
                assert_eq!(
                    state.last_error,
                    Some(ValidationError::InvalidFilter("urgent".to_string()))
                );
            })
            .run();
    }

    #[test]
    fn test_load_reads_storage() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::LoadTasks)
            .then_effects(assertions::assert_has_storage_read)
            .run();
    }

    #[test]
    fn test_loaded_tasks_replace_list_but_not_filter() {
        let mut state = TodoState::with_tasks(vec![task(1, "old", false)]);
        state.filter = Filter::Pending;

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(TodoAction::TasksLoaded {
                tasks: vec![task(7, "new", true)],
            })
            .then_state(|state| {
                assert_eq!(state.tasks, vec![task(7, "new", true)]);
                assert_eq!(state.filter, Filter::Pending);
            })
            .run();
    }

    #[test]
    fn test_persist_failure_is_recorded() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::PersistFailed {
                error: "quota exceeded".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.persistence_error.as_deref(), Some("quota exceeded"));
            })
            .run();
    }
}
