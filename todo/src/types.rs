//! Domain types for the task list.
//!
//! A task list is an ordered sequence of tasks plus a transient filter. The
//! sequence is the only durable state; everything displayed is derived from
//! it.

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Calendar format used for due dates in input and storage
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar format used when displaying due dates
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Unique identifier for a task
///
/// The creation time in milliseconds since the Unix epoch, nudged forward
/// when needed so ids in one list are strictly increasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Id for a task created at `now` in a list whose largest id is `last`
    ///
    /// ```
    /// use chrono::DateTime;
    /// use todo::TaskId;
    ///
    /// let now = DateTime::from_timestamp_millis(1_000).unwrap();
    /// assert_eq!(TaskId::next(now, None), TaskId::new(1_000));
    /// assert_eq!(TaskId::next(now, Some(TaskId::new(1_000))), TaskId::new(1_001));
    /// ```
    #[must_use]
    pub fn next(now: DateTime<Utc>, last: Option<Self>) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        match last {
            Some(Self(prev)) if prev >= millis => Self(prev.saturating_add(1)),
            _ => Self(millis),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single task
///
/// Serialized as `{id, title, date, completed}`, the record layout of the
/// stored task list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// What needs doing
    pub title: String,
    /// When it is due
    #[serde(rename = "date")]
    pub due_date: NaiveDate,
    /// Whether the task is done
    pub completed: bool,
}

impl Task {
    /// Creates a new pending task
    #[must_use]
    pub const fn new(id: TaskId, title: String, due_date: NaiveDate) -> Self {
        Self {
            id,
            title,
            due_date,
            completed: false,
        }
    }

    /// Due date in display form (`MM/DD/YYYY`)
    #[must_use]
    pub fn display_date(&self) -> String {
        self.due_date.format(DISPLAY_DATE_FORMAT).to_string()
    }
}

/// Which tasks the view shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Every task
    #[default]
    All,
    /// Tasks not yet completed
    Pending,
    /// Completed tasks
    Completed,
}

impl Filter {
    /// Every filter, in display order
    pub const ALL: [Self; 3] = [Self::All, Self::Pending, Self::Completed];

    /// Whether `task` passes this filter
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }

    /// Lowercase name, as typed by the user
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ValidationError::InvalidFilter(name.to_string()))
    }
}

/// State of the task list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// All tasks in insertion order
    pub tasks: Vec<Task>,
    /// Active filter (never persisted)
    pub filter: Filter,
    /// Validation failure of the last command, if any
    pub last_error: Option<ValidationError>,
    /// Storage failure of the last command, if any
    pub persistence_error: Option<String>,
}

impl TodoState {
    /// Creates a new empty state with the `all` filter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `tasks`
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    /// Returns the number of tasks
    #[must_use]
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Returns the number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Returns the number of pending tasks
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.count() - self.completed_count()
    }

    /// Returns a task by ID
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Checks if a task exists
    #[must_use]
    pub fn exists(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Largest id in the list
    #[must_use]
    pub fn last_id(&self) -> Option<TaskId> {
        self.tasks.iter().map(|t| t.id).max()
    }

    /// Tasks passing the active filter, in list order
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        let filter = self.filter;
        self.tasks.iter().filter(move |t| filter.matches(t))
    }
}

/// Actions representing commands and events for the task list
///
/// Commands are validated by the reducer and produce events; events are
/// applied to state. Storage outcomes come back as events too.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Read the persisted task list
    LoadTasks,

    /// Command: Add a task (raw user input, validated by the reducer)
    AddTask {
        /// Title as typed
        title: String,
        /// Due date as typed (`YYYY-MM-DD`)
        due_date: String,
    },

    /// Command: Flip a task between pending and completed
    ToggleTask {
        /// Task to toggle
        id: TaskId,
    },

    /// Command: Delete one task
    DeleteTask {
        /// Task to delete
        id: TaskId,
    },

    /// Command: Delete every task
    DeleteAllTasks,

    /// Command: Change the active filter
    SelectFilter {
        /// Filter name as typed
        filter: String,
    },

    // ========== Events ==========
    /// Event: Persisted tasks were read (empty when absent or unreadable)
    TasksLoaded {
        /// Loaded tasks, in stored order
        tasks: Vec<Task>,
    },

    /// Event: Task was added
    TaskAdded {
        /// The new task
        task: Task,
    },

    /// Event: Task completion was flipped
    TaskToggled {
        /// Task identifier
        id: TaskId,
    },

    /// Event: Task was deleted
    TaskDeleted {
        /// Task identifier
        id: TaskId,
    },

    /// Event: All tasks were deleted
    AllTasksDeleted,

    /// Event: Filter changed
    FilterSelected {
        /// New filter
        filter: Filter,
    },

    /// Event: Command validation failed
    ValidationFailed {
        /// What was wrong
        error: ValidationError,
    },

    /// Event: Task list written to storage
    TasksPersisted,

    /// Event: Task list could not be written to storage
    PersistFailed {
        /// Storage failure description
        error: String,
    },
}

/// Why a stored value was not accepted as a task list
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Not a JSON array of task records
    #[error("not a task list: {0}")]
    Json(#[from] serde_json::Error),

    /// A record has a blank title
    #[error("task {0} has an empty title")]
    EmptyTitle(TaskId),

    /// Two records share an id
    #[error("task id {0} appears more than once")]
    DuplicateId(TaskId),
}

/// Serializes tasks into the stored representation
///
/// # Errors
///
/// Returns the serializer error; cannot happen for well-formed tasks.
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tasks)
}

/// Parses the stored representation back into tasks
///
/// # Errors
///
/// Returns [`DecodeError`] when the value is not a JSON array of
/// `{id, title, date, completed}` records, a title is blank, or ids repeat.
pub fn decode_tasks(raw: &str) -> Result<Vec<Task>, DecodeError> {
    let tasks: Vec<Task> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if task.title.trim().is_empty() {
            return Err(DecodeError::EmptyTitle(task.id));
        }
        if !seen.insert(task.id) {
            return Err(DecodeError::DuplicateId(task.id));
        }
    }
    Ok(tasks)
}

/// Parses a user-supplied due date
///
/// # Errors
///
/// [`ValidationError::EmptyDueDate`] for blank input,
/// [`ValidationError::InvalidDueDate`] for anything that is not a calendar
/// date in `YYYY-MM-DD` form.
pub fn parse_due_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::EmptyDueDate);
    }
    let invalid = || ValidationError::InvalidDueDate(input.to_string());
    let date = NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| invalid())?;
    // chrono also accepts unpadded and signed fields
    if date.format(DATE_FORMAT).to_string() != input {
        return Err(invalid());
    }
    Ok(date)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn task(id: u64, title: &str, completed: bool) -> Task {
        Task {
            completed,
            ..Task::new(TaskId::new(id), title.to_string(), date("2024-01-15"))
        }
    }

    #[test]
    fn task_id_follows_clock() {
        let now = DateTime::from_timestamp_millis(5_000).unwrap();
        assert_eq!(TaskId::next(now, Some(TaskId::new(4_000))), TaskId::new(5_000));
    }

    #[test]
    fn task_id_never_goes_backwards() {
        let now = DateTime::from_timestamp_millis(5_000).unwrap();
        assert_eq!(TaskId::next(now, Some(TaskId::new(9_000))), TaskId::new(9_001));
    }

    #[test]
    fn display_date_is_month_first() {
        assert_eq!(task(1, "Buy milk", false).display_date(), "01/15/2024");
    }

    #[test]
    fn task_serializes_as_stored_record() {
        let json = serde_json::to_string(&task(1_705_312_800_000, "Buy milk", false)).unwrap();
        assert_eq!(
            json,
            r#"{"id":1705312800000,"title":"Buy milk","date":"2024-01-15","completed":false}"#
        );
    }

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!(" Pending ".parse::<Filter>(), Ok(Filter::Pending));
        assert_eq!("COMPLETED".parse::<Filter>(), Ok(Filter::Completed));
        assert_eq!(
            "done".parse::<Filter>(),
            Err(ValidationError::InvalidFilter("done".to_string()))
        );
    }

    #[test]
    fn visible_tasks_respect_filter() {
        let mut state = TodoState::with_tasks(vec![
            task(1, "a", true),
            task(2, "b", false),
            task(3, "c", true),
        ]);

        state.filter = Filter::Completed;
        let ids: Vec<_> = state.visible_tasks().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![1, 3]);

        state.filter = Filter::Pending;
        let ids: Vec<_> = state.visible_tasks().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![2]);

        assert_eq!(state.pending_count(), 1);
        assert_eq!(state.completed_count(), 2);
        assert_eq!(state.last_id(), Some(TaskId::new(3)));
    }

    #[test]
    fn decode_accepts_stored_records() {
        let raw = r#"[{"id":1,"title":"Buy milk","date":"2024-01-15","completed":true}]"#;
        let tasks = decode_tasks(raw).unwrap();
        assert_eq!(tasks, vec![task(1, "Buy milk", true)]);
    }

    #[test]
    fn decode_rejects_malformed_values() {
        assert!(matches!(decode_tasks("not json"), Err(DecodeError::Json(_))));
        assert!(matches!(decode_tasks("null"), Err(DecodeError::Json(_))));
        assert!(matches!(decode_tasks(r#"{"id":1}"#), Err(DecodeError::Json(_))));
        assert!(matches!(
            decode_tasks(r#"[{"id":1,"title":"x","date":"2024-02-30","completed":false}]"#),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_tasks(r#"[{"id":1,"title":"  ","date":"2024-01-15","completed":false}]"#),
            Err(DecodeError::EmptyTitle(_))
        ));
        assert!(matches!(
            decode_tasks(
                r#"[{"id":1,"title":"a","date":"2024-01-15","completed":false},
                    {"id":1,"title":"b","date":"2024-01-16","completed":false}]"#
            ),
            Err(DecodeError::DuplicateId(_))
        ));
    }

    #[test]
    fn due_date_validation() {
        assert_eq!(parse_due_date("2024-01-15"), Ok(date("2024-01-15")));
        assert_eq!(parse_due_date("   "), Err(ValidationError::EmptyDueDate));
        assert_eq!(
            parse_due_date("2024-13-01"),
            Err(ValidationError::InvalidDueDate("2024-13-01".to_string()))
        );
        assert!(parse_due_date("tomorrow").is_err());
        for loose in ["2024-1-5", "+2024-01-15", "2024-01-5", "02024-01-15"] {
            assert_eq!(
                parse_due_date(loose),
                Err(ValidationError::InvalidDueDate(loose.to_string())),
                "{loose:?}"
            );
        }
        assert_eq!(parse_due_date(" 2024-01-15 "), Ok(date("2024-01-15")));
    }
}
