//! The task list view.
//!
//! [`TodoView`] turns [`ViewCommand`]s into store operations, asks for
//! confirmation before destructive ones, and rebuilds its [`Frame`] from
//! [`TodoStore::visible_tasks`] after every change.

use crate::dialogs::Dialogs;
use crate::error::TodoError;
use crate::store::TodoStore;
use crate::types::{DATE_FORMAT, Filter, Task, TaskId};
use std::fmt;

/// Shown in place of entries when no task passes the filter
pub const EMPTY_PLACEHOLDER: &str = "No task found";

const CONFIRM_DELETE: &str = "Are you sure you want to delete this task?";
const CONFIRM_DELETE_ALL: &str = "Are you sure you want to delete all tasks?";
const NOTHING_TO_DELETE: &str = "No tasks to delete";

/// A user intent entering the view
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewCommand {
    /// Add a task from the form
    Submit {
        /// Title as typed
        title: String,
        /// Due date as typed (`YYYY-MM-DD`)
        due_date: String,
    },
    /// Flip a task between pending and completed
    Toggle {
        /// Task to flip
        id: TaskId,
    },
    /// Delete one task after confirmation
    Delete {
        /// Task to delete
        id: TaskId,
    },
    /// Delete every task after confirmation
    DeleteAll,
    /// Switch the active filter
    SelectFilter {
        /// Filter name as typed
        filter: String,
    },
    /// Rebuild the frame without changing anything
    Refresh,
}

/// Draft input for a new task
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskForm {
    /// Title field
    pub title: String,
    /// Due date field (`YYYY-MM-DD`)
    pub due_date: String,
}

/// One filter control
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterControl {
    /// Filter this control selects
    pub filter: Filter,
    /// Whether this is the active filter
    pub active: bool,
}

/// One displayed task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskEntry {
    /// 1-based position in the frame
    pub position: usize,
    /// Task behind the entry
    pub id: TaskId,
    /// Title
    pub title: String,
    /// Due date as `MM/DD/YYYY`
    pub due_date: String,
    /// Completion flag
    pub completed: bool,
    /// Label of the toggle control
    pub toggle_label: &'static str,
    /// Label of the delete control
    pub delete_label: &'static str,
}

impl TaskEntry {
    fn new(position: usize, task: &Task) -> Self {
        Self {
            position,
            id: task.id,
            title: task.title.clone(),
            due_date: task.display_date(),
            completed: task.completed,
            toggle_label: if task.completed { "UNDO" } else { "DONE" },
            delete_label: "DELETE",
        }
    }
}

/// Body of a frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameBody {
    /// No task passes the filter
    Placeholder,
    /// Visible tasks in list order
    Entries(Vec<TaskEntry>),
}

/// What the view currently displays
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Filter controls, one per filter, exactly one active
    pub filters: [FilterControl; 3],
    /// Task entries or the placeholder
    pub body: FrameBody,
}

impl Frame {
    /// Builds a frame for `visible` tasks under `active`
    #[must_use]
    pub fn build(visible: &[Task], active: Filter) -> Self {
        let filters = Filter::ALL.map(|filter| FilterControl {
            filter,
            active: filter == active,
        });
        let body = if visible.is_empty() {
            FrameBody::Placeholder
        } else {
            FrameBody::Entries(
                visible
                    .iter()
                    .enumerate()
                    .map(|(index, task)| TaskEntry::new(index + 1, task))
                    .collect(),
            )
        };
        Self { filters, body }
    }

    /// Displayed entries; empty for the placeholder
    #[must_use]
    pub fn entries(&self) -> &[TaskEntry] {
        match &self.body {
            FrameBody::Placeholder => &[],
            FrameBody::Entries(entries) => entries,
        }
    }

    /// Task displayed at 1-based `position`
    #[must_use]
    pub fn task_at(&self, position: usize) -> Option<TaskId> {
        position
            .checked_sub(1)
            .and_then(|index| self.entries().get(index))
            .map(|entry| entry.id)
    }

    /// Filter whose control is active
    #[must_use]
    pub fn active_filter(&self) -> Option<Filter> {
        self.filters.iter().find(|c| c.active).map(|c| c.filter)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let controls: Vec<String> = self
            .filters
            .iter()
            .map(|c| {
                if c.active {
                    format!("[{}]", c.filter.as_str().to_uppercase())
                } else {
                    c.filter.as_str().to_string()
                }
            })
            .collect();
        writeln!(f, "Filter: {}", controls.join(" "))?;

        match &self.body {
            FrameBody::Placeholder => writeln!(f, "  {EMPTY_PLACEHOLDER}"),
            FrameBody::Entries(entries) => {
                for entry in entries {
                    writeln!(
                        f,
                        "{:>3}. [{}] {}  {}  ({}) ({})",
                        entry.position,
                        if entry.completed { "x" } else { " " },
                        entry.title,
                        entry.due_date,
                        entry.toggle_label,
                        entry.delete_label,
                    )?;
                }
                Ok(())
            },
        }
    }
}

/// Task list view over a borrowed store
pub struct TodoView<'s, D> {
    store: &'s mut TodoStore,
    dialogs: D,
    form: TaskForm,
    frame: Frame,
}

impl<'s, D: Dialogs> TodoView<'s, D> {
    /// Creates a view showing the store's current contents
    pub fn new(store: &'s mut TodoStore, dialogs: D) -> Self {
        let frame = Frame::build(&store.visible_tasks(), store.filter());
        Self {
            store,
            dialogs,
            form: TaskForm::default(),
            frame,
        }
    }

    /// Loads the persisted list, renders it and dates the form today
    pub fn initialize(&mut self) {
        self.store.load();
        self.render();
        self.form.due_date = self.store.today().format(DATE_FORMAT).to_string();
    }

    /// Routes a command to its handler
    pub fn dispatch(&mut self, command: ViewCommand) {
        tracing::debug!(?command, "View command");
        match command {
            ViewCommand::Submit { title, due_date } => self.handle_submit(&title, &due_date),
            ViewCommand::Toggle { id } => self.handle_toggle(id),
            ViewCommand::Delete { id } => self.handle_delete(id),
            ViewCommand::DeleteAll => self.handle_delete_all(),
            ViewCommand::SelectFilter { filter } => self.handle_filter_select(&filter),
            ViewCommand::Refresh => self.render(),
        }
    }

    /// Adds a task from the form fields
    ///
    /// A rejected input is alerted and the frame stays as it was.
    pub fn handle_submit(&mut self, title: &str, due_date: &str) {
        self.form.title = title.to_string();
        self.form.due_date = due_date.to_string();

        match self.store.add(title, due_date) {
            Ok(task) => {
                tracing::debug!(id = %task.id, "Task submitted");
                self.form.title.clear();
                self.render();
            },
            Err(TodoError::Validation(error)) => self.dialogs.alert(&error.to_string()),
            Err(error) => {
                self.form.title.clear();
                self.report(&error);
            },
        }
    }

    /// Flips task `id` between pending and completed
    pub fn handle_toggle(&mut self, id: TaskId) {
        match self.store.toggle_completed(id) {
            Ok(()) => self.render(),
            Err(error) => self.report(&error),
        }
    }

    /// Deletes task `id` once the user confirms
    pub fn handle_delete(&mut self, id: TaskId) {
        if !self.dialogs.confirm(CONFIRM_DELETE) {
            tracing::debug!(%id, "Delete declined");
            return;
        }
        match self.store.delete(id) {
            Ok(()) => self.render(),
            Err(error) => self.report(&error),
        }
    }

    /// Deletes every task once the user confirms
    pub fn handle_delete_all(&mut self) {
        if self.store.is_empty() {
            self.dialogs.alert(NOTHING_TO_DELETE);
            return;
        }
        if !self.dialogs.confirm(CONFIRM_DELETE_ALL) {
            tracing::debug!("Delete all declined");
            return;
        }
        match self.store.delete_all() {
            Ok(()) => self.render(),
            Err(error) => self.report(&error),
        }
    }

    /// Switches the active filter
    pub fn handle_filter_select(&mut self, filter: &str) {
        match self.store.set_filter(filter) {
            Ok(_) => self.render(),
            Err(error) => self.dialogs.alert(&error.to_string()),
        }
    }

    /// Rebuilds the frame from the store's visible tasks
    pub fn render(&mut self) {
        self.frame = Frame::build(&self.store.visible_tasks(), self.store.filter());
    }

    /// Current frame
    #[must_use]
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Draft form contents
    #[must_use]
    pub const fn form(&self) -> &TaskForm {
        &self.form
    }

    /// Store behind the view
    #[must_use]
    pub fn store(&self) -> &TodoStore {
        self.store
    }

    /// Dialogs the view talks through
    #[must_use]
    pub const fn dialogs(&self) -> &D {
        &self.dialogs
    }

    fn report(&mut self, error: &TodoError) {
        // The change may have happened even though the call failed
        self.render();
        let message = if error.change_applied() {
            format!("{error}. The change may be lost when the app restarts.")
        } else {
            error.to_string()
        };
        tracing::warn!(%error, "Operation did not complete cleanly");
        self.dialogs.alert(&message);
    }
}

impl<D> fmt::Debug for TodoView<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoView")
            .field("form", &self.form)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}
