//! Error types surfaced by the task store and the view.

use tasklist_runtime::StoreError;
use thiserror::Error;

/// A requested change was refused before touching any state.
///
/// The `Display` text is what the user sees in the blocking alert.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title was empty or only whitespace
    #[error("Please enter a task")]
    EmptyTitle,

    /// No due date was given
    #[error("Please select a date")]
    EmptyDueDate,

    /// Due date is not a calendar date in `YYYY-MM-DD` form
    #[error("Please select a valid date ('{0}' is not a YYYY-MM-DD date)")]
    InvalidDueDate(String),

    /// Filter name is not one of `all`, `pending`, `completed`
    #[error("Unknown filter '{0}' (expected all, pending or completed)")]
    InvalidFilter(String),
}

impl ValidationError {
    /// Which input the error is about, for logging
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::EmptyDueDate | Self::InvalidDueDate(_) => "due_date",
            Self::InvalidFilter(_) => "filter",
        }
    }
}

/// Errors returned by [`TodoStore`](crate::TodoStore) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// The input was rejected; nothing changed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The change was applied in memory but could not be written to storage
    #[error("Change applied but not saved: {reason}")]
    Persistence {
        /// Storage failure description
        reason: String,
    },

    /// The runtime refused to finish processing the request
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    /// Whether the in-memory state reflects the requested change
    #[must_use]
    pub const fn change_applied(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_alert_text() {
        assert_eq!(ValidationError::EmptyTitle.to_string(), "Please enter a task");
        assert_eq!(ValidationError::EmptyDueDate.to_string(), "Please select a date");
        assert!(
            ValidationError::InvalidDueDate("2024-13-01".into())
                .to_string()
                .contains("2024-13-01")
        );
    }

    #[test]
    fn validation_is_transparent() {
        let error = TodoError::from(ValidationError::EmptyTitle);
        assert_eq!(error.to_string(), "Please enter a task");
        assert!(!error.change_applied());
        assert_eq!(ValidationError::InvalidFilter("x".into()).field(), "filter");
    }

    #[test]
    fn persistence_keeps_change() {
        let error = TodoError::Persistence {
            reason: "quota exceeded".into(),
        };
        assert!(error.change_applied());
    }
}
