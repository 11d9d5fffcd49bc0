//! Blocking alerts and confirmations shown by the view.

use std::collections::VecDeque;
use std::io::{self, Write};

/// Modal user interaction
///
/// Both calls block until the user has responded. The view performs no
/// mutation until [`confirm`](Dialogs::confirm) returns `true`.
pub trait Dialogs {
    /// Shows `message` and waits for acknowledgement
    fn alert(&mut self, message: &str);

    /// Asks a yes/no question; `true` means go ahead
    fn confirm(&mut self, message: &str) -> bool;
}

impl<D: Dialogs + ?Sized> Dialogs for &mut D {
    fn alert(&mut self, message: &str) {
        (**self).alert(message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }
}

/// Dialogs on the process terminal
///
/// Alerts and prompts go to stdout; answers are read line by line from
/// stdin. Only `y` or `yes` (any case) confirms.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalDialogs;

impl TerminalDialogs {
    /// Creates terminal dialogs
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialogs for TerminalDialogs {
    fn alert(&mut self, message: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(error) = writeln!(stdout, "! {message}") {
            tracing::warn!(%error, "Failed to show alert");
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        {
            let mut stdout = io::stdout().lock();
            if let Err(error) = write!(stdout, "{message} [y/N] ").and_then(|()| stdout.flush()) {
                tracing::warn!(%error, "Failed to show confirmation");
                return false;
            }
        }

        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(0) => false,
            Ok(_) => is_affirmative(&answer),
            Err(error) => {
                tracing::warn!(%error, "Failed to read confirmation");
                false
            },
        }
    }
}

/// Whether a typed answer confirms
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Dialogs driven by a queue of prepared answers
///
/// Records every alert and confirmation prompt. A confirmation with no
/// queued answer declines.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDialogs {
    answers: VecDeque<bool>,
    alerts: Vec<String>,
    prompts: Vec<String>,
}

impl ScriptedDialogs {
    /// Creates dialogs with no queued answers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates dialogs answering confirmations in the given order
    #[must_use]
    pub fn with_answers(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Alerts shown so far, oldest first
    #[must_use]
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Confirmation prompts shown so far, oldest first
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Dialogs for ScriptedDialogs {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}
