//! Line-oriented terminal front end for [`TodoView`].

use crate::dialogs::Dialogs;
use crate::types::{Filter, TaskId};
use crate::view::{TodoView, ViewCommand};
use std::io::{self, Write};
use thiserror::Error;

const DUE_FLAG: &str = "--due";

const HELP: &str = "\
Commands:
  add <title...> [--due YYYY-MM-DD]   add a task (due today by default)
  done <n> | undo <n> | toggle <n>    flip the task at position n
  delete <n> | rm <n>                 delete the task at position n
  clear | delete-all                  delete every task
  filter <all|pending|completed>      choose which tasks are shown
  all | pending | completed           same as filter <name>
  list                                show the list again
  help                                show this help
  quit | exit                         leave";

/// A line of input that could not be turned into a command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// First word is not a known command
    #[error("Unknown command '{0}' (type 'help' for a list)")]
    UnknownCommand(String),

    /// Command needs an argument that was not given
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        /// Command as typed
        command: String,
        /// What is missing
        argument: &'static str,
    },

    /// `--due` repeated or followed by more than one word
    #[error("'--due <date>' may be given once, at the end of the line")]
    MisplacedDueDate,

    /// Position is not a positive whole number
    #[error("'{0}' is not a task position")]
    InvalidPosition(String),

    /// Position is valid but the frame has no task there
    #[error("No task at position {0}")]
    NoTaskAtPosition(usize),
}

/// A parsed line of input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Add a task; `None` uses the form's date
    Add {
        /// Title as typed, without surrounding whitespace
        title: String,
        /// Due date from `--due`
        due_date: Option<String>,
    },
    /// Toggle the task at a displayed position
    Toggle(usize),
    /// Delete the task at a displayed position
    Delete(usize),
    /// Delete every task
    DeleteAll,
    /// Select a filter by name
    Filter(String),
    /// Re-render
    List,
    /// Print help
    Help,
    /// Leave the shell
    Quit,
}

impl ShellCommand {
    /// Parses one input line; blank lines yield `None`
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] for an unknown command, a missing argument, a
    /// misplaced `--due` or a position that is not a positive number.
    pub fn parse(line: &str) -> Result<Option<Self>, InputError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let parsed = match command.to_ascii_lowercase().as_str() {
            "add" => {
                let raw = line.trim_start().get(command.len()..).unwrap_or_default();
                Self::parse_add(raw)?
            },
            "done" | "undo" | "toggle" => Self::Toggle(position(command, &rest)?),
            "delete" | "rm" => Self::Delete(position(command, &rest)?),
            "clear" | "delete-all" => Self::DeleteAll,
            "filter" => match rest.first() {
                Some(name) => Self::Filter((*name).to_string()),
                None => {
                    return Err(InputError::MissingArgument {
                        command: command.to_string(),
                        argument: "a filter name",
                    });
                },
            },
            "list" | "ls" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            name if name.parse::<Filter>().is_ok() => Self::Filter(command.to_string()),
            _ => return Err(InputError::UnknownCommand(command.to_string())),
        };
        Ok(Some(parsed))
    }

    /// `rest` is the raw text after `add`; a due date may only be given
    /// once, as the final `--due <date>` pair
    fn parse_add(rest: &str) -> Result<Self, InputError> {
        let words: Vec<&str> = rest.split_whitespace().collect();
        let flags = words.iter().filter(|w| **w == DUE_FLAG).count();
        if flags == 0 {
            return Ok(Self::Add {
                title: rest.trim().to_string(),
                due_date: None,
            });
        }

        match words.as_slice() {
            [.., last] if *last == DUE_FLAG && flags == 1 => Err(InputError::MissingArgument {
                command: "add --due".to_string(),
                argument: "a date",
            }),
            [.., flag, date] if *flag == DUE_FLAG && flags == 1 => {
                let title = rest
                    .trim_end()
                    .strip_suffix(*date)
                    .and_then(|head| head.trim_end().strip_suffix(DUE_FLAG))
                    .ok_or(InputError::MisplacedDueDate)?;
                Ok(Self::Add {
                    title: title.trim().to_string(),
                    due_date: Some((*date).to_string()),
                })
            },
            _ => Err(InputError::MisplacedDueDate),
        }
    }
}

fn position(command: &str, words: &[&str]) -> Result<usize, InputError> {
    let Some(raw) = words.first() else {
        return Err(InputError::MissingArgument {
            command: command.to_string(),
            argument: "a task position",
        });
    };
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(InputError::InvalidPosition((*raw).to_string())),
    }
}

/// Whether the shell should keep reading input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runs the shell until `quit` or the end of `input`
///
/// The view is initialized first and the frame is printed after every
/// command. Input errors are printed and never end the session.
///
/// # Errors
///
/// Returns an I/O error if reading `input` or writing `output` fails.
pub fn run_shell<D, I, W>(view: &mut TodoView<'_, D>, input: I, mut output: W) -> io::Result<()>
where
    D: Dialogs,
    I: IntoIterator<Item = io::Result<String>>,
    W: Write,
{
    view.initialize();
    writeln!(output, "{}", view.frame())?;
    write!(output, "> ")?;
    output.flush()?;

    for line in input {
        let line = line?;
        let flow = match ShellCommand::parse(&line) {
            Ok(None) => Flow::Continue,
            Ok(Some(command)) => match execute(view, command, &mut output)? {
                Ok(flow) => flow,
                Err(error) => {
                    writeln!(output, "{error}")?;
                    Flow::Continue
                },
            },
            Err(error) => {
                tracing::debug!(%error, input = %line, "Unparseable input");
                writeln!(output, "{error}")?;
                Flow::Continue
            },
        };
        if flow == Flow::Quit {
            return Ok(());
        }

        writeln!(output, "{}", view.frame())?;
        write!(output, "> ")?;
        output.flush()?;
    }

    writeln!(output)?;
    Ok(())
}

/// Lines of process stdin, read one at a time
///
/// Each line is read through the shared stdin handle without holding its
/// lock, so [`TerminalDialogs`](crate::TerminalDialogs) can read
/// confirmation answers from the same stream in between.
pub fn stdin_lines() -> impl Iterator<Item = io::Result<String>> {
    std::iter::from_fn(|| {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(Ok(line)),
            Err(error) => Some(Err(error)),
        }
    })
}

fn execute<D: Dialogs, W: Write>(
    view: &mut TodoView<'_, D>,
    command: ShellCommand,
    output: &mut W,
) -> io::Result<Result<Flow, InputError>> {
    let command = match command {
        ShellCommand::Add { title, due_date } => {
            let due_date = due_date.unwrap_or_else(|| view.form().due_date.clone());
            ViewCommand::Submit { title, due_date }
        },
        ShellCommand::Toggle(position) => match lookup(view, position) {
            Ok(id) => ViewCommand::Toggle { id },
            Err(error) => return Ok(Err(error)),
        },
        ShellCommand::Delete(position) => match lookup(view, position) {
            Ok(id) => ViewCommand::Delete { id },
            Err(error) => return Ok(Err(error)),
        },
        ShellCommand::DeleteAll => ViewCommand::DeleteAll,
        ShellCommand::Filter(filter) => ViewCommand::SelectFilter { filter },
        ShellCommand::List => ViewCommand::Refresh,
        ShellCommand::Help => {
            writeln!(output, "{HELP}")?;
            return Ok(Ok(Flow::Continue));
        },
        ShellCommand::Quit => return Ok(Ok(Flow::Quit)),
    };
    view.dispatch(command);
    Ok(Ok(Flow::Continue))
}

fn lookup<D: Dialogs>(view: &TodoView<'_, D>, position: usize) -> Result<TaskId, InputError> {
    view.frame()
        .task_at(position)
        .ok_or(InputError::NoTaskAtPosition(position))
}
