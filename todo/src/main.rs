//! Terminal task list.
//!
//! Reads commands from stdin and keeps the list in a JSON file
//! (`TODO_STORAGE_PATH`, default `todos.json`).

use anyhow::Context;
use metrics::{Unit, describe_counter};
use std::io;
use std::sync::Arc;
use tasklist_core::environment::SystemClock;
use tasklist_core::storage::StorageKey;
use tasklist_runtime::metrics::register_metrics;
use todo::shell::stdin_lines;
use todo::{Config, FileStorage, TerminalDialogs, TodoEnvironment, TodoStore, TodoView, run_shell};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config);
    register_metrics();
    describe_counter!(
        "todo.validation.failures",
        Unit::Count,
        "Commands rejected by input validation, by field"
    );

    let storage_key: StorageKey = config
        .storage
        .key
        .parse()
        .context("TODO_STORAGE_KEY is not a usable storage key")?;
    info!(
        path = %config.storage.path.display(),
        key = %storage_key,
        "Configuration loaded"
    );

    let storage = Arc::new(FileStorage::new(&config.storage.path));
    let env = TodoEnvironment::new(Arc::new(SystemClock), storage).with_storage_key(storage_key);
    let mut store = TodoStore::new(env);

    let mut view = TodoView::new(&mut store, TerminalDialogs::new());
    run_shell(&mut view, stdin_lines(), io::stdout().lock()).context("terminal I/O failed")?;

    info!(tasks = store.len(), "Session ended");
    Ok(())
}

fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
