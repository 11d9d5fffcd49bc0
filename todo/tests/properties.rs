//! Property tests for the task store.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::sync::Arc;
use tasklist_testing::{InMemoryStorage, test_clock};
use todo::{TodoEnvironment, TodoError, TodoStore};

fn open(storage: &InMemoryStorage) -> TodoStore {
    TodoStore::open(TodoEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(storage.clone()),
    ))
}

fn title() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,12}[a-zA-Z0-9][a-zA-Z0-9 ]{0,12}"
}

fn due_date() -> impl Strategy<Value = String> {
    (2000i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
}

/// A list of tasks to add, each with whether to complete it
fn seeded_tasks() -> impl Strategy<Value = Vec<(String, String, bool)>> {
    prop::collection::vec((title(), due_date(), any::<bool>()), 0..12)
}

fn seed(store: &mut TodoStore, tasks: &[(String, String, bool)]) {
    for (title, due, completed) in tasks {
        let task = store.add(title, due).unwrap();
        if *completed {
            store.toggle_completed(task.id).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn add_grows_list_by_one_pending_task(tasks in seeded_tasks(), title in title(), due in due_date()) {
        let storage = InMemoryStorage::new();
        let mut store = open(&storage);
        seed(&mut store, &tasks);
        let before = store.len();

        let task = store.add(&title, &due).unwrap();

        prop_assert_eq!(store.len(), before + 1);
        prop_assert!(!task.completed);
        prop_assert_eq!(task.title, title.trim());
        prop_assert_eq!(task.due_date.format("%Y-%m-%d").to_string(), due);
    }

    #[test]
    fn blank_title_is_rejected(tasks in seeded_tasks(), blank in "[ \t]{0,6}", due in due_date()) {
        let storage = InMemoryStorage::new();
        let mut store = open(&storage);
        seed(&mut store, &tasks);
        let before = store.tasks();

        let result = store.add(&blank, &due);

        prop_assert!(matches!(result, Err(TodoError::Validation(_))));
        prop_assert_eq!(store.tasks(), before);
    }

    #[test]
    fn toggle_is_an_involution(tasks in seeded_tasks().prop_filter("non-empty", |t| !t.is_empty()), pick in any::<prop::sample::Index>()) {
        let storage = InMemoryStorage::new();
        let mut store = open(&storage);
        seed(&mut store, &tasks);
        let before = store.tasks();
        let id = before[pick.index(before.len())].id;

        store.toggle_completed(id).unwrap();
        store.toggle_completed(id).unwrap();

        prop_assert_eq!(store.tasks(), before);
    }

    #[test]
    fn filters_partition_the_list_in_order(tasks in seeded_tasks()) {
        let storage = InMemoryStorage::new();
        let mut store = open(&storage);
        seed(&mut store, &tasks);

        let seeded: Vec<(String, bool)> = tasks
            .iter()
            .map(|(title, _, completed)| (title.trim().to_string(), *completed))
            .collect();
        let shown = |store: &TodoStore| -> Vec<(String, bool)> {
            store.visible_tasks().into_iter().map(|t| (t.title, t.completed)).collect()
        };

        store.set_filter("all").unwrap();
        prop_assert_eq!(shown(&store), seeded.clone());

        store.set_filter("pending").unwrap();
        let pending: Vec<_> = seeded.iter().filter(|(_, done)| !done).cloned().collect();
        prop_assert_eq!(shown(&store), pending.clone());

        store.set_filter("completed").unwrap();
        let completed: Vec<_> = seeded.iter().filter(|(_, done)| *done).cloned().collect();
        prop_assert_eq!(shown(&store), completed.clone());

        prop_assert_eq!(store.pending_count(), pending.len());
        prop_assert_eq!(store.completed_count(), completed.len());
    }

    #[test]
    fn reload_restores_list(tasks in seeded_tasks()) {
        let storage = InMemoryStorage::new();
        let mut store = open(&storage);
        seed(&mut store, &tasks);

        prop_assert_eq!(open(&storage).tasks(), store.tasks());
    }

    #[test]
    fn delete_all_always_empties(tasks in seeded_tasks()) {
        let storage = InMemoryStorage::new();
        let mut store = open(&storage);
        seed(&mut store, &tasks);

        store.delete_all().unwrap();

        prop_assert!(store.is_empty());
        prop_assert!(open(&storage).is_empty());
    }
}
