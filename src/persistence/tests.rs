use super::*;
use crate::core::{Person, PersonDraft, Task, TaskDraft, TaskStatus};
use crate::notify::{ConfirmationQueue, NotificationCenter};
use std::collections::HashMap;
use std::time::Duration;

fn sample_task(title: &str) -> Task {
    Task::create(TaskDraft {
        title: title.to_string(),
        ..Default::default()
    })
}

fn sample_person(name: &str) -> Person {
    Person::create(PersonDraft {
        name: name.to_string(),
        role: "Engineer".to_string(),
    })
}

struct Fixture {
    _dir: tempfile::TempDir,
    durable: DurableStore,
    fallback: FallbackStore,
    durable_tasks_file: std::path::PathBuf,
    fallback_file: std::path::PathBuf,
}

fn fixture() -> Fixture {
    fixture_with_quota(fallback::DEFAULT_QUOTA_BYTES)
}

fn fixture_with_quota(quota: usize) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let durable_dir = dir.path().join("durable");
    let fallback_file = dir.path().join("fallback.json");
    Fixture {
        durable: DurableStore::new(&durable_dir),
        fallback: FallbackStore::open(&fallback_file, quota),
        durable_tasks_file: durable_dir.join("kv").join("tasks.json"),
        fallback_file,
        _dir: dir,
    }
}

fn store_from(fx: &Fixture) -> PersistenceStore {
    PersistenceStore::new(
        fx.durable.clone(),
        fx.fallback.clone(),
        NotificationCenter::new(),
    )
}

#[tokio::test]
async fn durable_set_then_get_round_trips() {
    let fx = fixture();
    let tasks = vec![sample_task("one"), sample_task("two")];

    fx.durable.set(TASKS_KEY, &tasks).await.unwrap();
    let loaded: Option<Vec<Task>> = fx.durable.get(TASKS_KEY).await.unwrap();

    assert_eq!(loaded.unwrap(), tasks);
}

#[tokio::test]
async fn durable_get_of_unset_key_is_none() {
    let fx = fixture();
    let loaded: Option<Vec<Task>> = fx.durable.get("nothing-here").await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn durable_corruption_is_a_read_error() {
    let fx = fixture();
    std::fs::create_dir_all(fx.durable_tasks_file.parent().unwrap()).unwrap();
    std::fs::write(&fx.durable_tasks_file, b"{ not json").unwrap();

    let result = fx.durable.get::<Vec<Task>>(TASKS_KEY).await;
    assert!(matches!(result, Err(StorageError::ReadFailed { .. })));
}

#[tokio::test]
async fn fallback_values_are_json_text_encoded() {
    let fx = fixture();
    let tasks = vec![sample_task("encode me")];
    fx.fallback.set(TASKS_KEY, &tasks).unwrap();

    // The backing file is a string-to-string map whose values hold
    // JSON text
    let raw = std::fs::read(&fx.fallback_file).unwrap();
    let entries: HashMap<String, String> = serde_json::from_slice(&raw).unwrap();
    let decoded: Vec<Task> = serde_json::from_str(&entries[TASKS_KEY]).unwrap();
    assert_eq!(decoded, tasks);

    let loaded: Option<Vec<Task>> = fx.fallback.get(TASKS_KEY).unwrap();
    assert_eq!(loaded.unwrap(), tasks);
}

#[tokio::test]
async fn fallback_rejects_writes_over_quota() {
    let fx = fixture_with_quota(64);
    let tasks = vec![sample_task("a title long enough to overflow the tiny quota")];

    let result = fx.fallback.set(TASKS_KEY, &tasks);
    assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));

    // The rejected write left no partial entry behind
    let loaded: Option<Vec<Task>> = fx.fallback.get(TASKS_KEY).unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn load_prefers_durable_over_fallback() {
    let fx = fixture();
    let durable_tasks = vec![sample_task("from durable")];
    let fallback_tasks = vec![sample_task("from fallback")];
    let durable_persons = vec![sample_person("Ayu")];
    fx.durable.set(TASKS_KEY, &durable_tasks).await.unwrap();
    fx.durable.set(PERSONS_KEY, &durable_persons).await.unwrap();
    fx.fallback.set(TASKS_KEY, &fallback_tasks).unwrap();

    let store = store_from(&fx);
    store.load().await;

    assert_eq!(store.tasks(), durable_tasks);
    assert_eq!(store.persons(), durable_persons);
}

#[tokio::test]
async fn load_falls_back_when_durable_is_corrupt() {
    let fx = fixture();
    let fallback_tasks = vec![sample_task("survivor")];
    fx.fallback.set(TASKS_KEY, &fallback_tasks).unwrap();
    std::fs::create_dir_all(fx.durable_tasks_file.parent().unwrap()).unwrap();
    std::fs::write(&fx.durable_tasks_file, b"][").unwrap();

    let store = store_from(&fx);
    store.load().await;

    assert_eq!(store.tasks(), fallback_tasks);
}

#[tokio::test]
async fn load_fails_open_to_empty_defaults() {
    let fx = fixture();
    let store = store_from(&fx);

    store.load().await;

    assert!(store.tasks().is_empty());
    assert!(store.persons().is_empty());
}

#[tokio::test]
async fn save_writes_both_backends() {
    let fx = fixture();
    let store = store_from(&fx);
    store
        .add_task(TaskDraft {
            title: "persist me".to_string(),
            ..Default::default()
        })
        .unwrap();
    store
        .add_person(PersonDraft {
            name: "Ayu".to_string(),
            role: "Lead".to_string(),
        })
        .unwrap();

    store.save().await;

    let durable_tasks: Vec<Task> = fx.durable.get(TASKS_KEY).await.unwrap().unwrap();
    let fallback_tasks: Vec<Task> = fx.fallback.get(TASKS_KEY).unwrap().unwrap();
    let durable_persons: Vec<Person> = fx.durable.get(PERSONS_KEY).await.unwrap().unwrap();
    assert_eq!(durable_tasks, store.tasks());
    assert_eq!(fallback_tasks, store.tasks());
    assert_eq!(durable_persons, store.persons());
}

#[tokio::test]
async fn repeated_saves_are_idempotent() {
    let fx = fixture();
    let store = store_from(&fx);
    store
        .add_task(TaskDraft {
            title: "stable".to_string(),
            ..Default::default()
        })
        .unwrap();

    store.save().await;
    let durable_first = std::fs::read(&fx.durable_tasks_file).unwrap();
    let fallback_first = std::fs::read(&fx.fallback_file).unwrap();

    store.save().await;
    let durable_second = std::fs::read(&fx.durable_tasks_file).unwrap();
    let fallback_second = std::fs::read(&fx.fallback_file).unwrap();

    assert_eq!(durable_first, durable_second);
    assert_eq!(fallback_first, fallback_second);
}

#[tokio::test]
async fn quota_failure_does_not_block_durable_write() {
    let fx = fixture_with_quota(8);
    let store = store_from(&fx);
    store
        .add_task(TaskDraft {
            title: "too big for the fallback".to_string(),
            ..Default::default()
        })
        .unwrap();

    store.save().await;

    // Fallback rejected the snapshot but the durable store has it
    let fallback_tasks: Option<Vec<Task>> = fx.fallback.get(TASKS_KEY).unwrap();
    assert!(fallback_tasks.is_none());
    let durable_tasks: Vec<Task> = fx.durable.get(TASKS_KEY).await.unwrap().unwrap();
    assert_eq!(durable_tasks, store.tasks());
}

#[tokio::test]
async fn created_task_defaults_to_not_started() {
    let fx = fixture();
    let store = store_from(&fx);

    let task = store
        .add_task(TaskDraft {
            title: "Write spec".to_string(),
            ..Default::default()
        })
        .unwrap();

    assert!(!task.id.is_empty());
    assert_eq!(task.status, TaskStatus::NotStarted);
    assert_eq!(
        store.tasks_with_status(TaskStatus::NotStarted).len(),
        1,
        "task should appear in the NotStarted view"
    );
    assert!(store.tasks_with_status(TaskStatus::InProgress).is_empty());
    assert!(store.tasks_with_status(TaskStatus::Done).is_empty());
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let fx = fixture();
    let store = store_from(&fx);

    let result = store.add_task(TaskDraft {
        title: "   ".to_string(),
        ..Default::default()
    });

    assert!(matches!(result, Err(crate::core::FlowError::InvalidValue(_))));
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn update_preserves_id_and_created_at() {
    let fx = fixture();
    let store = store_from(&fx);
    let task = store
        .add_task(TaskDraft {
            title: "before".to_string(),
            ..Default::default()
        })
        .unwrap();

    let updated = store
        .update_task(
            &task.id,
            TaskDraft {
                title: "after".to_string(),
                status: TaskStatus::Done,
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.id, task.id);
    assert_eq!(updated.created_at, task.created_at);
    assert_eq!(updated.title, "after");
    assert_eq!(store.tasks_with_status(TaskStatus::Done).len(), 1);
}

#[tokio::test]
async fn removing_missing_task_is_not_found() {
    let fx = fixture();
    let store = store_from(&fx);
    let result = store.remove_task("no-such-id");
    assert!(matches!(
        result,
        Err(crate::core::FlowError::TaskNotFound(_))
    ));
}

#[tokio::test]
async fn person_delete_leaves_assignments_dangling() {
    let fx = fixture();
    let store = store_from(&fx);
    let kept = store
        .add_person(PersonDraft {
            name: "Ayu".to_string(),
            role: "Lead".to_string(),
        })
        .unwrap();
    let deleted = store
        .add_person(PersonDraft {
            name: "Budi".to_string(),
            role: "QA".to_string(),
        })
        .unwrap();
    let task = store
        .add_task(TaskDraft {
            title: "shared work".to_string(),
            assigned_person_ids: vec![kept.id.clone(), deleted.id.clone()],
            ..Default::default()
        })
        .unwrap();

    store.remove_person(&deleted.id).unwrap();

    // No cascade: the assignment list is untouched and the dangling
    // id resolves to the sentinel at display time
    let task = store
        .tasks()
        .into_iter()
        .find(|t| t.id == task.id)
        .unwrap();
    assert_eq!(task.assigned_person_ids.len(), 2);
    assert_eq!(store.person_name(&kept.id), "Ayu");
    assert_eq!(store.person_name(&deleted.id), "Unknown");
}

#[tokio::test]
async fn declined_confirmation_keeps_the_task() {
    let fx = fixture();
    let store = store_from(&fx);
    let dialogs = ConfirmationQueue::new();
    let task = store
        .add_task(TaskDraft {
            title: "survivor".to_string(),
            ..Default::default()
        })
        .unwrap();

    let decline = {
        let dialogs = dialogs.clone();
        tokio::spawn(async move {
            loop {
                if let Some(prompt) = dialogs.current() {
                    dialogs.resolve(&prompt.id, false);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
    };

    // The guarded delete flow: confirm first, mutate only on accept
    let accepted = dialogs
        .request("Are you sure you want to delete this task?", "Delete task")
        .await;
    if accepted {
        store.remove_task(&task.id).unwrap();
    }
    decline.await.unwrap();

    assert!(!accepted);
    assert!(store.tasks().iter().any(|t| t.id == task.id));
}

#[tokio::test]
async fn overview_counts_partition_by_status() {
    let fx = fixture();
    let store = store_from(&fx);
    store
        .add_task(TaskDraft {
            title: "todo".to_string(),
            ..Default::default()
        })
        .unwrap();
    store
        .add_task(TaskDraft {
            title: "doing".to_string(),
            status: TaskStatus::InProgress,
            ..Default::default()
        })
        .unwrap();
    store
        .add_person(PersonDraft {
            name: "Ayu".to_string(),
            role: "Lead".to_string(),
        })
        .unwrap();

    let overview = store.overview();
    assert_eq!(overview.tasks, 2);
    assert_eq!(overview.persons, 1);
    assert_eq!(overview.not_started, 1);
    assert_eq!(overview.in_progress, 1);
    assert_eq!(overview.done, 0);
}
