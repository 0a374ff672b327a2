use super::durable::DurableStore;
use super::fallback::FallbackStore;
use super::types::{PERSONS_KEY, ReadOutcome, StorageError, TASKS_KEY};
use crate::core::{FlowError, Person, PersonDraft, Task, TaskDraft, TaskStatus, UNKNOWN_PERSON};
use crate::notify::{NotificationCenter, NotificationKind};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Coordinator owning the in-memory collections and mirroring them to
/// both storage backends.
///
/// Instantiated once per session and passed by handle to consumers;
/// cloning shares the underlying state.
#[derive(Clone)]
pub struct PersistenceStore {
    tasks: Arc<RwLock<Vec<Task>>>,
    persons: Arc<RwLock<Vec<Person>>>,
    durable: DurableStore,
    fallback: FallbackStore,
    notifier: NotificationCenter,
}

/// Counts shown in the tab bar and board header
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub tasks: usize,
    pub persons: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl PersistenceStore {
    pub fn new(
        durable: DurableStore,
        fallback: FallbackStore,
        notifier: NotificationCenter,
    ) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(Vec::new())),
            persons: Arc::new(RwLock::new(Vec::new())),
            durable,
            fallback,
            notifier,
        }
    }

    pub fn notifier(&self) -> &NotificationCenter {
        &self.notifier
    }

    /// Populate both collections, trying the durable store first and
    /// the fallback store second. A failure anywhere degrades to the
    /// next source; a corrupt store never blocks startup.
    pub async fn load(&self) {
        if let Some(tasks) = self.read_tiered::<Task>(TASKS_KEY).await {
            *self.tasks.write() = tasks;
        }
        if let Some(persons) = self.read_tiered::<Person>(PERSONS_KEY).await {
            *self.persons.write() = persons;
        }
        info!(
            tasks = self.tasks.read().len(),
            persons = self.persons.read().len(),
            "collections loaded"
        );
    }

    async fn read_tiered<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        match ReadOutcome::from_read(self.durable.get::<Vec<T>>(key).await) {
            ReadOutcome::Value(items) => {
                debug!(key, count = items.len(), source = "durable", "collection adopted");
                return Some(items);
            }
            ReadOutcome::Empty => debug!(key, "durable store empty, trying fallback"),
            ReadOutcome::Failed(reason) => {
                warn!(key, %reason, "durable read failed, trying fallback");
            }
        }

        match ReadOutcome::from_read(self.fallback.get::<Vec<T>>(key)) {
            ReadOutcome::Value(items) => {
                debug!(key, count = items.len(), source = "fallback", "collection adopted");
                Some(items)
            }
            ReadOutcome::Empty => {
                debug!(key, "no stored data, keeping empty default");
                None
            }
            ReadOutcome::Failed(reason) => {
                warn!(key, %reason, "fallback read failed, keeping empty default");
                None
            }
        }
    }

    /// Write the current snapshot of both collections to both
    /// backends. Best-effort: failures are logged, never propagated,
    /// and a durable failure does not roll back the fallback write.
    pub async fn save(&self) {
        let tasks = self.tasks.read().clone();
        let persons = self.persons.read().clone();

        // Fallback first: cheap, synchronous, and still present if
        // durable storage is disabled in the host environment
        self.write_fallback(TASKS_KEY, &tasks);
        self.write_fallback(PERSONS_KEY, &persons);

        if let Err(e) = self.durable.set(TASKS_KEY, &tasks).await {
            warn!(key = TASKS_KEY, error = %e, "durable write failed");
        }
        if let Err(e) = self.durable.set(PERSONS_KEY, &persons).await {
            warn!(key = PERSONS_KEY, error = %e, "durable write failed");
        }
    }

    fn write_fallback<T: Serialize>(&self, key: &str, value: &T) {
        match self.fallback.set(key, value) {
            Ok(()) => {}
            Err(e @ StorageError::QuotaExceeded { .. }) => {
                warn!(key, error = %e, "fallback write rejected");
                self.notifier.notify(
                    "Local fallback storage is full; changes are kept in the durable store only",
                    NotificationKind::Error,
                );
            }
            Err(e) => warn!(key, error = %e, "fallback write failed"),
        }
    }

    /// Persistence is part of every mutation's contract: the mutation
    /// synchronously enqueues an asynchronous save and returns without
    /// awaiting it. Overlapping saves are tolerated; each writes a
    /// full snapshot and the last write observed by a backend wins.
    fn enqueue_save(&self) {
        let store = self.clone();
        tokio::spawn(async move { store.save().await });
    }

    pub fn add_task(&self, draft: TaskDraft) -> Result<Task, FlowError> {
        if draft.title.trim().is_empty() {
            return Err(FlowError::InvalidValue(
                "task title must not be empty".to_string(),
            ));
        }

        let task = Task::create(draft);
        debug!(id = %task.id, "task created");
        self.tasks.write().push(task.clone());
        self.enqueue_save();
        Ok(task)
    }

    pub fn update_task(&self, id: &str, draft: TaskDraft) -> Result<Task, FlowError> {
        if draft.title.trim().is_empty() {
            return Err(FlowError::InvalidValue(
                "task title must not be empty".to_string(),
            ));
        }

        let updated = {
            let mut tasks = self.tasks.write();
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| FlowError::TaskNotFound(id.to_string()))?;
            task.apply(draft);
            task.clone()
        };
        debug!(id, "task updated");
        self.enqueue_save();
        Ok(updated)
    }

    /// Remove the task. Assignments referencing it elsewhere are not a
    /// concern; tasks reference persons, not the other way around.
    pub fn remove_task(&self, id: &str) -> Result<(), FlowError> {
        let removed = {
            let mut tasks = self.tasks.write();
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            tasks.len() < before
        };
        if !removed {
            return Err(FlowError::TaskNotFound(id.to_string()));
        }
        debug!(id, "task removed");
        self.enqueue_save();
        Ok(())
    }

    pub fn add_person(&self, draft: PersonDraft) -> Result<Person, FlowError> {
        validate_person(&draft)?;
        let person = Person::create(draft);
        debug!(id = %person.id, "person created");
        self.persons.write().push(person.clone());
        self.enqueue_save();
        Ok(person)
    }

    pub fn update_person(&self, id: &str, draft: PersonDraft) -> Result<Person, FlowError> {
        validate_person(&draft)?;
        let updated = {
            let mut persons = self.persons.write();
            let person = persons
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| FlowError::PersonNotFound(id.to_string()))?;
            person.apply(draft);
            person.clone()
        };
        debug!(id, "person updated");
        self.enqueue_save();
        Ok(updated)
    }

    /// Remove the person without cascading: tasks keep any assignment
    /// referencing the deleted id and display it as "Unknown"
    pub fn remove_person(&self, id: &str) -> Result<(), FlowError> {
        let removed = {
            let mut persons = self.persons.write();
            let before = persons.len();
            persons.retain(|p| p.id != id);
            persons.len() < before
        };
        if !removed {
            return Err(FlowError::PersonNotFound(id.to_string()));
        }
        debug!(id, "person removed");
        self.enqueue_save();
        Ok(())
    }

    /// Wholesale adoption of both collections, used by import. The
    /// incoming data replaces the current state, never merges with it.
    pub fn replace_all(&self, tasks: Vec<Task>, persons: Vec<Person>) {
        info!(
            tasks = tasks.len(),
            persons = persons.len(),
            "collections replaced"
        );
        *self.tasks.write() = tasks;
        *self.persons.write() = persons;
        self.enqueue_save();
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }

    pub fn persons(&self) -> Vec<Person> {
        self.persons.read().clone()
    }

    /// Status-partitioned view of the task collection
    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<Task> {
        self.tasks
            .read()
            .iter()
            .filter(|t| t.status == status)
            .cloned()
            .collect()
    }

    /// Display name for a person id, resolving dangling references to
    /// the "Unknown" sentinel
    pub fn person_name(&self, id: &str) -> String {
        self.persons
            .read()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_PERSON.to_string())
    }

    pub fn overview(&self) -> Overview {
        let tasks = self.tasks.read();
        Overview {
            tasks: tasks.len(),
            persons: self.persons.read().len(),
            not_started: count_status(&tasks, TaskStatus::NotStarted),
            in_progress: count_status(&tasks, TaskStatus::InProgress),
            done: count_status(&tasks, TaskStatus::Done),
        }
    }
}

fn count_status(tasks: &[Task], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

fn validate_person(draft: &PersonDraft) -> Result<(), FlowError> {
    if draft.name.trim().is_empty() || draft.role.trim().is_empty() {
        return Err(FlowError::InvalidValue(
            "person name and role must not be empty".to_string(),
        ));
    }
    Ok(())
}
