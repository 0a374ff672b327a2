use chrono::{SecondsFormat, Utc};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};

/// Display-time sentinel for assignments pointing at a deleted person
pub const UNKNOWN_PERSON: &str = "Unknown";

/// Generate an entity id from the current time plus a random suffix
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 6)
        .to_lowercase();
    format!("{millis}-{suffix}")
}

/// Current time as an ISO-8601 timestamp with millisecond precision
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

/// A tracked task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within the collection, immutable after creation
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    /// Ordered person-id references; may dangle after a person is deleted
    #[serde(default)]
    pub assigned_person_ids: Vec<String>,
    /// Set once at creation, never updated
    pub created_at: String,
}

impl Task {
    /// Build a fresh task from a form draft, assigning id and timestamp
    pub fn create(draft: TaskDraft) -> Self {
        Self {
            id: generate_id(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            assigned_person_ids: draft.assigned_person_ids,
            created_at: now_iso(),
        }
    }

    /// Replace the mutable fields from an edit-mode draft; id and
    /// created_at are preserved
    pub fn apply(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.status = draft.status;
        self.assigned_person_ids = draft.assigned_person_ids;
    }
}

/// Form-save payload for creating or editing a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_person_ids: Vec<String>,
}

impl TaskDraft {
    /// Add the person id if absent, remove it if present
    pub fn toggle_assignment(&mut self, person_id: &str) {
        if let Some(index) = self
            .assigned_person_ids
            .iter()
            .position(|id| id == person_id)
        {
            self.assigned_person_ids.remove(index);
        } else {
            self.assigned_person_ids.push(person_id.to_string());
        }
    }
}

/// A contact person assignable to tasks (historically "PIC",
/// person in contact)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

impl Person {
    /// Build a fresh person from a form draft
    pub fn create(draft: PersonDraft) -> Self {
        Self {
            id: generate_id(),
            name: draft.name,
            role: draft.role,
            created_at: now_iso(),
        }
    }

    /// Replace name and role from an edit-mode draft
    pub fn apply(&mut self, draft: PersonDraft) {
        self.name = draft.name;
        self.role = draft.role;
    }
}

/// Form-save payload for creating or editing a person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDraft {
    pub name: String,
    pub role: String,
}
