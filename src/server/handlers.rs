use crate::core::{FlowError, Person, PersonDraft, Task, TaskDraft, TaskStatus};
use crate::exchange::{self, ImportOutcome};
use crate::notify::{ConfirmationPrompt, ConfirmationQueue, Notification, NotificationCenter,
    NotificationKind};
use crate::persistence::{Overview, PersistenceStore};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: PersistenceStore,
    pub dialogs: ConfirmationQueue,
    pub notifier: NotificationCenter,
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub accept: bool,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "tcelflow",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List tasks, optionally filtered to one status column
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Json<Vec<Task>> {
    match query.status {
        Some(status) => Json(state.store.tasks_with_status(status)),
        None => Json(state.store.tasks()),
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), FlowError> {
    let task = state.store.add_task(draft)?;
    state.notifier.notify("Task added", NotificationKind::Success);
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<TaskDraft>,
) -> Result<Json<Task>, FlowError> {
    let task = state.store.update_task(&id, draft)?;
    state
        .notifier
        .notify("Task updated", NotificationKind::Success);
    Ok(Json(task))
}

/// Deletion is confirmation-gated: the handler suspends on the dialog
/// queue until the UI resolves the prompt
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, FlowError> {
    let accepted = state
        .dialogs
        .request("Are you sure you want to delete this task?", "Delete task")
        .await;
    if !accepted {
        return Ok(Json(DeleteResponse { deleted: false, id }));
    }

    state.store.remove_task(&id)?;
    state
        .notifier
        .notify("Task deleted", NotificationKind::Success);
    Ok(Json(DeleteResponse { deleted: true, id }))
}

pub async fn list_persons(State(state): State<AppState>) -> Json<Vec<Person>> {
    Json(state.store.persons())
}

pub async fn create_person(
    State(state): State<AppState>,
    Json(draft): Json<PersonDraft>,
) -> Result<(StatusCode, Json<Person>), FlowError> {
    let person = state.store.add_person(draft)?;
    state
        .notifier
        .notify("Person added", NotificationKind::Success);
    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<PersonDraft>,
) -> Result<Json<Person>, FlowError> {
    let person = state.store.update_person(&id, draft)?;
    state
        .notifier
        .notify("Person updated", NotificationKind::Success);
    Ok(Json(person))
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, FlowError> {
    let accepted = state
        .dialogs
        .request(
            "Are you sure? Tasks assigned to this person will remain.",
            "Delete person",
        )
        .await;
    if !accepted {
        return Ok(Json(DeleteResponse { deleted: false, id }));
    }

    state.store.remove_person(&id)?;
    state
        .notifier
        .notify("Person deleted", NotificationKind::Success);
    Ok(Json(DeleteResponse { deleted: true, id }))
}

pub async fn overview(State(state): State<AppState>) -> Json<Overview> {
    Json(state.store.overview())
}

/// Serve the export document as a timestamped file download
pub async fn export_data(State(state): State<AppState>) -> Result<impl IntoResponse, FlowError> {
    let doc = exchange::export_document(&state.store);
    let body = match serde_json::to_string_pretty(&doc) {
        Ok(body) => body,
        Err(e) => {
            // Export has no failure path affecting state; report and
            // bail
            state
                .notifier
                .notify(format!("Export failed: {e}"), NotificationKind::Error);
            return Err(FlowError::Internal(e.to_string()));
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", exchange::export_filename(&doc));
    state
        .notifier
        .notify("Data exported", NotificationKind::Success);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Import an export document; suspends on the confirmation dialog
pub async fn import_data(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportOutcome>, FlowError> {
    let outcome = exchange::import(&state.store, &state.dialogs, &body).await?;
    Ok(Json(outcome))
}

pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifier.active())
}

pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    state.notifier.dismiss(&id);
    StatusCode::NO_CONTENT
}

pub async fn current_confirmation(
    State(state): State<AppState>,
) -> Json<Option<ConfirmationPrompt>> {
    Json(state.dialogs.current())
}

pub async fn resolve_confirmation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<serde_json::Value>, FlowError> {
    if !state.dialogs.resolve(&id, request.accept) {
        return Err(FlowError::InvalidValue(format!(
            "no pending confirmation with id {id}"
        )));
    }
    Ok(Json(json!({ "resolved": true })))
}
