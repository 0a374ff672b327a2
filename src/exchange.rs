use crate::core::types::now_iso;
use crate::core::{FlowError, Person, Task};
use crate::notify::{ConfirmationQueue, NotificationKind};
use crate::persistence::PersistenceStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Portable export document.
///
/// The persons field is named `pics` on the wire; existing export
/// files depend on that exact name, only the internal identifier was
/// renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default)]
    pub exported_at: Option<String>,
    pub tasks: Vec<Task>,
    pub pics: Vec<Person>,
}

/// Result of a confirmed or aborted import
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ImportOutcome {
    /// The user declined the overwrite; nothing changed
    Declined,
    /// Both collections were replaced and persisted
    Applied { tasks: usize, persons: usize },
}

/// Snapshot the collections into a timestamped export document.
/// Building the document never touches collection state.
pub fn export_document(store: &PersistenceStore) -> ExportDocument {
    ExportDocument {
        exported_at: Some(now_iso()),
        tasks: store.tasks(),
        pics: store.persons(),
    }
}

/// Download filename for an export document
pub fn export_filename(doc: &ExportDocument) -> String {
    let stamp = doc.exported_at.as_deref().unwrap_or("unknown");
    format!("tcelflow-export-{stamp}.json")
}

/// Parse `text` as an export document and, after user confirmation,
/// replace both collections with its contents.
///
/// Import is destructive by design (full overwrite, never a merge);
/// the confirmation dialog carries the source timestamp and entity
/// counts so the decision is an informed one.
pub async fn import(
    store: &PersistenceStore,
    dialogs: &ConfirmationQueue,
    text: &str,
) -> Result<ImportOutcome, FlowError> {
    let doc: ExportDocument = match serde_json::from_str(text) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "import rejected: malformed document");
            store
                .notifier()
                .notify(format!("Import failed: {e}"), NotificationKind::Error);
            return Err(FlowError::InvalidFormat(e.to_string()));
        }
    };

    let exported_at = doc.exported_at.as_deref().unwrap_or("an unknown time");
    let message = format!(
        "Import data exported at {exported_at}? Tasks: {}, persons: {}. Existing data will be overwritten.",
        doc.tasks.len(),
        doc.pics.len()
    );
    if !dialogs.request(&message, "Import data").await {
        info!("import declined");
        return Ok(ImportOutcome::Declined);
    }

    let (task_count, person_count) = (doc.tasks.len(), doc.pics.len());
    store.replace_all(doc.tasks, doc.pics);
    // Imports persist immediately rather than relying on the enqueued
    // background save alone
    store.save().await;

    store
        .notifier()
        .notify("Data imported successfully", NotificationKind::Success);
    Ok(ImportOutcome::Applied {
        tasks: task_count,
        persons: person_count,
    })
}
