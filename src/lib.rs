pub mod config;
pub mod core;
pub mod exchange;
pub mod notify;
pub mod persistence;
pub mod server;

// Re-export commonly used types
pub use config::AppConfig;
pub use core::{FlowError, Person, PersonDraft, Task, TaskDraft, TaskStatus};
pub use exchange::{ExportDocument, ImportOutcome};
pub use notify::{ConfirmationPrompt, ConfirmationQueue, Notification, NotificationCenter,
    NotificationKind};
pub use persistence::{
    DurableStore, FallbackStore, Overview, PersistenceStore, ReadOutcome, StorageError,
};
pub use server::{AppState, create_router};
