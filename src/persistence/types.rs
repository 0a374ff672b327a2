use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Storage key for the task collection
pub const TASKS_KEY: &str = "tasks";
/// Storage key for the person collection (exported on the wire as "pics")
pub const PERSONS_KEY: &str = "persons";

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("durable storage unavailable: {0}")]
    Unavailable(String),

    #[error("read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("write failed for {target}: {reason}")]
    WriteFailed { target: String, reason: String },

    #[error("fallback quota exceeded: {attempted} of {quota} bytes")]
    QuotaExceeded { attempted: usize, quota: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Outcome of reading one key from one backend. The tiered load path
/// matches on this instead of suppressing exceptions.
#[derive(Debug)]
pub enum ReadOutcome<T> {
    /// Backend holds a well-formed value for the key
    Value(T),
    /// Backend has nothing stored under the key
    Empty,
    /// Backend errored or holds a malformed value
    Failed(String),
}

impl<T> ReadOutcome<T> {
    /// Collapse an adapter result into an outcome
    pub fn from_read(result: Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => ReadOutcome::Value(value),
            Ok(None) => ReadOutcome::Empty,
            Err(e) => ReadOutcome::Failed(e.to_string()),
        }
    }
}

/// Storage configuration for both backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root directory of the durable store
    pub durable_dir: PathBuf,
    /// Single file backing the fallback store
    pub fallback_file: PathBuf,
    /// Byte budget for the fallback store
    pub fallback_quota_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            durable_dir: PathBuf::from("./data/tcelflow-db"),
            fallback_file: PathBuf::from("./data/fallback.json"),
            fallback_quota_bytes: super::fallback::DEFAULT_QUOTA_BYTES,
        }
    }
}
