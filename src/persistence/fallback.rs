use super::types::{Result, StorageError};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default byte budget, sized to the envelope of a browser
/// localStorage area
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Small synchronous string-keyed store used as the secondary
/// persistence target.
///
/// Values are JSON-text encoded on write and parsed on read. The whole
/// map is mirrored to a single file; construction is fail-open, so a
/// missing or corrupt file starts the store empty.
#[derive(Clone)]
pub struct FallbackStore {
    path: PathBuf,
    quota_bytes: usize,
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl FallbackStore {
    /// Open the store backed by `path`, loading any existing entries
    pub fn open(path: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = ?path, error = %e, "fallback store corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = ?path, error = %e, "fallback store unreadable, starting empty");
                HashMap::new()
            }
        };

        Self {
            path,
            quota_bytes,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Parse and return the value stored under `key`, or `None` if
    /// unset
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(text) => {
                serde_json::from_str(text)
                    .map(Some)
                    .map_err(|e| StorageError::ReadFailed {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })
            }
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON text and store it under `key`
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let text =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut entries = self.entries.write();

        // Quota is checked against the projected size with this entry
        // replaced, before anything is mutated
        let projected: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + text.len();
        if projected > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                attempted: projected,
                quota: self.quota_bytes,
            });
        }

        debug!(key, size = text.len(), "fallback SET");
        entries.insert(key.to_string(), text);
        self.persist(&entries)
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let write_err = |e: std::io::Error| StorageError::WriteFailed {
            target: self.path.display().to_string(),
            reason: e.to_string(),
        };

        let bytes =
            serde_json::to_vec(entries).map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = {
            let mut os = self.path.clone().into_os_string();
            os.push(".tmp");
            PathBuf::from(os)
        };
        std::fs::write(&tmp, &bytes).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)
    }
}
