use super::types::{Result, StorageError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Name of the single key-value namespace inside the store directory
const NAMESPACE: &str = "kv";

/// Larger-capacity durable key-value store, one JSON document per key.
///
/// Every operation opens a fresh connection, runs a single transaction
/// and releases the connection on drop. Operation volume is low (one
/// save per user edit), so the open/close overhead is acceptable.
#[derive(Debug, Clone)]
pub struct DurableStore {
    dir: PathBuf,
}

impl DurableStore {
    /// Create a handle rooted at the given directory. Nothing is
    /// touched on disk until the first operation.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Open a connection, creating the store and its namespace on
    /// first use
    pub async fn open(&self) -> Result<DurableConn> {
        let namespace = self.dir.join(NAMESPACE);
        tokio::fs::create_dir_all(&namespace)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(DurableConn { namespace })
    }

    /// Read the value stored under `key`, or `None` if unset
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let conn = self.open().await?;
        conn.get(key).await
    }

    /// Atomically overwrite the value stored under `key`
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let conn = self.open().await?;
        conn.set(key, value).await
    }
}

/// A ready connection to the durable store, released on drop
pub struct DurableConn {
    namespace: PathBuf,
}

impl DurableConn {
    fn entry_path(&self, key: &str) -> PathBuf {
        self.namespace.join(format!("{key}.json"))
    }

    /// Run a single read transaction
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(key, size = bytes.len(), "durable GET");
                serde_json::from_slice(&bytes)
                    .map(Some)
                    .map_err(|e| StorageError::ReadFailed {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Run a single write transaction
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        debug!(key, size = bytes.len(), "durable SET");

        let write_err = |e: std::io::Error| StorageError::WriteFailed {
            target: key.to_string(),
            reason: e.to_string(),
        };

        // Write to a temp file and rename over the target so the key
        // is replaced atomically or not at all
        let tmp = self.namespace.join(format!("{key}.json.tmp"));
        let mut file = File::create(&tmp).await.map_err(write_err)?;
        file.write_all(&bytes).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        tokio::fs::rename(&tmp, self.entry_path(key))
            .await
            .map_err(write_err)
    }
}
