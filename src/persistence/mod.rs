/// Persistence module for the dual-backend storage chain
///
/// Provides durability for the task and person collections through:
/// - An async durable key-value store (one JSON document per key)
/// - A synchronous fallback store kept in lockstep on every save
/// - A coordinator with a tiered read path and best-effort writes
pub mod durable;
pub mod fallback;
pub mod store;
pub mod types;

pub use durable::DurableStore;
pub use fallback::FallbackStore;
pub use store::{Overview, PersistenceStore};
pub use types::{PERSONS_KEY, ReadOutcome, Result, StorageError, StorageSettings, TASKS_KEY};

#[cfg(test)]
mod tests;
