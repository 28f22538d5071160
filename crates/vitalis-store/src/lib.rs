//! # vitalis-store
//!
//! Durable key-value storage backends for Vitalis.

pub mod json;
pub mod memory;
pub mod sqlite;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;
use vitalis_core::{config::StorageConfig, error::VitalisError, traits::KeyValueStore};

/// Build the configured storage backend.
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, VitalisError> {
    match config.backend.as_str() {
        "json" => Ok(Arc::new(JsonFileStore::open(&config.path).await?)),
        "sqlite" => Ok(Arc::new(SqliteStore::open(&config.path).await?)),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(VitalisError::Config(format!(
            "unsupported storage backend: {other}"
        ))),
    }
}
