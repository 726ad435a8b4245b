//! Storage module for persisting crawl progress
//!
//! This module handles the two durable artifacts of a crawl:
//! - The progress index (completed URLs, failed URL → reason)
//! - The accumulated episode records
//!
//! Both are rewritten as a whole at every checkpoint.

mod json;
mod traits;

pub use json::JsonFileStore;
pub use traits::{ProgressStore, StorageError, StorageResult};

use crate::config::OutputConfig;

/// Opens the file-backed store described by the output configuration
pub fn open_storage(config: &OutputConfig) -> JsonFileStore {
    JsonFileStore::from_config(config)
}
