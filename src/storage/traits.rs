//! Storage traits and error types
//!
//! This module defines the trait interface for progress store backends and
//! associated error types.

use crate::model::EpisodeRecord;
use crate::state::CrawlProgress;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error in {path}: {source}")]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable crawl state backends
///
/// Two artifacts are kept: the progress index and the episode records. Each
/// is read and written as a whole, and each write must be atomic with respect
/// to process termination. The pair is not written atomically together; the
/// coordinator reconciles them on load.
pub trait ProgressStore {
    /// Loads the progress index, or an empty one if none was saved yet
    fn load(&self) -> StorageResult<CrawlProgress>;

    /// Loads the accumulated episode records, or none if none were saved yet
    fn load_records(&self) -> StorageResult<Vec<EpisodeRecord>>;

    /// Writes both artifacts
    fn save(&self, progress: &CrawlProgress, records: &[EpisodeRecord]) -> StorageResult<()>;
}
