//! JSON file storage implementation
//!
//! This module provides a flat-file implementation of the ProgressStore trait:
//! one pretty-printed JSON document per artifact, replaced atomically via a
//! temporary file in the same directory.

use crate::config::OutputConfig;
use crate::model::EpisodeRecord;
use crate::state::CrawlProgress;
use crate::storage::traits::{ProgressStore, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Progress index and records kept as two JSON files
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    progress_path: PathBuf,
    episodes_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(progress_path: impl Into<PathBuf>, episodes_path: impl Into<PathBuf>) -> Self {
        Self {
            progress_path: progress_path.into(),
            episodes_path: episodes_path.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.progress_path, &config.episodes_path)
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_path
    }

    pub fn episodes_path(&self) -> &Path {
        &self.episodes_path
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> StorageResult<CrawlProgress> {
        Ok(read_json(&self.progress_path)?.unwrap_or_default())
    }

    fn load_records(&self) -> StorageResult<Vec<EpisodeRecord>> {
        Ok(read_json(&self.episodes_path)?.unwrap_or_default())
    }

    fn save(&self, progress: &CrawlProgress, records: &[EpisodeRecord]) -> StorageResult<()> {
        write_json_atomic(&self.progress_path, progress)?;
        write_json_atomic(&self.episodes_path, &records)?;
        tracing::debug!(
            "Saved {} completed URLs and {} records",
            progress.completed.len(),
            records.len()
        );
        Ok(())
    }
}

/// Reads a JSON document; a missing file is `None`, not an error
fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        })
}

/// Serializes into a sibling temp file, syncs it, then renames over `path`
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
            StorageError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;

    tmp.persist(path).map_err(|source| StorageError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
