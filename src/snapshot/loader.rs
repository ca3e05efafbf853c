//! Snapshot file loader
//!
//! Reads and writes the pretty-printed JSON snapshot produced by the log
//! fetcher.

use std::path::Path;

use super::RunRecord;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error in {file}: {error}")]
    Json {
        file: String,
        error: serde_json::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialize(serde_json::Error),
}

pub struct SnapshotLoader;

impl SnapshotLoader {
    pub fn load_file(path: &Path) -> Result<RunRecord, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| SnapshotError::Json {
            file: path.display().to_string(),
            error: e,
        })
    }

    pub fn to_json(record: &RunRecord) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(record).map_err(SnapshotError::Serialize)
    }

    /// Write `record` to `path`, creating missing parent directories.
    pub fn write_file(path: &Path, record: &RunRecord) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = Self::to_json(record)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
