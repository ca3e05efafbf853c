//! Workflow file loader
//!
//! Read a workflow definition from the working tree and write a replacement
//! back to the same path.

use std::path::Path;

use super::definition::{DefinitionError, WorkflowDefinition};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid workflow in {file}: {error}")]
    Definition {
        file: String,
        error: DefinitionError,
    },
}

pub struct WorkflowLoader;

impl WorkflowLoader {
    pub fn load_file(path: &Path) -> Result<WorkflowDefinition, LoadError> {
        let content = std::fs::read_to_string(path)?;
        WorkflowDefinition::parse(&content).map_err(|e| LoadError::Definition {
            file: path.display().to_string(),
            error: e,
        })
    }

    /// Overwrite `path` with the YAML rendering of `definition`.
    pub fn write_file(path: &Path, definition: &WorkflowDefinition) -> Result<(), LoadError> {
        let yaml = definition.to_yaml().map_err(|e| LoadError::Definition {
            file: path.display().to_string(),
            error: e,
        })?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
