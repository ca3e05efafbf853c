//! Engine error types

use crate::client::ClientError;
use crate::snapshot::SnapshotError;
use crate::workflow::{DefinitionError, LoadError};

/// Errors that end a repair attempt without a commit
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("Failed to load workflow file: {0}")]
    WorkflowLoad(#[from] LoadError),

    #[error("Failed to load logs snapshot: {0}")]
    LogsLoad(#[from] SnapshotError),

    #[error("Failed to build prompt: {0}")]
    Prompt(String),

    #[error("Inference request failed: {0}")]
    Inference(#[source] ClientError),

    #[error("Model response is not a usable workflow: {0}")]
    InvalidProposal(#[source] DefinitionError),

    #[error("Model returned the workflow unchanged")]
    NoChange,

    #[error("Failed to write workflow file: {0}")]
    Write(#[source] LoadError),

    #[error("Version control failed: {0}")]
    VersionControl(#[source] ClientError),
}

/// Errors from building a run summary
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Could not read snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}
