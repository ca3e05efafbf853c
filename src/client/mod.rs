//! Clients for the services the repair loop talks to
//!
//! Each external collaborator sits behind a trait so the engine can be driven
//! by in-memory fakes:
//! - `github`: CI run/job/log queries and repair history (GitHub REST)
//! - `openai`: Chat-completions inference
//! - `git`: Stage, commit, and push through the `git` executable
//! - `types`: Wire types shared by the clients

use std::path::Path;

use async_trait::async_trait;

use crate::config::ConfigError;

pub mod git;
pub mod github;
pub mod openai;
pub mod types;

pub use git::GitCli;
pub use github::GitHubClient;
pub use openai::OpenAiClient;
pub use types::{ApiJob, ApiStep, CompletionRequest, RepairRecord, WorkflowRun};

/// Common error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Read access to CI runs, their jobs, and job logs
#[async_trait]
pub trait CiPlatform: Send + Sync {
    async fn get_run(&self, run_id: u64) -> Result<WorkflowRun, ClientError>;

    /// All jobs of a run, in the order the platform reports them
    async fn get_jobs(&self, run_id: u64) -> Result<Vec<ApiJob>, ClientError>;

    /// Raw log text of a job
    async fn get_job_logs(&self, job_id: u64) -> Result<String, ClientError>;
}

/// Append-only record of past repair attempts
#[async_trait]
pub trait RepairHistory: Send + Sync {
    /// One page (1-based) of records, newest first
    async fn list_records(&self, page: u32) -> Result<Vec<RepairRecord>, ClientError>;
}

/// Text completion service
#[async_trait]
pub trait Inference: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ClientError>;
}

/// The three version-control operations a fix needs
#[async_trait]
pub trait VersionControl: Send + Sync {
    async fn stage(&self, path: &Path) -> Result<(), ClientError>;

    async fn commit(&self, message: &str) -> Result<(), ClientError>;

    async fn push(&self, branch: &str) -> Result<(), ClientError>;
}
