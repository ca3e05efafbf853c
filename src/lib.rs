//! # Workflow Autofix
//!
//! A bounded repair loop for failing GitHub Actions workflows. A failed run is
//! captured as a snapshot, summarized for humans, and handed to a language
//! model together with the workflow file. An acceptable proposal is committed
//! and pushed; the next run of the workflow decides whether it worked.
//!
//! ## Stages
//!
//! - **Fetch** - Pull run, job, and step metadata plus step logs into a JSON snapshot
//! - **Summarize** - Render the snapshot as a Markdown report
//! - **Count** - Recover the next attempt number from repair history
//! - **Repair** - Propose, validate, write, and commit a corrected workflow
//!
//! Each stage is a separate process invocation; the snapshot file and the
//! repair history are the only state shared between them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use workflow_autofix::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AutofixConfig::default();
//!     let inference = OpenAiClient::new(&config.inference)?;
//!     let git = GitCli::new(&config.git);
//!
//!     let request = RepairRequest {
//!         workflow_file: ".github/workflows/ci.yml".into(),
//!         logs_file: "workflow_logs.json".into(),
//!         max_retries: 3,
//!         attempt: 1,
//!         branch: "main".to_string(),
//!         model: "gpt-4o".to_string(),
//!     };
//!
//!     let outcome = RepairEngine::new(&inference, &git)
//!         .with_settings(config.inference.clone())
//!         .run(&request)
//!         .await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod engine;
pub mod snapshot;
pub mod workflow;

pub use client::{ClientError, GitCli, GitHubClient, OpenAiClient};
pub use config::{AutofixConfig, ConfigError, Credentials};
pub use engine::{
    AttemptCounter, LogFetcher, RepairEngine, RepairError, RepairOutcome, RepairRequest,
    SummaryError, SummaryRenderer,
};
pub use snapshot::{JobRecord, RunRecord, RunStatus, SnapshotLoader, StepRecord};
pub use workflow::{WorkflowDefinition, WorkflowLoader};

pub mod prelude {
    pub use crate::client::{
        CiPlatform, ClientError, GitCli, GitHubClient, Inference, OpenAiClient, RepairHistory,
        VersionControl,
    };
    pub use crate::config::AutofixConfig;
    pub use crate::engine::{
        AttemptCounter, LogFetcher, RepairEngine, RepairOutcome, RepairRequest, SummaryRenderer,
    };
    pub use crate::snapshot::{RunRecord, RunStatus, SnapshotLoader};
    pub use crate::workflow::{WorkflowDefinition, WorkflowLoader};
}
