//! Repair engine
//!
//! One invocation makes at most one repair attempt:
//! 1. Refuse outright once the attempt number passes the retry ceiling
//! 2. Load the workflow file and the logs snapshot
//! 3. Ask the model for a corrected workflow and parse it strictly
//! 4. Write it back, then stage, commit, and push
//!
//! Nothing before step 4 touches the working tree, so a failure at any
//! earlier point leaves no trace.

use std::path::PathBuf;

use tracing::{error, info, instrument};

use crate::client::{ClientError, CompletionRequest, Inference, VersionControl};
use crate::config::InferenceConfig;
use crate::engine::attempt::attempt_message;
use crate::engine::error::RepairError;
use crate::snapshot::{RunRecord, SnapshotLoader};
use crate::workflow::{WorkflowDefinition, WorkflowLoader};

/// Inputs for a single repair attempt
#[derive(Debug, Clone)]
pub struct RepairRequest {
    pub workflow_file: PathBuf,
    pub logs_file: PathBuf,
    pub max_retries: u32,
    pub attempt: u32,
    pub branch: String,
    pub model: String,
}

impl RepairRequest {
    pub fn exceeds_ceiling(&self) -> bool {
        self.attempt > self.max_retries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The retry ceiling was reached; nothing was loaded or changed
    CeilingReached { attempt: u32, max_retries: u32 },

    /// A fix was committed and pushed
    Committed {
        attempt: u32,
        branch: String,
        message: String,
    },
}

impl RepairOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, RepairOutcome::Committed { .. })
    }
}

pub struct RepairEngine<'a> {
    inference: &'a dyn Inference,
    vcs: &'a dyn VersionControl,
    settings: InferenceConfig,
}

impl<'a> RepairEngine<'a> {
    pub fn new(inference: &'a dyn Inference, vcs: &'a dyn VersionControl) -> Self {
        Self {
            inference,
            vcs,
            settings: InferenceConfig::default(),
        }
    }

    pub fn with_settings(mut self, settings: InferenceConfig) -> Self {
        self.settings = settings;
        self
    }

    #[instrument(skip(self, request), fields(attempt = request.attempt, branch = %request.branch))]
    pub async fn run(&self, request: &RepairRequest) -> Result<RepairOutcome, RepairError> {
        if request.exceeds_ceiling() {
            info!(
                max_retries = request.max_retries,
                "Reached maximum retry limit of {}", request.max_retries
            );
            return Ok(RepairOutcome::CeilingReached {
                attempt: request.attempt,
                max_retries: request.max_retries,
            });
        }

        let workflow = WorkflowLoader::load_file(&request.workflow_file).map_err(|e| {
            error!(error = %e, "Error loading workflow file");
            RepairError::from(e)
        })?;
        let logs = SnapshotLoader::load_file(&request.logs_file).map_err(|e| {
            error!(error = %e, "Error loading logs file");
            RepairError::from(e)
        })?;

        let proposal = self.propose(&workflow, &logs, &request.model).await?;
        if proposal == workflow {
            error!("Model returned the workflow unchanged");
            return Err(RepairError::NoChange);
        }

        let message = self.persist(request, &proposal).await?;

        Ok(RepairOutcome::Committed {
            attempt: request.attempt,
            branch: request.branch.clone(),
            message,
        })
    }

    async fn propose(
        &self,
        workflow: &WorkflowDefinition,
        logs: &RunRecord,
        model: &str,
    ) -> Result<WorkflowDefinition, RepairError> {
        let request = CompletionRequest {
            model: model.to_string(),
            system_prompt: self.settings.system_prompt.clone(),
            user_prompt: build_prompt(workflow, logs)?,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self.inference.complete(&request).await.map_err(|e| {
            error!(error = %e, "Error getting AI suggestions");
            RepairError::Inference(e)
        })?;

        WorkflowDefinition::from_model_response(&response).map_err(|e| {
            error!(error = %e, "AI response is not a valid workflow");
            RepairError::InvalidProposal(e)
        })
    }

    async fn persist(
        &self,
        request: &RepairRequest,
        proposal: &WorkflowDefinition,
    ) -> Result<String, RepairError> {
        WorkflowLoader::write_file(&request.workflow_file, proposal).map_err(|e| {
            error!(error = %e, "Error writing fixed workflow");
            RepairError::Write(e)
        })?;

        let message = attempt_message(request.attempt);
        let vcs_error = |e: ClientError| {
            error!(error = %e, "Error committing fixes");
            RepairError::VersionControl(e)
        };

        self.vcs
            .stage(&request.workflow_file)
            .await
            .map_err(vcs_error)?;
        self.vcs.commit(&message).await.map_err(vcs_error)?;
        self.vcs.push(&request.branch).await.map_err(vcs_error)?;

        info!(path = %request.workflow_file.display(), "Committed fix");
        Ok(message)
    }
}

/// User prompt pairing the current workflow with the run's logs
pub fn build_prompt(workflow: &WorkflowDefinition, logs: &RunRecord) -> Result<String, RepairError> {
    let workflow_yaml = workflow
        .to_yaml()
        .map_err(|e| RepairError::Prompt(e.to_string()))?;
    let logs_json =
        SnapshotLoader::to_json(logs).map_err(|e| RepairError::Prompt(e.to_string()))?;

    let failed: Vec<String> = logs
        .failed_steps()
        .map(|(job, step)| format!("- {} / {}", job.name, step.name))
        .collect();
    let failed_steps = if failed.is_empty() {
        "- none reported".to_string()
    } else {
        failed.join("\n")
    };

    Ok(format!(
        r#"As an expert in GitHub Actions CI/CD, analyze these workflow logs and fix the workflow file.
Focus on common issues like:
- Incorrect job dependencies or step order
- Missing environment variables or secrets
- Invalid commands or tool configurations
- Caching issues
- Permission problems
- Syntax errors

Failed steps:
{failed_steps}

Workflow file:
{workflow_yaml}
Error logs:
{logs_json}

Provide the fixed workflow file in YAML format, maintaining the existing structure while fixing the issues.
Only output the YAML content, nothing else.
"#
    ))
}
