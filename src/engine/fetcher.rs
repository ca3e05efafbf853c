//! Log fetcher
//!
//! Walks a run's jobs and steps in platform order and builds a [`RunRecord`].
//! The walk is best-effort: a step whose log cannot be downloaded still gets
//! a record, carrying the failure text in place of the log. Only a failure to
//! read the run or its job list aborts the walk, and even then the caller gets
//! an error snapshot on disk.

use std::path::Path;

use tracing::{debug, error, info, instrument, warn};

use crate::client::{ApiJob, CiPlatform, ClientError};
use crate::snapshot::{
    truncate_log, JobRecord, RunRecord, RunStatus, SnapshotLoader, StepRecord, FETCH_LOG_CAP,
};

/// Result of retrieving one log body
#[derive(Debug, Clone, PartialEq)]
pub enum StepLog {
    Fetched(String),
    Degraded(String),
}

impl StepLog {
    /// Text stored in the snapshot, capped at `cap` characters
    pub fn into_content(self, cap: usize) -> String {
        match self {
            StepLog::Fetched(text) => truncate_log(&text, cap),
            StepLog::Degraded(reason) => reason,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StepLog::Degraded(_))
    }
}

pub struct LogFetcher<'a> {
    platform: &'a dyn CiPlatform,
    log_cap: usize,
}

impl<'a> LogFetcher<'a> {
    pub fn new(platform: &'a dyn CiPlatform) -> Self {
        Self {
            platform,
            log_cap: FETCH_LOG_CAP,
        }
    }

    pub fn with_log_cap(mut self, cap: usize) -> Self {
        self.log_cap = cap;
        self
    }

    /// Build the full run record.
    ///
    /// Errors only when the run or its jobs cannot be listed.
    #[instrument(skip(self))]
    pub async fn fetch(&self, run_id: u64) -> Result<RunRecord, ClientError> {
        let run = self.platform.get_run(run_id).await?;
        let jobs = self.platform.get_jobs(run_id).await?;

        let mut record = RunRecord::new(
            run_id,
            run.name.unwrap_or_else(|| "Unknown".to_string()),
            RunStatus::from_conclusion(run.conclusion.as_deref()),
        );

        for job in jobs {
            record.jobs.push(self.fetch_job(job).await);
        }

        info!(
            run_id,
            workflow = %record.workflow_name,
            jobs = record.jobs.len(),
            "Fetched run"
        );
        Ok(record)
    }

    async fn fetch_job(&self, job: ApiJob) -> JobRecord {
        let mut record = JobRecord::new(
            job.name.clone(),
            RunStatus::from_conclusion(job.conclusion.as_deref()),
        );

        // The platform only serves logs per job; download once and share the
        // outcome across the job's terminal steps.
        let mut job_log: Option<StepLog> = None;

        for step in &job.steps {
            let mut step_record = StepRecord::new(
                step.name.clone(),
                RunStatus::from_conclusion(step.conclusion.as_deref()),
                step.number,
            );
            step_record.started_at = step.started_at;
            step_record.completed_at = step.completed_at;

            if step.is_terminal() {
                let log = match &job_log {
                    Some(log) => log.clone(),
                    None => {
                        let log = self.download(&job).await;
                        job_log = Some(log.clone());
                        log
                    }
                };
                if log.is_degraded() {
                    warn!(job = %job.name, step = %step.name, "Could not download logs for step");
                }
                step_record.log_content = Some(log.into_content(self.log_cap));
            } else {
                debug!(job = %job.name, step = %step.name, "Step not finished, skipping logs");
            }

            record.steps.push(step_record);
        }

        record
    }

    async fn download(&self, job: &ApiJob) -> StepLog {
        match self.platform.get_job_logs(job.id).await {
            Ok(text) => StepLog::Fetched(text),
            Err(e) => StepLog::Degraded(format!("Log download failed: {}", e)),
        }
    }

    /// Fetch `run_id` and write the snapshot to `output`.
    ///
    /// A snapshot is always written: on failure it is the minimal error
    /// snapshot. Returns whether the fetch itself succeeded.
    pub async fn fetch_to_file(&self, run_id: u64, output: &Path) -> bool {
        let (record, success) = match self.fetch(run_id).await {
            Ok(record) => (record, true),
            Err(e) => {
                error!(run_id, error = %e, "Error downloading logs");
                (RunRecord::error_snapshot(run_id, e.to_string()), false)
            }
        };

        match SnapshotLoader::write_file(output, &record) {
            Ok(()) => {
                if success {
                    info!(path = %output.display(), "Successfully downloaded logs");
                }
                success
            }
            Err(e) => {
                error!(path = %output.display(), error = %e, "Failed to write logs snapshot");
                false
            }
        }
    }
}
