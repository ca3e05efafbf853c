//! Run, job, and step records
//!
//! These mirror the GitHub Actions run/job/step hierarchy, reduced to the
//! fields the renderer and the repair prompt need. Job and step order is
//! execution order and is preserved through serialization.

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Outcome of a run, job, or step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failure,
    /// Only produced for snapshots of runs that could not be fetched
    Error,
    #[default]
    Unknown,
}

impl RunStatus {
    /// Map a GitHub `conclusion` value onto a status.
    ///
    /// `None` means the run/job/step has not concluded yet.
    pub fn from_conclusion(conclusion: Option<&str>) -> Self {
        match conclusion {
            Some("success") => RunStatus::Success,
            Some("failure") | Some("timed_out") | Some("startup_failure") => RunStatus::Failure,
            Some("error") => RunStatus::Error,
            _ => RunStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failure => "failure",
            RunStatus::Error => "error",
            RunStatus::Unknown => "unknown",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunStatus::Failure)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // `deserialize_any` keeps the key required: serde reports a missing
        // field instead of routing it through `visit_none`.
        deserializer.deserialize_any(RunStatusVisitor)
    }
}

struct RunStatusVisitor;

impl<'de> Visitor<'de> for RunStatusVisitor {
    type Value = RunStatus;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("one of \"success\", \"failure\", \"error\", \"unknown\" or null")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<RunStatus, E> {
        match value {
            "success" => Ok(RunStatus::Success),
            "failure" => Ok(RunStatus::Failure),
            "error" => Ok(RunStatus::Error),
            "unknown" => Ok(RunStatus::Unknown),
            other => Err(E::unknown_variant(other, STATUS_NAMES)),
        }
    }

    // Older snapshots write `null` for steps that never concluded.
    fn visit_unit<E: de::Error>(self) -> Result<RunStatus, E> {
        Ok(RunStatus::Unknown)
    }

    fn visit_none<E: de::Error>(self) -> Result<RunStatus, E> {
        Ok(RunStatus::Unknown)
    }
}

const STATUS_NAMES: &[&str] = &["success", "failure", "error", "unknown"];

/// A single CI run with its ordered jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub workflow_name: String,

    pub run_id: u64,

    pub status: RunStatus,

    pub jobs: Vec<JobRecord>,

    /// Set only on error snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunRecord {
    pub fn new(run_id: u64, workflow_name: impl Into<String>, status: RunStatus) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            run_id,
            status,
            jobs: Vec::new(),
            error: None,
        }
    }

    /// Minimal snapshot written when the run itself could not be fetched
    pub fn error_snapshot(run_id: u64, error: impl Into<String>) -> Self {
        Self {
            workflow_name: "Unknown".to_string(),
            run_id,
            status: RunStatus::Error,
            jobs: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error_snapshot(&self) -> bool {
        self.error.is_some()
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = (&JobRecord, &StepRecord)> {
        self.jobs.iter().flat_map(|job| {
            job.steps
                .iter()
                .filter(|s| s.status.is_failure())
                .map(move |s| (job, s))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: String,

    pub status: RunStatus,

    pub steps: Vec<StepRecord>,
}

impl JobRecord {
    pub fn new(name: impl Into<String>, status: RunStatus) -> Self {
        Self {
            name: name.into(),
            status,
            steps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,

    pub status: RunStatus,

    /// 1-based position within the job
    pub number: u32,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    /// Absent when retrieval was not attempted; never an empty placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_content: Option<String>,
}

impl StepRecord {
    pub fn new(name: impl Into<String>, status: RunStatus, number: u32) -> Self {
        Self {
            name: name.into(),
            status,
            number,
            started_at: None,
            completed_at: None,
            log_content: None,
        }
    }

    /// A step is terminal once the platform reports a completion time.
    pub fn is_terminal(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_conclusion() {
        assert_eq!(RunStatus::from_conclusion(Some("success")), RunStatus::Success);
        assert_eq!(RunStatus::from_conclusion(Some("failure")), RunStatus::Failure);
        assert_eq!(RunStatus::from_conclusion(Some("timed_out")), RunStatus::Failure);
        assert_eq!(RunStatus::from_conclusion(Some("cancelled")), RunStatus::Unknown);
        assert_eq!(RunStatus::from_conclusion(Some("skipped")), RunStatus::Unknown);
        assert_eq!(RunStatus::from_conclusion(None), RunStatus::Unknown);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&RunStatus::Failure).unwrap();
        assert_eq!(json, "\"failure\"");

        let status: RunStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(status, RunStatus::Error);

        let status: RunStatus = serde_json::from_str("null").unwrap();
        assert_eq!(status, RunStatus::Unknown);

        let status: RunStatus = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(status, RunStatus::Unknown);
    }

    #[test]
    fn test_status_rejects_unrecognised_names() {
        assert!(serde_json::from_str::<RunStatus>("\"bogus\"").is_err());
        // Raw GitHub conclusions are mapped at fetch time, never stored.
        assert!(serde_json::from_str::<RunStatus>("\"timed_out\"").is_err());
        assert!(serde_json::from_str::<RunStatus>("3").is_err());
    }

    #[test]
    fn test_absent_log_content_is_not_serialized() {
        let step = StepRecord::new("checkout", RunStatus::Unknown, 1);
        let value = serde_json::to_value(&step).unwrap();

        assert!(value.get("log_content").is_none());
        assert!(value.get("started_at").unwrap().is_null());
        assert!(value.get("completed_at").unwrap().is_null());
    }

    #[test]
    fn test_empty_log_content_is_kept() {
        let mut step = StepRecord::new("checkout", RunStatus::Success, 1);
        step.log_content = Some(String::new());
        let value = serde_json::to_value(&step).unwrap();

        assert_eq!(value.get("log_content").unwrap(), "");
    }

    #[test]
    fn test_error_snapshot_shape() {
        let record = RunRecord::error_snapshot(7, "Not Found");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["workflow_name"], "Unknown");
        assert_eq!(value["run_id"], 7);
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "Not Found");
        assert!(value["jobs"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_failed_steps_keeps_order() {
        let mut run = RunRecord::new(1, "ci", RunStatus::Failure);
        let mut job = JobRecord::new("build", RunStatus::Failure);
        job.steps.push(StepRecord::new("a", RunStatus::Failure, 1));
        job.steps.push(StepRecord::new("b", RunStatus::Success, 2));
        job.steps.push(StepRecord::new("c", RunStatus::Failure, 3));
        run.jobs.push(job);

        let names: Vec<_> = run.failed_steps().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
