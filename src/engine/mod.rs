//! Repair loop engine
//!
//! This module contains:
//! - `fetcher` - Builds a run snapshot from the CI platform
//! - `summary` - Renders a snapshot as a Markdown report
//! - `attempt` - Derives the next attempt number from repair history
//! - `repair` - Runs one bounded repair attempt
//! - `error` - Engine error types

pub mod attempt;
pub mod error;
pub mod fetcher;
pub mod repair;
pub mod summary;

pub use attempt::{
    attempt_message, next_from_records, parse_attempt, AttemptCounter, MalformedAttempt,
    ATTEMPT_TITLE_PREFIX,
};
pub use error::{RepairError, SummaryError};
pub use fetcher::{LogFetcher, StepLog};
pub use repair::{build_prompt, RepairEngine, RepairOutcome, RepairRequest};
pub use summary::{fallback_report, SummaryRenderer, SUMMARY_LOG_CAP, SUMMARY_TITLE};
