//! Run snapshot types and persistence
//!
//! The snapshot is the JSON hand-off between the log fetcher and everything
//! downstream of it:
//! - `record` - RunRecord, JobRecord, StepRecord and RunStatus
//! - `truncate` - Character-based log truncation
//! - `loader` - Read and write snapshot files

pub mod loader;
pub mod record;
pub mod truncate;

pub use loader::{SnapshotError, SnapshotLoader};
pub use record::{JobRecord, RunRecord, RunStatus, StepRecord};
pub use truncate::{truncate_log, FETCH_LOG_CAP, TRUNCATION_MARKER};
