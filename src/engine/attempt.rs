//! Attempt counter
//!
//! There is no local state between runs. The next attempt number is rebuilt
//! from the repair history: the newest record whose title carries the attempt
//! marker holds the highest number, so scanning stops at the first match.
//!
//! Any failure while reading history yields attempt 1. A permissions error is
//! therefore indistinguishable from an empty history; callers that need the
//! difference should look at the logs.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::client::{RepairHistory, RepairRecord};

/// Prefix shared by commit messages and the records scanned for them
pub const ATTEMPT_TITLE_PREFIX: &str = "AI: Fix attempt #";

static ATTEMPT_TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AI: Fix attempt #(\S*)").unwrap());

/// A title carries the marker but no readable number after it
#[derive(Debug, thiserror::Error)]
#[error("Malformed attempt number in title: {0}")]
pub struct MalformedAttempt(pub String);

/// Commit message (and expected record title) for attempt `attempt`
pub fn attempt_message(attempt: u32) -> String {
    format!("{}{} for workflow issues", ATTEMPT_TITLE_PREFIX, attempt)
}

/// Attempt number embedded in `title`.
///
/// `Ok(None)` when the title does not start with the marker.
pub fn parse_attempt(title: &str) -> Result<Option<u32>, MalformedAttempt> {
    let Some(captures) = ATTEMPT_TITLE_REGEX.captures(title) else {
        return Ok(None);
    };
    let token = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    token
        .parse::<u32>()
        .map(Some)
        .map_err(|_| MalformedAttempt(title.to_string()))
}

/// Next attempt from records ordered newest first.
///
/// Only the first record carrying the marker is read.
pub fn next_from_records<'a, I>(records: I) -> Result<Option<u32>, MalformedAttempt>
where
    I: IntoIterator<Item = &'a RepairRecord>,
{
    for record in records {
        if let Some(n) = parse_attempt(&record.title)? {
            return Ok(Some(n.saturating_add(1)));
        }
    }
    Ok(None)
}

pub struct AttemptCounter<'a> {
    history: &'a dyn RepairHistory,
    max_pages: u32,
}

impl<'a> AttemptCounter<'a> {
    pub fn new(history: &'a dyn RepairHistory) -> Self {
        Self {
            history,
            max_pages: 10,
        }
    }

    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages.max(1);
        self
    }

    /// Next attempt ordinal, always at least 1.
    pub async fn next_attempt(&self) -> u32 {
        for page in 1..=self.max_pages {
            let records = match self.history.list_records(page).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "Could not read repair history, starting at attempt 1");
                    return 1;
                }
            };

            if records.is_empty() {
                break;
            }

            match next_from_records(&records) {
                Ok(Some(next)) => {
                    info!(attempt = next, "Found previous fix attempt");
                    return next;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Could not read attempt number, starting at attempt 1");
                    return 1;
                }
            }
            debug!(page, "No fix attempts on page");
        }

        info!("No previous fix attempts found");
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeHistory {
        pages: Vec<Vec<RepairRecord>>,
        fail: bool,
        requested: Mutex<Vec<u32>>,
    }

    impl FakeHistory {
        fn with_pages(pages: Vec<Vec<&str>>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|p| p.into_iter().map(RepairRecord::titled).collect())
                    .collect(),
                fail: false,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                pages: Vec::new(),
                fail: true,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RepairHistory for FakeHistory {
        async fn list_records(&self, page: u32) -> Result<Vec<RepairRecord>, ClientError> {
            self.requested.lock().unwrap().push(page);
            if self.fail {
                return Err(ClientError::HttpError {
                    status: 403,
                    message: "Resource not accessible by integration".to_string(),
                });
            }
            Ok(self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default())
        }
    }

    #[test]
    fn test_attempt_message_round_trips() {
        assert_eq!(attempt_message(3), "AI: Fix attempt #3 for workflow issues");
        assert_eq!(parse_attempt(&attempt_message(17)).unwrap(), Some(17));
    }

    #[test]
    fn test_parse_attempt() {
        assert_eq!(parse_attempt("AI: Fix attempt #2 ...").unwrap(), Some(2));
        assert_eq!(parse_attempt("AI: Fix attempt #12").unwrap(), Some(12));
        assert_eq!(parse_attempt("Fix attempt #3").unwrap(), None);
        assert_eq!(parse_attempt("Revert \"AI: Fix attempt #3\"").unwrap(), None);
    }

    #[test]
    fn test_parse_attempt_malformed_number() {
        assert!(parse_attempt("AI: Fix attempt #x for workflow issues").is_err());
        assert!(parse_attempt("AI: Fix attempt #").is_err());
        assert!(parse_attempt("AI: Fix attempt #99999999999999999999").is_err());
    }

    #[tokio::test]
    async fn test_most_recent_match_wins() {
        let history = FakeHistory::with_pages(vec![vec![
            "AI: Fix attempt #3 for workflow issues",
            "AI: Fix attempt #2 for workflow issues",
        ]]);
        assert_eq!(AttemptCounter::new(&history).next_attempt().await, 4);
    }

    #[tokio::test]
    async fn test_non_matching_titles_are_skipped() {
        let history = FakeHistory::with_pages(vec![vec![
            "Bump serde",
            "AI: Fix attempt #5 for workflow issues",
        ]]);
        assert_eq!(AttemptCounter::new(&history).next_attempt().await, 6);
    }

    #[tokio::test]
    async fn test_empty_history_starts_at_one() {
        let history = FakeHistory::with_pages(vec![]);
        assert_eq!(AttemptCounter::new(&history).next_attempt().await, 1);
    }

    #[tokio::test]
    async fn test_no_match_starts_at_one() {
        let history = FakeHistory::with_pages(vec![vec!["Add README", "Fix typo"]]);
        assert_eq!(AttemptCounter::new(&history).next_attempt().await, 1);
    }

    #[tokio::test]
    async fn test_history_error_starts_at_one() {
        let history = FakeHistory::failing();
        assert_eq!(AttemptCounter::new(&history).next_attempt().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_newest_match_starts_at_one() {
        let history = FakeHistory::with_pages(vec![vec![
            "AI: Fix attempt #three for workflow issues",
            "AI: Fix attempt #2 for workflow issues",
        ]]);
        assert_eq!(AttemptCounter::new(&history).next_attempt().await, 1);
    }

    #[tokio::test]
    async fn test_scans_later_pages_until_match() {
        let history = FakeHistory::with_pages(vec![
            vec!["Add README"],
            vec!["Fix typo", "AI: Fix attempt #1 for workflow issues"],
            vec!["AI: Fix attempt #9 for workflow issues"],
        ]);
        assert_eq!(AttemptCounter::new(&history).next_attempt().await, 2);
        assert_eq!(*history.requested.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_page_limit_is_respected() {
        let history = FakeHistory::with_pages(vec![
            vec!["a"],
            vec!["b"],
            vec!["AI: Fix attempt #4 for workflow issues"],
        ]);
        let counter = AttemptCounter::new(&history).with_max_pages(2);
        assert_eq!(counter.next_attempt().await, 1);
        assert_eq!(*history.requested.lock().unwrap(), vec![1, 2]);
    }
}
