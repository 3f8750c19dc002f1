//! Per-session page visit history.
//!
//! The history lives in three session keys: `visits` (a list of
//! `[page, elapsed_seconds, index]` triples), `old_page` and `old_time`
//! (a `%Y-%m-%d %H:%M:%S` timestamp). [`VisitLog`] holds those three values
//! and applies one tracked page load to them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the `old_time` session value.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised while updating the visit history.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VisitError {
    /// `old_time` does not match [`TIMESTAMP_FORMAT`].
    #[error("malformed visit timestamp {0:?}")]
    MalformedTimestamp(String),
    /// History entries exist but `old_time` is missing.
    #[error("visit history has entries but no timestamp")]
    MissingTimestamp,
}

/// One entry of the visit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, i64, u32)", into = "(String, i64, u32)")]
pub struct Visit {
    pub page: String,
    pub elapsed_seconds: i64,
    pub index: u32,
}

impl From<(String, i64, u32)> for Visit {
    fn from((page, elapsed_seconds, index): (String, i64, u32)) -> Self {
        Self {
            page,
            elapsed_seconds,
            index,
        }
    }
}

impl From<Visit> for (String, i64, u32) {
    fn from(visit: Visit) -> Self {
        (visit.page, visit.elapsed_seconds, visit.index)
    }
}

/// The visit-related session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitLog {
    pub visits: Vec<Visit>,
    pub old_page: Option<String>,
    pub old_time: Option<String>,
}

impl VisitLog {
    /// Apply a tracked page load of `page` at `now`.
    ///
    /// The first tracked load starts the history with `(page, 0, 1)` and
    /// remembers `page` and `now`. Later loads rewrite every entry: its page
    /// becomes the remembered page, its elapsed time is measured from the
    /// remembered timestamp (which then moves to `now`), and its index becomes
    /// its 1-based position. The remembered page itself is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError`] if entries exist and the remembered timestamp
    /// is missing or malformed. The log is left unchanged in that case.
    pub fn record(&mut self, page: &str, now: NaiveDateTime) -> Result<(), VisitError> {
        let Some(old_page) = self.old_page.clone() else {
            self.visits = vec![Visit {
                page: page.to_owned(),
                elapsed_seconds: 0,
                index: 1,
            }];
            self.old_page = Some(page.to_owned());
            self.old_time = Some(format_timestamp(now));
            return Ok(());
        };

        let mut old_time = self.old_time.clone();
        let mut visits = self.visits.clone();
        for (position, visit) in visits.iter_mut().enumerate() {
            let previous = old_time
                .as_deref()
                .ok_or(VisitError::MissingTimestamp)
                .and_then(parse_timestamp)?;
            visit.page.clone_from(&old_page);
            visit.elapsed_seconds = (now - previous).num_seconds().max(0);
            visit.index = u32::try_from(position + 1).unwrap_or(u32::MAX);
            old_time = Some(format_timestamp(now));
        }

        self.visits = visits;
        self.old_time = old_time;
        Ok(())
    }
}

/// Format a timestamp the way it is stored in the session.
#[must_use]
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a session timestamp.
///
/// # Errors
///
/// Returns [`VisitError::MalformedTimestamp`] if `value` does not match
/// [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, VisitError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|_| VisitError::MalformedTimestamp(value.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_first_visit_starts_history() {
        let mut log = VisitLog::default();
        log.record("/", at("2024-05-01 10:00:00")).unwrap();

        assert_eq!(
            log.visits,
            vec![Visit {
                page: "/".to_owned(),
                elapsed_seconds: 0,
                index: 1
            }]
        );
        assert_eq!(log.old_page.as_deref(), Some("/"));
        assert_eq!(log.old_time.as_deref(), Some("2024-05-01 10:00:00"));
    }

    #[test]
    fn test_second_visit_measures_elapsed_time() {
        let mut log = VisitLog::default();
        log.record("/", at("2024-05-01 10:00:00")).unwrap();
        log.record("/products/3", at("2024-05-01 10:01:30")).unwrap();

        assert_eq!(log.visits.len(), 1);
        assert_eq!(log.visits[0].page, "/");
        assert_eq!(log.visits[0].elapsed_seconds, 90);
        assert_eq!(log.visits[0].index, 1);
        assert_eq!(log.old_page.as_deref(), Some("/"));
        assert_eq!(log.old_time.as_deref(), Some("2024-05-01 10:01:30"));
    }

    #[test]
    fn test_every_entry_is_rewritten_in_order() {
        let mut log = VisitLog {
            visits: vec![
                Visit {
                    page: "/a".to_owned(),
                    elapsed_seconds: 5,
                    index: 9,
                },
                Visit {
                    page: "/b".to_owned(),
                    elapsed_seconds: 7,
                    index: 9,
                },
            ],
            old_page: Some("/home".to_owned()),
            old_time: Some("2024-05-01 09:59:50".to_owned()),
        };
        log.record("/basket", at("2024-05-01 10:00:00")).unwrap();

        // The first entry is measured from the stored time, later ones from now.
        assert_eq!(log.visits[0].elapsed_seconds, 10);
        assert_eq!(log.visits[1].elapsed_seconds, 0);
        assert!(log.visits.iter().all(|v| v.page == "/home"));
        assert_eq!(
            log.visits.iter().map(|v| v.index).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_clock_going_backwards_clamps_to_zero() {
        let mut log = VisitLog::default();
        log.record("/", at("2024-05-01 10:00:00")).unwrap();
        log.record("/", at("2024-05-01 09:00:00")).unwrap();
        assert_eq!(log.visits[0].elapsed_seconds, 0);
    }

    #[test]
    fn test_malformed_timestamp_is_an_error() {
        let mut log = VisitLog {
            visits: vec![Visit {
                page: "/".to_owned(),
                elapsed_seconds: 0,
                index: 1,
            }],
            old_page: Some("/".to_owned()),
            old_time: Some("yesterday".to_owned()),
        };
        let before = log.clone();
        assert_eq!(
            log.record("/", at("2024-05-01 10:00:00")),
            Err(VisitError::MalformedTimestamp("yesterday".to_owned()))
        );
        assert_eq!(log, before);
    }

    #[test]
    fn test_missing_timestamp_with_entries_is_an_error() {
        let mut log = VisitLog {
            visits: vec![Visit {
                page: "/".to_owned(),
                elapsed_seconds: 0,
                index: 1,
            }],
            old_page: Some("/".to_owned()),
            old_time: None,
        };
        assert_eq!(
            log.record("/", at("2024-05-01 10:00:00")),
            Err(VisitError::MissingTimestamp)
        );
    }

    #[test]
    fn test_visit_serializes_as_triple() {
        let visit = Visit {
            page: "/".to_owned(),
            elapsed_seconds: 12,
            index: 1,
        };
        assert_eq!(serde_json::to_string(&visit).unwrap(), r#"["/",12,1]"#);
    }
}
