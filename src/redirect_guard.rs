use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StoreState;

/// Storage key of the redirect record.
pub const REDIRECT_RECORD_KEY: &str = "auth_redirect_record";
/// Attempts within one window at which the guard escalates.
pub const REDIRECT_THRESHOLD: u32 = 3;
/// Window after which the counter starts over at 1.
pub const REDIRECT_WINDOW_MS: i64 = 5 * 60 * 1000;

/// RedirectRecord
///
/// Persisted as JSON under `REDIRECT_RECORD_KEY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRecord {
    pub count: u32,
    pub timestamp_ms: i64,
}

/// Detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub should_escalate: bool,
    pub count: u32,
}

/// RedirectGuard
///
/// Circuit breaker against auth-redirect loops. Every logical redirect attempt
/// calls `detect` exactly once, right before navigating; calling it without
/// following through inflates the counter.
#[derive(Clone)]
pub struct RedirectGuard {
    store: StoreState,
}

impl RedirectGuard {
    pub fn new(store: StoreState) -> Self {
        Self { store }
    }

    pub fn detect(&self) -> Detection {
        self.detect_at(Utc::now())
    }

    /// detect_at
    ///
    /// Records one attempt at `now`. The window does not decay: once
    /// `now - timestamp >= 5 min` the counter restarts at 1.
    pub fn detect_at(&self, now: DateTime<Utc>) -> Detection {
        let now_ms = now.timestamp_millis();

        let count = match self.record() {
            Some(record) if now_ms - record.timestamp_ms < REDIRECT_WINDOW_MS => {
                record.count.saturating_add(1)
            }
            _ => 1,
        };
        self.persist(RedirectRecord {
            count,
            timestamp_ms: now_ms,
        });

        let should_escalate = count >= REDIRECT_THRESHOLD;
        if should_escalate {
            tracing::warn!(count, "Redirect loop detected");
        } else {
            tracing::debug!(count, "Redirect attempt recorded");
        }
        Detection {
            should_escalate,
            count,
        }
    }

    /// reset
    ///
    /// Clears the record. Called on confirmed authentication and on the user's
    /// explicit "try again".
    pub fn reset(&self) {
        self.store.remove(REDIRECT_RECORD_KEY);
    }

    /// The current record. A value that does not parse counts as no record.
    pub fn record(&self) -> Option<RedirectRecord> {
        self.store
            .get(REDIRECT_RECORD_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    fn persist(&self, record: RedirectRecord) {
        match serde_json::to_string(&record) {
            Ok(raw) => self.store.set(REDIRECT_RECORD_KEY, &raw),
            Err(e) => tracing::error!(error = %e, "Failed to persist redirect record"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Duration;

    fn guard() -> RedirectGuard {
        RedirectGuard::new(MemoryStore::shared())
    }

    #[test]
    fn third_attempt_in_window_escalates() {
        let guard = guard();
        let start = Utc::now();
        assert_eq!(
            guard.detect_at(start),
            Detection {
                should_escalate: false,
                count: 1
            }
        );
        assert!(!guard.detect_at(start + Duration::seconds(30)).should_escalate);
        let third = guard.detect_at(start + Duration::seconds(60));
        assert!(third.should_escalate);
        assert_eq!(third.count, 3);
    }

    #[test]
    fn gap_longer_than_window_restarts_at_one() {
        let guard = guard();
        let start = Utc::now();
        guard.detect_at(start);
        let later = guard.detect_at(start + Duration::minutes(6));
        assert_eq!(
            later,
            Detection {
                should_escalate: false,
                count: 1
            }
        );
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let guard = guard();
        let start = Utc::now();
        guard.detect_at(start);
        let at_boundary = guard.detect_at(start + Duration::milliseconds(REDIRECT_WINDOW_MS));
        assert_eq!(at_boundary.count, 1);
    }

    #[test]
    fn window_slides_with_each_attempt() {
        let guard = guard();
        let start = Utc::now();
        guard.detect_at(start);
        guard.detect_at(start + Duration::minutes(4));
        let third = guard.detect_at(start + Duration::minutes(8));
        assert_eq!(third.count, 3);
        assert!(third.should_escalate);
    }

    #[test]
    fn reset_then_detect_starts_over() {
        let guard = guard();
        let now = Utc::now();
        guard.detect_at(now);
        guard.detect_at(now);
        guard.reset();
        assert_eq!(guard.record(), None);
        assert_eq!(
            guard.detect_at(now),
            Detection {
                should_escalate: false,
                count: 1
            }
        );
    }

    #[test]
    fn corrupt_record_is_treated_as_absent() {
        let store = MemoryStore::shared();
        store.set(REDIRECT_RECORD_KEY, "not json");
        let guard = RedirectGuard::new(store);
        assert_eq!(guard.detect().count, 1);
    }
}
