//! Freshness policy evaluation.

use serde::{Deserialize, Serialize};

/// Caller-supplied freshness constraints for snapshot lookups.
///
/// `max_age` bounds how old the current snapshot may be relative to now.
/// `max_timestamp` bounds the query to the state of the world as of a past
/// instant. Both are optional and independent; the default policy accepts
/// any snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    /// Maximum snapshot age in seconds. Absent means unlimited. Zero or
    /// negative means no snapshot is ever fresh enough (forced refresh) -
    /// callers must not assume "0 means unlimited".
    pub max_age: Option<i64>,

    /// Upper bound on snapshot timestamps, seconds since epoch.
    pub max_timestamp: Option<i64>,
}

impl Policy {
    /// Policy accepting snapshots younger than `seconds`.
    pub fn fresh_within(seconds: i64) -> Self {
        Self { max_age: Some(seconds), max_timestamp: None }
    }

    /// Policy reading the state of the world as of `timestamp`.
    pub fn as_of(timestamp: i64) -> Self {
        Self { max_age: None, max_timestamp: Some(timestamp) }
    }

    /// Whether a snapshot taken at `snapped_at` still satisfies this policy
    /// at `now`.
    pub fn allows(&self, snapped_at: i64, now: i64) -> bool {
        match self.max_age {
            None => true,
            Some(max_age) => now - snapped_at < max_age,
        }
    }
}
