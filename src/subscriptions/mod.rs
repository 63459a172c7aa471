//! Subscription toggling with deadline-bounded subscriber counts.
//!
//! The outer toggle deadline (8s) wraps the upsert and the count; the count
//! has its own, shorter deadline (3s) nested inside it. Either expiring, or
//! the store failing, yields a fallback value instead of an error.

pub mod count;
pub mod toggle;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use derive_more::Display;
use serde::{Serialize, Serializer};

use crate::models::category::Category;

pub use count::{CountResolver, COUNT_DEADLINE};
pub use toggle::{ToggleCoordinator, TOGGLE_DEADLINE};

/// Wire value for a subscriber count that could not be determined.
pub const UNKNOWN_COUNT: i64 = -1;

/// Why a fallback value was produced.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum FallbackReason {
    #[display(fmt = "timed out after {:?}", _0)]
    TimedOut(Duration),
    #[display(fmt = "store error: {}", _0)]
    StoreFailed(String),
    #[display(fmt = "worker error: {}", _0)]
    WorkerFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResult {
    pub category: Category,
    /// `None` is the "unknown" sentinel, serialized as `-1`. It is never
    /// reported as zero.
    #[serde(serialize_with = "serialize_count")]
    pub count: Option<u64>,
    pub is_fallback: bool,
}

impl CountResult {
    pub fn live(category: Category, count: u64) -> Self {
        Self {
            category,
            count: Some(count),
            is_fallback: false,
        }
    }

    pub fn unknown(category: Category) -> Self {
        Self {
            category,
            count: None,
            is_fallback: true,
        }
    }

    pub fn as_wire_value(&self) -> i64 {
        self.count
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
            .unwrap_or(UNKNOWN_COUNT)
    }
}

fn serialize_count<S: Serializer>(count: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    let value = count
        .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
        .unwrap_or(UNKNOWN_COUNT);
    serializer.serialize_i64(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub category: Category,
    /// The persisted value, or on fallback the requested one.
    pub is_active: bool,
    pub subscriber_count: CountResult,
    /// Set only when the whole toggle (not just the count) degraded.
    pub is_fallback: bool,
}

impl ToggleOutcome {
    pub fn fallback(category: Category, requested_active: bool) -> Self {
        Self {
            category,
            is_active: requested_active,
            subscriber_count: CountResult::unknown(category),
            is_fallback: true,
        }
    }
}
