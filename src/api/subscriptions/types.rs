use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    errors::ValidationError,
    models::{category::Category, subscription::SubscriptionRecord},
    subscriptions::ToggleOutcome,
};

/// Raw toggle body. Both fields are optional here so that a missing value
/// is reported as a validation error rather than a parse failure.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

impl ToggleRequest {
    pub fn into_parts(self) -> Result<(String, bool), ValidationError> {
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .ok_or(ValidationError::MissingCategory)?;
        let is_active = self.is_active.ok_or(ValidationError::MissingActiveFlag)?;
        Ok((category, is_active))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    #[serde(flatten)]
    pub outcome: ToggleOutcome,
    pub message: &'static str,
}

impl From<ToggleOutcome> for ToggleResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        let message = match (outcome.is_fallback, outcome.is_active) {
            (true, _) => {
                "Service temporarily degraded: the request was accepted but its result could not be confirmed"
            }
            (false, true) => "Subscription activated",
            (false, false) => "Subscription deactivated",
        };
        Self { outcome, message }
    }
}

/// One card in "my subscriptions"
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCard {
    pub subscription_id: i32,
    pub category: Category,
    pub category_name: &'static str,
    pub is_active: bool,
    pub subscribed_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// `-1` when the count could not be resolved in time
    pub subscriber_count: i64,
}

impl SubscriptionCard {
    pub fn new(record: SubscriptionRecord, subscriber_count: i64) -> Self {
        Self {
            subscription_id: record.id,
            category: record.category,
            category_name: record.category.display_name(),
            is_active: record.is_active,
            subscribed_at: record.subscribed_at,
            updated_at: record.updated_at,
            subscriber_count,
        }
    }
}

/// A catalogue entry with the caller's state and the category's live count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySubscription {
    pub category: Category,
    pub category_name: &'static str,
    pub is_active: bool,
    pub subscribed_at: Option<NaiveDateTime>,
    pub subscriber_count: u64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStats {
    pub total_subscriptions: usize,
    pub active_subscriptions: usize,
    pub inactive_subscriptions: usize,
    pub total_subscribers: u64,
}

impl SubscriptionStats {
    pub fn new(records: &[SubscriptionRecord], total_subscribers: u64) -> Self {
        let active = records.iter().filter(|r| r.is_active).count();
        Self {
            total_subscriptions: records.len(),
            active_subscriptions: active,
            inactive_subscriptions: records.len() - active,
            total_subscribers,
        }
    }
}

/// Presence check for one category. The record fields are omitted when
/// the caller never subscribed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCheck {
    pub category: Category,
    pub is_subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_at: Option<NaiveDateTime>,
}

impl SubscriptionCheck {
    pub fn new(category: Category, record: Option<SubscriptionRecord>) -> Self {
        Self {
            category,
            is_subscribed: record.is_some(),
            subscription_id: record.as_ref().map(|r| r.id),
            is_active: record.as_ref().map(|r| r.is_active),
            subscribed_at: record.map(|r| r.subscribed_at),
        }
    }
}
