use std::{sync::Arc, time::Duration};

use super::{CountResult, FallbackReason};
use crate::{
    deadline::{run_with_deadline, DeadlineError},
    models::category::Category,
    observability::SubscriptionTelemetry,
    store::SubscriptionStore,
};

/// Inner deadline for a single category count.
pub const COUNT_DEADLINE: Duration = Duration::from_secs(3);

/// Resolves live subscriber counts without ever blocking past its deadline.
#[derive(Clone)]
pub struct CountResolver {
    store: Arc<dyn SubscriptionStore>,
    telemetry: Arc<dyn SubscriptionTelemetry>,
    deadline: Duration,
}

impl CountResolver {
    pub fn new(store: Arc<dyn SubscriptionStore>, telemetry: Arc<dyn SubscriptionTelemetry>) -> Self {
        Self {
            store,
            telemetry,
            deadline: COUNT_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Live count, or the unknown sentinel on timeout or store error.
    /// Failures are logged and never retried.
    pub async fn get_count_with_fallback(&self, category: Category) -> CountResult {
        let store = Arc::clone(&self.store);
        let query = async move { store.count_active(category).await };

        let reason = match run_with_deadline(query, self.deadline).await {
            Ok(Ok(count)) => return CountResult::live(category, count),
            Ok(Err(e)) => FallbackReason::StoreFailed(e.to_string()),
            Err(DeadlineError::TimedOut(after)) => FallbackReason::TimedOut(after),
            Err(e) => FallbackReason::WorkerFailed(e.to_string()),
        };

        self.telemetry.count_degraded(category, &reason);
        CountResult::unknown(category)
    }
}
