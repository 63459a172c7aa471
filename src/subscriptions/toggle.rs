use std::{sync::Arc, time::Duration};

use tokio::time::Instant;

use super::{CountResolver, FallbackReason, ToggleOutcome};
use crate::{
    deadline::{run_with_deadline, DeadlineError},
    errors::ValidationError,
    models::category::Category,
    observability::SubscriptionTelemetry,
    store::{StoreError, SubscriptionStore},
};

/// Outer deadline for the whole toggle (upsert plus count).
pub const TOGGLE_DEADLINE: Duration = Duration::from_secs(8);

/// Flips a user's category subscription and reports the fresh subscriber
/// count, bounded by [`TOGGLE_DEADLINE`].
///
/// Concurrent toggles for the same `(user, category)` are not serialized
/// here; the store's last write wins. The upsert and the count are two
/// separate store calls, so the count may or may not include this write.
#[derive(Clone)]
pub struct ToggleCoordinator {
    store: Arc<dyn SubscriptionStore>,
    counts: CountResolver,
    telemetry: Arc<dyn SubscriptionTelemetry>,
    deadline: Duration,
}

impl ToggleCoordinator {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        counts: CountResolver,
        telemetry: Arc<dyn SubscriptionTelemetry>,
    ) -> Self {
        Self {
            store,
            counts,
            telemetry,
            deadline: TOGGLE_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Validate the raw category code, then toggle. Validation failures
    /// return before any store call or timer starts.
    pub async fn toggle(
        &self,
        user_id: i64,
        category: &str,
        desired_active: bool,
    ) -> Result<ToggleOutcome, ValidationError> {
        let category: Category = category.parse()?;
        Ok(self.toggle_category(user_id, category, desired_active).await)
    }

    /// Never fails: timeouts and store errors both produce
    /// [`ToggleOutcome::fallback`], and callers cannot tell them apart.
    ///
    /// On the timeout path the upsert may still land after we return.
    pub async fn toggle_category(
        &self,
        user_id: i64,
        category: Category,
        desired_active: bool,
    ) -> ToggleOutcome {
        let started = Instant::now();

        let store = Arc::clone(&self.store);
        let counts = self.counts.clone();
        let telemetry = Arc::clone(&self.telemetry);
        let work = async move {
            let existing = store.find_by_user_and_category(user_id, category).await?;
            let record = store.upsert(user_id, category, desired_active).await?;
            telemetry.toggle_applied(user_id, category, record.is_active, existing.is_none());

            let subscriber_count = counts.get_count_with_fallback(category).await;
            Ok::<_, StoreError>(ToggleOutcome {
                category,
                is_active: record.is_active,
                subscriber_count,
                is_fallback: false,
            })
        };

        let reason = match run_with_deadline(work, self.deadline).await {
            Ok(Ok(outcome)) => {
                self.telemetry
                    .toggle_completed(user_id, category, started.elapsed());
                return outcome;
            }
            Ok(Err(e)) => FallbackReason::StoreFailed(e.to_string()),
            Err(DeadlineError::TimedOut(after)) => FallbackReason::TimedOut(after),
            Err(e) => FallbackReason::WorkerFailed(e.to_string()),
        };

        self.telemetry
            .toggle_degraded(user_id, category, &reason, started.elapsed());
        ToggleOutcome::fallback(category, desired_active)
    }
}
