use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{models::category::Category, subscriptions::FallbackReason};

/// Initialize structured logging and tracing
pub fn init_logging(log_level: &str, log_format: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if log_format == "json" {
        // JSON structured logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        // Pretty logging for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }

    info!(
        service = "newsletter",
        version = env!("CARGO_PKG_VERSION"),
        log_level = %log_level,
        log_format = %log_format,
        "Logging initialized"
    );
}

/// Structured events emitted by the subscription coordinators. Components
/// receive an implementation instead of logging through globals, so tests
/// can observe degraded paths directly.
pub trait SubscriptionTelemetry: Send + Sync {
    fn count_degraded(&self, category: Category, reason: &FallbackReason);

    fn toggle_applied(&self, user_id: i64, category: Category, is_active: bool, created: bool);

    fn toggle_completed(&self, user_id: i64, category: Category, elapsed: Duration);

    fn toggle_degraded(
        &self,
        user_id: i64,
        category: Category,
        reason: &FallbackReason,
        elapsed: Duration,
    );
}

/// Default telemetry: `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl SubscriptionTelemetry for TracingTelemetry {
    fn count_degraded(&self, category: Category, reason: &FallbackReason) {
        warn!(
            category = %category,
            reason = %reason,
            "Subscriber count unavailable, returning fallback"
        );
    }

    fn toggle_applied(&self, user_id: i64, category: Category, is_active: bool, created: bool) {
        info!(
            user_id = user_id,
            category = %category,
            is_active = is_active,
            created = created,
            "Subscription state stored"
        );
    }

    fn toggle_completed(&self, user_id: i64, category: Category, elapsed: Duration) {
        info!(
            user_id = user_id,
            category = %category,
            elapsed_ms = elapsed.as_millis() as u64,
            "Subscription toggle completed"
        );
    }

    fn toggle_degraded(
        &self,
        user_id: i64,
        category: Category,
        reason: &FallbackReason,
        elapsed: Duration,
    ) {
        warn!(
            user_id = user_id,
            category = %category,
            reason = %reason,
            elapsed_ms = elapsed.as_millis() as u64,
            "Subscription toggle degraded to fallback"
        );
    }
}
