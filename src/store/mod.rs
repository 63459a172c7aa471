//! Persistence seam for newsletter subscriptions.
//!
//! Coordinators only ever talk to [`SubscriptionStore`]; the SQLite
//! implementation lives in [`sqlite`]. Each call is atomic for a single
//! record, and nothing here spans several calls in one transaction.

pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{category::Category, subscription::SubscriptionRecord};

pub use sqlite::SqliteSubscriptionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: Category,
    ) -> Result<Option<SubscriptionRecord>, StoreError>;

    /// Create the `(user_id, category)` row or update it in place.
    async fn upsert(
        &self,
        user_id: i64,
        category: Category,
        is_active: bool,
    ) -> Result<SubscriptionRecord, StoreError>;

    async fn count_active(&self, category: Category) -> Result<u64, StoreError>;

    async fn find_all_for_user(&self, user_id: i64) -> Result<Vec<SubscriptionRecord>, StoreError>;

    /// Categories with no active rows are omitted.
    async fn count_active_by_category(&self) -> Result<Vec<(Category, u64)>, StoreError>;

    async fn count_total_active(&self) -> Result<u64, StoreError>;
}
