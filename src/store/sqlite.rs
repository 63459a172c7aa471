use async_trait::async_trait;
use diesel::SqliteConnection;
use tokio::task::spawn_blocking;

use super::{StoreError, SubscriptionStore};
use crate::{
    models::{category::Category, subscription::SubscriptionRecord},
    DbPool,
};

/// Diesel-backed store. Diesel is synchronous, so every call checks out a
/// pooled connection on the blocking pool and never runs on an async worker.
#[derive(Clone)]
pub struct SqliteSubscriptionStore {
    pool: DbPool,
}

impl SqliteSubscriptionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> diesel::QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        spawn_blocking(move || -> Result<T, StoreError> {
            let mut conn = pool.get()?;
            Ok(op(&mut *conn)?)
        })
        .await?
    }
}

// SQLite COUNT(*) is never negative
fn to_count(n: i64) -> u64 {
    n.max(0) as u64
}

#[async_trait]
impl SubscriptionStore for SqliteSubscriptionStore {
    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: Category,
    ) -> Result<Option<SubscriptionRecord>, StoreError> {
        self.with_conn(move |conn| {
            SubscriptionRecord::get_for_user_and_category(conn, user_id, category)
        })
        .await
    }

    async fn upsert(
        &self,
        user_id: i64,
        category: Category,
        is_active: bool,
    ) -> Result<SubscriptionRecord, StoreError> {
        self.with_conn(move |conn| SubscriptionRecord::upsert(conn, user_id, category, is_active))
            .await
    }

    async fn count_active(&self, category: Category) -> Result<u64, StoreError> {
        self.with_conn(move |conn| SubscriptionRecord::count_active_for_category(conn, category))
            .await
            .map(to_count)
    }

    async fn find_all_for_user(&self, user_id: i64) -> Result<Vec<SubscriptionRecord>, StoreError> {
        self.with_conn(move |conn| SubscriptionRecord::get_all_for_user(conn, user_id))
            .await
    }

    async fn count_active_by_category(&self) -> Result<Vec<(Category, u64)>, StoreError> {
        let rows = self
            .with_conn(SubscriptionRecord::count_active_by_category)
            .await?;
        Ok(rows.into_iter().map(|(c, n)| (c, to_count(n))).collect())
    }

    async fn count_total_active(&self) -> Result<u64, StoreError> {
        self.with_conn(SubscriptionRecord::count_total_active)
            .await
            .map(to_count)
    }
}
