use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI32, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;

use super::FallbackReason;
use crate::{
    models::{category::Category, subscription::SubscriptionRecord},
    observability::SubscriptionTelemetry,
    store::{StoreError, SubscriptionStore},
};

#[derive(Debug, Clone, Copy)]
pub enum Latency {
    Immediate,
    Delay(Duration),
    Hang,
}

impl Latency {
    async fn wait(self) {
        match self {
            Latency::Immediate => {}
            Latency::Delay(d) => tokio::time::sleep(d).await,
            Latency::Hang => std::future::pending::<()>().await,
        }
    }
}

/// In-memory store with scripted latency and failures.
pub struct FakeStore {
    records: Mutex<HashMap<(i64, Category), SubscriptionRecord>>,
    next_id: AtomicI32,
    calls: AtomicUsize,
    write_latency: Latency,
    count_latency: Latency,
    fixed_count: Option<u64>,
    fail_writes: bool,
    fail_counts: bool,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
            calls: AtomicUsize::new(0),
            write_latency: Latency::Immediate,
            count_latency: Latency::Immediate,
            fixed_count: None,
            fail_writes: false,
            fail_counts: false,
        }
    }
}

impl FakeStore {
    pub fn with_write_latency(mut self, latency: Latency) -> Self {
        self.write_latency = latency;
        self
    }

    pub fn with_count_latency(mut self, latency: Latency) -> Self {
        self.count_latency = latency;
        self
    }

    pub fn with_fixed_count(mut self, count: u64) -> Self {
        self.fixed_count = Some(count);
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_counts(mut self) -> Self {
        self.fail_counts = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn records_for(&self, user_id: i64) -> Vec<SubscriptionRecord> {
        self.records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriptionStore for FakeStore {
    async fn find_by_user_and_category(
        &self,
        user_id: i64,
        category: Category,
    ) -> Result<Option<SubscriptionRecord>, StoreError> {
        self.touch();
        Ok(self.records.lock().unwrap().get(&(user_id, category)).cloned())
    }

    async fn upsert(
        &self,
        user_id: i64,
        category: Category,
        is_active: bool,
    ) -> Result<SubscriptionRecord, StoreError> {
        self.touch();
        self.write_latency.wait().await;
        if self.fail_writes {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }

        let now = Utc::now().naive_utc();
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry((user_id, category))
            .and_modify(|r| {
                r.is_active = is_active;
                r.updated_at = now;
            })
            .or_insert_with(|| SubscriptionRecord {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                user_id,
                category,
                is_active,
                subscribed_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn count_active(&self, category: Category) -> Result<u64, StoreError> {
        self.touch();
        self.count_latency.wait().await;
        if self.fail_counts {
            return Err(StoreError::Unavailable("count rejected".to_string()));
        }
        if let Some(n) = self.fixed_count {
            return Ok(n);
        }
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .filter(|r| r.category == category && r.is_active)
            .count() as u64)
    }

    async fn find_all_for_user(&self, user_id: i64) -> Result<Vec<SubscriptionRecord>, StoreError> {
        self.touch();
        let mut found = self.records_for(user_id);
        found.sort_by_key(|r| r.id);
        Ok(found)
    }

    async fn count_active_by_category(&self) -> Result<Vec<(Category, u64)>, StoreError> {
        self.touch();
        let records = self.records.lock().unwrap();
        let mut counts: HashMap<Category, u64> = HashMap::new();
        for r in records.values().filter(|r| r.is_active) {
            *counts.entry(r.category).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn count_total_active(&self) -> Result<u64, StoreError> {
        self.touch();
        let records = self.records.lock().unwrap();
        Ok(records.values().filter(|r| r.is_active).count() as u64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CountDegraded(Category, FallbackReason),
    Applied { user_id: i64, category: Category, is_active: bool, created: bool },
    Completed(i64, Category),
    Degraded(i64, Category, FallbackReason),
}

#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<Event>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl SubscriptionTelemetry for RecordingTelemetry {
    fn count_degraded(&self, category: Category, reason: &FallbackReason) {
        self.push(Event::CountDegraded(category, reason.clone()));
    }

    fn toggle_applied(&self, user_id: i64, category: Category, is_active: bool, created: bool) {
        self.push(Event::Applied { user_id, category, is_active, created });
    }

    fn toggle_completed(&self, user_id: i64, category: Category, _elapsed: Duration) {
        self.push(Event::Completed(user_id, category));
    }

    fn toggle_degraded(
        &self,
        user_id: i64,
        category: Category,
        reason: &FallbackReason,
        _elapsed: Duration,
    ) {
        self.push(Event::Degraded(user_id, category, reason.clone()));
    }
}
