//! Audit store backends.
//!
//! The engine appends through the [`ActivityStore`] trait; the query surface
//! reads through it. The store exclusively owns the activity log: no other
//! component writes to it, and nothing ever updates or deletes an entry.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use trellis_db::{ActivityFilter, ActivityLog, ActivitySummary, NewActivity};
use trellis_db::models::activity_log::ActivityTypeCount;

use crate::error::ActivityError;

/// Append-only persistence for audit entries, plus the read queries backing
/// the activity API.
#[async_trait::async_trait]
pub trait ActivityStore: Send + Sync {
    /// Append an entry.
    async fn insert(&self, input: NewActivity) -> Result<ActivityLog, ActivityError>;

    /// Fetch a single entry.
    async fn get(&self, id: Uuid) -> Result<Option<ActivityLog>, ActivityError>;

    /// List entries matching the filter, newest first.
    async fn list(
        &self,
        filter: &ActivityFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLog>, ActivityError>;

    /// Count entries matching the filter.
    async fn count(&self, filter: &ActivityFilter) -> Result<i64, ActivityError>;

    /// Aggregate statistics for the dashboard.
    async fn summary(&self) -> Result<ActivitySummary, ActivityError>;
}

/// Postgres-backed audit store.
pub struct PgActivityStore {
    pool: PgPool,
}

impl PgActivityStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ActivityStore for PgActivityStore {
    async fn insert(&self, input: NewActivity) -> Result<ActivityLog, ActivityError> {
        ActivityLog::create(&self.pool, input)
            .await
            .map_err(ActivityError::from)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ActivityLog>, ActivityError> {
        ActivityLog::get_by_id(&self.pool, id)
            .await
            .map_err(ActivityError::from)
    }

    async fn list(
        &self,
        filter: &ActivityFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLog>, ActivityError> {
        ActivityLog::list(&self.pool, filter, limit, offset)
            .await
            .map_err(ActivityError::from)
    }

    async fn count(&self, filter: &ActivityFilter) -> Result<i64, ActivityError> {
        ActivityLog::count(&self.pool, filter)
            .await
            .map_err(ActivityError::from)
    }

    async fn summary(&self) -> Result<ActivitySummary, ActivityError> {
        ActivityLog::summary(&self.pool)
            .await
            .map_err(ActivityError::from)
    }
}

/// In-memory audit store for testing.
pub struct InMemoryActivityStore {
    entries: RwLock<Vec<ActivityLog>>,
}

impl Default for InMemoryActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryActivityStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Shared handle, convenient for wiring into the engine.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn matches(entry: &ActivityLog, filter: &ActivityFilter) -> bool {
        filter.user_id.is_none_or(|id| entry.user_id == Some(id))
            && filter
                .activity_type
                .as_ref()
                .is_none_or(|t| &entry.activity_type == t)
            && filter
                .object_type
                .as_ref()
                .is_none_or(|t| entry.object_type.as_ref() == Some(t))
            && filter
                .object_id
                .as_ref()
                .is_none_or(|t| entry.object_id.as_ref() == Some(t))
            && filter.from.is_none_or(|d| entry.created_at >= d)
            && filter.to.is_none_or(|d| entry.created_at <= d)
    }
}

#[async_trait::async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn insert(&self, input: NewActivity) -> Result<ActivityLog, ActivityError> {
        let entry = ActivityLog {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            activity_type: input.activity_type,
            object_type: input.object_type,
            object_id: input.object_id,
            details: input.details,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            created_at: Utc::now(),
        };

        let mut entries = self.entries.write().await;
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ActivityLog>, ActivityError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &ActivityFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLog>, ActivityError> {
        let entries = self.entries.read().await;
        let mut results: Vec<ActivityLog> = entries
            .iter()
            .filter(|e| Self::matches(e, filter))
            .cloned()
            .collect();

        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(results
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &ActivityFilter) -> Result<i64, ActivityError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|e| Self::matches(e, filter)).count() as i64)
    }

    async fn summary(&self) -> Result<ActivitySummary, ActivityError> {
        use std::collections::{HashMap, HashSet};

        let entries = self.entries.read().await;

        let mut by_type: HashMap<String, i64> = HashMap::new();
        let mut actors: HashSet<Uuid> = HashSet::new();
        for entry in entries.iter() {
            *by_type.entry(entry.activity_type.clone()).or_insert(0) += 1;
            if let Some(user_id) = entry.user_id {
                actors.insert(user_id);
            }
        }

        let mut by_type: Vec<ActivityTypeCount> = by_type
            .into_iter()
            .map(|(activity_type, count)| ActivityTypeCount {
                activity_type,
                count,
            })
            .collect();
        by_type.sort_by(|a, b| b.count.cmp(&a.count).then(a.activity_type.cmp(&b.activity_type)));

        Ok(ActivitySummary {
            by_type,
            total: entries.len() as i64,
            distinct_actors: actors.len() as i64,
        })
    }
}
