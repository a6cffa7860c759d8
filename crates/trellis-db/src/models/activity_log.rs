//! Activity log model.
//!
//! Append-only audit trail written exclusively by the audit engine. There are
//! deliberately no UPDATE or DELETE queries on this table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// An activity log entry.
///
/// `user_id` is nullable: a NULL actor denotes a system-initiated change.
/// `ip_address` and `user_agent` are present only for request-originated
/// mutations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    /// Unique identifier.
    pub id: Uuid,
    /// Acting user, NULL for system actions.
    pub user_id: Option<Uuid>,
    /// Operation kind (e.g. "create", "update", "login").
    pub activity_type: String,
    /// Logical entity name of the target (e.g. "project").
    pub object_type: Option<String>,
    /// Identifier of the target record.
    pub object_id: Option<String>,
    /// Operation-specific payload (e.g. changed-field snapshot).
    pub details: JsonValue,
    /// Caller IP address.
    pub ip_address: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// When the activity occurred.
    pub created_at: DateTime<Utc>,
}

/// Input for appending an activity log entry.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Option<Uuid>,
    pub activity_type: String,
    pub object_type: Option<String>,
    pub object_id: Option<String>,
    pub details: JsonValue,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Filter options for querying the activity log.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub user_id: Option<Uuid>,
    pub activity_type: Option<String>,
    pub object_type: Option<String>,
    pub object_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ActivityFilter {
    fn where_clause(&self, first_param: usize) -> (String, usize) {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx = first_param;

        if self.user_id.is_some() {
            conditions.push(format!("user_id = ${param_idx}"));
            param_idx += 1;
        }

        if self.activity_type.is_some() {
            conditions.push(format!("activity_type = ${param_idx}"));
            param_idx += 1;
        }

        if self.object_type.is_some() {
            conditions.push(format!("object_type = ${param_idx}"));
            param_idx += 1;
        }

        if self.object_id.is_some() {
            conditions.push(format!("object_id = ${param_idx}"));
            param_idx += 1;
        }

        if self.from.is_some() {
            conditions.push(format!("created_at >= ${param_idx}"));
            param_idx += 1;
        }

        if self.to.is_some() {
            conditions.push(format!("created_at <= ${param_idx}"));
            param_idx += 1;
        }

        let clause = if conditions.is_empty() {
            "TRUE".to_string()
        } else {
            conditions.join(" AND ")
        };

        (clause, param_idx)
    }

    fn bind_to<'q, O>(
        &'q self,
        mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
        if let Some(user_id) = self.user_id {
            q = q.bind(user_id);
        }
        if let Some(activity_type) = &self.activity_type {
            q = q.bind(activity_type);
        }
        if let Some(object_type) = &self.object_type {
            q = q.bind(object_type);
        }
        if let Some(object_id) = &self.object_id {
            q = q.bind(object_id);
        }
        if let Some(from) = self.from {
            q = q.bind(from);
        }
        if let Some(to) = self.to {
            q = q.bind(to);
        }
        q
    }
}

/// Per-type counts for the summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityTypeCount {
    pub activity_type: String,
    pub count: i64,
}

/// Aggregate statistics over the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub by_type: Vec<ActivityTypeCount>,
    pub total: i64,
    pub distinct_actors: i64,
}

impl ActivityLog {
    /// Append a new activity log entry.
    pub async fn create<'e, E>(executor: E, input: NewActivity) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO activity_logs
                (user_id, activity_type, object_type, object_id, details,
                 ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, activity_type, object_type, object_id, details,
                      ip_address, user_agent, created_at
            ",
        )
        .bind(input.user_id)
        .bind(input.activity_type)
        .bind(input.object_type)
        .bind(input.object_id)
        .bind(input.details)
        .bind(input.ip_address)
        .bind(input.user_agent)
        .fetch_one(executor)
        .await
    }

    /// Get an activity log entry by ID.
    pub async fn get_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, user_id, activity_type, object_type, object_id, details,
                   ip_address, user_agent, created_at
            FROM activity_logs
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// List activity log entries with optional filters, newest first.
    pub async fn list<'e, E>(
        executor: E,
        filter: &ActivityFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (where_clause, next_param) = filter.where_clause(1);
        let query = format!(
            r"
            SELECT id, user_id, activity_type, object_type, object_id, details,
                   ip_address, user_agent, created_at
            FROM activity_logs
            WHERE {where_clause}
            ORDER BY created_at DESC
            LIMIT ${next_param} OFFSET ${}
            ",
            next_param + 1
        );

        let q = sqlx::query_as::<_, Self>(&query);
        filter.bind_to(q).bind(limit).bind(offset).fetch_all(executor).await
    }

    /// Count activity log entries matching the filter.
    pub async fn count<'e, E>(executor: E, filter: &ActivityFilter) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (where_clause, _) = filter.where_clause(1);
        let query = format!(
            r"
            SELECT COUNT(*) FROM activity_logs
            WHERE {where_clause}
            "
        );

        let q = sqlx::query_as::<_, (i64,)>(&query);
        let row = filter.bind_to(q).fetch_one(executor).await?;
        Ok(row.0)
    }

    /// Get the recent audit trail for a specific record.
    pub async fn for_object<'e, E>(
        executor: E,
        object_type: &str,
        object_id: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, user_id, activity_type, object_type, object_id, details,
                   ip_address, user_agent, created_at
            FROM activity_logs
            WHERE object_type = $1 AND object_id = $2
            ORDER BY created_at DESC
            LIMIT $3
            ",
        )
        .bind(object_type)
        .bind(object_id)
        .bind(limit)
        .fetch_all(executor)
        .await
    }

    /// Aggregate statistics for the dashboard summary view.
    pub async fn summary(pool: &sqlx::PgPool) -> Result<ActivitySummary, sqlx::Error> {
        let by_type: Vec<ActivityTypeCount> = sqlx::query_as(
            r"
            SELECT activity_type, COUNT(*) AS count
            FROM activity_logs
            GROUP BY activity_type
            ORDER BY count DESC
            ",
        )
        .fetch_all(pool)
        .await?;

        let totals: (i64, i64) = sqlx::query_as(
            r"
            SELECT COUNT(*), COUNT(DISTINCT user_id)
            FROM activity_logs
            ",
        )
        .fetch_one(pool)
        .await?;

        Ok(ActivitySummary {
            by_type,
            total: totals.0,
            distinct_actors: totals.1,
        })
    }
}
