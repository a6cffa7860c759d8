//! Organization model for trellis-db.
//!
//! Organizations are the tenant boundary: every business record resolves to
//! exactly one of them. The authorization core reads `id`, `status`, and the
//! quota columns; all other fields belong to the business layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Type};
use uuid::Uuid;

use crate::DbError;

/// Lifecycle status of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Type, Serialize, Deserialize)]
#[sqlx(type_name = "org_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrgStatus {
    /// Fully provisioned and paying.
    Active,
    /// Evaluation period; functional but quota-limited by plan.
    #[default]
    Trial,
    /// Access blocked by an operator (e.g. payment failure).
    Suspended,
    /// Deactivated; retained for history only.
    Inactive,
}

impl std::fmt::Display for OrgStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrgStatus::Active => write!(f, "active"),
            OrgStatus::Trial => write!(f, "trial"),
            OrgStatus::Suspended => write!(f, "suspended"),
            OrgStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// An organization (tenant) in the trellis platform.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization.
    pub id: Uuid,

    /// Human-readable name (e.g., "Acme Corp").
    pub name: String,

    /// Lifecycle status.
    pub status: OrgStatus,

    /// Maximum number of active members. Zero or negative means unlimited.
    pub max_users: i64,

    /// Maximum storage in bytes. Zero or negative means unlimited.
    pub max_storage: i64,

    /// Timestamp when the organization was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last update.
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Returns `true` if this organization is currently suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.status == OrgStatus::Suspended
    }

    /// Returns `true` if members may act within this organization.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self.status, OrgStatus::Active | OrgStatus::Trial)
    }

    /// Finds an organization by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, name, status, max_users, max_storage, created_at, updated_at
            FROM organizations
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Lists organizations with a given status, oldest first.
    pub async fn list_by_status(pool: &PgPool, status: OrgStatus) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, name, status, max_users, max_storage, created_at, updated_at
            FROM organizations
            WHERE status = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(status)
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }
}
