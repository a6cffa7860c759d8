//! Organization membership entity model.
//!
//! Ternary relationship between a user, an organization, and a role. At most
//! one membership exists per (user, organization) pair; deactivation flips
//! `is_active` and nothing is ever hard-deleted, so audit history stays
//! intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// A membership linking a user to an organization with a role.
///
/// `role` is persisted as text and parsed into the role hierarchy at
/// evaluation time; an unparseable value denies access rather than erroring.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct OrgMembership {
    /// Unique identifier for the membership.
    pub id: Uuid,

    /// The organization this membership belongs to.
    pub org_id: Uuid,

    /// The user ID.
    pub user_id: Uuid,

    /// Role name within the organization (e.g. "admin", "developer").
    pub role: String,

    /// Whether this membership currently grants access.
    pub is_active: bool,

    /// When the membership was created.
    pub created_at: DateTime<Utc>,

    /// When the membership was last updated.
    pub updated_at: DateTime<Utc>,
}

impl OrgMembership {
    /// Add a user to an organization with the given role.
    ///
    /// An existing (even deactivated) membership for the pair is reactivated
    /// and updated instead of duplicated.
    pub async fn add_member<'e, E>(
        executor: E,
        org_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO org_memberships (org_id, user_id, role, is_active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (org_id, user_id)
            DO UPDATE SET role = EXCLUDED.role, is_active = TRUE, updated_at = NOW()
            RETURNING id, org_id, user_id, role, is_active, created_at, updated_at
            ",
        )
        .bind(org_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await
    }

    /// Get the active membership for a (user, organization) pair.
    pub async fn find_active<'e, E>(
        executor: E,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT id, org_id, user_id, role, is_active, created_at, updated_at
            FROM org_memberships
            WHERE user_id = $1 AND org_id = $2 AND is_active = TRUE
            ",
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_optional(executor)
        .await
    }

    /// List every active membership a user holds, across all organizations.
    pub async fn list_active_for_user<'e, E>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT id, org_id, user_id, role, is_active, created_at, updated_at
            FROM org_memberships
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY created_at ASC
            ",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// List members of an organization, optionally filtered by role.
    pub async fn list_for_org<'e, E>(
        executor: E,
        org_id: Uuid,
        role: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        match role {
            Some(role) => {
                sqlx::query_as(
                    r"
                    SELECT id, org_id, user_id, role, is_active, created_at, updated_at
                    FROM org_memberships
                    WHERE org_id = $1 AND role = $2 AND is_active = TRUE
                    ORDER BY created_at ASC
                    ",
                )
                .bind(org_id)
                .bind(role)
                .fetch_all(executor)
                .await
            }
            None => {
                sqlx::query_as(
                    r"
                    SELECT id, org_id, user_id, role, is_active, created_at, updated_at
                    FROM org_memberships
                    WHERE org_id = $1 AND is_active = TRUE
                    ORDER BY created_at ASC
                    ",
                )
                .bind(org_id)
                .fetch_all(executor)
                .await
            }
        }
    }

    /// Count active memberships in an organization.
    pub async fn count_active<'e, E>(executor: E, org_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM org_memberships
            WHERE org_id = $1 AND is_active = TRUE
            ",
        )
        .bind(org_id)
        .fetch_one(executor)
        .await?;

        Ok(row.0)
    }

    /// Soft-deactivate a membership. Returns `false` if none was active.
    pub async fn deactivate<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            UPDATE org_memberships
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            ",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reactivate a previously deactivated membership.
    pub async fn reactivate<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            UPDATE org_memberships
            SET is_active = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_active = FALSE
            ",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Change the role on an existing membership.
    pub async fn set_role<'e, E>(executor: E, id: Uuid, role: &str) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            UPDATE org_memberships
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(role)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_serde_roundtrip() {
        let membership = OrgMembership {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role: "developer".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&membership).unwrap();
        let back: OrgMembership = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, membership.id);
        assert_eq!(back.role, "developer");
        assert!(back.is_active);
    }
}
