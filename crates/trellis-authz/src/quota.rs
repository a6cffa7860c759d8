//! The subscription quota gate.
//!
//! Checked before any action that grows an organization's membership count
//! or storage usage. A rejected action yields `TrellisError::QuotaExceeded`,
//! deliberately distinct from `NotAuthorized` so callers can render an
//! upgrade prompt instead of a permission error.

use tracing::error;

use trellis_core::TrellisError;
use trellis_db::Organization;

use crate::store::MembershipStore;

/// Gate for organization resource quotas.
///
/// Limits of zero or below mean "unlimited", matching how plan rows encode
/// the absence of a cap.
pub struct QuotaGate;

impl QuotaGate {
    /// May this organization accept one more active member?
    ///
    /// `active_members` is the current active-membership count.
    pub fn check_members(org: &Organization, active_members: i64) -> trellis_core::Result<()> {
        let limit = org.max_users;
        if limit <= 0 {
            return Ok(());
        }

        if active_members + 1 > limit {
            return Err(TrellisError::QuotaExceeded {
                quota: "max_users".to_string(),
                limit,
                current: active_members,
            });
        }

        Ok(())
    }

    /// May this organization store `additional` more bytes on top of `used`?
    pub fn check_storage(
        org: &Organization,
        used: i64,
        additional: i64,
    ) -> trellis_core::Result<()> {
        let limit = org.max_storage;
        if limit <= 0 {
            return Ok(());
        }

        if used.saturating_add(additional) > limit {
            return Err(TrellisError::QuotaExceeded {
                quota: "max_storage".to_string(),
                limit,
                current: used,
            });
        }

        Ok(())
    }

    /// Membership check with the current count read through the store.
    ///
    /// A store failure is logged and lets the action through: quota
    /// enforcement degrades open so an unavailable counter cannot block
    /// legitimate work (access control itself still fails closed upstream).
    pub async fn check_members_via<S: MembershipStore>(
        store: &S,
        org: &Organization,
    ) -> trellis_core::Result<()> {
        if org.max_users <= 0 {
            return Ok(());
        }

        match store.count_active_members(org.id.into()).await {
            Ok(count) => Self::check_members(org, count),
            Err(e) => {
                error!(
                    org_id = %org.id,
                    error = %e,
                    "failed to count active members for quota check"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use trellis_db::OrgStatus;
    use uuid::Uuid;

    fn org_with_limits(max_users: i64, max_storage: i64) -> Organization {
        Organization {
            id: Uuid::new_v4(),
            name: "Acme Corp".to_string(),
            status: OrgStatus::Active,
            max_users,
            max_storage,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_member_quota_allows_below_limit() {
        let org = org_with_limits(10, 0);
        assert!(QuotaGate::check_members(&org, 9).is_ok());
    }

    #[test]
    fn test_member_quota_rejects_at_limit() {
        let org = org_with_limits(10, 0);
        let err = QuotaGate::check_members(&org, 10).unwrap_err();
        match err {
            TrellisError::QuotaExceeded {
                quota,
                limit,
                current,
            } => {
                assert_eq!(quota, "max_users");
                assert_eq!(limit, 10);
                assert_eq!(current, 10);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_quota_rejection_is_not_an_authorization_denial() {
        let org = org_with_limits(1, 0);
        let err = QuotaGate::check_members(&org, 1).unwrap_err();
        assert!(!matches!(err, TrellisError::NotAuthorized { .. }));
        assert!(matches!(err, TrellisError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_zero_limit_means_unlimited() {
        let org = org_with_limits(0, 0);
        assert!(QuotaGate::check_members(&org, 1_000_000).is_ok());
        assert!(QuotaGate::check_storage(&org, i64::MAX - 1, 1).is_ok());
    }

    #[test]
    fn test_storage_quota_rejects_overflowing_write() {
        let org = org_with_limits(0, 1024);
        assert!(QuotaGate::check_storage(&org, 512, 512).is_ok());

        let err = QuotaGate::check_storage(&org, 1000, 100).unwrap_err();
        match err {
            TrellisError::QuotaExceeded { quota, limit, current } => {
                assert_eq!(quota, "max_storage");
                assert_eq!(limit, 1024);
                assert_eq!(current, 1000);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_storage_quota_saturates_on_huge_additions() {
        let org = org_with_limits(0, 1024);
        assert!(QuotaGate::check_storage(&org, 1, i64::MAX).is_err());
    }

    #[tokio::test]
    async fn test_eleventh_member_is_rejected_via_store() {
        use crate::store::InMemoryMembershipStore;
        use trellis_core::{OrgId, UserId};

        let org = org_with_limits(10, 0);
        let store = InMemoryMembershipStore::new();
        let org_id = OrgId::from_uuid(org.id);

        for _ in 0..10 {
            store.add_membership(UserId::new(), org_id, "user").await;
        }

        let err = QuotaGate::check_members_via(&store, &org).await.unwrap_err();
        assert!(matches!(err, TrellisError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn test_member_under_quota_is_allowed_via_store() {
        use crate::store::InMemoryMembershipStore;
        use trellis_core::{OrgId, UserId};

        let org = org_with_limits(10, 0);
        let store = InMemoryMembershipStore::new();
        let org_id = OrgId::from_uuid(org.id);

        for _ in 0..5 {
            store.add_membership(UserId::new(), org_id, "user").await;
        }

        assert!(QuotaGate::check_members_via(&store, &org).await.is_ok());
    }
}
