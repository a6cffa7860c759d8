//! Membership store access for authorization.
//!
//! The resolver reads memberships through the [`MembershipStore`] trait.
//! A Postgres implementation backs production; the in-memory implementation
//! serves tests and doubles as a fixture. Lookups can be wrapped in a
//! moka-backed cache with a short TTL so repeated checks within one request
//! see a consistent snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use uuid::Uuid;

use trellis_core::{OrgId, UserId};
use trellis_db::OrgMembership;

use crate::error::AuthzError;

/// Read interface over the membership relation.
///
/// Implementations must be safe under concurrent reads; the resolver never
/// writes through this trait.
#[async_trait::async_trait]
pub trait MembershipStore: Send + Sync {
    /// Get the active membership for a (user, organization) pair.
    async fn get_active_membership(
        &self,
        user_id: UserId,
        org_id: OrgId,
    ) -> Result<Option<OrgMembership>, AuthzError>;

    /// List every active membership a user holds.
    async fn list_active_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrgMembership>, AuthzError>;

    /// Count active memberships in an organization.
    async fn count_active_members(&self, org_id: OrgId) -> Result<i64, AuthzError>;
}

/// Postgres-backed membership store.
pub struct PgMembershipStore {
    pool: PgPool,
}

impl PgMembershipStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MembershipStore for PgMembershipStore {
    async fn get_active_membership(
        &self,
        user_id: UserId,
        org_id: OrgId,
    ) -> Result<Option<OrgMembership>, AuthzError> {
        OrgMembership::find_active(&self.pool, user_id.into(), org_id.into())
            .await
            .map_err(AuthzError::from)
    }

    async fn list_active_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrgMembership>, AuthzError> {
        OrgMembership::list_active_for_user(&self.pool, user_id.into())
            .await
            .map_err(AuthzError::from)
    }

    async fn count_active_members(&self, org_id: OrgId) -> Result<i64, AuthzError> {
        OrgMembership::count_active(&self.pool, org_id.into())
            .await
            .map_err(AuthzError::from)
    }
}

/// In-memory membership store for testing.
pub struct InMemoryMembershipStore {
    memberships: tokio::sync::RwLock<HashMap<(Uuid, Uuid), OrgMembership>>,
}

impl Default for InMemoryMembershipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMembershipStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memberships: tokio::sync::RwLock::new(HashMap::new()),
        }
    }

    /// Add (or replace) an active membership.
    pub async fn add_membership(&self, user_id: UserId, org_id: OrgId, role: &str) {
        let now = chrono::Utc::now();
        let membership = OrgMembership {
            id: Uuid::new_v4(),
            org_id: org_id.into(),
            user_id: user_id.into(),
            role: role.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut memberships = self.memberships.write().await;
        memberships.insert((user_id.into(), org_id.into()), membership);
    }

    /// Soft-deactivate the membership for a pair, keeping the row.
    pub async fn deactivate_membership(&self, user_id: UserId, org_id: OrgId) {
        let mut memberships = self.memberships.write().await;
        if let Some(membership) = memberships.get_mut(&(user_id.into(), org_id.into())) {
            membership.is_active = false;
            membership.updated_at = chrono::Utc::now();
        }
    }
}

#[async_trait::async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn get_active_membership(
        &self,
        user_id: UserId,
        org_id: OrgId,
    ) -> Result<Option<OrgMembership>, AuthzError> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .get(&(user_id.into(), org_id.into()))
            .filter(|m| m.is_active)
            .cloned())
    }

    async fn list_active_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrgMembership>, AuthzError> {
        let user_uuid: Uuid = user_id.into();
        let memberships = self.memberships.read().await;
        let mut result: Vec<OrgMembership> = memberships
            .values()
            .filter(|m| m.user_id == user_uuid && m.is_active)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn count_active_members(&self, org_id: OrgId) -> Result<i64, AuthzError> {
        let org_uuid: Uuid = org_id.into();
        let memberships = self.memberships.read().await;
        Ok(memberships
            .values()
            .filter(|m| m.org_id == org_uuid && m.is_active)
            .count() as i64)
    }
}

/// Cache for per-pair membership lookups.
///
/// Keyed by (user, organization). The TTL is deliberately short: within one
/// request lifecycle repeated checks see the same snapshot, while role
/// changes still propagate promptly without explicit invalidation from every
/// write path.
pub struct MembershipCache {
    cache: Cache<(Uuid, Uuid), Option<OrgMembership>>,
    ttl: Duration,
}

impl MembershipCache {
    /// Create a new cache with the specified TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(10_000)
            .build();
        Self { cache, ttl }
    }

    /// Get a cached lookup result.
    pub async fn get(&self, user_id: UserId, org_id: OrgId) -> Option<Option<OrgMembership>> {
        self.cache.get(&(user_id.into(), org_id.into())).await
    }

    /// Insert a lookup result (including negative results).
    pub async fn insert(&self, user_id: UserId, org_id: OrgId, value: Option<OrgMembership>) {
        self.cache.insert((user_id.into(), org_id.into()), value).await;
    }

    /// Invalidate the cached lookup for a pair.
    pub async fn invalidate(&self, user_id: UserId, org_id: OrgId) {
        self.cache.invalidate(&(user_id.into(), org_id.into())).await;
    }

    /// Get the configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Caching membership store that wraps any [`MembershipStore`].
///
/// Only the per-pair lookup is cached; list and count queries always hit the
/// inner store since they feed less latency-sensitive paths.
pub struct CachingMembershipStore<S: MembershipStore> {
    inner: S,
    cache: Arc<MembershipCache>,
}

impl<S: MembershipStore> CachingMembershipStore<S> {
    pub fn new(inner: S, cache: Arc<MembershipCache>) -> Self {
        Self { inner, cache }
    }

    /// Invalidate the cached lookup for a pair after a membership write.
    pub async fn invalidate(&self, user_id: UserId, org_id: OrgId) {
        self.cache.invalidate(user_id, org_id).await;
    }
}

#[async_trait::async_trait]
impl<S: MembershipStore> MembershipStore for CachingMembershipStore<S> {
    async fn get_active_membership(
        &self,
        user_id: UserId,
        org_id: OrgId,
    ) -> Result<Option<OrgMembership>, AuthzError> {
        if let Some(cached) = self.cache.get(user_id, org_id).await {
            return Ok(cached);
        }

        let result = self.inner.get_active_membership(user_id, org_id).await?;
        self.cache.insert(user_id, org_id, result.clone()).await;
        Ok(result)
    }

    async fn list_active_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrgMembership>, AuthzError> {
        self.inner.list_active_memberships_for_user(user_id).await
    }

    async fn count_active_members(&self, org_id: OrgId) -> Result<i64, AuthzError> {
        self.inner.count_active_members(org_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_get_active() {
        let store = InMemoryMembershipStore::new();
        let user = UserId::new();
        let org = OrgId::new();

        store.add_membership(user, org, "developer").await;

        let membership = store.get_active_membership(user, org).await.unwrap();
        assert_eq!(membership.unwrap().role, "developer");
    }

    #[tokio::test]
    async fn test_in_memory_store_missing_pair() {
        let store = InMemoryMembershipStore::new();
        let result = store
            .get_active_membership(UserId::new(), OrgId::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_deactivated_membership_is_invisible() {
        let store = InMemoryMembershipStore::new();
        let user = UserId::new();
        let org = OrgId::new();

        store.add_membership(user, org, "admin").await;
        store.deactivate_membership(user, org).await;

        assert!(store
            .get_active_membership(user, org)
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.count_active_members(org).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_membership_replaces_existing_pair() {
        let store = InMemoryMembershipStore::new();
        let user = UserId::new();
        let org = OrgId::new();

        store.add_membership(user, org, "user").await;
        store.add_membership(user, org, "admin").await;

        let memberships = store.list_active_memberships_for_user(user).await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].role, "admin");
    }

    #[tokio::test]
    async fn test_list_spans_organizations() {
        let store = InMemoryMembershipStore::new();
        let user = UserId::new();
        let org_a = OrgId::new();
        let org_b = OrgId::new();

        store.add_membership(user, org_a, "developer").await;
        store.add_membership(user, org_b, "verifier").await;
        store.add_membership(UserId::new(), org_a, "admin").await;

        let memberships = store.list_active_memberships_for_user(user).await.unwrap();
        assert_eq!(memberships.len(), 2);
    }

    #[tokio::test]
    async fn test_count_active_members() {
        let store = InMemoryMembershipStore::new();
        let org = OrgId::new();

        for _ in 0..3 {
            store.add_membership(UserId::new(), org, "user").await;
        }
        store.add_membership(UserId::new(), OrgId::new(), "user").await;

        assert_eq!(store.count_active_members(org).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = MembershipCache::new(Duration::from_secs(60));
        let user = UserId::new();
        let org = OrgId::new();

        assert!(cache.get(user, org).await.is_none());

        cache.insert(user, org, None).await;
        // Negative lookups are cached too
        assert_eq!(cache.get(user, org).await, Some(None));
    }

    #[tokio::test]
    async fn test_cache_invalidate() {
        let cache = MembershipCache::new(Duration::from_secs(60));
        let user = UserId::new();
        let org = OrgId::new();

        cache.insert(user, org, None).await;
        cache.invalidate(user, org).await;
        assert!(cache.get(user, org).await.is_none());
    }

    #[tokio::test]
    async fn test_caching_store_serves_from_cache() {
        let inner = InMemoryMembershipStore::new();
        let user = UserId::new();
        let org = OrgId::new();
        inner.add_membership(user, org, "support").await;

        let store = CachingMembershipStore::new(
            inner,
            Arc::new(MembershipCache::new(Duration::from_secs(60))),
        );

        let first = store.get_active_membership(user, org).await.unwrap();
        assert_eq!(first.as_ref().unwrap().role, "support");

        // The cached snapshot survives an underlying change until invalidated
        store.inner.deactivate_membership(user, org).await;
        let second = store.get_active_membership(user, org).await.unwrap();
        assert!(second.is_some());

        store.invalidate(user, org).await;
        let third = store.get_active_membership(user, org).await.unwrap();
        assert!(third.is_none());
    }
}
