//! The permission resolver.
//!
//! Answers "may this principal act with at least role R in organization O?".
//! Evaluation order:
//!
//! 1. inactive principal → deny
//! 2. global override → allow (the only blanket escape hatch, checked first
//!    and never combined with another allow path)
//! 3. active-membership lookup, bounded by a timeout → missing, errored, or
//!    timed-out lookups deny
//! 4. role comparison against the static hierarchy → unknown stored roles
//!    deny and are logged as a configuration anomaly
//!
//! The resolver has no side effects; every decision is pure over the store
//! snapshot read at call time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use trellis_core::{OrgId, Principal, TrellisError};

use crate::roles::OrgRole;
use crate::store::MembershipStore;

/// Configuration for the access resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on any single membership-store read.
    pub read_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(5),
        }
    }
}

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The principal carries the global override flag.
    GlobalOverride,
    /// An active membership satisfied the required role.
    Role,
    /// The principal is inactive or missing.
    NotAuthenticated,
    /// No active membership in the target organization.
    NoMembership,
    /// The held role does not satisfy the required role.
    InsufficientRole,
    /// The stored role is not part of the hierarchy (configuration anomaly).
    UnknownRole,
    /// The membership store failed or timed out; denied fail-closed.
    StoreFailure,
}

/// The outcome of an authorization check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether the action is allowed.
    pub allowed: bool,
    /// Which rule decided.
    pub source: DecisionSource,
    /// Human-readable explanation, for logs and diagnostics.
    pub reason: String,
}

impl AccessDecision {
    fn allow(source: DecisionSource, reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            source,
            reason: reason.into(),
        }
    }

    fn deny(source: DecisionSource, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            source,
            reason: reason.into(),
        }
    }

    /// Convert a denial into the caller-facing error, for use in handlers.
    pub fn require(&self) -> trellis_core::Result<()> {
        if self.allowed {
            return Ok(());
        }
        match self.source {
            DecisionSource::NotAuthenticated => Err(TrellisError::NotAuthenticated),
            _ => Err(TrellisError::forbidden(self.reason.clone())),
        }
    }
}

/// Resolves access decisions against a membership store.
pub struct AccessResolver<S: MembershipStore> {
    store: Arc<S>,
    config: ResolverConfig,
}

impl<S: MembershipStore> AccessResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(store: Arc<S>, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    /// The membership store backing this resolver.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Decide whether `principal` may act with at least `required_role` in
    /// the organization `org_id`.
    pub async fn authorize(
        &self,
        principal: &Principal,
        org_id: OrgId,
        required_role: OrgRole,
    ) -> AccessDecision {
        if !principal.is_authenticated() {
            return AccessDecision::deny(
                DecisionSource::NotAuthenticated,
                "principal is inactive",
            );
        }

        if principal.global_override {
            return AccessDecision::allow(DecisionSource::GlobalOverride, "global override");
        }

        let lookup = tokio::time::timeout(
            self.config.read_timeout,
            self.store.get_active_membership(principal.id, org_id),
        )
        .await;

        let membership = match lookup {
            Err(_) => {
                warn!(
                    user_id = %principal.id,
                    org_id = %org_id,
                    timeout = ?self.config.read_timeout,
                    "membership lookup timed out; denying"
                );
                return AccessDecision::deny(
                    DecisionSource::StoreFailure,
                    "membership lookup timed out",
                );
            }
            Ok(Err(e)) => {
                warn!(
                    user_id = %principal.id,
                    org_id = %org_id,
                    error = %e,
                    "membership lookup failed; denying"
                );
                return AccessDecision::deny(
                    DecisionSource::StoreFailure,
                    "membership lookup failed",
                );
            }
            Ok(Ok(m)) => m,
        };

        let Some(membership) = membership else {
            return AccessDecision::deny(
                DecisionSource::NoMembership,
                format!("no active membership in organization {org_id}"),
            );
        };

        let role: OrgRole = match membership.role.parse() {
            Ok(role) => role,
            Err(_) => {
                warn!(
                    user_id = %principal.id,
                    org_id = %org_id,
                    role = %membership.role,
                    "membership carries a role outside the hierarchy; denying"
                );
                return AccessDecision::deny(
                    DecisionSource::UnknownRole,
                    format!("unrecognized role '{}'", membership.role),
                );
            }
        };

        if role.satisfies(required_role) {
            AccessDecision::allow(
                DecisionSource::Role,
                format!("role '{role}' satisfies '{required_role}'"),
            )
        } else {
            AccessDecision::deny(
                DecisionSource::InsufficientRole,
                format!("role '{role}' does not satisfy '{required_role}'"),
            )
        }
    }

    /// Map of organization → held role for every active membership the
    /// principal holds.
    ///
    /// Fails closed: store errors and timeouts yield an empty map (logged),
    /// and memberships whose stored role does not parse are skipped with a
    /// warning rather than surfaced.
    pub async fn membership_map(&self, principal: &Principal) -> HashMap<OrgId, OrgRole> {
        if !principal.is_authenticated() {
            return HashMap::new();
        }

        let lookup = tokio::time::timeout(
            self.config.read_timeout,
            self.store.list_active_memberships_for_user(principal.id),
        )
        .await;

        let memberships = match lookup {
            Err(_) => {
                warn!(
                    user_id = %principal.id,
                    timeout = ?self.config.read_timeout,
                    "membership listing timed out; scoping to nothing"
                );
                return HashMap::new();
            }
            Ok(Err(e)) => {
                warn!(
                    user_id = %principal.id,
                    error = %e,
                    "membership listing failed; scoping to nothing"
                );
                return HashMap::new();
            }
            Ok(Ok(m)) => m,
        };

        let mut map = HashMap::with_capacity(memberships.len());
        for membership in memberships {
            match membership.role.parse::<OrgRole>() {
                Ok(role) => {
                    map.insert(OrgId::from_uuid(membership.org_id), role);
                }
                Err(_) => {
                    warn!(
                        user_id = %principal.id,
                        org_id = %membership.org_id,
                        role = %membership.role,
                        "skipping membership with unrecognized role"
                    );
                }
            }
        }
        map
    }
}
