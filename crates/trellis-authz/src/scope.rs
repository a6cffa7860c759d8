//! The resource scope filter.
//!
//! Narrows any collection of organization-owned records to what a principal
//! may see. This is the first stage of every list query: downstream
//! narrowing (search, status filters) composes after it and can never
//! re-expose an excluded record.

use std::collections::HashMap;

use tracing::warn;

use trellis_core::{OrgId, OrgScoped, Principal};

use crate::resolver::AccessResolver;
use crate::roles::OrgRole;
use crate::store::MembershipStore;

/// Restrict `records` to organizations where the principal holds an active
/// membership.
///
/// - global override passes everything through unfiltered;
/// - records that cannot resolve their owning organization are excluded and
///   reported (fail closed);
/// - an empty membership map yields an empty result, never an error.
///
/// Input order is preserved, which makes the filter idempotent.
pub fn scope<T: OrgScoped>(
    principal: &Principal,
    memberships: &HashMap<OrgId, OrgRole>,
    records: impl IntoIterator<Item = T>,
) -> Vec<T> {
    filter_records(principal, memberships, None, records)
}

/// Like [`scope`], additionally requiring the held role to satisfy
/// `required_role` in each owning organization (role-scoped views).
pub fn scope_with_role<T: OrgScoped>(
    principal: &Principal,
    memberships: &HashMap<OrgId, OrgRole>,
    required_role: OrgRole,
    records: impl IntoIterator<Item = T>,
) -> Vec<T> {
    filter_records(principal, memberships, Some(required_role), records)
}

fn filter_records<T: OrgScoped>(
    principal: &Principal,
    memberships: &HashMap<OrgId, OrgRole>,
    required_role: Option<OrgRole>,
    records: impl IntoIterator<Item = T>,
) -> Vec<T> {
    let mut unresolved: usize = 0;

    let kept: Vec<T> = records
        .into_iter()
        .filter(|record| {
            let Some(org_id) = record.org_id() else {
                // Ownership must resolve; ambiguity denies
                unresolved += 1;
                return false;
            };

            if principal.global_override && principal.active {
                return true;
            }

            match memberships.get(&org_id) {
                None => false,
                Some(held) => match required_role {
                    None => true,
                    Some(required) => held.satisfies(required),
                },
            }
        })
        .collect();

    if unresolved > 0 {
        warn!(
            user_id = %principal.id,
            excluded = unresolved,
            "excluded records with unresolvable organization ownership"
        );
    }

    kept
}

impl<S: MembershipStore> AccessResolver<S> {
    /// Scope `records` for `principal`, resolving memberships through the
    /// store (same timeout and fail-closed rules as `authorize`).
    pub async fn scope<T: OrgScoped>(
        &self,
        principal: &Principal,
        records: impl IntoIterator<Item = T>,
    ) -> Vec<T> {
        let memberships = self.membership_map(principal).await;
        scope(principal, &memberships, records)
    }

    /// Scope `records` to organizations where the principal's role satisfies
    /// `required_role`.
    pub async fn scope_with_role<T: OrgScoped>(
        &self,
        principal: &Principal,
        required_role: OrgRole,
        records: impl IntoIterator<Item = T>,
    ) -> Vec<T> {
        let memberships = self.membership_map(principal).await;
        scope_with_role(principal, &memberships, required_role, records)
    }
}
