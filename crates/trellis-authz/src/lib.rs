//! # trellis-authz
//!
//! Organization-scoped authorization for trellis.
//!
//! Three cooperating pieces:
//!
//! - [`resolver`] answers "may this principal act with at least role R in
//!   organization O?": global override first, then one active-membership
//!   lookup compared against the static role hierarchy. Fail-closed on
//!   store errors, timeouts, and unknown roles.
//! - [`scope`] narrows any collection of organization-owned records to what
//!   the calling principal may see.
//! - [`quota`] gates actions that would grow an organization past its
//!   `max_users`/`max_storage` limits, with an error kind distinct from a
//!   plain authorization denial.
//!
//! Membership data is read through the [`store::MembershipStore`] trait;
//! Postgres and in-memory implementations are provided, plus a moka-backed
//! caching wrapper for hot request paths.

pub mod error;
pub mod quota;
pub mod resolver;
pub mod roles;
pub mod scope;
pub mod store;

pub use error::AuthzError;
pub use quota::QuotaGate;
pub use resolver::{AccessDecision, AccessResolver, DecisionSource, ResolverConfig};
pub use roles::OrgRole;
pub use scope::{scope, scope_with_role};
pub use store::{
    CachingMembershipStore, InMemoryMembershipStore, MembershipCache, MembershipStore,
    PgMembershipStore,
};
