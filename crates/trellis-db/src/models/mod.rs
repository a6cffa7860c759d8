//! Database models for trellis.

pub mod activity_log;
pub mod membership;
pub mod organization;

pub use activity_log::{ActivityFilter, ActivityLog, ActivitySummary, NewActivity};
pub use membership::OrgMembership;
pub use organization::{OrgStatus, Organization};
