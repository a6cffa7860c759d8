//! # trellis-db
//!
//! Persistence models for trellis.
//!
//! Each model is a `sqlx::FromRow` struct with static async query methods,
//! generic over `PgExecutor` where queries may run inside a transaction.
//! Writes to the activity log happen exclusively through the audit engine;
//! membership and organization rows are owned by the business layer and only
//! read here.

pub mod error;
pub mod migrations;
pub mod models;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::{
    ActivityFilter, ActivityLog, ActivitySummary, NewActivity, OrgMembership, OrgStatus,
    Organization,
};
