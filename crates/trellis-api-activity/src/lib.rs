//! # trellis-api-activity
//!
//! Read-only HTTP surface over the activity log.
//!
//! Provides paginated, filterable access to audit entries for operators and
//! dashboards. Nothing here writes: entries are appended exclusively by the
//! audit engine in `trellis-activity`.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

pub use error::ActivityApiError;
pub use router::{activity_router, ActivityApiState};
