//! Request and response types for the activity API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trellis_db::{ActivityFilter, ActivityLog};

/// Default page size for activity listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Hard cap on page size and the recent feed.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for `GET /activities`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityListQuery {
    /// Filter by acting user.
    pub user_id: Option<Uuid>,
    /// Filter by operation kind.
    pub activity_type: Option<String>,
    /// Filter by target entity name.
    pub object_type: Option<String>,
    /// Filter by target record id.
    pub object_id: Option<String>,
    /// Inclusive lower bound on creation time.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time.
    pub to: Option<DateTime<Utc>>,
    /// Page size (clamped to [`MAX_PAGE_SIZE`]).
    pub limit: Option<i64>,
    /// Pagination offset.
    pub offset: Option<i64>,
}

impl ActivityListQuery {
    /// Effective page size.
    #[must_use]
    pub fn page_size(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Effective offset.
    #[must_use]
    pub fn page_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Convert to the store filter.
    #[must_use]
    pub fn to_filter(&self) -> ActivityFilter {
        ActivityFilter {
            user_id: self.user_id,
            activity_type: self.activity_type.clone(),
            object_type: self.object_type.clone(),
            object_id: self.object_id.clone(),
            from: self.from,
            to: self.to,
        }
    }
}

/// Query parameters for `GET /activities/recent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

impl RecentQuery {
    /// Effective feed size.
    #[must_use]
    pub fn feed_size(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Paginated listing response.
#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub items: Vec<ActivityLog>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
