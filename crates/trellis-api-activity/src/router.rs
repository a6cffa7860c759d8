//! Router configuration for the activity API.

use std::sync::Arc;

use axum::{routing::get, Router};

use trellis_activity::ActivityStore;

use crate::handlers::{activity_summary, get_activity, list_activities, recent_activities};

/// Application state for the activity API.
#[derive(Clone)]
pub struct ActivityApiState {
    /// Audit store backing the read queries.
    pub store: Arc<dyn ActivityStore>,
}

/// Create the activity log router.
///
/// Provides:
/// - GET /activities - Paginated listing with filters
/// - GET /activities/recent - Bounded dashboard feed
/// - GET /activities/summary - Aggregate statistics
/// - GET /activities/{id} - Single entry
///
/// ## Authorization
///
/// The caller is expected to gate these routes with the platform-operator
/// check (`Principal::global_override`) before mounting; the activity log
/// spans organizations and is not a tenant-scoped surface.
pub fn activity_router(store: Arc<dyn ActivityStore>) -> Router {
    let state = ActivityApiState { store };

    Router::new()
        .route("/activities", get(list_activities))
        .route("/activities/recent", get(recent_activities))
        .route("/activities/summary", get(activity_summary))
        .route("/activities/:id", get(get_activity))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_activity::InMemoryActivityStore;

    #[tokio::test]
    async fn test_router_builds() {
        let store = InMemoryActivityStore::shared();
        let _router = activity_router(store);
    }
}
