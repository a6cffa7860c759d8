//! Handlers for the activity API.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use trellis_activity::{ActivityStore, Operation};
use trellis_db::{ActivityFilter, ActivityLog, ActivitySummary};

use crate::error::ActivityApiError;
use crate::models::{ActivityListQuery, ActivityListResponse, RecentQuery};
use crate::router::ActivityApiState;

/// `GET /activities`: paginated, filterable listing, newest first.
pub async fn list_activities(
    State(state): State<ActivityApiState>,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<ActivityListResponse>, ActivityApiError> {
    if let Some(activity_type) = &query.activity_type {
        // Reject unknown kinds instead of silently returning nothing
        activity_type.parse::<Operation>().map_err(|_| {
            ActivityApiError::Validation(format!("unknown activity_type '{activity_type}'"))
        })?;
    }

    let filter = query.to_filter();
    let limit = query.page_size();
    let offset = query.page_offset();

    let items = state.store.list(&filter, limit, offset).await?;
    let total = state.store.count(&filter).await?;

    Ok(Json(ActivityListResponse {
        items,
        total,
        limit,
        offset,
    }))
}

/// `GET /activities/{id}`: fetch a single entry.
pub async fn get_activity(
    State(state): State<ActivityApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivityLog>, ActivityApiError> {
    let entry = state
        .store
        .get(id)
        .await?
        .ok_or(ActivityApiError::NotFound)?;
    Ok(Json(entry))
}

/// `GET /activities/recent`: bounded feed for dashboards.
pub async fn recent_activities(
    State(state): State<ActivityApiState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<ActivityLog>>, ActivityApiError> {
    let items = state
        .store
        .list(&ActivityFilter::default(), query.feed_size(), 0)
        .await?;
    Ok(Json(items))
}

/// `GET /activities/summary`: aggregate statistics.
pub async fn activity_summary(
    State(state): State<ActivityApiState>,
) -> Result<Json<ActivitySummary>, ActivityApiError> {
    let summary = state.store.summary().await?;
    Ok(Json(summary))
}
