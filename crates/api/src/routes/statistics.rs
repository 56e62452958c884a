//! Statistics route handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use domain::models::Statistics;
use persistence::repositories::StatisticsRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::routes::ensure_member;

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    /// Scope the report to one handler's cases.
    pub handler_user_id: Option<Uuid>,
}

/// GET /api/v1/orgs/:org_id/statistics
///
/// Org-wide case statistics: totals, breakdowns, zero-filled time series
/// and average processing time. With `handler_user_id` the report covers
/// only that handler's cases and the per-handler breakdown is omitted.
pub async fn org_statistics(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Statistics>, ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;

    let repo = StatisticsRepository::new(state.pool.clone());
    let stats = repo.org_statistics(org_id, query.handler_user_id).await?;

    Ok(Json(stats))
}
