//! Org location route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::{CreateLocationRequest, OrgLocation, UpdateLocationRequest};
use persistence::repositories::{DeleteLocationOutcome, NewLocation, OrgLocationRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::routes::{ensure_admin, ensure_member};

/// GET /api/v1/orgs/:org_id/locations
pub async fn list_locations(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<OrgLocation>>, ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;

    let repo = OrgLocationRepository::new(state.pool.clone());
    Ok(Json(repo.list(org_id).await?))
}

/// POST /api/v1/orgs/:org_id/locations
///
/// Admin-only. When the new location is marked default the previous default
/// is demoted in the same transaction.
pub async fn create_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<OrgLocation>), ApiError> {
    ensure_admin(&state, org_id, user.user_id).await?;
    request.validate()?;

    let repo = OrgLocationRepository::new(state.pool.clone());
    let location = repo
        .insert(NewLocation {
            org_id,
            name: request.name.trim().to_string(),
            is_default: request.is_default,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

/// PATCH /api/v1/orgs/:org_id/locations/:location_id
pub async fn rename_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, location_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateLocationRequest>,
) -> Result<Json<OrgLocation>, ApiError> {
    ensure_admin(&state, org_id, user.user_id).await?;
    request.validate()?;

    let repo = OrgLocationRepository::new(state.pool.clone());
    let location = repo
        .rename(org_id, location_id, request.name.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    Ok(Json(location))
}

/// POST /api/v1/orgs/:org_id/locations/:location_id/default
///
/// Promotes the location to the organization's single default. The old
/// default is demoted and the target promoted in one transaction, so no
/// concurrent reader ever sees two defaults or none.
pub async fn set_default_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, location_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<OrgLocation>, ApiError> {
    ensure_admin(&state, org_id, user.user_id).await?;

    let repo = OrgLocationRepository::new(state.pool.clone());
    let location = repo
        .set_default(org_id, location_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    Ok(Json(location))
}

/// DELETE /api/v1/orgs/:org_id/locations/:location_id
///
/// The default location cannot be deleted; another location must be
/// promoted first.
pub async fn delete_location(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, location_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&state, org_id, user.user_id).await?;

    let repo = OrgLocationRepository::new(state.pool.clone());
    match repo.delete(org_id, location_id).await? {
        DeleteLocationOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteLocationOutcome::IsDefault => Err(ApiError::Conflict(
            "The default location cannot be deleted".to_string(),
        )),
        DeleteLocationOutcome::NotFound => {
            Err(ApiError::NotFound("Location not found".to_string()))
        }
    }
}
