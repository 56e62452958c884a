//! Vehicle case route handlers.
//!
//! Every handler resolves the caller's membership first; cases outside the
//! caller's organization answer 404 regardless of whether they exist.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    AuditedChange, CaseFilters, CreateVehicleCaseRequest, FundingSource, InsuranceStatus,
    UpdateVehicleCaseRequest, VehicleCase, VehicleCaseAudit, VehicleCaseListResponse,
};
use domain::services::case_update::prepare_update;
use domain::services::klar_guard::{ensure_can_mark_klar, ensure_can_restore, KlarError};
use persistence::repositories::{
    NewVehicleCase, OrgLocationRepository, VehicleCaseAuditRepository, VehicleCaseRepository,
};
use shared::pagination::{total_pages, PageParams};
use shared::validation::{normalize_registration, validate_handler_note, validate_registration};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::routes::{ensure_admin, ensure_member};

/// Query parameters for the case listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListCasesQuery {
    #[serde(default)]
    pub archived: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub funding_source: Option<FundingSource>,
    pub insurance_status: Option<InsuranceStatus>,
    pub dropoff_location_id: Option<Uuid>,
    pub handler_user_id: Option<Uuid>,
}

impl ListCasesQuery {
    fn filters(&self) -> CaseFilters {
        CaseFilters {
            search: self.search.clone(),
            funding_source: self.funding_source,
            insurance_status: self.insurance_status,
            dropoff_location_id: self.dropoff_location_id,
            handler_user_id: self.handler_user_id,
        }
    }

    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

fn map_klar_error(err: KlarError) -> ApiError {
    match err {
        KlarError::AlreadyArchived => ApiError::Conflict("Case is already archived".to_string()),
        KlarError::Blocked(reasons) => {
            ApiError::Unprocessable("Case cannot change state".to_string(), reasons)
        }
    }
}

/// GET /api/v1/orgs/:org_id/cases
///
/// Lists one partition (ongoing or archived) with conjunctive filters.
/// Archived cases come most recently closed first; ongoing cases newest
/// first.
pub async fn list_cases(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListCasesQuery>,
) -> Result<Json<VehicleCaseListResponse>, ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;

    let page = query.page_params().resolve(
        state.config.pagination.default_per_page,
        state.config.pagination.max_per_page,
    );

    let repo = VehicleCaseRepository::new(state.pool.clone());
    let (data, count) = repo
        .list(org_id, query.archived, &query.filters(), page)
        .await?;

    Ok(Json(VehicleCaseListResponse {
        data,
        count,
        page: page.page,
        per_page: page.per_page,
        total_pages: total_pages(count, page.per_page),
    }))
}

/// POST /api/v1/orgs/:org_id/cases
///
/// Creates a case with the caller as handler. The dropoff location falls
/// back to the organization's default when omitted.
pub async fn create_case(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<CreateVehicleCaseRequest>,
) -> Result<(StatusCode, Json<VehicleCase>), ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;
    request.validate()?;

    let registration_number = normalize_registration(&request.registration_number);

    let locations = OrgLocationRepository::new(state.pool.clone());
    let dropoff_location_id = match request.dropoff_location_id {
        Some(id) => {
            locations
                .find_by_id(org_id, id)
                .await?
                .ok_or_else(|| ApiError::Validation("Unknown dropoff location".to_string()))?
                .id
        }
        None => {
            locations
                .find_default(org_id)
                .await?
                .ok_or_else(|| {
                    ApiError::Validation(
                        "No dropoff location given and the organization has no default".to_string(),
                    )
                })?
                .id
        }
    };

    let repo = VehicleCaseRepository::new(state.pool.clone());
    let case = repo
        .insert(NewVehicleCase {
            org_id,
            registration_number,
            dropoff_location_id,
            funding_source: request.funding_source,
            insurance_status: request.insurance_status,
            handler_note: request.handler_note,
            created_by: user.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(case)))
}

/// GET /api/v1/orgs/:org_id/cases/:case_id
pub async fn get_case(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, case_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<VehicleCase>, ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;

    let repo = VehicleCaseRepository::new(state.pool.clone());
    let case = repo
        .find_by_id(org_id, case_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Case not found".to_string()))?;

    Ok(Json(case))
}

/// PATCH /api/v1/orgs/:org_id/cases/:case_id
///
/// Guarded field update. The caller names the field it edited together with
/// stringified before/after values; exactly one audit row records that
/// pair. When an insurance approval implicitly sets `raknad_pa`, the side
/// effect is applied in the same mutation and shows up in the audit row's
/// snapshot.
pub async fn update_case(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, case_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateVehicleCaseRequest>,
) -> Result<Json<VehicleCase>, ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;

    if request.field.trim().is_empty() {
        return Err(ApiError::Validation("Field name is required".to_string()));
    }
    if request.updates.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }
    if let Some(ref registration) = request.updates.registration_number {
        validate_registration(registration)
            .map_err(|e| ApiError::Validation(format!("registration_number: {}", e.code)))?;
    }
    if let Some(ref note) = request.updates.handler_note {
        validate_handler_note(note)
            .map_err(|e| ApiError::Validation(format!("handler_note: {}", e.code)))?;
    }

    if let Some(location_id) = request.updates.dropoff_location_id {
        let locations = OrgLocationRepository::new(state.pool.clone());
        locations
            .find_by_id(org_id, location_id)
            .await?
            .ok_or_else(|| ApiError::Validation("Unknown dropoff location".to_string()))?;
    }

    let repo = VehicleCaseRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(org_id, case_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Case not found".to_string()))?;

    let updates = prepare_update(&current, request.updates);
    let change = AuditedChange::new(request.field, request.old_value, request.new_value);

    let case = repo
        .update(
            org_id,
            case_id,
            &updates,
            change,
            user.user_id,
            state.config.audit_mode(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Case not found".to_string()))?;

    Ok(Json(case))
}

/// POST /api/v1/orgs/:org_id/cases/:case_id/klar
///
/// Marks the case klar and archives it in one transition. Blocked unless
/// funding is internal or the insurance is approved; a second attempt on an
/// archived case is a conflict.
pub async fn mark_case_klar(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, case_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<VehicleCase>, ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;

    let repo = VehicleCaseRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(org_id, case_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Case not found".to_string()))?;

    ensure_can_mark_klar(&current).map_err(map_klar_error)?;

    let case = repo
        .mark_klar(org_id, case_id, user.user_id, state.config.audit_mode())
        .await?
        // A concurrent archive won the race between the guard check and the
        // update.
        .ok_or_else(|| ApiError::Conflict("Case is already archived".to_string()))?;

    Ok(Json(case))
}

/// POST /api/v1/orgs/:org_id/cases/:case_id/restore
///
/// Restores an archived case to ongoing: `klar`, `archived_at` and
/// `archived_by` are cleared together.
pub async fn restore_case(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, case_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<VehicleCase>, ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;

    let repo = VehicleCaseRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(org_id, case_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Case not found".to_string()))?;

    ensure_can_restore(&current).map_err(map_klar_error)?;

    let case = repo
        .restore(org_id, case_id, user.user_id, state.config.audit_mode())
        .await?
        .ok_or_else(|| ApiError::Conflict("Case is not archived".to_string()))?;

    Ok(Json(case))
}

/// DELETE /api/v1/orgs/:org_id/cases/:case_id
///
/// Hard delete, admin-only.
pub async fn delete_case(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, case_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&state, org_id, user.user_id).await?;

    let repo = VehicleCaseRepository::new(state.pool.clone());
    let deleted = repo.delete(org_id, case_id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Case not found".to_string()))
    }
}

/// GET /api/v1/orgs/:org_id/cases/:case_id/audits
///
/// The case's audit trail in chronological order.
pub async fn list_case_audits(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((org_id, case_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<VehicleCaseAudit>>, ApiError> {
    ensure_member(&state, org_id, user.user_id).await?;

    let cases = VehicleCaseRepository::new(state.pool.clone());
    cases
        .find_by_id(org_id, case_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Case not found".to_string()))?;

    let audits = VehicleCaseAuditRepository::new(state.pool.clone());
    Ok(Json(audits.list_for_case(org_id, case_id).await?))
}
