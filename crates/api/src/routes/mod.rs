//! HTTP route handlers.

pub mod health;
pub mod locations;
pub mod statistics;
pub mod vehicle_cases;

use domain::models::OrgMember;
use persistence::repositories::OrgMemberRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Resolves the caller's membership in the organization.
///
/// Non-members get the same 404 as a missing organization so the response
/// never reveals whether the org exists.
pub(crate) async fn ensure_member(
    state: &AppState,
    org_id: Uuid,
    user_id: Uuid,
) -> Result<OrgMember, ApiError> {
    let repo = OrgMemberRepository::new(state.pool.clone());
    repo.find_member(org_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organization not found".to_string()))
}

/// Like [`ensure_member`] but additionally requires the admin role.
pub(crate) async fn ensure_admin(
    state: &AppState,
    org_id: Uuid,
    user_id: Uuid,
) -> Result<OrgMember, ApiError> {
    let member = ensure_member(state, org_id, user_id).await?;
    if !member.is_admin() {
        return Err(ApiError::Forbidden(
            "Administrator role required".to_string(),
        ));
    }
    Ok(member)
}
