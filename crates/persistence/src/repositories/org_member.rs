//! Organization membership repository.

use domain::models::OrgMember;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for organization membership lookups.
#[derive(Clone)]
pub struct OrgMemberRepository {
    pool: PgPool,
}

impl OrgMemberRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user's membership in an organization. `None` means the user
    /// does not belong to the organization (or the organization does not
    /// exist; callers must not distinguish the two).
    pub async fn find_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrgMember>, sqlx::Error> {
        let entity = sqlx::query_as::<_, crate::entities::OrgMemberEntity>(
            r#"
            SELECT org_id, user_id, role, created_at
            FROM organization_members
            WHERE org_id = $1 AND user_id = $2
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }
}
