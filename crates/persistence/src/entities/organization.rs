//! Organization membership entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for org_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "org_role", rename_all = "lowercase")]
pub enum OrgRoleDb {
    Admin,
    Member,
}

impl From<OrgRoleDb> for domain::models::OrgRole {
    fn from(db: OrgRoleDb) -> Self {
        match db {
            OrgRoleDb::Admin => Self::Admin,
            OrgRoleDb::Member => Self::Member,
        }
    }
}

impl From<domain::models::OrgRole> for OrgRoleDb {
    fn from(domain: domain::models::OrgRole) -> Self {
        match domain {
            domain::models::OrgRole::Admin => Self::Admin,
            domain::models::OrgRole::Member => Self::Member,
        }
    }
}

/// Database row mapping for the organization_members table.
#[derive(Debug, Clone, FromRow)]
pub struct OrgMemberEntity {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: OrgRoleDb,
    pub created_at: DateTime<Utc>,
}

impl From<OrgMemberEntity> for domain::models::OrgMember {
    fn from(entity: OrgMemberEntity) -> Self {
        Self {
            org_id: entity.org_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_role_conversion() {
        assert_eq!(
            domain::models::OrgRole::from(OrgRoleDb::Admin),
            domain::models::OrgRole::Admin
        );
        assert_eq!(
            OrgRoleDb::from(domain::models::OrgRole::Member),
            OrgRoleDb::Member
        );
    }
}
