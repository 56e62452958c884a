//! Org location entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the org_locations table.
#[derive(Debug, Clone, FromRow)]
pub struct OrgLocationEntity {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrgLocationEntity> for domain::models::OrgLocation {
    fn from(entity: OrgLocationEntity) -> Self {
        Self {
            id: entity.id,
            org_id: entity.org_id,
            name: entity.name,
            is_default: entity.is_default,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
