//! Vehicle case audit entity (database row mapping).

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the vehicle_case_audits table.
///
/// Rows are append-only; there is no update or delete path.
#[derive(Debug, Clone, FromRow)]
pub struct VehicleCaseAuditEntity {
    pub id: Uuid,
    pub case_id: Uuid,
    pub org_id: Uuid,
    pub changed_by: Uuid,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub changed_at: DateTime<Utc>,
    pub snapshot: JsonValue,
}

impl From<VehicleCaseAuditEntity> for domain::models::VehicleCaseAudit {
    fn from(entity: VehicleCaseAuditEntity) -> Self {
        Self {
            id: entity.id,
            case_id: entity.case_id,
            org_id: entity.org_id,
            changed_by: entity.changed_by,
            field: entity.field,
            old_value: entity.old_value,
            new_value: entity.new_value,
            changed_at: entity.changed_at,
            snapshot: entity.snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain_conversion() {
        let entity = VehicleCaseAuditEntity {
            id: Uuid::new_v4(),
            case_id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            changed_by: Uuid::new_v4(),
            field: "klar".to_string(),
            old_value: "false".to_string(),
            new_value: "true".to_string(),
            changed_at: Utc::now(),
            snapshot: serde_json::json!({"klar": true}),
        };

        let audit: domain::models::VehicleCaseAudit = entity.clone().into();
        assert_eq!(audit.field, "klar");
        assert_eq!(audit.old_value, "false");
        assert_eq!(audit.new_value, "true");
        assert_eq!(audit.snapshot["klar"], serde_json::json!(true));
    }
}
