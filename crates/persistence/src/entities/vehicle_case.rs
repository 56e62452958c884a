//! Vehicle case entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for funding_source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "funding_source", rename_all = "lowercase")]
pub enum FundingSourceDb {
    Insurance,
    Internal,
    Customer,
}

impl From<FundingSourceDb> for domain::models::FundingSource {
    fn from(db: FundingSourceDb) -> Self {
        match db {
            FundingSourceDb::Insurance => Self::Insurance,
            FundingSourceDb::Internal => Self::Internal,
            FundingSourceDb::Customer => Self::Customer,
        }
    }
}

impl From<domain::models::FundingSource> for FundingSourceDb {
    fn from(domain: domain::models::FundingSource) -> Self {
        match domain {
            domain::models::FundingSource::Insurance => Self::Insurance,
            domain::models::FundingSource::Internal => Self::Internal,
            domain::models::FundingSource::Customer => Self::Customer,
        }
    }
}

/// Database enum for insurance_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "insurance_status", rename_all = "lowercase")]
pub enum InsuranceStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<InsuranceStatusDb> for domain::models::InsuranceStatus {
    fn from(db: InsuranceStatusDb) -> Self {
        match db {
            InsuranceStatusDb::Pending => Self::Pending,
            InsuranceStatusDb::Approved => Self::Approved,
            InsuranceStatusDb::Rejected => Self::Rejected,
        }
    }
}

impl From<domain::models::InsuranceStatus> for InsuranceStatusDb {
    fn from(domain: domain::models::InsuranceStatus) -> Self {
        match domain {
            domain::models::InsuranceStatus::Pending => Self::Pending,
            domain::models::InsuranceStatus::Approved => Self::Approved,
            domain::models::InsuranceStatus::Rejected => Self::Rejected,
        }
    }
}

/// Database row mapping for the vehicle_cases table.
#[derive(Debug, Clone, FromRow)]
pub struct VehicleCaseEntity {
    pub id: Uuid,
    pub org_id: Uuid,
    pub registration_number: String,
    pub dropoff_location_id: Uuid,
    pub funding_source: FundingSourceDb,
    pub insurance_status: InsuranceStatusDb,
    pub photo_inspection_done: bool,
    pub raknad_pa: bool,
    pub handler_user_id: Option<Uuid>,
    pub handler_note: Option<String>,
    pub klar: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub archived_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

impl From<VehicleCaseEntity> for domain::models::VehicleCase {
    fn from(entity: VehicleCaseEntity) -> Self {
        Self {
            id: entity.id,
            org_id: entity.org_id,
            registration_number: entity.registration_number,
            dropoff_location_id: entity.dropoff_location_id,
            funding_source: entity.funding_source.into(),
            insurance_status: entity.insurance_status.into(),
            photo_inspection_done: entity.photo_inspection_done,
            raknad_pa: entity.raknad_pa,
            handler_user_id: entity.handler_user_id,
            handler_note: entity.handler_note,
            klar: entity.klar,
            archived_at: entity.archived_at,
            archived_by: entity.archived_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            created_by: entity.created_by,
            updated_by: entity.updated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funding_source_conversion() {
        assert_eq!(
            domain::models::FundingSource::from(FundingSourceDb::Insurance),
            domain::models::FundingSource::Insurance
        );
        assert_eq!(
            FundingSourceDb::from(domain::models::FundingSource::Customer),
            FundingSourceDb::Customer
        );
    }

    #[test]
    fn test_insurance_status_conversion() {
        assert_eq!(
            domain::models::InsuranceStatus::from(InsuranceStatusDb::Approved),
            domain::models::InsuranceStatus::Approved
        );
        assert_eq!(
            InsuranceStatusDb::from(domain::models::InsuranceStatus::Rejected),
            InsuranceStatusDb::Rejected
        );
    }

    #[test]
    fn test_entity_to_domain_preserves_lifecycle_fields() {
        let now = Utc::now();
        let entity = VehicleCaseEntity {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            registration_number: "ABC123".to_string(),
            dropoff_location_id: Uuid::new_v4(),
            funding_source: FundingSourceDb::Internal,
            insurance_status: InsuranceStatusDb::Pending,
            photo_inspection_done: true,
            raknad_pa: false,
            handler_user_id: Some(Uuid::new_v4()),
            handler_note: Some("waiting for parts".to_string()),
            klar: true,
            archived_at: Some(now),
            archived_by: Some(Uuid::new_v4()),
            created_at: now,
            updated_at: now,
            created_by: Uuid::new_v4(),
            updated_by: Uuid::new_v4(),
        };

        let case: domain::models::VehicleCase = entity.clone().into();
        assert_eq!(case.id, entity.id);
        assert!(case.klar);
        assert_eq!(case.archived_at, Some(now));
        assert_eq!(case.funding_source, domain::models::FundingSource::Internal);
    }
}
