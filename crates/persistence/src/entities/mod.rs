//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod org_location;
pub mod organization;
pub mod vehicle_case;
pub mod vehicle_case_audit;

pub use org_location::OrgLocationEntity;
pub use organization::{OrgMemberEntity, OrgRoleDb};
pub use vehicle_case::{FundingSourceDb, InsuranceStatusDb, VehicleCaseEntity};
pub use vehicle_case_audit::VehicleCaseAuditEntity;
