//! Domain model definitions.

pub mod org_location;
pub mod organization;
pub mod statistics;
pub mod vehicle_case;
pub mod vehicle_case_audit;

pub use org_location::{CreateLocationRequest, OrgLocation, UpdateLocationRequest};
pub use organization::{OrgMember, OrgRole};
pub use statistics::{
    FundingSourceCounts, HandlerStats, InsuranceStatusCounts, Statistics, TimeBucket,
};
pub use vehicle_case::{
    CaseFilters, CreateVehicleCaseRequest, FundingSource, InsuranceStatus, UpdateVehicleCase,
    UpdateVehicleCaseRequest, VehicleCase, VehicleCaseListResponse,
};
pub use vehicle_case_audit::{AuditMode, AuditedChange, CreateCaseAuditInput, VehicleCaseAudit};
