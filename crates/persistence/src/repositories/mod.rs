//! Repository implementations.

pub mod org_location;
pub mod org_member;
pub mod statistics;
pub mod vehicle_case;
pub mod vehicle_case_audit;

pub use org_location::{DeleteLocationOutcome, NewLocation, OrgLocationRepository};
pub use org_member::OrgMemberRepository;
pub use statistics::StatisticsRepository;
pub use vehicle_case::{NewVehicleCase, VehicleCaseRepository};
pub use vehicle_case_audit::VehicleCaseAuditRepository;
