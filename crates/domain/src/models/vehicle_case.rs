//! Vehicle case domain models.
//!
//! A vehicle case is the tracked unit of work for one vehicle moving through
//! the insurance/cost workflow. Cases are scoped to an organization and move
//! from "ongoing" to "klar" (archived) through a guarded transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Who pays for the case's resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    Insurance,
    Internal,
    Customer,
}

impl FromStr for FundingSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "insurance" => Ok(FundingSource::Insurance),
            "internal" => Ok(FundingSource::Internal),
            "customer" => Ok(FundingSource::Customer),
            _ => Err(format!("Unknown funding source: {}", s)),
        }
    }
}

impl std::fmt::Display for FundingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FundingSource::Insurance => write!(f, "insurance"),
            FundingSource::Internal => write!(f, "internal"),
            FundingSource::Customer => write!(f, "customer"),
        }
    }
}

/// Insurance approval state for a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceStatus {
    Pending,
    Approved,
    Rejected,
}

impl FromStr for InsuranceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InsuranceStatus::Pending),
            "approved" => Ok(InsuranceStatus::Approved),
            "rejected" => Ok(InsuranceStatus::Rejected),
            _ => Err(format!("Unknown insurance status: {}", s)),
        }
    }
}

impl std::fmt::Display for InsuranceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsuranceStatus::Pending => write!(f, "pending"),
            InsuranceStatus::Approved => write!(f, "approved"),
            InsuranceStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A vehicle case.
///
/// Invariant: `klar == true` exactly when `archived_at` is set. A case is
/// "ongoing" when `archived_at` is null and "archived" otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCase {
    pub id: Uuid,
    /// Owning organization; never changes after creation.
    pub org_id: Uuid,
    /// Normalized (trimmed, uppercased) registration number.
    pub registration_number: String,
    /// Drop-off location; defaults to the org's designated default location.
    pub dropoff_location_id: Uuid,
    pub funding_source: FundingSource,
    pub insurance_status: InsuranceStatus,
    pub photo_inspection_done: bool,
    /// "Counted/estimated on" milestone flag.
    pub raknad_pa: bool,
    /// Responsible user; auto-assigned to the creator at case creation.
    pub handler_user_id: Option<Uuid>,
    pub handler_note: Option<String>,
    /// Terminal flag; true iff `archived_at` is set.
    pub klar: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub archived_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

impl VehicleCase {
    /// Whether the case is still in the ongoing partition.
    pub fn is_ongoing(&self) -> bool {
        self.archived_at.is_none()
    }
}

/// Request body for creating a vehicle case.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleCaseRequest {
    #[validate(custom(function = "shared::validation::validate_registration"))]
    pub registration_number: String,

    /// Falls back to the org's default location when omitted.
    pub dropoff_location_id: Option<Uuid>,

    #[serde(default = "default_funding_source")]
    pub funding_source: FundingSource,

    #[serde(default = "default_insurance_status")]
    pub insurance_status: InsuranceStatus,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_handler_note"))]
    pub handler_note: Option<String>,
}

fn default_funding_source() -> FundingSource {
    FundingSource::Insurance
}

fn default_insurance_status() -> InsuranceStatus {
    InsuranceStatus::Pending
}

/// Field-level update payload for a vehicle case.
///
/// All fields are optional; only the present ones are written. Handler
/// reassignment is deliberately not part of this path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVehicleCase {
    pub registration_number: Option<String>,
    pub dropoff_location_id: Option<Uuid>,
    pub funding_source: Option<FundingSource>,
    pub insurance_status: Option<InsuranceStatus>,
    pub photo_inspection_done: Option<bool>,
    pub raknad_pa: Option<bool>,
    pub handler_note: Option<String>,
}

impl UpdateVehicleCase {
    /// Whether the payload carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.registration_number.is_none()
            && self.dropoff_location_id.is_none()
            && self.funding_source.is_none()
            && self.insurance_status.is_none()
            && self.photo_inspection_done.is_none()
            && self.raknad_pa.is_none()
            && self.handler_note.is_none()
    }
}

/// Request body for the guarded field update.
///
/// The caller names the field it is editing together with stringified
/// before/after values; exactly one audit row is written for that pair.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVehicleCaseRequest {
    #[serde(flatten)]
    pub updates: UpdateVehicleCase,

    /// Name of the edited field, as shown in the audit trail.
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

/// Conjunctive filters for the case listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseFilters {
    /// Case-insensitive substring match on the registration number.
    pub search: Option<String>,
    pub funding_source: Option<FundingSource>,
    pub insurance_status: Option<InsuranceStatus>,
    pub dropoff_location_id: Option<Uuid>,
    pub handler_user_id: Option<Uuid>,
}

/// Paginated case listing response.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleCaseListResponse {
    pub data: Vec<VehicleCase>,
    /// Total matching rows before pagination.
    pub count: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
}
