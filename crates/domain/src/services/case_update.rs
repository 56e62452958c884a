//! Business rules applied to a guarded field update before it is persisted.

use shared::validation::normalize_registration;

use crate::models::{InsuranceStatus, UpdateVehicleCase, VehicleCase};

/// Prepares an update payload against the case's current state.
///
/// Two rules apply:
/// - registration numbers are normalized (trimmed, uppercased);
/// - when the update moves `insurance_status` into `approved` and the case
///   has not been counted yet, `raknad_pa` is set true as part of the same
///   mutation. The side effect is not re-triggered when the status is
///   already approved, and an explicit `raknad_pa` value in the payload wins.
pub fn prepare_update(current: &VehicleCase, mut updates: UpdateVehicleCase) -> UpdateVehicleCase {
    updates.registration_number = updates
        .registration_number
        .map(|registration| normalize_registration(&registration));

    let approving = updates.insurance_status == Some(InsuranceStatus::Approved)
        && current.insurance_status != InsuranceStatus::Approved;
    if approving && !current.raknad_pa && updates.raknad_pa.is_none() {
        updates.raknad_pa = Some(true);
    }

    updates
}
