//! Vehicle case audit trail models.
//!
//! Audits are append-only: one row per tracked field change, never updated
//! or deleted. Each row carries stringified before/after values and a full
//! snapshot of the case as it looked after the change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// How audit rows are persisted relative to the primary mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// The case mutation commits first; an audit-write failure is logged
    /// and never fails the primary operation.
    BestEffort,
    /// The case mutation and its audit row share one transaction; audit
    /// failure rolls back the mutation.
    Strict,
}

impl Default for AuditMode {
    fn default() -> Self {
        AuditMode::BestEffort
    }
}

impl std::str::FromStr for AuditMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "best_effort" => Ok(AuditMode::BestEffort),
            "strict" => Ok(AuditMode::Strict),
            _ => Err(format!("Unknown audit mode: {}", s)),
        }
    }
}

/// One recorded field change on a vehicle case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCaseAudit {
    pub id: Uuid,
    pub case_id: Uuid,
    pub org_id: Uuid,
    pub changed_by: Uuid,
    /// Name of the changed attribute.
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub changed_at: DateTime<Utc>,
    /// Full case state at the time of the change.
    pub snapshot: JsonValue,
}

/// The caller-specified field/value pair an update audits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditedChange {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

impl AuditedChange {
    pub fn new(
        field: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    /// The change recorded when a case is marked klar.
    pub fn klar_set() -> Self {
        Self::new("klar", "false", "true")
    }

    /// The change recorded when an archived case is restored.
    pub fn klar_cleared() -> Self {
        Self::new("klar", "true", "false")
    }
}

/// Input for appending an audit row.
#[derive(Debug, Clone)]
pub struct CreateCaseAuditInput {
    pub case_id: Uuid,
    pub org_id: Uuid,
    pub changed_by: Uuid,
    pub change: AuditedChange,
    pub snapshot: JsonValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_mode_parse() {
        assert_eq!(
            "best_effort".parse::<AuditMode>().unwrap(),
            AuditMode::BestEffort
        );
        assert_eq!("strict".parse::<AuditMode>().unwrap(), AuditMode::Strict);
        assert!("eventual".parse::<AuditMode>().is_err());
    }

    #[test]
    fn test_audit_mode_default_is_best_effort() {
        assert_eq!(AuditMode::default(), AuditMode::BestEffort);
    }

    #[test]
    fn test_klar_transitions() {
        let set = AuditedChange::klar_set();
        assert_eq!(set.field, "klar");
        assert_eq!(set.old_value, "false");
        assert_eq!(set.new_value, "true");

        let cleared = AuditedChange::klar_cleared();
        assert_eq!(cleared.old_value, "true");
        assert_eq!(cleared.new_value, "false");
    }
}
