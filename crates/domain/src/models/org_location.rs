//! Org-scoped drop-off location models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A named drop-off point within an organization.
///
/// At most one location per org carries `is_default`; a partial unique index
/// enforces this at the persistence layer and the swap is a single
/// conditional update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgLocation {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a location.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 120, message = "Location name must be 1-120 characters"))]
    pub name: String,

    /// When true the new location becomes the org default, demoting any
    /// previous default in the same statement.
    #[serde(default)]
    pub is_default: bool,
}

/// Request body for renaming a location.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(length(min = 1, max = 120, message = "Location name must be 1-120 characters"))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validates_name() {
        let request = CreateLocationRequest {
            name: String::new(),
            is_default: false,
        };
        assert!(request.validate().is_err());

        let request = CreateLocationRequest {
            name: "Huvudverkstad".to_string(),
            is_default: true,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_default_flag_from_json() {
        let request: CreateLocationRequest =
            serde_json::from_str(r#"{"name": "Annex"}"#).unwrap();
        assert!(!request.is_default);
    }
}
