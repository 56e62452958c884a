//! Organization membership models.
//!
//! Every core entity is scoped by organization id; membership gates all
//! access, and non-members are answered as if the resource did not exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Role of a user within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    Admin,
    Member,
}

impl FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(OrgRole::Admin),
            "member" => Ok(OrgRole::Member),
            _ => Err(format!("Unknown org role: {}", s)),
        }
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrgRole::Admin => write!(f, "admin"),
            OrgRole::Member => write!(f, "member"),
        }
    }
}

/// A user's membership in an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgMember {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: OrgRole,
    pub created_at: DateTime<Utc>,
}

impl OrgMember {
    pub fn is_admin(&self) -> bool {
        self.role == OrgRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_role_roundtrip() {
        assert_eq!("admin".parse::<OrgRole>().unwrap(), OrgRole::Admin);
        assert_eq!("member".parse::<OrgRole>().unwrap(), OrgRole::Member);
        assert_eq!(OrgRole::Admin.to_string(), "admin");
        assert!("owner".parse::<OrgRole>().is_err());
    }

    #[test]
    fn test_is_admin() {
        let member = OrgMember {
            org_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role: OrgRole::Member,
            created_at: Utc::now(),
        };
        assert!(!member.is_admin());
    }
}
