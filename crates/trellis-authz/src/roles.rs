//! The organization role hierarchy.
//!
//! Roles form a static total order used for "at least as privileged as"
//! comparisons. Rank 0 (`admin`) is the most privileged; a membership role
//! satisfies a requirement iff its rank is numerically less than or equal to
//! the required rank.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AuthzError;

/// A role a user holds within one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Full control of the organization.
    Admin,
    ProjectManager,
    Verifier,
    Support,
    Developer,
    Salesperson,
    /// Default role for new members; least privileged.
    User,
}

impl OrgRole {
    /// Every role, ordered from most to least privileged.
    ///
    /// The rank table below must cover exactly these variants; tests verify
    /// the two stay in lockstep.
    pub const ALL: [OrgRole; 7] = [
        OrgRole::Admin,
        OrgRole::ProjectManager,
        OrgRole::Verifier,
        OrgRole::Support,
        OrgRole::Developer,
        OrgRole::Salesperson,
        OrgRole::User,
    ];

    /// Privilege rank: 0 is the most privileged.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            OrgRole::Admin => 0,
            OrgRole::ProjectManager => 1,
            OrgRole::Verifier => 2,
            OrgRole::Support => 3,
            OrgRole::Developer => 4,
            OrgRole::Salesperson => 5,
            OrgRole::User => 6,
        }
    }

    /// True when this role is at least as privileged as `required`.
    #[must_use]
    pub fn satisfies(self, required: OrgRole) -> bool {
        self.rank() <= required.rank()
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrgRole::Admin => write!(f, "admin"),
            OrgRole::ProjectManager => write!(f, "project_manager"),
            OrgRole::Verifier => write!(f, "verifier"),
            OrgRole::Support => write!(f, "support"),
            OrgRole::Developer => write!(f, "developer"),
            OrgRole::Salesperson => write!(f, "salesperson"),
            OrgRole::User => write!(f, "user"),
        }
    }
}

impl FromStr for OrgRole {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(OrgRole::Admin),
            "project_manager" => Ok(OrgRole::ProjectManager),
            "verifier" => Ok(OrgRole::Verifier),
            "support" => Ok(OrgRole::Support),
            "developer" => Ok(OrgRole::Developer),
            "salesperson" => Ok(OrgRole::Salesperson),
            "user" => Ok(OrgRole::User),
            other => Err(AuthzError::UnknownRole(other.to_string())),
        }
    }
}
