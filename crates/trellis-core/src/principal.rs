//! The authenticated actor making a request.
//!
//! A [`Principal`] is produced by the identity layer after credential
//! verification; this crate never authenticates. It is read-only input to
//! every authorization decision.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// An authenticated actor.
///
/// `global_override` marks platform operators whose access bypasses all
/// membership checks. `active` mirrors the identity provider's account flag;
/// an inactive principal is treated as unauthenticated everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Identifier of the user this principal represents.
    pub id: UserId,
    /// Unconditional access flag (platform superadmin).
    pub global_override: bool,
    /// Whether the account is currently active.
    pub active: bool,
}

impl Principal {
    /// A regular active principal without the override flag.
    #[must_use]
    pub fn user(id: UserId) -> Self {
        Self {
            id,
            global_override: false,
            active: true,
        }
    }

    /// An active principal carrying the global override.
    #[must_use]
    pub fn superadmin(id: UserId) -> Self {
        Self {
            id,
            global_override: true,
            active: true,
        }
    }

    /// Returns a copy of this principal marked inactive.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// True when this principal may act at all.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.active
    }
}
