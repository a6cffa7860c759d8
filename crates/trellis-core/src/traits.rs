//! Organization-Ownership Traits
//!
//! Traits for entities owned by a single organization.
//!
//! # Example
//!
//! ```
//! use trellis_core::{OrgId, OrgScoped};
//!
//! struct Project {
//!     id: uuid::Uuid,
//!     org_id: OrgId,
//!     name: String,
//! }
//!
//! impl OrgScoped for Project {
//!     fn org_id(&self) -> Option<OrgId> {
//!         Some(self.org_id)
//!     }
//! }
//! ```

use crate::ids::OrgId;

/// Trait for records that belong to exactly one organization.
///
/// Ownership may be transitive (a task belongs to a project, which belongs
/// to a client, which belongs to an organization); implementors walk their
/// own ownership chain. `None` means the chain could not be resolved, and
/// callers must treat the record as inaccessible rather than unowned.
///
/// This trait is object-safe and can be used as `&dyn OrgScoped`.
pub trait OrgScoped {
    /// Returns the owning organization, or `None` if ownership cannot be
    /// resolved.
    fn org_id(&self) -> Option<OrgId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Resolved {
        org: OrgId,
    }

    impl OrgScoped for Resolved {
        fn org_id(&self) -> Option<OrgId> {
            Some(self.org)
        }
    }

    struct Orphaned;

    impl OrgScoped for Orphaned {
        fn org_id(&self) -> Option<OrgId> {
            None
        }
    }

    #[test]
    fn test_resolved_record_returns_org() {
        let org = OrgId::new();
        let record = Resolved { org };
        assert_eq!(record.org_id(), Some(org));
    }

    #[test]
    fn test_orphaned_record_returns_none() {
        assert_eq!(Orphaned.org_id(), None);
    }

    #[test]
    fn test_trait_is_object_safe() {
        let org = OrgId::new();
        let record = Resolved { org };
        let dyn_record: &dyn OrgScoped = &record;
        assert_eq!(dyn_record.org_id(), Some(org));
    }

    #[test]
    fn test_generic_function_with_bound() {
        fn belongs_to<T: OrgScoped>(record: &T, org: OrgId) -> bool {
            record.org_id() == Some(org)
        }

        let org = OrgId::new();
        assert!(belongs_to(&Resolved { org }, org));
        assert!(!belongs_to(&Resolved { org }, OrgId::new()));
        assert!(!belongs_to(&Orphaned, org));
    }
}
