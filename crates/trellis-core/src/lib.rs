//! Trellis Core Library
//!
//! Shared types and traits for trellis.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`OrgId`, `UserId`, `ActivityId`)
//! - [`principal`] - The authenticated actor making a request
//! - [`traits`] - Organization-ownership traits (`OrgScoped`)
//! - [`error`] - Standardized error types (`TrellisError`)
//!
//! # Example
//!
//! ```
//! use trellis_core::{OrgId, UserId, Principal, TrellisError, Result};
//!
//! let org_id = OrgId::new();
//! let principal = Principal::user(UserId::new());
//!
//! fn example() -> Result<()> {
//!     Err(TrellisError::NotAuthorized { message: None })
//! }
//! ```

pub mod error;
pub mod ids;
pub mod principal;
pub mod traits;

// Re-export main types for convenient access
pub use error::{Result, TrellisError};
pub use ids::{ActivityId, OrgId, UserId};
pub use principal::Principal;
pub use traits::OrgScoped;
