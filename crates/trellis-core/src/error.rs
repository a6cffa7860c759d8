//! Error Types
//!
//! Standardized caller-facing error types for trellis.
//!
//! # Example
//!
//! ```
//! use trellis_core::{TrellisError, Result};
//!
//! fn find_project(id: &str) -> Result<String> {
//!     if id.is_empty() {
//!         return Err(TrellisError::NotFound {
//!             resource: "Project".to_string(),
//!             id: None,
//!         });
//!     }
//!     Ok(format!("Project {}", id))
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Standardized error type for trellis.
///
/// Carries the outcomes that are surfaced to API callers. Internal failures
/// (store timeouts, audit persistence errors) live in their own crate error
/// types and are converted to a fail-closed variant here before leaving the
/// core.
///
/// # Variants
///
/// - `NotAuthenticated` - No usable principal on the request (HTTP 401)
/// - `NotAuthorized` - Authenticated but insufficient role/membership (HTTP 403)
/// - `QuotaExceeded` - An organization quota would be exceeded (HTTP 403,
///   distinct body so callers can render an upgrade prompt)
/// - `NotFound` - Resource not found (HTTP 404)
/// - `Validation` - Input validation failure (HTTP 400)
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrellisError {
    /// No authenticated principal was supplied, or the principal is inactive.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The principal is authenticated but lacks the required membership or role.
    #[error("Not authorized{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    NotAuthorized {
        /// Optional message providing more context
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// An organization quota would be exceeded by this action.
    ///
    /// Deliberately distinct from `NotAuthorized`: the caller is allowed to
    /// act, the organization has simply run out of headroom.
    #[error("Quota exceeded for {quota}: {current} of {limit}")]
    QuotaExceeded {
        /// Which quota was hit (e.g. "max_users", "max_storage")
        quota: String,
        /// The configured limit
        limit: i64,
        /// Current usage that triggered the rejection
        current: i64,
    },

    /// Requested resource was not found.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource that was not found (e.g., "Organization")
        resource: String,
        /// Optional identifier of the resource
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Input validation failure.
    #[error("Validation error on field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl TrellisError {
    /// A `NotAuthorized` error without additional context.
    #[must_use]
    pub fn not_authorized() -> Self {
        Self::NotAuthorized { message: None }
    }

    /// A `NotAuthorized` error with a message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::NotAuthorized {
            message: Some(message.into()),
        }
    }
}

/// Type alias for Results using `TrellisError`.
pub type Result<T> = std::result::Result<T, TrellisError>;
