//! Error types for the authorization engine.

use thiserror::Error;

/// Internal errors raised while evaluating authorization.
///
/// None of these reach API callers directly: the resolver converts every one
/// of them into a deny decision (fail closed) and logs the cause.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The membership store failed to answer.
    #[error("Membership store error: {0}")]
    Store(String),

    /// The membership store did not answer within the configured timeout.
    #[error("Membership store timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A persisted role value is not part of the role hierarchy.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A record's owning organization could not be resolved.
    ///
    /// Raised by `OrgScoped` implementations whose ownership chain is broken
    /// (e.g. a task whose project row is gone). The scope filter excludes
    /// such records; this variant lets business code report the anomaly.
    #[error("Cannot resolve owning organization for {entity}")]
    ScopeResolution { entity: String },
}

impl From<sqlx::Error> for AuthzError {
    fn from(err: sqlx::Error) -> Self {
        AuthzError::Store(err.to_string())
    }
}

/// Convenience Result type for the authorization engine.
pub type Result<T> = std::result::Result<T, AuthzError>;
