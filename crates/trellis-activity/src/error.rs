//! Error types for the trellis-activity crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while recording activity.
///
/// All of these are internal to the engine: audit failures are retried and
/// dead-lettered, never surfaced to the caller whose mutation triggered the
/// event.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// The audit store rejected or failed the write.
    #[error("Activity store error: {0}")]
    Store(String),

    /// The audit store did not answer within the configured timeout.
    #[error("Activity store timed out after {0:?}")]
    Timeout(Duration),

    /// The worker channel is closed; no further events can be queued.
    #[error("Activity channel closed")]
    ChannelClosed,
}

impl ActivityError {
    /// Returns true if this error is transient and the write can be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, ActivityError::Store(_) | ActivityError::Timeout(_))
    }
}

impl From<sqlx::Error> for ActivityError {
    fn from(err: sqlx::Error) -> Self {
        ActivityError::Store(err.to_string())
    }
}
