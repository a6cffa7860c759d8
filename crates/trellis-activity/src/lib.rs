//! # trellis-activity
//!
//! The activity audit engine for trellis.
//!
//! Business modules emit a [`ChangeEvent`] for every create/update/delete
//! through [`ActivityRecorder::record`], a non-blocking fire-and-forget
//! call. A background worker drains the queue and runs each event through a
//! fixed pipeline:
//!
//! ```text
//! Observed -> Attributed -> Classified -> Persisted
//!      \-> Skipped (excluded kinds, including the activity log itself)
//! ```
//!
//! Persistence is best-effort and asynchronous relative to the triggering
//! mutation: a slow or failing audit write never delays a request or rolls
//! back business work. Transient store failures are retried with exponential
//! backoff and then dead-lettered.

pub mod context;
pub mod engine;
pub mod error;
pub mod event;
pub mod retry;
pub mod store;

pub use context::RequestContext;
pub use engine::{ActivityEngine, ActivityRecorder, Disposition, EngineConfig};
pub use error::ActivityError;
pub use event::{ChangeEvent, Operation};
pub use retry::RetryPolicy;
pub use store::{ActivityStore, InMemoryActivityStore, PgActivityStore};
