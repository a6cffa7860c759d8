//! The audit engine: observation, attribution, classification, persistence.
//!
//! [`ActivityRecorder::record`] is the fire-and-forget ingestion point used
//! by business modules. Events travel over a bounded channel to a worker
//! task that runs [`ActivityEngine::process`] on each one. Events from one
//! recorder are processed in emission order; nothing is ordered across
//! unrelated recorders.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use trellis_db::{ActivityLog, NewActivity};

use crate::error::ActivityError;
use crate::event::ChangeEvent;
use crate::retry::RetryPolicy;
use crate::store::ActivityStore;

/// Entity kinds that never produce audit entries.
///
/// The activity log itself is first in the list: auditing an audit write
/// would recurse forever. The rest are identity-provider plumbing whose
/// churn is noise, not business history.
const EXCLUDED_KINDS: &[&str] = &["activity_log", "session", "auth_token", "permission"];

/// Fields dropped from update details regardless of the supplied manifest.
const VOLATILE_FIELDS: &[&str] = &["last_login", "updated_at"];

/// Conventional owner fields consulted when no explicit actor is supplied.
const OWNER_FIELDS: &[&str] = &["user", "created_by"];

/// Capacity of the recorder channel.
const CHANNEL_CAPACITY: usize = 1024;

/// Configuration for the audit engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on a single store insert.
    pub insert_timeout: std::time::Duration,
    /// Retry/backoff policy for failed inserts.
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            insert_timeout: std::time::Duration::from_secs(2),
            retry: RetryPolicy::default(),
        }
    }
}

/// Terminal state of one processed event.
#[derive(Debug)]
pub enum Disposition {
    /// The entry was appended to the store.
    Persisted(ActivityLog),
    /// The event's entity kind is excluded from auditing.
    Skipped { entity_kind: String },
    /// Persistence failed after all retries; the event went to dead letter.
    DeadLettered { event: ChangeEvent },
}

/// Processes entity-changed events into audit entries.
pub struct ActivityEngine {
    store: Arc<dyn ActivityStore>,
    config: EngineConfig,
}

impl ActivityEngine {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(store: Arc<dyn ActivityStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The store this engine appends to.
    pub fn store(&self) -> &Arc<dyn ActivityStore> {
        &self.store
    }

    /// Run one event through the pipeline to a terminal state.
    ///
    /// Never returns an error: failure is absorbed into the dead-letter
    /// disposition so the emitting mutation is unaffected.
    pub async fn process(&self, event: ChangeEvent) -> Disposition {
        // Observed: excluded kinds never reach attribution
        if is_excluded(&event.entity_kind) {
            debug!(entity_kind = %event.entity_kind, "skipping excluded entity kind");
            return Disposition::Skipped {
                entity_kind: event.entity_kind,
            };
        }

        // Attributed: explicit actor, then conventional owner field, then
        // none. A missing actor still persists as a system action.
        let actor = resolve_actor(&event);

        // Classified: details carry only the supplied manifest, minus
        // volatile bookkeeping fields.
        let details = classify_details(&event);

        let input = NewActivity {
            user_id: actor,
            activity_type: event.operation.to_string(),
            object_type: Some(event.entity_kind.clone()),
            object_id: Some(event.entity_id.clone()),
            details,
            ip_address: event.request.as_ref().and_then(|r| r.ip_address.clone()),
            user_agent: event.request.as_ref().and_then(|r| r.user_agent.clone()),
        };

        // Persisted: bounded insert with retry, then dead letter
        self.persist(event, input).await
    }

    async fn persist(&self, event: ChangeEvent, input: NewActivity) -> Disposition {
        let mut attempt: u8 = 0;

        loop {
            let result = tokio::time::timeout(
                self.config.insert_timeout,
                self.store.insert(input.clone()),
            )
            .await
            .map_err(|_| ActivityError::Timeout(self.config.insert_timeout))
            .and_then(|r| r);

            match result {
                Ok(entry) => {
                    debug!(
                        entry_id = %entry.id,
                        entity_kind = %entry.object_type.as_deref().unwrap_or(""),
                        activity_type = %entry.activity_type,
                        "activity entry persisted"
                    );
                    return Disposition::Persisted(entry);
                }
                Err(e) if !e.is_transient() => {
                    error!(
                        entity_kind = %event.entity_kind,
                        entity_id = %event.entity_id,
                        error = %e,
                        "activity entry dead-lettered (permanent failure)"
                    );
                    return Disposition::DeadLettered { event };
                }
                Err(e) => {
                    attempt += 1;
                    if self.config.retry.is_dead_letter(attempt) {
                        error!(
                            entity_kind = %event.entity_kind,
                            entity_id = %event.entity_id,
                            attempts = attempt,
                            error = %e,
                            "activity entry dead-lettered after retries"
                        );
                        return Disposition::DeadLettered { event };
                    }

                    let delay = self.config.retry.next_delay(attempt - 1);
                    debug!(
                        entity_kind = %event.entity_kind,
                        attempt,
                        ?delay,
                        error = %e,
                        "retrying activity persistence"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn is_excluded(entity_kind: &str) -> bool {
    EXCLUDED_KINDS
        .iter()
        .any(|kind| kind.eq_ignore_ascii_case(entity_kind))
}

fn resolve_actor(event: &ChangeEvent) -> Option<Uuid> {
    if let Some(actor) = event.actor_hint {
        return Some(actor.into());
    }

    let fields = event.changed_fields.as_ref()?;
    for field in OWNER_FIELDS {
        if let Some(JsonValue::String(value)) = fields.get(*field) {
            if let Ok(uuid) = Uuid::parse_str(value) {
                return Some(uuid);
            }
        }
    }

    None
}

fn classify_details(event: &ChangeEvent) -> JsonValue {
    let Some(fields) = &event.changed_fields else {
        return JsonValue::Object(Map::new());
    };

    let filtered: Map<String, JsonValue> = fields
        .iter()
        .filter(|(name, _)| !VOLATILE_FIELDS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    JsonValue::Object(filtered)
}

/// Fire-and-forget ingestion handle handed to business modules.
///
/// Cloneable; all clones feed the same worker. Dropping every clone ends the
/// worker after it drains the queue.
#[derive(Clone)]
pub struct ActivityRecorder {
    tx: mpsc::Sender<ChangeEvent>,
}

impl ActivityRecorder {
    /// Spawn the worker task and return the recorder feeding it.
    pub fn spawn(engine: ActivityEngine) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = tokio::spawn(worker_loop(engine, rx));
        (Self { tx }, handle)
    }

    /// Queue an event for audit (non-blocking, fire-and-forget).
    ///
    /// A full or closed channel drops the event with a warning rather than
    /// blocking the caller.
    pub fn record(&self, event: ChangeEvent) {
        if let Err(e) = self.tx.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(event) => warn!(
                    entity_kind = %event.entity_kind,
                    "activity channel full; dropping event"
                ),
                mpsc::error::TrySendError::Closed(event) => warn!(
                    entity_kind = %event.entity_kind,
                    "activity worker stopped; dropping event"
                ),
            }
        }
    }
}

async fn worker_loop(engine: ActivityEngine, mut rx: mpsc::Receiver<ChangeEvent>) {
    while let Some(event) = rx.recv().await {
        engine.process(event).await;
    }
    debug!("activity worker drained and stopped");
}
