//! End-to-end session behaviour against a scripted in-memory gateway.

use std::collections::{HashSet, VecDeque};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::Notify;
use verity_core::{
    Confidence, CoreError, EntryKey, HistoryEntry, Label, NonEmptyText, PredictionResult,
    RequestPhase,
};
use verity_gateway::{ErrorKind, Gateway, GatewayError};
use verity_session::{Notice, Session, SessionError, SessionOptions, SubmitOutcome};

// ---------------------------------------------------------------------------
// Fake gateway
// ---------------------------------------------------------------------------

fn unavailable() -> GatewayError {
    GatewayError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

#[derive(Default)]
struct FakeGateway {
    /// Scripted predict responses, consumed in order. Empty means failure.
    predictions: Mutex<VecDeque<Result<PredictionResult, GatewayError>>>,
    /// Listing returned by `list_history`; `None` makes it fail.
    listing: Mutex<Option<Vec<HistoryEntry>>>,
    /// Keys whose deletion the server rejects.
    refuse_delete: Mutex<HashSet<EntryKey>>,
    /// Reject deletes addressed by text, like a backend that only routes ids.
    ids_only: bool,
    /// When set, `predict` waits for a notification before answering.
    gate: Option<Arc<Notify>>,
    /// Artificial latency for `predict`.
    delay: Option<Duration>,
    predict_calls: AtomicUsize,
    list_calls: AtomicUsize,
    deleted: Mutex<Vec<EntryKey>>,
    sent: Mutex<Vec<String>>,
}

impl FakeGateway {
    fn answering(results: Vec<Result<PredictionResult, GatewayError>>) -> Self {
        Self {
            predictions: Mutex::new(results.into()),
            listing: Mutex::new(Some(Vec::new())),
            ..Self::default()
        }
    }

    fn with_listing(self, entries: Vec<HistoryEntry>) -> Self {
        *self.listing.lock().unwrap() = Some(entries);
        self
    }

    fn with_failing_listing(self) -> Self {
        *self.listing.lock().unwrap() = None;
        self
    }

    fn refusing(self, key: EntryKey) -> Self {
        self.refuse_delete.lock().unwrap().insert(key);
        self
    }

    fn deleting_by_id_only(self) -> Self {
        Self {
            ids_only: true,
            ..self
        }
    }
}

impl Gateway for FakeGateway {
    async fn predict(&self, text: &NonEmptyText) -> Result<PredictionResult, GatewayError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(text.as_str().to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.predictions.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unavailable()))
    }

    async fn list_history(&self, _limit: NonZeroU32) -> Result<Vec<HistoryEntry>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let listing = self.listing.lock().unwrap().clone();
        listing.ok_or_else(unavailable)
    }

    async fn delete_history(&self, key: &EntryKey) -> Result<(), GatewayError> {
        if self.ids_only && !key.is_durable() {
            return Err(GatewayError::Api {
                status: 405,
                message: "Method Not Allowed".to_string(),
            });
        }
        if self.refuse_delete.lock().unwrap().contains(key) {
            return Err(GatewayError::Api {
                status: 500,
                message: "delete failed".to_string(),
            });
        }
        self.deleted.lock().unwrap().push(key.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn result(label: Label, confidence: f64) -> PredictionResult {
    PredictionResult::new(label, Confidence::from_fraction(confidence).unwrap())
}

fn entry(key: EntryKey, text: &str, label: Label, confidence: f64) -> HistoryEntry {
    HistoryEntry {
        key,
        text: text.to_string(),
        label,
        confidence: Confidence::from_fraction(confidence).unwrap(),
    }
}

fn durable(id: u32, text: &str) -> HistoryEntry {
    entry(EntryKey::Id(id.to_string()), text, Label::Real, 0.6)
}

fn session(gateway: FakeGateway) -> Session<FakeGateway> {
    Session::new(gateway, SessionOptions::default())
}

async fn seeded(gateway: FakeGateway) -> Session<FakeGateway> {
    let session = session(gateway);
    assert!(session.start().await);
    session
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_prediction_is_prepended_and_input_cleared() {
    let gateway = FakeGateway::answering(vec![Ok(result(Label::Fake, 0.87))])
        .with_listing(vec![durable(1, "older headline")]);
    let session = seeded(gateway).await;

    session.set_input("Breaking: moon made of cheese");
    let outcome = session.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Succeeded(ref r) if r.label == Label::Fake));
    let view = session.view();
    assert_eq!(view.phase, RequestPhase::Succeeded);
    assert_eq!(view.input, "");
    assert_eq!(view.result, Some(result(Label::Fake, 0.87)));
    assert_eq!(view.history.len(), 2);
    assert_eq!(
        view.history[0],
        entry(
            EntryKey::Text("Breaking: moon made of cheese".to_string()),
            "Breaking: moon made of cheese",
            Label::Fake,
            0.87,
        )
    );
    assert_eq!(view.history[1].text, "older headline");
}

#[tokio::test]
async fn blank_input_never_reaches_gateway() {
    let session = seeded(FakeGateway::answering(vec![])).await;

    for blank in ["", "   "] {
        session.set_input(blank);
        let outcome = session.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(CoreError::Validation(_))));
        assert_eq!(session.phase(), RequestPhase::Idle);
    }
    assert_eq!(session.gateway().predict_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_prediction_leaves_history_and_input_untouched() {
    let gateway = FakeGateway::answering(vec![Err(unavailable())])
        .with_listing(vec![durable(2, "b"), durable(1, "a")]);
    let session = seeded(gateway).await;
    let before = session.view().history;

    session.set_input("will fail");
    let outcome = session.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    let view = session.view();
    assert_eq!(view.phase, RequestPhase::Failed);
    assert_eq!(view.history, before);
    assert_eq!(view.input, "will fail");
    assert_eq!(view.result, None);
    assert_eq!(view.notice.as_ref().map(Notice::headline), Some("Backend not reachable"));
}

#[tokio::test]
async fn concurrent_submissions_are_dropped_not_queued() {
    let gate = Arc::new(Notify::new());
    let gateway = FakeGateway {
        gate: Some(Arc::clone(&gate)),
        ..FakeGateway::answering(vec![Ok(result(Label::Real, 0.9)), Ok(result(Label::Fake, 0.1))])
    };
    let session = seeded(gateway).await;
    session.set_input("only once");

    let (first, second) = tokio::join!(session.submit(), async {
        assert_eq!(session.phase(), RequestPhase::Submitting);
        let outcomes = [session.submit().await, session.submit().await];
        gate.notify_one();
        outcomes
    });

    assert!(matches!(first, SubmitOutcome::Succeeded(_)));
    assert!(second.iter().all(|o| matches!(o, SubmitOutcome::Ignored)));
    assert_eq!(session.gateway().predict_calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.view().history.len(), 1);
}

#[tokio::test]
async fn retry_after_failure_resends_preserved_input() {
    let gateway =
        FakeGateway::answering(vec![Err(unavailable()), Ok(result(Label::Real, 0.7))]);
    let session = seeded(gateway).await;

    session.set_input("try again");
    assert!(matches!(session.submit().await, SubmitOutcome::Failed(_)));
    assert!(matches!(session.submit().await, SubmitOutcome::Succeeded(_)));

    let sent = session.gateway().sent.lock().unwrap().clone();
    assert_eq!(sent, vec!["try again", "try again"]);
    assert_eq!(session.input(), "");
}

#[tokio::test]
async fn slow_prediction_times_out_into_failed() {
    let gateway = FakeGateway {
        delay: Some(Duration::from_secs(5)),
        ..FakeGateway::answering(vec![Ok(result(Label::Real, 0.5))])
    };
    let session = Session::new(
        gateway,
        SessionOptions {
            request_timeout: Duration::from_millis(50),
            ..SessionOptions::default()
        },
    );

    session.set_input("hung request");
    let outcome = session.submit().await;

    match outcome {
        SubmitOutcome::Failed(error) => assert_eq!(error.kind(), ErrorKind::Timeout),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(session.phase(), RequestPhase::Failed);
    assert_eq!(session.input(), "hung request");
    assert!(session.view().history.is_empty());
}

#[tokio::test]
async fn teardown_abandons_in_flight_prediction() {
    let gate = Arc::new(Notify::new());
    let gateway = FakeGateway {
        gate: Some(Arc::clone(&gate)),
        ..FakeGateway::answering(vec![Ok(result(Label::Fake, 0.99))])
    };
    let session = seeded(gateway).await;
    session.set_input("unmounted");

    let (outcome, ()) = tokio::join!(session.submit(), async {
        session.teardown();
        gate.notify_one();
    });

    assert!(matches!(outcome, SubmitOutcome::Cancelled));
    assert!(session.view().history.is_empty());
    assert_eq!(session.input(), "unmounted");
    assert!(matches!(session.submit().await, SubmitOutcome::Cancelled));
    assert!(matches!(
        session.delete(&EntryKey::Id("1".into())).await,
        Err(SessionError::TornDown)
    ));
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seed_round_trips_server_listing() {
    let listing = vec![
        durable(3, "newest"),
        entry(EntryKey::Text("no id".into()), "no id", Label::Fake, 0.95),
        durable(1, "oldest"),
    ];
    let session = seeded(FakeGateway::answering(vec![]).with_listing(listing.clone())).await;

    assert_eq!(session.view().history, listing);
}

#[tokio::test]
async fn start_runs_once() {
    let session = session(FakeGateway::answering(vec![]).with_listing(vec![durable(1, "a")]));
    assert!(session.start().await);
    assert!(!session.start().await);
    assert_eq!(session.gateway().list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_startup_load_is_not_fatal() {
    let gateway =
        FakeGateway::answering(vec![Ok(result(Label::Real, 0.8))]).with_failing_listing();
    let session = session(gateway);

    assert!(!session.start().await);
    assert!(session.view().history.is_empty());
    let notice = session.take_notice().expect("notice raised");
    assert_eq!(notice.headline(), "History could not be loaded");
    assert_eq!(session.take_notice(), None);

    session.set_input("still works");
    assert!(matches!(session.submit().await, SubmitOutcome::Succeeded(_)));
    assert_eq!(session.view().history.len(), 1);
}

#[tokio::test]
async fn confirmed_delete_removes_exactly_one_entry() {
    let session = seeded(
        FakeGateway::answering(vec![])
            .with_listing(vec![durable(3, "c"), durable(2, "b"), durable(1, "a")]),
    )
    .await;
    let key = EntryKey::Id("2".into());

    let removed = session.delete(&key).await.unwrap();

    assert_eq!(removed, 1);
    let history = session.view().history;
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|e| !e.matches(&key)));
    assert_eq!(session.gateway().deleted.lock().unwrap().clone(), vec![key]);
}

#[tokio::test]
async fn refused_delete_leaves_cache_unchanged() {
    let key = EntryKey::Id("2".into());
    let session = seeded(
        FakeGateway::answering(vec![])
            .with_listing(vec![durable(3, "c"), durable(2, "b")])
            .refusing(key.clone()),
    )
    .await;
    let before = session.view().history;

    let err = session.delete(&key).await.unwrap_err();

    assert!(matches!(err, SessionError::Gateway(_)));
    assert_eq!(session.view().history, before);
    match session.take_notice() {
        Some(Notice::DeleteFailed { key: failed, .. }) => assert_eq!(failed, key),
        other => panic!("expected delete notice, got {other:?}"),
    }
}

#[tokio::test]
async fn text_key_delete_removes_all_entries_with_that_text() {
    let session = seeded(FakeGateway::answering(vec![]).with_listing(vec![
        entry(EntryKey::Text("same".into()), "same", Label::Fake, 0.9),
        entry(EntryKey::Text("other".into()), "other", Label::Real, 0.6),
        entry(EntryKey::Text("same".into()), "same", Label::Real, 0.7),
    ]))
    .await;

    let removed = session.delete(&EntryKey::Text("same".into())).await.unwrap();

    assert_eq!(removed, 2);
    let history = session.view().history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "other");
}

#[tokio::test]
async fn fresh_prediction_is_deleted_by_its_server_id() {
    let gateway = FakeGateway::answering(vec![Ok(result(Label::Fake, 0.87))])
        .with_listing(vec![durable(1, "old")])
        .deleting_by_id_only();
    let session = seeded(gateway).await;

    session.set_input("Breaking: moon made of cheese");
    session.submit().await;
    *session.gateway().listing.lock().unwrap() = Some(vec![
        entry(
            EntryKey::Id("2".into()),
            "Breaking: moon made of cheese",
            Label::Fake,
            0.87,
        ),
        durable(1, "old"),
    ]);

    let key = session.view().history[0].key.clone();
    assert_eq!(key, EntryKey::Text("Breaking: moon made of cheese".into()));
    let removed = session.delete(&key).await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(
        session.gateway().deleted.lock().unwrap().clone(),
        vec![EntryKey::Id("2".into())]
    );
    let history = session.view().history;
    let texts: Vec<&str> = history.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["old"]);
    assert!(session.take_notice().is_none());
}

#[tokio::test]
async fn unlisted_prediction_delete_fails_locally_without_sending() {
    let gateway = FakeGateway::answering(vec![Ok(result(Label::Fake, 0.87))])
        .with_listing(vec![durable(1, "old")])
        .deleting_by_id_only();
    let session = seeded(gateway).await;

    session.set_input("Breaking: moon made of cheese");
    session.submit().await;

    let key = session.view().history[0].key.clone();
    let err = session.delete(&key).await.unwrap_err();

    assert!(matches!(err, SessionError::Unresolved { ref key } if !key.is_durable()));
    assert!(session.gateway().deleted.lock().unwrap().is_empty());
    assert_eq!(session.view().history.len(), 2);
    match session.take_notice() {
        Some(Notice::DeleteFailed { key: failed, .. }) => assert_eq!(failed, key),
        other => panic!("expected delete notice, got {other:?}"),
    }
}

#[tokio::test]
async fn refresh_keeps_unconfirmed_local_entries() {
    let gateway = FakeGateway::answering(vec![
        Ok(result(Label::Fake, 0.8)),
        Ok(result(Label::Real, 0.7)),
    ])
    .with_listing(vec![durable(1, "old")]);
    let session = seeded(gateway).await;

    session.set_input("persisted");
    session.submit().await;
    session.set_input("not yet listed");
    session.submit().await;

    *session.gateway().listing.lock().unwrap() = Some(vec![
        entry(EntryKey::Id("2".into()), "persisted", Label::Fake, 0.8),
        durable(1, "old"),
    ]);
    let pending = session.refresh().await.unwrap();

    assert_eq!(pending, 1);
    let history = session.view().history;
    let texts: Vec<&str> = history.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["not yet listed", "persisted", "old"]);
    assert_eq!(history[1].key, EntryKey::Id("2".into()));
}

#[tokio::test]
async fn failed_refresh_keeps_cache() {
    let session = seeded(FakeGateway::answering(vec![]).with_listing(vec![durable(1, "a")])).await;
    *session.gateway().listing.lock().unwrap() = None;

    assert!(session.refresh().await.is_err());
    assert_eq!(session.view().history.len(), 1);
    assert_eq!(
        session.take_notice().map(|n| n.headline()),
        Some("History could not be loaded")
    );
}
