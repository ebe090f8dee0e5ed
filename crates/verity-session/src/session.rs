//! Async driver tying the workflow and history cache to a gateway.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use verity_core::{CoreError, EntryKey, HistoryEntry, PredictionResult, RequestPhase};
use verity_gateway::{Gateway, GatewayError};

use crate::error::SessionError;
use crate::history::{DeleteContract, HistoryCache};
use crate::notice::Notice;
use crate::workflow::{Begin, PredictionWorkflow};

const DEFAULT_HISTORY_LIMIT: NonZeroU32 = match NonZeroU32::new(20) {
    Some(limit) => limit,
    None => unreachable!(),
};

/// Tunables for a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Page size for the startup load and refreshes.
    pub history_limit: NonZeroU32,
    /// Upper bound on every gateway call.
    pub request_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// What happened to a call to [`Session::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The input was blank; nothing was sent.
    Rejected(CoreError),
    /// A prediction was already in flight; this submission was dropped.
    Ignored,
    /// The prediction arrived and was recorded.
    Succeeded(PredictionResult),
    /// The prediction failed; history and input are unchanged.
    Failed(GatewayError),
    /// The session was torn down; nothing was recorded.
    Cancelled,
}

/// Read-only snapshot of a session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: RequestPhase,
    pub input: String,
    /// Present only while the phase is `Succeeded`.
    pub result: Option<PredictionResult>,
    pub notice: Option<Notice>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Default)]
struct State {
    workflow: PredictionWorkflow,
    history: HistoryCache,
    notice: Option<Notice>,
    started: bool,
}

/// One user's prediction session against a [`Gateway`].
pub struct Session<G> {
    gateway: G,
    options: SessionOptions,
    state: Mutex<State>,
    cancel: CancellationToken,
}

impl<G: Gateway> Session<G> {
    pub fn new(gateway: G, options: SessionOptions) -> Self {
        Self {
            gateway,
            options,
            state: Mutex::new(State::default()),
            cancel: CancellationToken::new(),
        }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Load the history once. Later calls return immediately.
    ///
    /// Failure is not fatal: the cache stays empty, a
    /// [`Notice::HistoryUnavailable`] is raised, and predictions keep working.
    /// Returns whether the history was loaded by this call.
    pub async fn start(&self) -> bool {
        {
            let mut state = self.lock();
            if state.started || self.cancel.is_cancelled() {
                return false;
            }
            state.started = true;
        }

        let Some(result) = self
            .guarded(self.gateway.list_history(self.options.history_limit))
            .await
        else {
            return false;
        };

        let mut state = self.lock();
        match result {
            Ok(entries) => {
                tracing::info!(entries = entries.len(), "history loaded");
                if state.history.is_empty() {
                    state.history.seed(entries);
                } else {
                    // A prediction finished before the listing did; keep it.
                    state.history.reconcile(entries);
                }
                true
            }
            Err(error) => {
                tracing::warn!(%error, "history load failed; starting empty");
                state.notice = Some(Notice::HistoryUnavailable {
                    detail: error.to_string(),
                });
                false
            }
        }
    }

    /// Replace the input text.
    pub fn set_input(&self, text: impl Into<String>) {
        self.lock().workflow.set_input(text);
    }

    #[must_use]
    pub fn input(&self) -> String {
        self.lock().workflow.input().to_string()
    }

    #[must_use]
    pub fn phase(&self) -> RequestPhase {
        self.lock().workflow.phase()
    }

    /// Submit the current input for classification.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.cancel.is_cancelled() {
            return SubmitOutcome::Cancelled;
        }

        let text = {
            let mut state = self.lock();
            match state.workflow.begin() {
                Ok(Begin::Started(text)) => text,
                Ok(Begin::Busy) => {
                    tracing::debug!("submission dropped; a prediction is already in flight");
                    return SubmitOutcome::Ignored;
                }
                Err(error) => return SubmitOutcome::Rejected(error),
            }
        };

        let Some(result) = self.guarded(self.gateway.predict(&text)).await else {
            tracing::debug!("prediction abandoned on teardown");
            return SubmitOutcome::Cancelled;
        };

        let mut guard = self.lock();
        let state = &mut *guard;
        match result {
            Ok(prediction) => {
                if let Err(error) =
                    state
                        .workflow
                        .succeed(&text, prediction.clone(), &mut state.history)
                {
                    tracing::error!(%error, "prediction completed outside a submission");
                }
                tracing::info!(label = %prediction.label, confidence = prediction.confidence.value(), "prediction recorded");
                SubmitOutcome::Succeeded(prediction)
            }
            Err(error) => {
                if let Err(transition) = state.workflow.fail() {
                    tracing::error!(%transition, "prediction failed outside a submission");
                }
                tracing::warn!(%error, "prediction failed");
                state.notice = Some(Notice::BackendUnreachable {
                    detail: error.to_string(),
                });
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Delete the entries addressed by `key`, remotely first.
    ///
    /// A text key is sent as is only when the backend is known to delete by
    /// text. Otherwise the history is re-listed to learn the server id for
    /// that entry; if none turns up, nothing is sent. The cache is filtered
    /// only after the server confirms. Returns the number of cached entries
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Gateway`] (and raises
    /// [`Notice::DeleteFailed`]) if a server call fails,
    /// [`SessionError::Unresolved`] (with the same notice) if no server id is
    /// known for a text key, or [`SessionError::TornDown`] after
    /// [`Self::teardown`].
    pub async fn delete(&self, key: &EntryKey) -> Result<usize, SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::TornDown);
        }

        let by_text = self.lock().history.contract() == Some(DeleteContract::ByText);
        let target = if key.is_durable() || by_text {
            key.clone()
        } else {
            self.resolve_durable(key).await?
        };

        let result = self
            .guarded(self.gateway.delete_history(&target))
            .await
            .ok_or(SessionError::TornDown)?;

        let mut state = self.lock();
        match result {
            Ok(()) => {
                let removed = state.history.evict(&target);
                tracing::info!(key = %target, removed, "history entry deleted");
                Ok(removed)
            }
            Err(error) => {
                tracing::warn!(key = %target, %error, "history delete failed");
                state.notice = Some(Notice::DeleteFailed {
                    key: key.clone(),
                    detail: error.to_string(),
                });
                Err(error.into())
            }
        }
    }

    /// Re-list the history to find the key a text-keyed entry must be deleted by.
    async fn resolve_durable(&self, key: &EntryKey) -> Result<EntryKey, SessionError> {
        let result = self
            .guarded(self.gateway.list_history(self.options.history_limit))
            .await
            .ok_or(SessionError::TornDown)?;

        let mut state = self.lock();
        let entries = match result {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(%key, %error, "history listing for delete failed");
                state.notice = Some(Notice::DeleteFailed {
                    key: key.clone(),
                    detail: error.to_string(),
                });
                return Err(error.into());
            }
        };

        let merged = state.history.reconcile(entries);
        if state.history.contract() == Some(DeleteContract::ByText) {
            return Ok(key.clone());
        }
        if let Some(server) = merged.server_key(key) {
            tracing::debug!(%key, %server, "resolved server id for delete");
            return Ok(server.clone());
        }

        tracing::warn!(%key, "no server id for entry; delete not sent");
        state.notice = Some(Notice::DeleteFailed {
            key: key.clone(),
            detail: "the backend has not stored this entry yet".to_string(),
        });
        Err(SessionError::Unresolved { key: key.clone() })
    }

    /// Re-list the history and reconcile it with the cache.
    ///
    /// Returns the number of local entries still awaiting confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Gateway`] (and raises
    /// [`Notice::HistoryUnavailable`]) if listing fails; the cache is left
    /// untouched.
    pub async fn refresh(&self) -> Result<usize, SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::TornDown);
        }

        let result = self
            .guarded(self.gateway.list_history(self.options.history_limit))
            .await
            .ok_or(SessionError::TornDown)?;

        let mut state = self.lock();
        match result {
            Ok(entries) => {
                let pending = state.history.reconcile(entries).pending;
                tracing::debug!(pending, total = state.history.len(), "history reconciled");
                Ok(pending)
            }
            Err(error) => {
                tracing::warn!(%error, "history refresh failed");
                state.notice = Some(Notice::HistoryUnavailable {
                    detail: error.to_string(),
                });
                Err(error.into())
            }
        }
    }

    /// Cancel in-flight requests and freeze the session.
    pub fn teardown(&self) {
        tracing::debug!("session torn down");
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Snapshot the current state for rendering.
    #[must_use]
    pub fn view(&self) -> SessionView {
        let state = self.lock();
        SessionView {
            phase: state.workflow.phase(),
            input: state.workflow.input().to_string(),
            result: state.workflow.result().cloned(),
            notice: state.notice.clone(),
            history: state.history.snapshot(),
        }
    }

    /// Consume the pending notice, if any.
    pub fn take_notice(&self) -> Option<Notice> {
        self.lock().notice.take()
    }

    /// Run a gateway call under the request timeout, abandoning it on teardown.
    ///
    /// Returns `None` when the session is (or becomes) torn down, in which
    /// case the caller must not touch state.
    async fn guarded<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Option<Result<T, GatewayError>> {
        let timeout = self.options.request_timeout;
        let bounded = async {
            tokio::time::timeout(timeout, call)
                .await
                .unwrap_or_else(|_| {
                    Err(GatewayError::Timeout {
                        millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    })
                })
        };

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            result = bounded => Some(result),
        };
        result.filter(|_| !self.cancel.is_cancelled())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
