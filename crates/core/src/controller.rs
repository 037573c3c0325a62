use std::{collections::HashMap, sync::Arc};

use tokio::{sync::mpsc, task::AbortHandle};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    backend::VideoBackend,
    error::Result,
    session::{SessionEvent, SessionState},
    types::{SearchResult, UploadReceipt, VideoFile},
};

pub type RequestId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Upload,
    Search,
}

enum Outcome {
    Uploaded(Result<UploadReceipt>),
    Searched(Result<Vec<SearchResult>>),
    /// The task ended without producing a result (panic or abort).
    Lost,
}

struct Completion {
    id: RequestId,
    kind: RequestKind,
    outcome: Outcome,
}

/// Reports back to the controller exactly once, even if the request task unwinds.
struct CompletionGuard {
    id: RequestId,
    kind: RequestKind,
    tx: Option<mpsc::UnboundedSender<Completion>>,
}

impl CompletionGuard {
    fn finish(mut self, outcome: Outcome) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Completion {
                id: self.id,
                kind: self.kind,
                outcome,
            });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Completion {
                id: self.id,
                kind: self.kind,
                outcome: Outcome::Lost,
            });
        }
    }
}

struct InFlight {
    kind: RequestKind,
    abort: AbortHandle,
}

/// Owns the session state and drives requests against a [`VideoBackend`].
///
/// Requests run on spawned tasks. Their results only touch the state when the owner calls
/// [`SessionController::next_event`], so completions are applied in the order they resolve.
pub struct SessionController {
    backend: Arc<dyn VideoBackend>,
    state: SessionState,
    in_flight: HashMap<RequestId, InFlight>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn VideoBackend>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            state: SessionState::new(),
            in_flight: HashMap::new(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn select_file(&mut self, file: VideoFile) {
        self.dispatch(SessionEvent::FileSelected(file));
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.dispatch(SessionEvent::QueryChanged(text.into()));
    }

    /// Uploads the selected file. Returns `None` without doing anything when no file is selected.
    ///
    /// Nothing stops a second upload while one is running.
    pub fn submit_video(&mut self) -> Option<RequestId> {
        let video = self.state.file.clone()?;
        self.dispatch(SessionEvent::UploadStarted);

        let backend = Arc::clone(&self.backend);
        let id = self.spawn_request(RequestKind::Upload, async move {
            Outcome::Uploaded(backend.upload_video(&video).await)
        });
        info!(request = %id, "upload submitted");
        Some(id)
    }

    /// Searches with the current query. Returns `None` and leaves everything untouched when it is empty.
    pub fn submit_query(&mut self) -> Option<RequestId> {
        if self.state.query.is_empty() {
            return None;
        }
        let query = self.state.query.clone();
        self.dispatch(SessionEvent::SearchStarted);

        let backend = Arc::clone(&self.backend);
        let id = self.spawn_request(RequestKind::Search, async move {
            Outcome::Searched(backend.search(&query).await)
        });
        info!(request = %id, "search submitted");
        Some(id)
    }

    /// Waits for the next request to settle and applies it.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        while !self.in_flight.is_empty() {
            let completion = self.completions_rx.recv().await?;
            let Some(entry) = self.in_flight.remove(&completion.id) else {
                debug!(request = %completion.id, "dropping completion of cancelled request");
                continue;
            };
            debug_assert_eq!(entry.kind, completion.kind);

            let event = settle_event(completion);
            self.dispatch(event.clone());
            return Some(event);
        }
        None
    }

    /// Applies completions until nothing is in flight.
    pub async fn settle(&mut self) -> Vec<SessionEvent> {
        let mut applied = Vec::new();
        while let Some(event) = self.next_event().await {
            applied.push(event);
        }
        applied
    }

    /// Aborts every in-flight request. Late results from them are discarded.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.in_flight.len();
        if cancelled == 0 {
            return 0;
        }
        for (id, entry) in self.in_flight.drain() {
            debug!(request = %id, kind = ?entry.kind, "aborting request");
            entry.abort.abort();
        }
        warn!(cancelled, "cancelled in-flight requests");
        self.dispatch(SessionEvent::Cancelled);
        cancelled
    }

    fn dispatch(&mut self, event: SessionEvent) {
        debug!(event = event.event_type(), "applying session event");
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
    }

    fn spawn_request<F>(&mut self, kind: RequestKind, request: F) -> RequestId
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let guard = CompletionGuard {
            id,
            kind,
            tx: Some(self.completions_tx.clone()),
        };
        let handle = tokio::spawn(async move {
            let outcome = request.await;
            guard.finish(outcome);
        });
        self.in_flight.insert(
            id,
            InFlight {
                kind,
                abort: handle.abort_handle(),
            },
        );
        id
    }
}

fn settle_event(completion: Completion) -> SessionEvent {
    let Completion { id, kind, outcome } = completion;
    match outcome {
        Outcome::Uploaded(Ok(_)) => SessionEvent::UploadSucceeded,
        Outcome::Uploaded(Err(e)) => {
            error!(request = %id, error = %e, "upload failed");
            SessionEvent::UploadFailed
        }
        Outcome::Searched(Ok(results)) => SessionEvent::SearchSucceeded(results),
        Outcome::Searched(Err(e)) => {
            error!(request = %id, error = %e, "search failed");
            SessionEvent::SearchFailed
        }
        Outcome::Lost => {
            error!(request = %id, ?kind, "request task ended without a result");
            match kind {
                RequestKind::Upload => SessionEvent::UploadFailed,
                RequestKind::Search => SessionEvent::SearchFailed,
            }
        }
    }
}
