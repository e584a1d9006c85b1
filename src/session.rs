//! Conversation log and stream session manager.
//!
//! The [`ConversationLog`] is the single source of truth for rendered turns.
//! The [`SessionController`] owns at most one live stream handle at a time:
//! it opens one per submitted turn, appends incoming fragments to the unique
//! in-progress assistant turn, and finalizes that turn when the transport
//! closes, cleanly or not.
//!
//! Every callback from a stream task is guarded by a generation counter.
//! The transport gives no guarantee that closing a connection suppresses
//! fragments already in flight, so a task whose generation is no longer
//! current must not touch shared state.

use crate::config::ClientConfig;
use crate::stream;
use crate::types::SessionParams;
use futures_util::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOrigin {
    /// Submitted by the user.
    User,
    /// Finalized assistant response.
    Assistant,
    /// The in-flight assistant response. At most one exists at a time.
    AssistantPending,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Who produced this turn.
    pub origin: TurnOrigin,
    /// Accumulated content. Append-only while pending, immutable once
    /// finalized.
    pub text: String,
}

/// Ordered list of conversation turns.
///
/// Holds an explicit index of the pending turn so fragment application never
/// scans the log by tag.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    pending: Option<usize>,
}

impl ConversationLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns in order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log has no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Whether an in-progress assistant turn exists.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Append a user turn.
    pub fn push_user(&mut self, text: &str) {
        self.turns.push(Turn {
            origin: TurnOrigin::User,
            text: text.to_owned(),
        });
    }

    /// Append a fragment to the pending assistant turn, creating it on the
    /// first fragment. Returns the full accumulated buffer.
    pub fn append_pending(&mut self, fragment: &str) -> String {
        match self.pending {
            Some(i) => {
                self.turns[i].text.push_str(fragment);
                self.turns[i].text.clone()
            }
            None => {
                self.turns.push(Turn {
                    origin: TurnOrigin::AssistantPending,
                    text: fragment.to_owned(),
                });
                self.pending = Some(self.turns.len() - 1);
                fragment.to_owned()
            }
        }
    }

    /// Re-tag the pending turn as a finalized assistant turn, returning its
    /// text. Returns `None` (and changes nothing) when no turn is pending.
    pub fn finalize_pending(&mut self) -> Option<String> {
        let i = self.pending.take()?;
        self.turns[i].origin = TurnOrigin::Assistant;
        Some(self.turns[i].text.clone())
    }

    /// Remove all turns.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.pending = None;
    }
}

/// Notification emitted whenever the session mutates shared state.
///
/// `PendingUpdated` carries the full accumulated buffer: observers replace
/// the unique in-progress turn wholesale rather than patching text ranges.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user turn was appended.
    UserTurn {
        /// The submitted text.
        text: String,
    },
    /// The in-progress assistant turn changed.
    PendingUpdated {
        /// Full accumulated buffer after this fragment.
        text: String,
    },
    /// The stream closed and the turn (if any) was finalized.
    TurnFinalized {
        /// Final text, or `None` when the stream closed before any fragment
        /// arrived.
        text: Option<String>,
    },
    /// The conversation was cleared.
    Cleared,
}

struct SessionState {
    log: ConversationLog,
    /// Bumped on every new stream handle and on clear. Stream-task callbacks
    /// compare against it before mutating anything.
    generation: u64,
    streaming: bool,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Manages the conversation log and the lifecycle of assistant streams.
///
/// Cloneable handle over shared state; all methods take `&self`.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
    http: reqwest::Client,
    config: ClientConfig,
}

impl SessionController {
    /// Create a controller using the given HTTP client and configuration.
    #[must_use]
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState {
                    log: ConversationLog::new(),
                    generation: 0,
                    streaming: false,
                    task: None,
                }),
                events,
            }),
            http,
            config,
        }
    }

    /// Submit one user turn.
    ///
    /// Returns `false` without touching any state when the text is blank or
    /// a stream is already active (mid-stream submissions are rejected, not
    /// queued). Otherwise the user turn is appended synchronously, before
    /// any network activity, and the stream task for
    /// `(text, session_id, personality, lang)` is spawned.
    pub fn submit(&self, text: &str, params: &SessionParams) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let generation;
        {
            let mut state = self.shared.lock();
            if state.streaming {
                debug!("submit rejected: a stream is already active");
                return false;
            }
            state.log.push_user(text);
            state.generation += 1;
            generation = state.generation;
            state.streaming = true;
            // A superseded task may still be winding down; closing it here
            // keeps the at-most-one-live-handle invariant.
            if let Some(task) = state.task.take() {
                task.abort();
            }
        }
        let _ = self.shared.events.send(SessionEvent::UserTurn {
            text: text.to_owned(),
        });

        let url = self.config.stream_url(text, params);
        let shared = Arc::clone(&self.shared);
        let http = self.http.clone();
        let handle = tokio::spawn(async move {
            match stream::open(&http, &url).await {
                Ok(fragments) => {
                    tokio::pin!(fragments);
                    while let Some(fragment) = fragments.next().await {
                        if !apply_fragment(&shared, generation, &fragment) {
                            // Superseded mid-stream; the new owner of the
                            // state already cleaned up after this handle.
                            return;
                        }
                    }
                }
                Err(e) => warn!("assistant stream unavailable: {e}"),
            }
            finalize(&shared, generation);
        });
        self.shared.lock().task = Some(handle);
        true
    }

    /// Clear the conversation, closing any active stream first.
    ///
    /// Synchronous with respect to shared state: after this returns no
    /// fragment from the old handle can be applied, the log is empty, and a
    /// subsequent [`submit`](Self::submit) succeeds.
    pub fn clear(&self) {
        {
            let mut state = self.shared.lock();
            state.generation += 1;
            if let Some(task) = state.task.take() {
                task.abort();
            }
            state.log.clear();
            state.streaming = false;
        }
        let _ = self.shared.events.send(SessionEvent::Cleared);
    }

    /// Whether a stream is currently active.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.shared.lock().streaming
    }

    /// Snapshot of the conversation log.
    #[must_use]
    pub fn log_snapshot(&self) -> Vec<Turn> {
        self.shared.lock().log.turns().to_vec()
    }

    /// Subscribe to session notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }
}

/// Apply one fragment from the stream task for `generation`.
///
/// Returns `false` when the handle has been superseded, in which case the
/// fragment is discarded and the task must stop.
fn apply_fragment(shared: &Shared, generation: u64, fragment: &str) -> bool {
    let buffer = {
        let mut state = shared.lock();
        if state.generation != generation || !state.streaming {
            debug!("discarding fragment from superseded stream handle");
            return false;
        }
        state.log.append_pending(fragment)
    };
    let _ = shared
        .events
        .send(SessionEvent::PendingUpdated { text: buffer });
    true
}

/// Finalize the turn for `generation`: re-tag the pending turn and release
/// the busy flag. Stale or repeated signals are ignored, so finalization is
/// idempotent per handle.
fn finalize(shared: &Shared, generation: u64) {
    let finalized = {
        let mut state = shared.lock();
        if state.generation != generation || !state.streaming {
            return;
        }
        state.streaming = false;
        state.log.finalize_pending()
    };
    let _ = shared
        .events
        .send(SessionEvent::TurnFinalized { text: finalized });
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn pending_count(log: &ConversationLog) -> usize {
        log.turns()
            .iter()
            .filter(|t| t.origin == TurnOrigin::AssistantPending)
            .count()
    }

    #[test]
    fn log_starts_empty() {
        let log = ConversationLog::new();
        assert!(log.is_empty());
        assert!(!log.has_pending());
    }

    #[test]
    fn fragments_accumulate_in_order() {
        let mut log = ConversationLog::new();
        log.push_user("Hello");
        assert_eq!(log.append_pending("Hel"), "Hel");
        assert_eq!(log.append_pending("lo"), "Hello");
        assert_eq!(pending_count(&log), 1);
        assert_eq!(log.turns()[1].text, "Hello");
    }

    #[test]
    fn at_most_one_pending_turn() {
        let mut log = ConversationLog::new();
        log.append_pending("a");
        log.append_pending("b");
        log.append_pending("c");
        assert_eq!(pending_count(&log), 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn finalize_retags_and_is_idempotent() {
        let mut log = ConversationLog::new();
        log.append_pending("Hi there");
        assert_eq!(log.finalize_pending(), Some("Hi there".to_owned()));
        assert_eq!(log.turns()[0].origin, TurnOrigin::Assistant);
        // A second completion signal must not re-mutate the log.
        assert_eq!(log.finalize_pending(), None);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn finalize_without_pending_is_noop() {
        let mut log = ConversationLog::new();
        log.push_user("hi");
        assert_eq!(log.finalize_pending(), None);
        assert_eq!(log.turns()[0].origin, TurnOrigin::User);
    }

    #[test]
    fn new_pending_allowed_after_finalize() {
        let mut log = ConversationLog::new();
        log.append_pending("one");
        log.finalize_pending();
        log.append_pending("two");
        assert_eq!(pending_count(&log), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn clear_removes_everything() {
        let mut log = ConversationLog::new();
        log.push_user("q");
        log.append_pending("a");
        log.clear();
        assert!(log.is_empty());
        assert!(!log.has_pending());
    }

    #[tokio::test]
    async fn blank_submit_is_a_noop() {
        let controller =
            SessionController::new(reqwest::Client::new(), ClientConfig::default());
        assert!(!controller.submit("   ", &SessionParams::new()));
        assert!(controller.log_snapshot().is_empty());
        assert!(!controller.is_streaming());
    }

    #[tokio::test]
    async fn stale_fragment_is_discarded() {
        let controller =
            SessionController::new(reqwest::Client::new(), ClientConfig::default());
        let shared = Arc::clone(&controller.shared);
        {
            let mut state = shared.lock();
            state.generation = 2;
            state.streaming = true;
        }
        // A fragment from generation 1 arrives after handle 2 opened.
        assert!(!apply_fragment(&shared, 1, "late"));
        assert!(shared.lock().log.is_empty());
        // The current handle still applies.
        assert!(apply_fragment(&shared, 2, "current"));
        assert_eq!(shared.lock().log.turns()[0].text, "current");
    }

    #[tokio::test]
    async fn stale_finalize_is_ignored() {
        let controller =
            SessionController::new(reqwest::Client::new(), ClientConfig::default());
        let shared = Arc::clone(&controller.shared);
        {
            let mut state = shared.lock();
            state.generation = 2;
            state.streaming = true;
        }
        assert!(apply_fragment(&shared, 2, "text"));
        finalize(&shared, 1);
        // Still streaming: the stale handle's completion changed nothing.
        assert!(shared.lock().streaming);
        assert!(shared.lock().log.has_pending());

        finalize(&shared, 2);
        assert!(!shared.lock().streaming);
        assert!(!shared.lock().log.has_pending());
        // Repeated completion from the same handle is also ignored.
        finalize(&shared, 2);
        assert_eq!(shared.lock().log.len(), 1);
    }
}
