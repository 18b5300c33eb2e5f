//! Translation session: turns text changes into state snapshots
//!
//! Every call to [`TranslationSession::submit`] starts a new cycle (translate, then
//! fetch usage) and invalidates the previous one. A cycle only writes state through
//! a single commit point that checks its [`CancelToken`] is still the authoritative
//! one, so overlapping requests completing out of order never corrupt the state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::cancel::{CancelSource, CancelToken};
use crate::core::client::TranslationApi;
use crate::core::errors::TranslationError;
use crate::core::languages::Language;
use crate::core::models::{Translation, TranslationRequest, Usage};

/// Title of the notification published when a translation fails
pub const FAILURE_TITLE: &str = "Could not perform translation";

/// Snapshot of a session, read-only for consumers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Text most recently submitted
    pub text: String,
    /// Result of the last committed cycle
    pub translation: Option<Translation>,
    /// Source language override, `None` lets the API detect it
    pub source_language: Option<Language>,
    /// Usage fetched with the last committed translation
    pub usage: Option<Usage>,
    /// True while a cycle for `text` is outstanding
    pub is_loading: bool,
    /// Message of the last failed cycle, cleared by the next submission
    pub error: Option<String>,
}

impl SessionState {
    /// Phase of the session state machine
    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Loading
        } else if self.error.is_some() {
            SessionPhase::Failed
        } else if self.translation.is_some() {
            SessionPhase::Ready
        } else {
            SessionPhase::Idle
        }
    }
}

/// Lifecycle phase derived from a [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing to show
    Idle,
    /// A cycle is outstanding
    Loading,
    /// A translation is shown
    Ready,
    /// The last cycle failed
    Failed,
}

/// User-facing, non-blocking failure report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short headline
    pub title: String,
    /// Error message
    pub message: String,
}

/// Result of one translate-then-usage cycle before it is committed
#[derive(Debug)]
pub enum CycleOutcome {
    /// Translation succeeded; usage is `None` when its call failed
    Success {
        /// The translated text
        translation: Translation,
        /// Usage fetched right after
        usage: Option<Usage>,
    },
    /// Translation failed or the cycle was cancelled
    Failure {
        /// Why the cycle ended
        error: TranslationError,
    },
}

/// What happened to a cycle's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// Written to the session state
    Committed,
    /// Superseded before it could commit
    Discarded,
    /// Empty input, state cleared without any request
    Cleared,
}

/// Handle to a running cycle. Dropping it does not cancel the cycle.
#[derive(Debug)]
pub struct CycleHandle {
    generation: u64,
    task: Option<JoinHandle<CycleReport>>,
}

impl CycleHandle {
    /// Wait for the cycle to finish
    pub async fn wait(self) -> CycleReport {
        match self.task {
            Some(task) => match task.await {
                Ok(report) => report,
                Err(e) => {
                    warn!("Translation cycle {} aborted: {}", self.generation, e);
                    CycleReport::Discarded
                }
            },
            None => CycleReport::Cleared,
        }
    }
}

#[derive(Debug)]
struct SessionInner {
    api: Arc<dyn TranslationApi>,
    target_lang: String,
    state: watch::Sender<SessionState>,
    cancel: CancelSource,
    notifications: broadcast::Sender<Notification>,
}

/// Long-lived state holder for one target language
#[derive(Debug, Clone)]
pub struct TranslationSession {
    inner: Arc<SessionInner>,
}

impl TranslationSession {
    /// Create a new session translating into `target_lang`
    pub fn new(api: Arc<dyn TranslationApi>, target_lang: impl Into<String>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let (notifications, _) = broadcast::channel(16);

        Self {
            inner: Arc::new(SessionInner {
                api,
                target_lang: target_lang.into(),
                state,
                cancel: CancelSource::new(),
                notifications,
            }),
        }
    }

    /// Start with a source language override instead of auto-detection
    pub fn with_source_language(self, language: Option<Language>) -> Self {
        self.inner
            .state
            .send_modify(|state| state.source_language = language);
        self
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Receive failure notifications published after this call
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifications.subscribe()
    }

    /// Replace the current text, superseding any cycle still in flight.
    ///
    /// Must be called from within a tokio runtime when `text` is non-empty.
    pub fn submit(&self, text: impl Into<String>) -> CycleHandle {
        let text = text.into();

        // Bump the generation before touching state so a stale commit can't slip in
        let token = self.inner.cancel.renew();
        let generation = token.generation();

        if text.is_empty() {
            debug!("Cycle {}: empty input, clearing", generation);
            self.inner.state.send_modify(|state| {
                state.text = text;
                state.translation = None;
                state.usage = None;
                state.error = None;
                state.is_loading = false;
            });
            return CycleHandle {
                generation,
                task: None,
            };
        }

        let mut request = TranslationRequest::new(text.clone(), self.inner.target_lang.clone());
        let mut source_lang = None;
        self.inner.state.send_modify(|state| {
            source_lang = state.source_language.as_ref().map(|l| l.code.clone());
            state.text = text;
            state.error = None;
            state.is_loading = true;
        });
        if let Some(code) = source_lang {
            request = request.with_source_lang(code);
        }

        debug!(
            "Cycle {}: translating {} chars to {}",
            generation,
            request.text.chars().count(),
            request.target_lang
        );

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let outcome = run_cycle(inner.api.as_ref(), &request, &token).await;
            inner.commit(&token, outcome)
        });

        CycleHandle {
            generation,
            task: Some(task),
        }
    }

    /// Change the source language override and translate the current text again
    pub fn set_source_language(&self, language: Option<Language>) -> CycleHandle {
        let mut text = String::new();
        self.inner.state.send_modify(|state| {
            state.source_language = language;
            text = state.text.clone();
        });
        self.submit(text)
    }

    /// Abandon the cycle in flight, if any
    pub fn cancel(&self) {
        self.inner.cancel.cancel();
        self.inner.state.send_if_modified(|state| {
            let was_loading = state.is_loading;
            state.is_loading = false;
            was_loading
        });
    }
}

impl SessionInner {
    /// The only place a cycle writes state
    fn commit(&self, token: &CancelToken, outcome: CycleOutcome) -> CycleReport {
        let failure = match &outcome {
            CycleOutcome::Failure { error } if !error.is_cancelled() => Some(error.to_string()),
            _ => None,
        };

        let committed = self.state.send_if_modified(|state| {
            if token.is_cancelled() {
                return false;
            }

            match outcome {
                CycleOutcome::Success { translation, usage } => {
                    state.translation = Some(translation);
                    state.usage = usage;
                    state.error = None;
                }
                CycleOutcome::Failure { error } => {
                    if !error.is_cancelled() {
                        state.error = Some(error.to_string());
                    }
                }
            }
            state.is_loading = false;
            true
        });

        if !committed {
            debug!("Cycle {}: superseded, result discarded", token.generation());
            return CycleReport::Discarded;
        }

        match failure {
            Some(message) => {
                warn!("Translation error: {}", message);
                // Fails only when nobody is listening
                let _ = self.notifications.send(Notification {
                    title: FAILURE_TITLE.to_string(),
                    message,
                });
            }
            None => info!("Cycle {}: committed", token.generation()),
        }

        CycleReport::Committed
    }
}

/// Translate, then fetch usage, as one operation
pub async fn run_cycle(
    api: &dyn TranslationApi,
    request: &TranslationRequest,
    token: &CancelToken,
) -> CycleOutcome {
    let translation = match api.translate(request, token).await {
        Ok(translation) => translation,
        Err(error) => return CycleOutcome::Failure { error },
    };

    let usage = match api.usage(token).await {
        Ok(usage) => Some(usage),
        Err(error) if error.is_cancelled() => return CycleOutcome::Failure { error },
        Err(error) => {
            warn!("Usage unavailable: {}", error);
            None
        }
    };

    CycleOutcome::Success { translation, usage }
}
