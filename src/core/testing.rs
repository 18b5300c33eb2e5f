//! Scripted translation API for tests
//!
//! - `reply(text, ..)` - answers immediately for `text`
//! - `gated(text, ..)` - answers once the returned sender fires
//! - `fail(text, ..)` - answers with an API error
//! - `gate_next_usage()` - holds the next usage call until the returned sender fires
//!
//! Unknown texts are echoed back prefixed with the target language.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};

use crate::core::cancel::CancelToken;
use crate::core::client::TranslationApi;
use crate::core::errors::{Result, TranslationError};
use crate::core::languages::{source_languages, Language};
use crate::core::models::{Translation, TranslationRequest, Usage};

#[derive(Debug)]
struct MockReply {
    gate: Option<oneshot::Receiver<()>>,
    result: std::result::Result<Translation, (u16, String)>,
}

#[derive(Debug)]
pub(crate) struct MockApi {
    replies: Mutex<HashMap<String, MockReply>>,
    usage: Mutex<Option<Usage>>,
    usage_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    usage_entered: Notify,
    requests: Mutex<Vec<TranslationRequest>>,
    ignore_cancellation: AtomicBool,
    translate_calls: AtomicUsize,
    usage_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            usage: Mutex::new(Some(Usage {
                character_count: 10,
                character_limit: 500000,
            })),
            usage_gates: Mutex::new(VecDeque::new()),
            usage_entered: Notify::new(),
            requests: Mutex::new(Vec::new()),
            ignore_cancellation: AtomicBool::new(false),
            translate_calls: AtomicUsize::new(0),
            usage_calls: AtomicUsize::new(0),
        }
    }

    fn insert(&self, text: &str, reply: MockReply) {
        self.replies.lock().unwrap().insert(text.to_string(), reply);
    }

    pub fn reply(&self, text: &str, translated: &str, detected: &str) {
        self.insert(
            text,
            MockReply {
                gate: None,
                result: Ok(translation(translated, detected)),
            },
        );
    }

    pub fn gated(&self, text: &str, translated: &str, detected: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.insert(
            text,
            MockReply {
                gate: Some(rx),
                result: Ok(translation(translated, detected)),
            },
        );
        tx
    }

    pub fn fail(&self, text: &str, status: u16, message: &str) {
        self.insert(
            text,
            MockReply {
                gate: None,
                result: Err((status, message.to_string())),
            },
        );
    }

    /// `None` makes the usage call fail
    pub fn set_usage(&self, usage: Option<Usage>) {
        *self.usage.lock().unwrap() = usage;
    }

    /// Hold the next usage call; its reply is read when the call starts
    pub fn gate_next_usage(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.usage_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Wait until a usage call has started
    pub async fn usage_started(&self) {
        self.usage_entered.notified().await;
    }

    /// Behave like a transport that can't abort: gated calls finish even when cancelled
    pub fn ignore_cancellation(&self) {
        self.ignore_cancellation.store(true, Ordering::SeqCst);
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    pub fn usage_calls(&self) -> usize {
        self.usage_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn translation(text: &str, detected: &str) -> Translation {
    Translation {
        text: text.to_string(),
        detected_source_language: detected.to_string(),
    }
}

#[async_trait]
impl TranslationApi for MockApi {
    async fn translate(
        &self,
        request: &TranslationRequest,
        token: &CancelToken,
    ) -> Result<Translation> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let (gate, result) = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(&request.text) {
                Some(reply) => (reply.gate.take(), reply.result.clone()),
                None => (
                    None,
                    Ok(translation(
                        &format!("[{}] {}", request.target_lang, request.text),
                        "EN",
                    )),
                ),
            }
        };

        if let Some(gate) = gate {
            if self.ignore_cancellation.load(Ordering::SeqCst) {
                let _ = gate.await;
            } else {
                token
                    .run(async {
                        let _ = gate.await;
                        Ok(())
                    })
                    .await?;
            }
        } else if token.is_cancelled() {
            return Err(TranslationError::Cancelled);
        }

        result.map_err(|(status, message)| TranslationError::ApiError { status, message })
    }

    async fn usage(&self, token: &CancelToken) -> Result<Usage> {
        self.usage_calls.fetch_add(1, Ordering::SeqCst);

        let usage = *self.usage.lock().unwrap();
        let gate = self.usage_gates.lock().unwrap().pop_front();
        self.usage_entered.notify_one();

        let ignore_cancellation = self.ignore_cancellation.load(Ordering::SeqCst);
        if let Some(gate) = gate {
            if ignore_cancellation {
                let _ = gate.await;
            } else {
                token
                    .run(async {
                        let _ = gate.await;
                        Ok(())
                    })
                    .await?;
            }
        } else if token.is_cancelled() && !ignore_cancellation {
            return Err(TranslationError::Cancelled);
        }

        usage.ok_or(TranslationError::UsageUnavailable)
    }

    async fn languages(&self, _token: &CancelToken) -> Result<Vec<Language>> {
        Ok(source_languages())
    }
}
