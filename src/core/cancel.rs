//! Generation-based cancellation shared between a session and its cycles

use std::future::Future;
use tokio::sync::watch;

use crate::core::errors::{Result, TranslationError};

/// Issues cancellation tokens; renewing invalidates every token issued before
#[derive(Debug)]
pub struct CancelSource {
    current: watch::Sender<u64>,
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSource {
    /// Create a source at generation zero
    pub fn new() -> Self {
        let (current, _) = watch::channel(0);
        Self { current }
    }

    /// Cancel all outstanding tokens and hand out one for the next generation
    pub fn renew(&self) -> CancelToken {
        let mut generation = 0;
        self.current.send_modify(|current| {
            *current += 1;
            generation = *current;
        });

        CancelToken {
            generation,
            current: self.current.subscribe(),
        }
    }

    /// Cancel all outstanding tokens without issuing a new one
    pub fn cancel(&self) {
        self.current.send_modify(|current| *current += 1);
    }
}

/// Captures the generation active when a cycle started
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: u64,
    current: watch::Receiver<u64>,
}

impl CancelToken {
    /// A token whose source is gone, so it is never cancelled
    pub fn detached() -> Self {
        let (_, current) = watch::channel(0);
        Self {
            generation: 0,
            current,
        }
    }

    /// Generation this token was issued for
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer generation has been issued
    pub fn is_cancelled(&self) -> bool {
        *self.current.borrow() != self.generation
    }

    /// Resolves when the token is cancelled
    pub async fn cancelled(&self) {
        let mut current = self.current.clone();
        loop {
            if *current.borrow_and_update() != self.generation {
                return;
            }
            if current.changed().await.is_err() {
                // Source dropped: nothing can supersede this token anymore
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run `fut` unless the token is cancelled first
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(TranslationError::Cancelled),
            result = fut => result,
        }
    }
}
