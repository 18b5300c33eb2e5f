//! DeepL Translator - interactive translation over the DeepL API
//!
//! The heart of the library is [`TranslationSession`], which turns a stream of
//! text changes into state snapshots: each submission cancels the previous
//! request cycle, translates the new text, then refreshes the account usage.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;

// Re-export key types for convenience
pub use crate::core::{
    cancel::{CancelSource, CancelToken},
    client::{DeeplClient, TranslationApi},
    config::TranslatorConfig,
    errors::TranslationError,
    languages::Language,
    models::{Plan, Translation, TranslationRequest, Usage},
    session::{Notification, SessionPhase, SessionState, TranslationSession},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
