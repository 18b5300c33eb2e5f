//! DeepL API client

use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::cancel::CancelToken;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::languages::Language;
use crate::core::models::{
    ErrorResponse, LanguageEntry, TranslateResponse, Translation, TranslationRequest, Usage,
};

/// Calls a translation session depends on.
///
/// Implementations must resolve with [`TranslationError::Cancelled`] promptly once
/// the token passed in is cancelled.
#[async_trait]
pub trait TranslationApi: Send + Sync + Debug {
    /// Translate a single text
    async fn translate(
        &self,
        request: &TranslationRequest,
        token: &CancelToken,
    ) -> Result<Translation>;

    /// Fetch the account's character usage
    async fn usage(&self, token: &CancelToken) -> Result<Usage>;

    /// List the source languages the API supports
    async fn languages(&self, token: &CancelToken) -> Result<Vec<Language>>;
}

/// HTTP client for the DeepL v2 API
#[derive(Debug, Clone)]
pub struct DeeplClient {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
}

impl DeeplClient {
    /// Create a new client
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate().map_err(|e| TranslationError::ConfigError {
            message: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// POST a form to `endpoint`, returning status and raw body
    async fn post_form(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<(StatusCode, String)> {
        let url = self.config.endpoint(endpoint);
        debug!("POST {}", url);

        let mut form: Vec<(&str, &str)> = vec![("auth_key", self.config.api_key.as_str())];
        form.extend_from_slice(params);

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        debug!("{} responded with {}", endpoint, status);
        Ok((status, body))
    }
}

#[async_trait]
impl TranslationApi for DeeplClient {
    async fn translate(
        &self,
        request: &TranslationRequest,
        token: &CancelToken,
    ) -> Result<Translation> {
        let mut params = vec![
            ("text", request.text.as_str()),
            ("target_lang", request.target_lang.as_str()),
        ];
        if let Some(source_lang) = &request.source_lang {
            params.push(("source_lang", source_lang.as_str()));
        }

        let (status, body) = token.run(self.post_form("translate", &params)).await?;
        parse_translation(status, &body)
    }

    async fn usage(&self, token: &CancelToken) -> Result<Usage> {
        let (status, body) = token.run(self.post_form("usage", &[])).await?;
        parse_usage(status, &body)
    }

    async fn languages(&self, token: &CancelToken) -> Result<Vec<Language>> {
        let (status, body) = token
            .run(self.post_form("languages", &[("type", "source")]))
            .await?;
        parse_languages(status, &body)
    }
}

/// Turn a non-2xx status, or a body carrying `message`, into an API error
fn check_api_error(status: StatusCode, body: &str) -> Result<()> {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.message);

    if status.is_success() && message.is_none() {
        return Ok(());
    }

    let message = message.unwrap_or_else(|| status_text(status));

    Err(TranslationError::ApiError {
        status: status.as_u16(),
        message,
    })
}

/// Reason phrase for a status, including DeepL's own codes
fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None if status.as_u16() == 456 => "Quota exceeded".to_string(),
        None => format!("HTTP {}", status.as_u16()),
    }
}

pub(crate) fn parse_translation(status: StatusCode, body: &str) -> Result<Translation> {
    check_api_error(status, body)?;

    let response: TranslateResponse =
        serde_json::from_str(body).map_err(|e| TranslationError::InvalidResponseError {
            message: e.to_string(),
        })?;

    // Only one text is ever sent, so only the first result matters
    response
        .translations
        .into_iter()
        .next()
        .ok_or_else(|| TranslationError::InvalidResponseError {
            message: "No translation in response".to_string(),
        })
}

pub(crate) fn parse_usage(status: StatusCode, body: &str) -> Result<Usage> {
    if let Err(e) = check_api_error(status, body) {
        warn!("Usage request failed: {}", e);
        return Err(TranslationError::UsageUnavailable);
    }

    serde_json::from_str(body).map_err(|e| {
        warn!("Malformed usage response: {}", e);
        TranslationError::UsageUnavailable
    })
}

pub(crate) fn parse_languages(status: StatusCode, body: &str) -> Result<Vec<Language>> {
    check_api_error(status, body)?;

    let entries: Vec<LanguageEntry> =
        serde_json::from_str(body).map_err(|e| TranslationError::InvalidResponseError {
            message: e.to_string(),
        })?;

    Ok(entries
        .into_iter()
        .map(|entry| Language::new(entry.language, entry.name))
        .collect())
}
