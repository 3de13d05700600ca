//! LibreTranslate provider
//!
//! Sends one `POST` per word to a LibreTranslate `/translate` endpoint:
//!
//! ```json
//! {"q": "hello", "source": "en", "target": "es", "format": "text"}
//! ```
//!
//! and reads `translatedText` from the response body. Language codes are sent
//! as given; LibreTranslate distinguishes variants such as `zh-Hant` and `pt-BR`.
//!
//! # Configuration
//!
//! [`LibreTranslateProvider::from_env`] reads `LIBRETRANSLATE_URL` (defaults to
//! a local instance on port 5001) and the optional `LIBRETRANSLATE_API_KEY`.

use crate::error::{RelayError, RelayResult};
use crate::policy::DEFAULT_CALL_TIMEOUT;
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Endpoint used when `LIBRETRANSLATE_URL` is not set
pub const DEFAULT_LIBRETRANSLATE_URL: &str = "http://localhost:5001/translate";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateReply {
    translated_text: String,
}

/// LibreTranslate HTTP provider
#[derive(Clone)]
pub struct LibreTranslateProvider {
    /// HTTP client carrying the call timeout
    client: reqwest::Client,
    /// Full URL of the translate endpoint
    url: String,
    /// Optional API key for instances that require one
    api_key: Option<String>,
}

impl LibreTranslateProvider {
    /// Create a provider for the given endpoint with the default 5 s timeout
    pub fn new(url: impl Into<String>) -> RelayResult<Self> {
        Self::with_timeout(url, DEFAULT_CALL_TIMEOUT)
    }

    /// Create a provider with an explicit per-call timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> RelayResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(RelayError::ConfigError(
                "LibreTranslate URL cannot be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RelayError::ConfigError(format!(
                "LibreTranslate URL must be http(s): {}",
                url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            api_key: None,
        })
    }

    /// Attach an API key, sent as `api_key` in every request body
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    /// Create a provider from `LIBRETRANSLATE_URL` and `LIBRETRANSLATE_API_KEY`
    pub fn from_env() -> RelayResult<Self> {
        Self::from_env_with_timeout(DEFAULT_CALL_TIMEOUT)
    }

    /// Same as [`Self::from_env`] with an explicit per-call timeout
    pub fn from_env_with_timeout(timeout: Duration) -> RelayResult<Self> {
        let url = std::env::var("LIBRETRANSLATE_URL")
            .unwrap_or_else(|_| DEFAULT_LIBRETRANSLATE_URL.to_string());
        let provider = Self::with_timeout(url, timeout)?;

        Ok(match std::env::var("LIBRETRANSLATE_API_KEY") {
            Ok(key) => provider.with_api_key(key),
            Err(_) => provider,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, text: &str, source: &str, target: &str) -> serde_json::Value {
        let mut body = json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text"
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = json!(key);
        }
        body
    }
}

impl std::fmt::Debug for LibreTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibreTranslateProvider")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for LibreTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> RelayResult<String> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let body = self.request_body(text, source_locale, target_locale);
        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RelayError::TranslationError(format!(
                "Backend error ({}): {}",
                status, error_text
            )));
        }

        let reply: TranslateReply = response.json().await?;
        Ok(reply.translated_text)
    }

    fn provider_name(&self) -> &str {
        "LibreTranslate"
    }
}
