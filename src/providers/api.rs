/*!
 * Direct HTTP API provider.
 *
 * Talks to an OpenAI-compatible responses endpoint: one request carrying the
 * system instruction and the source array, one structured JSON reply. The API
 * key comes from the environment; a missing key is a configuration error, not
 * a retryable failure.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::translator::system_instruction;

use super::{build_user_prompt, parse_translations, tail, TranslationProvider};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/responses";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const API_KEY_VAR: &str = "OPENAI_API_KEY";
const REQUEST_TIMEOUT_SECS: u64 = 180;

/// HTTP client for the translation API
#[derive(Debug)]
pub struct ApiProvider {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Endpoint URL
    endpoint: String,
    /// Model identifier
    model: String,
}

/// Request body for the responses endpoint
#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    input: Vec<ApiMessage>,
}

/// One conversation message
#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

/// Response body; only the aggregated output text is used
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    output_text: String,
}

impl ApiProvider {
    /// Create a provider from the environment, failing fast if the API key
    /// is not set.
    pub fn from_env(model: Option<String>) -> Result<Self, ProviderError> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| ProviderError::MissingCredential(API_KEY_VAR.to_string()))?;
        Ok(Self::new(
            api_key,
            DEFAULT_ENDPOINT,
            model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        ))
    }

    /// Create a provider with explicit credentials and endpoint.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TranslationProvider for ApiProvider {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = ApiRequest {
            model: self.model.clone(),
            input: vec![
                ApiMessage {
                    role: "system",
                    content: system_instruction().to_string(),
                },
                ApiMessage {
                    role: "user",
                    content: build_user_prompt(texts)?,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response body".to_string());
            error!("translation API error ({}): {}", status, tail(&body, 2000));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: tail(&body, 2000),
            });
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("invalid response body: {}", e)))?;
        if parsed.output_text.trim().is_empty() {
            return Err(ProviderError::ParseError("no output_text in API response".to_string()));
        }

        parse_translations(&parsed.output_text)
    }

    fn name(&self) -> &'static str {
        "api"
    }
}
