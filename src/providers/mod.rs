/*!
 * Provider implementations for translation backends.
 *
 * This module contains the capability interface the batch translator is built
 * against, plus the interchangeable backends:
 * - `api`: direct HTTP API client
 * - `agent`: subprocess-based coding agent
 * - `mock`: deterministic in-process provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation backends.
///
/// A provider takes an ordered list of source strings and returns the
/// backend's translations in request order. The caller validates the length;
/// providers only guarantee the protocol shape.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate an ordered list of source strings.
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError>;

    /// Short backend name for logging.
    fn name(&self) -> &'static str;
}

/// Build the task portion of the prompt: the instruction about the required
/// response shape plus the source array as JSON.
pub(crate) fn build_user_prompt(texts: &[String]) -> Result<String, ProviderError> {
    let payload = serde_json::to_string(texts)
        .map_err(|e| ProviderError::ParseError(format!("failed to encode source texts: {}", e)))?;
    Ok(format!(
        "Translate each element of the following JSON array into the target language, in the same order.\n\
         Respond with exactly one JSON object of the form {{\"translations\": string[]}}, \
         with the same number of elements as the input.\n\
         Do not add explanations, code fences, or markdown.\n\n{}",
        payload
    ))
}

/// Parse the provider response protocol: one JSON object with a single
/// `translations` array of strings. Anything else is a protocol error.
pub(crate) fn parse_translations(raw: &str) -> Result<Vec<String>, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(raw.trim()).map_err(|e| {
        ProviderError::ParseError(format!("not valid JSON: {} (raw: {})", e, tail(raw, 500)))
    })?;
    let array = value
        .get("translations")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            ProviderError::ParseError(format!(
                "response is not {{\"translations\": string[]}} (raw: {})",
                tail(raw, 500)
            ))
        })?;
    array
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                ProviderError::ParseError("translations array contains a non-string element".to_string())
            })
        })
        .collect()
}

/// Keep only the last `max_chars` characters of diagnostic output.
pub(crate) fn tail(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        text.to_string()
    } else {
        chars[chars.len() - max_chars..].iter().collect()
    }
}

pub mod agent;
pub mod api;
pub mod mock;
