/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - echoes inputs back with a marker
 * - `MockProvider::mapped(..)` - fixed translation table
 * - `MockProvider::failing()` - always fails with a transport-style error
 * - `MockProvider::short_array()` - always one element short (length mismatch)
 * - `MockProvider::short_over(n)` - only batches of at most n succeed
 * - `MockProvider::malformed()` - wrong-shaped response (protocol error)
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::TranslationProvider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echo each input back with a translated-marker prefix
    Echo,
    /// Look translations up in a fixed map, echoing unknown texts
    Mapped,
    /// Always fail with a transport-style error
    Failing,
    /// Return one fewer translation than requested
    ShortArray,
    /// Batches larger than `max_ok` come back one element short; smaller
    /// batches translate properly. Exercises bisection recovery.
    ShortOver {
        /// Largest batch size that still succeeds
        max_ok: usize,
    },
    /// Fail with a protocol error (wrong-shaped response)
    Malformed,
    /// Succeed for the first `succeed` calls, then fail with a transport error
    FailAfter {
        /// Number of initial calls that succeed
        succeed: usize,
    },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Shared request counter
    call_count: Arc<AtomicUsize>,
    /// Texts of every batch received, in call order
    requests: Arc<Mutex<Vec<Vec<String>>>>,
    /// Fixed translation table for `Mapped`
    map: HashMap<String, String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            map: HashMap::new(),
        }
    }

    /// Create a working mock provider that echoes inputs
    pub fn working() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock with a fixed translation table
    pub fn mapped(pairs: &[(&str, &str)]) -> Self {
        let mut provider = Self::new(MockBehavior::Mapped);
        provider.map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        provider
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that always drops the last translation
    pub fn short_array() -> Self {
        Self::new(MockBehavior::ShortArray)
    }

    /// Create a mock that only translates batches of at most `max_ok` items
    pub fn short_over(max_ok: usize) -> Self {
        Self::new(MockBehavior::ShortOver { max_ok })
    }

    /// Create a mock that returns wrong-shaped responses
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create a mock that fails after the first `succeed` calls
    pub fn fail_after(succeed: usize) -> Self {
        Self::new(MockBehavior::FailAfter { succeed })
    }

    /// Number of translate calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts of every batch received so far, in call order
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }

    fn translate_one(&self, text: &str) -> String {
        match self.behavior {
            MockBehavior::Mapped => self
                .map
                .get(text)
                .cloned()
                .unwrap_or_else(|| format!("[xlated] {}", text)),
            _ => format!("[xlated] {}", text),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            call_count: Arc::clone(&self.call_count),
            requests: Arc::clone(&self.requests),
            map: self.map.clone(),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(texts.to_vec());

        match self.behavior {
            MockBehavior::Echo | MockBehavior::Mapped => {
                Ok(texts.iter().map(|t| self.translate_one(t)).collect())
            }

            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "simulated provider failure".to_string(),
            )),

            MockBehavior::ShortArray => Ok(texts
                .iter()
                .take(texts.len().saturating_sub(1))
                .map(|t| self.translate_one(t))
                .collect()),

            MockBehavior::ShortOver { max_ok } => {
                if texts.len() > max_ok {
                    Ok(texts
                        .iter()
                        .take(texts.len() - 1)
                        .map(|t| self.translate_one(t))
                        .collect())
                } else {
                    Ok(texts.iter().map(|t| self.translate_one(t)).collect())
                }
            }

            MockBehavior::Malformed => Err(ProviderError::ParseError(
                "response is not {\"translations\": string[]} (raw: oops)".to_string(),
            )),

            MockBehavior::FailAfter { succeed } => {
                if call < succeed {
                    Ok(texts.iter().map(|t| self.translate_one(t)).collect())
                } else {
                    Err(ProviderError::RequestFailed(format!(
                        "simulated failure on call #{}",
                        call + 1
                    )))
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
