//! Reshape LLM Provider Layer
//!
//! Pluggable model backends behind the `LlmProvider` trait from `reshape-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted mock for testing
//! - `OllamaProvider`: Local Ollama chat API
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use reshape_llm::MockProvider;
//! use reshape_domain::LlmProvider;
//!
//! let provider = MockProvider::scripted(["first", "second"]);
//! assert_eq!(provider.complete("system", "a").unwrap(), "first");
//! assert_eq!(provider.complete("system", "b").unwrap(), "second");
//! assert_eq!(provider.call_count(), 2);
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;

use reshape_domain::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfiguration (missing key, bad endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Drive an HTTP future to completion from synchronous code
///
/// Callers sit on a blocking thread, so a throwaway current-thread runtime is
/// enough.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, LlmError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map(|runtime| runtime.block_on(future))
        .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))
}

/// One recorded `complete` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// System prompt sent
    pub system: String,
    /// User prompt sent
    pub user: String,
}

/// Mock LLM provider for deterministic testing
///
/// Responses are chosen in this order:
/// 1. a registered response whose pattern occurs in the user prompt
/// 2. the next scripted entry (per call index)
/// 3. the default response
///
/// # Examples
///
/// ```
/// use reshape_llm::MockProvider;
/// use reshape_domain::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.complete("sys", "any prompt").unwrap(), "Fixed response");
///
/// // Pattern responses
/// let mut provider = MockProvider::default();
/// provider.add_response("`date`", ".datetime");
/// assert_eq!(provider.complete("sys", "extract `date`").unwrap(), ".datetime");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    script: Arc<Mutex<VecDeque<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider answering calls in order from `responses`
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        provider.push_responses(responses);
        provider
    }

    /// Append responses to the script
    pub fn push_responses<I, S>(&self, responses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.script).extend(responses.into_iter().map(|r| Ok(r.into())));
    }

    /// Append a scripted backend failure
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Err(message.into()));
    }

    /// Add a specific response for user prompts containing `pattern`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(pattern.into(), Ok(response.into()));
    }

    /// Configure to return an error for user prompts containing `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        lock(&self.responses).insert(pattern.into(), Err("Mock error".to_string()));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of scripted responses not yet consumed
    pub fn remaining_script(&self) -> usize {
        lock(&self.script).len()
    }

    /// Reset the call record
    pub fn reset_call_count(&self) {
        lock(&self.calls).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error> {
        lock(&self.calls).push(RecordedCall {
            system: system_prompt.to_string(),
            user: user_prompt.to_string(),
        });

        let registered = lock(&self.responses)
            .iter()
            .find(|(pattern, _)| user_prompt.contains(pattern.as_str()))
            .map(|(_, response)| response.clone());

        let response = match registered {
            Some(response) => response,
            None => lock(&self.script)
                .pop_front()
                .unwrap_or_else(|| Ok(self.default_response.clone())),
        };

        response.map_err(LlmError::Other)
    }
}
