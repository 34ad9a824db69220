//! Blocking model backend calls, bridged into async code

use crate::prompt::Prompt;
use reshape_domain::LlmProvider;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Shared handle on the model backend with a per-call timeout
///
/// Every failure (backend error, empty reply, timeout, join error) comes back
/// as a message, ready to be fed into a repair loop.
pub(crate) struct ModelGateway<L> {
    provider: Arc<L>,
    call_timeout: Duration,
}

impl<L> ModelGateway<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    pub(crate) fn new(provider: L, call_timeout: Duration) -> Self {
        Self {
            provider: Arc::new(provider),
            call_timeout,
        }
    }

    pub(crate) async fn complete(&self, prompt: Prompt) -> Result<String, String> {
        let llm = Arc::clone(&self.provider);
        debug!(
            system_chars = prompt.system.len(),
            user_chars = prompt.user.len(),
            "calling model backend"
        );

        // Call in a blocking context since LlmProvider is not async
        let call = tokio::task::spawn_blocking(move || {
            llm.complete(&prompt.system, &prompt.user)
                .map_err(|e| format!("model backend error: {}", e))
        });

        let response = timeout(self.call_timeout, call)
            .await
            .map_err(|_| {
                format!(
                    "model backend timed out after {}s",
                    self.call_timeout.as_secs()
                )
            })?
            .map_err(|e| format!("model backend task failed: {}", e))??;

        debug!(response_chars = response.len(), "model backend replied");

        if response.trim().is_empty() {
            return Err("model backend returned an empty response".to_string());
        }
        Ok(response)
    }
}
