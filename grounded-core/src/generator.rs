//! Answer generation gateway.
//!
//! Sends an [`AugmentedPrompt`] to the model-serving backend and collects the
//! streamed reply. One request per call, bounded by a timeout, never retried.

use crate::config::Config;
use crate::provider::{ChatRequest, ChatResponse, Provider, ProviderError};
use crate::rag::AugmentedPrompt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Calls the generation backend with a fixed model, temperature and timeout.
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl Generator {
    pub fn new(config: &Config, provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            timeout: config.llm.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generates an answer for the prompt.
    ///
    /// The reply may be empty if the model produced nothing. If the timeout
    /// elapses the in-flight request is dropped and
    /// [`GenerationError::Timeout`] is returned.
    pub async fn generate(&self, prompt: &AugmentedPrompt) -> Result<String> {
        let request = ChatRequest::new(&self.model, prompt.to_messages())
            .with_temperature(self.temperature);
        debug!(
            model = %self.model,
            context_blocks = prompt.context_blocks.len(),
            "Sending prompt to generator"
        );

        let mut answer = String::new();
        let call = self.provider.chat(
            request,
            Box::new(|response: ChatResponse| answer.push_str(&response.content)),
        );

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result?,
            Err(_) => return Err(GenerationError::Timeout(self.timeout)),
        }

        debug!(answer_len = answer.len(), "Generator completed");
        Ok(answer)
    }
}
