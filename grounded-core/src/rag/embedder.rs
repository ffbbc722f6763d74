//! Embedding generation through a provider.

use crate::provider::{Provider, ProviderError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during embedding generation.
#[derive(Debug, Error)]
pub enum EmbedderError {
    /// The provider API returned an error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered with an empty vector.
    #[error("No embeddings returned")]
    NoEmbeddings,

    /// The provider did not answer in time.
    #[error("Embedding timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedderError>;

/// Converts text to vectors with a fixed embedding model.
///
/// Embedding computation itself is delegated to the provider; this wrapper
/// pins the model name, bounds each call by a timeout and rejects empty
/// vectors.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn Provider>,
    model: String,
    timeout: Duration,
}

impl Embedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let call = self.provider.embed(text, &self.model);
        let embedding = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result?,
            Err(_) => return Err(EmbedderError::Timeout(self.timeout)),
        };
        if embedding.is_empty() {
            return Err(EmbedderError::NoEmbeddings);
        }
        Ok(embedding)
    }

    /// Embeds each text in order, stopping at the first failure.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}
