//! Common types for LLM providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when interacting with a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Provider error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Provider trait for model-serving backends.
///
/// A provider is the boundary to the external embedding and generation
/// services. Implementations own their transport; callers own timeouts.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stream a chat completion.
    ///
    /// The callback is invoked for each chunk of the response.
    async fn chat<'a>(
        &'a self,
        request: ChatRequest,
        callback: Box<dyn FnMut(ChatResponse) + Send + 'a>,
    ) -> Result<()>;

    /// Generate an embedding vector for the given text.
    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>>;
}

/// Request for chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Response from chat completion (streaming chunk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    /// Incremental content carried by this chunk.
    pub content: String,
    pub done: bool,
}

impl ChatResponse {
    pub fn chunk(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            done: false,
        }
    }

    pub fn done(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: String::new(),
            done: true,
        }
    }
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}
