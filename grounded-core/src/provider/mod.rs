//! Model-serving provider abstraction layer.
//!
//! This module defines a common interface for embedding and generation
//! backends. Ollama is the bundled implementation.

mod types;
pub mod ollama;

pub use types::{ChatRequest, ChatResponse, Message, Provider, ProviderError, Result};

pub use ollama::OllamaProvider;
