//! grounded-core - Retrieval-grounded question answering
//!
//! Provides the engine behind grounded:
//! - Model-serving provider abstraction (Ollama)
//! - Document store with thresholded top-k similarity search
//! - Prompt augmentation and answer generation
//! - Query orchestration
//! - Configuration management
//! - Unix socket server (primary interface)

pub mod config;
pub mod generator;
pub mod orchestrator;
pub mod provider;
pub mod rag;
pub mod server;

pub use config::{Config, EmptyContextPolicy, IndexerConfig};
pub use generator::{GenerationError, Generator};
pub use orchestrator::{Answer, QueryError, QueryOrchestrator, QueryRequest, QueryState};
pub use rag::{
    AugmentedPrompt, Document, DocumentStore, PromptAugmenter, RagError, SearchRequest,
    SearchResult,
};
pub use server::Server;

pub use provider::{ChatRequest, ChatResponse, Message, OllamaProvider, Provider, ProviderError};
