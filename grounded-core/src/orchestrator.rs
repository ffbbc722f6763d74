//! Query orchestration.
//!
//! Composes retrieval, augmentation and generation into one request/response
//! cycle.
//!
//! # Query Flow
//!
//! ```text
//! validating ──blank──▶ rejected
//!     │
//!     ▼
//! retrieving ──▶ generating ──▶ done
//! ```
//!
//! Validation happens before any I/O, so a rejected query never reaches the
//! document store or the generator. When retrieval finds nothing, the
//! configured [`EmptyContextPolicy`] decides whether the generator is still
//! called.

use crate::config::{Config, EmptyContextPolicy};
use crate::generator::{GenerationError, Generator};
use crate::provider::Provider;
use crate::rag::{DocumentStore, PromptAugmenter, RagError, SearchRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Error text for a missing or blank query.
pub const INVALID_QUERY_MESSAGE: &str = "Missing or empty 'query' in request body";

#[derive(Debug, Error)]
pub enum QueryError {
    /// The query was missing or blank. Nothing was retrieved or generated.
    #[error("{}", INVALID_QUERY_MESSAGE)]
    InvalidQuery,

    #[error(transparent)]
    Retrieval(RagError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl QueryError {
    /// True when the caller sent a bad request rather than the pipeline failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::InvalidQuery)
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;

/// Incoming query as received from a transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// A generated answer. `query` echoes the input exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub query: String,
    pub answer: String,
}

/// Lifecycle of a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Validating,
    Retrieving,
    Generating,
    Done,
    Rejected,
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryState::Validating => "validating",
            QueryState::Retrieving => "retrieving",
            QueryState::Generating => "generating",
            QueryState::Done => "done",
            QueryState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

fn enter(state: QueryState) {
    debug!(%state, "Query state transition");
}

/// Answers queries grounded in a [`DocumentStore`].
///
/// Holds its collaborators directly; build one at startup and share it.
///
/// # Examples
///
/// ```no_run
/// use grounded_core::{Config, QueryOrchestrator};
/// use grounded_core::provider::OllamaProvider;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load_or_default("config.yaml")?;
/// let provider = Arc::new(OllamaProvider::from_config(&config.llm));
/// let orchestrator = QueryOrchestrator::new(&config, provider);
/// orchestrator.store().seed().await?;
///
/// let answer = orchestrator.ask("What's our data retention policy?").await?;
/// println!("{}", answer.answer);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QueryOrchestrator {
    store: DocumentStore,
    augmenter: PromptAugmenter,
    generator: Generator,
    top_k: usize,
    similarity_threshold: f32,
    decline_message: String,
}

impl QueryOrchestrator {
    /// Wires an in-memory store, augmenter and generator over one provider.
    pub fn new(config: &Config, provider: Arc<dyn Provider>) -> Self {
        let store = DocumentStore::new(config, Arc::clone(&provider));
        let generator = Generator::new(config, provider);
        Self::from_parts(config, store, generator)
    }

    /// Builds an orchestrator from existing collaborators.
    pub fn from_parts(config: &Config, store: DocumentStore, generator: Generator) -> Self {
        Self {
            store,
            augmenter: PromptAugmenter::new(
                config.system_prompt.clone(),
                config.rag.on_empty_context,
            ),
            generator,
            top_k: config.rag.top_k,
            similarity_threshold: config.rag.similarity_threshold,
            decline_message: config.rag.decline_message.clone(),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Answers a query.
    ///
    /// # Errors
    ///
    /// - [`QueryError::InvalidQuery`] if the query is blank
    /// - [`QueryError::Retrieval`] if the store cannot be searched
    /// - [`QueryError::Generation`] if the generator fails or times out
    ///
    /// Finding no relevant context is not an error.
    pub async fn ask(&self, query: &str) -> Result<Answer> {
        enter(QueryState::Validating);
        if query.trim().is_empty() {
            enter(QueryState::Rejected);
            return Err(QueryError::InvalidQuery);
        }
        info!(query_len = query.len(), "Received query");

        enter(QueryState::Retrieving);
        let request = SearchRequest::new(query)
            .with_top_k(self.top_k)
            .with_similarity_threshold(self.similarity_threshold);
        let results = self
            .store
            .search(&request)
            .await
            .map_err(QueryError::Retrieval)?;
        debug!(results = results.len(), "Retrieved context");

        let prompt = self.augmenter.augment(query, &results);

        let answer = if !prompt.has_context()
            && self.augmenter.policy() == EmptyContextPolicy::Decline
        {
            debug!("No context found, declining without generation");
            self.decline_message.clone()
        } else {
            enter(QueryState::Generating);
            self.generator.generate(&prompt).await?
        };

        enter(QueryState::Done);
        info!(
            query_len = query.len(),
            answer_len = answer.len(),
            grounded = prompt.has_context(),
            "Answered query"
        );
        Ok(Answer {
            query: query.to_string(),
            answer,
        })
    }

    /// Answers a transport request, rejecting a missing query.
    pub async fn answer_request(&self, request: QueryRequest) -> Result<Answer> {
        match request.query {
            Some(query) => self.ask(&query).await,
            None => {
                enter(QueryState::Validating);
                enter(QueryState::Rejected);
                Err(QueryError::InvalidQuery)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(QueryError::InvalidQuery.is_client_error());
        assert!(!QueryError::Retrieval(RagError::Retrieval("down".into())).is_client_error());
        assert!(!QueryError::Generation(GenerationError::Timeout(
            std::time::Duration::from_secs(1)
        ))
        .is_client_error());
    }

    #[test]
    fn test_invalid_query_message() {
        assert_eq!(
            QueryError::InvalidQuery.to_string(),
            "Missing or empty 'query' in request body"
        );
    }

    #[test]
    fn test_request_deserializes_missing_query() {
        let request: QueryRequest = serde_json::from_str("{}").unwrap();
        assert!(request.query.is_none());

        let request: QueryRequest = serde_json::from_str(r#"{"query":" hi "}"#).unwrap();
        assert_eq!(request.query.as_deref(), Some(" hi "));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(QueryState::Retrieving.to_string(), "retrieving");
        assert_eq!(QueryState::Rejected.to_string(), "rejected");
    }
}
