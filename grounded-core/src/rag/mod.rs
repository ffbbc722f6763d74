//! Retrieval Augmented Generation (RAG) pipeline.
//!
//! Grounds generated answers in a small corpus of ingested text chunks.
//!
//! # Architecture
//!
//! - [`DocumentStore`]: ingestion and similarity search over the corpus
//! - [`VectorStore`]: storage backend, [`InMemoryVectorStore`] by default
//! - [`PromptAugmenter`]: combines ranked results with the user query
//! - [`Embedder`]: converts text to vectors through a [`Provider`]
//!
//! # How It Works
//!
//! 1. **Ingestion**: each document is embedded, then the whole batch is
//!    appended to the store at once. A batch with a blank document is
//!    rejected and the corpus stays unchanged.
//! 2. **Retrieval**: the query is embedded and every stored chunk is scored
//!    by cosine similarity. Chunks below the threshold are dropped and the
//!    rest are cut to `top_k`, best first.
//! 3. **Augmentation**: the surviving chunks become labelled context blocks
//!    in the prompt handed to the generator.

mod augment;
mod embedder;
pub mod indexer;
mod search;
mod seed;
mod store;
mod types;

pub use augment::{AugmentedPrompt, ContextBlock, PromptAugmenter, NO_CONTEXT_MARKER};
pub use embedder::{Embedder, EmbedderError};
pub use indexer::IndexerError;
pub use search::cosine_similarity;
pub use seed::sample_documents;
pub use store::{InMemoryVectorStore, StoreError, StoredDocument, VectorStore};
pub use types::{Document, SearchRequest, SearchResult};

use crate::config::{Config, IndexerConfig};
use crate::provider::Provider;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RagError {
    /// A document could not be added; the corpus is unchanged.
    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    /// The store could not be searched.
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),
}

pub type Result<T> = std::result::Result<T, RagError>;

/// Outcome of indexing a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub files: usize,
    pub chunks: usize,
}

/// The knowledge base: embeds documents on the way in and ranks them on the
/// way out.
///
/// `DocumentStore` is `Clone`; clones share the same underlying
/// [`VectorStore`], so one store can serve the server loop and every
/// in-flight query.
#[derive(Clone)]
pub struct DocumentStore {
    embedder: Embedder,
    store: Arc<dyn VectorStore>,
    indexer: IndexerConfig,
}

impl DocumentStore {
    /// Creates an empty in-memory store.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use grounded_core::{Config, rag::DocumentStore, provider::OllamaProvider};
    /// # use std::sync::Arc;
    /// let config = Config::default();
    /// let provider = Arc::new(OllamaProvider::from_config(&config.llm));
    /// let store = DocumentStore::new(&config, provider);
    /// ```
    pub fn new(config: &Config, provider: Arc<dyn Provider>) -> Self {
        Self::with_vector_store(config, provider, Arc::new(InMemoryVectorStore::new()))
    }

    /// Creates a store over a custom backend.
    pub fn with_vector_store(
        config: &Config,
        provider: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            embedder: Embedder::new(
                provider,
                config.rag.embedding_model.clone(),
                config.llm.timeout(),
            ),
            store,
            indexer: config.rag.indexer.clone(),
        }
    }

    /// Overrides the bound on each embedding call, which defaults to
    /// `llm.timeout_secs`.
    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embedder = self.embedder.with_timeout(timeout);
        self
    }

    /// Adds documents to the knowledge base and returns how many were added.
    ///
    /// All documents are validated and embedded before any is stored, so a
    /// failure leaves the corpus exactly as it was. Documents are not
    /// deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Ingestion`] if any document has blank content, if
    /// embedding fails, or if the embeddings do not match the store's dimension.
    pub async fn add(&self, documents: Vec<Document>) -> Result<usize> {
        if let Some(blank) = documents.iter().find(|d| d.content.trim().is_empty()) {
            return Err(RagError::Ingestion(format!(
                "document '{}' has empty content",
                blank.id
            )));
        }
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        debug!(count = texts.len(), "Embedding documents for ingestion");
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| RagError::Ingestion(e.to_string()))?;

        let stored: Vec<StoredDocument> = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| StoredDocument::new(document, embedding))
            .collect();
        let added = stored.len();

        self.store
            .add(stored)
            .await
            .map_err(|e| RagError::Ingestion(e.to_string()))?;

        info!(added, "Documents added to knowledge base");
        Ok(added)
    }

    /// Returns the stored documents most similar to the request's query.
    ///
    /// An empty result means no grounding evidence was found, which is not an
    /// error. An empty store answers without calling the embedder.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Retrieval`] if the store fails, or if the embedder
    /// fails or does not answer within its timeout.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let count = self.count().await?;
        debug!(count, "Knowledge base count");
        if count == 0 {
            debug!("Knowledge base is empty, returning no results");
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(&request.query)
            .await
            .map_err(|e| RagError::Retrieval(e.to_string()))?;

        let results = self
            .store
            .search(
                &query_embedding,
                request.top_k(),
                request.similarity_threshold(),
            )
            .await
            .map_err(|e| RagError::Retrieval(e.to_string()))?;

        debug!(
            results = results.len(),
            top_k = request.top_k(),
            threshold = request.similarity_threshold(),
            "Similarity search complete"
        );
        Ok(results)
    }

    /// Returns the number of documents in the knowledge base.
    pub async fn count(&self) -> Result<usize> {
        self.store
            .count()
            .await
            .map_err(|e| RagError::Retrieval(e.to_string()))
    }

    /// Adds the sample policy corpus.
    pub async fn seed(&self) -> Result<usize> {
        let added = self.add(sample_documents()).await?;
        info!(added, "Seeded knowledge base with sample documents");
        Ok(added)
    }

    /// Recursively indexes the text files below `dir`.
    ///
    /// Each file is split into overlapping chunks, and each chunk becomes a
    /// document with `source` (the file path) and `chunk` (its index)
    /// metadata. Files are ingested one at a time, so a failure keeps the
    /// files indexed before it.
    pub async fn index_directory(&self, dir: &Path) -> Result<IndexSummary> {
        let files = indexer::collect_files(dir, &self.indexer).await?;
        info!(files = files.len(), dir = %dir.display(), "Starting indexing");

        let mut summary = IndexSummary::default();
        for file in files {
            let source = file.path.to_string_lossy().to_string();
            let documents: Vec<Document> = indexer::chunk_text(
                &file.content,
                self.indexer.chunk_size,
                self.indexer.chunk_overlap,
            )
            .into_iter()
            .enumerate()
            .filter(|(_, chunk)| !chunk.trim().is_empty())
            .map(|(i, chunk)| {
                Document::new(chunk)
                    .with_id(format!("{}_chunk_{}", source, i))
                    .with_metadata("source", source.as_str())
                    .with_metadata("chunk", i.to_string())
            })
            .collect();

            if documents.is_empty() {
                warn!(file = %file.path.display(), "No content to index");
                continue;
            }

            summary.chunks += self.add(documents).await?;
            summary.files += 1;
            debug!(file = %file.path.display(), "Indexed file");
        }

        info!(files = summary.files, chunks = summary.chunks, "Indexing complete");
        Ok(summary)
    }
}
