//! Vector storage abstraction and the in-memory backend.

use super::search::rank;
use super::types::{Document, SearchResult};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Embedding dimension mismatch: store holds {expected}-d vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A document together with the embedding of its content.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub document: Document,
    pub embedding: Vec<f32>,
}

impl StoredDocument {
    pub fn new(document: Document, embedding: Vec<f32>) -> Self {
        Self {
            document,
            embedding,
        }
    }
}

/// Unified interface for vector storage backends.
///
/// Implementations must make each `add` batch visible to searches all at once
/// or not at all, and must return equal-score results in insertion order.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Appends documents. The batch is rejected as a whole on error.
    async fn add(&self, documents: Vec<StoredDocument>) -> Result<()>;

    /// Returns up to `top_k` documents scoring at least `threshold`,
    /// sorted by descending similarity.
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Returns the total number of documents in the store.
    async fn count(&self) -> Result<usize>;
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    dimension: Option<usize>,
    documents: Vec<Arc<StoredDocument>>,
}

impl Snapshot {
    fn check_dimension(&self, actual: usize) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != actual => {
                Err(StoreError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

/// An in-memory vector store using copy-on-write snapshots.
///
/// Searches clone the current snapshot handle and scan it without holding the
/// lock, so they see the store exactly as it was when they started. Appends
/// build the next snapshot under the write lock; a snapshot still referenced
/// by an in-flight search is copied rather than mutated.
///
/// Search is a linear scan: O(n * d) for n documents of dimension d.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    current: RwLock<Arc<Snapshot>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let guard = self.current.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Arc::clone(&guard))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, documents: Vec<StoredDocument>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let mut guard = self.current.write().map_err(|_| StoreError::Poisoned)?;

        let dimension = guard
            .dimension
            .unwrap_or_else(|| documents[0].embedding.len());
        for doc in &documents {
            if doc.embedding.len() != dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: dimension,
                    actual: doc.embedding.len(),
                });
            }
        }

        let next = Arc::make_mut(&mut *guard);
        next.dimension = Some(dimension);
        next.documents.extend(documents.into_iter().map(Arc::new));
        debug!(total = next.documents.len(), "Appended documents to in-memory store");
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        let snapshot = self.snapshot()?;
        if snapshot.documents.is_empty() {
            return Ok(Vec::new());
        }
        snapshot.check_dimension(query_embedding.len())?;
        Ok(rank(query_embedding, &snapshot.documents, top_k, threshold))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.snapshot()?.documents.len())
    }
}
