use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A chunk of text in the knowledge base.
///
/// Documents are immutable once added to a store. The embedding computed for
/// the content is owned by the store and never handed back to callers.
///
/// # Example
///
/// ```
/// use grounded_core::rag::Document;
///
/// let doc = Document::new("Keep customer data for 7 years after account closure.")
///     .with_metadata("source", "data-retention-policy")
///     .with_metadata("section", "customer-data");
/// assert_eq!(doc.source(), Some("data-retention-policy"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Creates a document with a random id.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `source` metadata field, if present.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").map(String::as_str)
    }
}

/// Parameters for a similarity search.
///
/// `top_k` is always at least 1. The threshold is not range-checked; documents
/// scoring below it are simply excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    top_k: usize,
    similarity_threshold: f32,
}

impl SearchRequest {
    pub const DEFAULT_TOP_K: usize = 4;

    /// A request with `top_k = 4` and no threshold.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: Self::DEFAULT_TOP_K,
            similarity_threshold: 0.0,
        }
    }

    /// Sets the result cap. Values below 1 are raised to 1.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }
}

/// A search result containing a document and its similarity score.
///
/// Returned by searches ordered by descending score. Cosine similarity ranges
/// from -1.0 to 1.0; text embeddings usually land between 0.0 and 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub document: Document,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ids_are_unique() {
        let a = Document::new("same");
        let b = Document::new("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_metadata_keys_are_unique() {
        let doc = Document::new("x")
            .with_metadata("source", "a")
            .with_metadata("source", "b");
        assert_eq!(doc.metadata.len(), 1);
        assert_eq!(doc.source(), Some("b"));
    }

    #[test]
    fn test_top_k_is_at_least_one() {
        let request = SearchRequest::new("q").with_top_k(0);
        assert_eq!(request.top_k(), 1);
        assert_eq!(SearchRequest::new("q").top_k(), SearchRequest::DEFAULT_TOP_K);
    }
}
