//! Wire protocol: one JSON request per line, one JSON response per line.

use crate::orchestrator::Answer;
use crate::rag::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A client request, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Answer a question. A missing `query` is rejected, not a parse error.
    Query {
        #[serde(default)]
        query: Option<String>,
    },
    /// Add documents as one all-or-nothing batch.
    Add { documents: Vec<DocumentInput> },
    /// Index a directory on the server's filesystem.
    Index { path: String },
    Stats,
    Tools,
    Tool {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
}

impl Request {
    pub fn query(query: impl Into<String>) -> Self {
        Request::Query {
            query: Some(query.into()),
        }
    }
}

/// Content and metadata for one document to ingest. The id is assigned by
/// the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl From<DocumentInput> for Document {
    fn from(input: DocumentInput) -> Self {
        input
            .metadata
            .into_iter()
            .fold(Document::new(input.content), |doc, (key, value)| {
                doc.with_metadata(key, value)
            })
    }
}

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidQuery,
    Ingestion,
    Retrieval,
    Generation,
    Tool,
    BadRequest,
}

/// A server response. Variants are distinguished by their fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Answer(Answer),
    Error { error: String, kind: ErrorKind },
    Message { message: String },
    Documents { documents: usize },
    Tools { tools: Vec<Value> },
    Output {
        output: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
}

impl Response {
    pub fn error(kind: ErrorKind, error: impl ToString) -> Self {
        Response::Error {
            error: error.to_string(),
            kind,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Response::Message {
            message: message.into(),
        }
    }
}
