use super::types::{ErrorKind, Request, Response};
use crate::orchestrator::{QueryError, QueryOrchestrator, QueryRequest};
use crate::rag::{Document, RagError};
use grounded_plugin::PluginRegistry;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Routes requests to the orchestrator, the document store or the tool registry.
pub struct RequestHandler {
    orchestrator: QueryOrchestrator,
    registry: Arc<PluginRegistry>,
}

impl RequestHandler {
    pub fn new(orchestrator: QueryOrchestrator, registry: Arc<PluginRegistry>) -> Self {
        Self {
            orchestrator,
            registry,
        }
    }

    pub fn orchestrator(&self) -> &QueryOrchestrator {
        &self.orchestrator
    }

    /// Routes request to appropriate handler based on type.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Query { query } => self.handle_query(query).await,
            Request::Add { documents } => {
                self.handle_add(documents.into_iter().map(Document::from).collect())
                    .await
            }
            Request::Index { path } => self.handle_index(&path).await,
            Request::Stats => self.handle_stats().await,
            Request::Tools => Response::Tools {
                tools: self.registry.plugin_specs(),
            },
            Request::Tool { name, arguments } => self.handle_tool(&name, arguments).await,
        }
    }

    async fn handle_query(&self, query: Option<String>) -> Response {
        match self
            .orchestrator
            .answer_request(QueryRequest { query })
            .await
        {
            Ok(answer) => Response::Answer(answer),
            Err(e) => {
                let kind = match &e {
                    QueryError::InvalidQuery => ErrorKind::InvalidQuery,
                    QueryError::Retrieval(_) => ErrorKind::Retrieval,
                    QueryError::Generation(_) => ErrorKind::Generation,
                };
                if !e.is_client_error() {
                    warn!(error = %e, "Query failed");
                }
                Response::error(kind, e)
            }
        }
    }

    async fn handle_add(&self, documents: Vec<Document>) -> Response {
        match self.orchestrator.store().add(documents).await {
            Ok(added) => Response::message(format!("Added {} documents to knowledge base", added)),
            Err(e) => rag_error(e),
        }
    }

    async fn handle_index(&self, path: &str) -> Response {
        match self.orchestrator.store().index_directory(Path::new(path)).await {
            Ok(summary) => Response::message(format!(
                "Indexed {} files ({} chunks) from: {}",
                summary.files, summary.chunks, path
            )),
            Err(e) => rag_error(e),
        }
    }

    async fn handle_stats(&self) -> Response {
        match self.orchestrator.store().count().await {
            Ok(documents) => Response::Documents { documents },
            Err(e) => rag_error(e),
        }
    }

    async fn handle_tool(&self, name: &str, arguments: Value) -> Response {
        match self.registry.execute(name, arguments).await {
            Ok(output) => Response::Output {
                output: output.content,
                metadata: output.metadata,
            },
            Err(e) => Response::error(ErrorKind::Tool, e),
        }
    }
}

fn rag_error(e: RagError) -> Response {
    warn!(error = %e, "Knowledge base request failed");
    let kind = match e {
        RagError::Retrieval(_) => ErrorKind::Retrieval,
        RagError::Ingestion(_) | RagError::Indexer(_) => ErrorKind::Ingestion,
    };
    Response::error(kind, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::types::DocumentInput;
    use std::collections::HashMap;
    use crate::provider::{ChatRequest, ChatResponse, Provider, ProviderError};
    use async_trait::async_trait;
    use grounded_plugin::Permission;

    /// Embeds everything except text mentioning "offline".
    struct FlakyEmbeddings;

    #[async_trait]
    impl Provider for FlakyEmbeddings {
        async fn chat<'a>(
            &'a self,
            request: ChatRequest,
            mut callback: Box<dyn FnMut(ChatResponse) + Send + 'a>,
        ) -> crate::provider::Result<()> {
            callback(ChatResponse::chunk(&request.model, "answer"));
            Ok(())
        }

        async fn embed(&self, text: &str, _model: &str) -> crate::provider::Result<Vec<f32>> {
            if text.contains("offline") {
                return Err(ProviderError::Api("embedding model offline".to_string()));
            }
            Ok(vec![1.0, 0.0])
        }
    }

    fn handler() -> RequestHandler {
        let orchestrator = QueryOrchestrator::new(&Config::default(), Arc::new(FlakyEmbeddings));
        RequestHandler::new(orchestrator, Arc::new(PluginRegistry::new(Permission::READ_ONLY)))
    }

    fn kind(response: Response) -> Option<ErrorKind> {
        match response {
            Response::Error { kind, .. } => Some(kind),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_embedding_failures_keep_their_category() {
        let handler = handler();
        let add = |content: &str| Request::Add {
            documents: vec![DocumentInput {
                content: content.to_string(),
                metadata: HashMap::new(),
            }],
        };

        assert_eq!(kind(handler.handle(add("Keep data 7 years")).await), None);
        assert_eq!(
            kind(handler.handle(Request::query("is the model offline?")).await),
            Some(ErrorKind::Retrieval)
        );
        assert_eq!(
            kind(handler.handle(add("offline copy")).await),
            Some(ErrorKind::Ingestion)
        );
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let request = Request::Index {
            path: missing.to_string_lossy().to_string(),
        };

        assert_eq!(kind(handler().handle(request).await), Some(ErrorKind::Ingestion));
    }
}
