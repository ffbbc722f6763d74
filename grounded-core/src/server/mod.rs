//! Unix socket server answering queries over newline-delimited JSON.
//!
//! The server is organized into separate concerns:
//! - `types`: Protocol types for requests and responses
//! - `handler`: Routing requests to the orchestrator, store and tools
//! - `transport`: Unix socket communication layer
//! - `client`: One-shot request helper for clients

mod client;
mod handler;
mod transport;
mod types;

pub use client::send_request;
pub use handler::RequestHandler;
pub use transport::{TransportError, UnixSocketTransport};
pub use types::{DocumentInput, ErrorKind, Request, Response};

use crate::config::Config;
use crate::orchestrator::QueryOrchestrator;
use crate::provider::{OllamaProvider, Provider};
use anyhow::{Context, Result};
use grounded_plugin::PluginRegistry;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::UnixStream;
use tokio::signal;
use tracing::{debug, error, info};

/// Main server coordinating transport and request handling.
pub struct Server {
    handler: Arc<RequestHandler>,
    transport: UnixSocketTransport,
    seed_on_startup: bool,
}

impl Server {
    /// Creates a server backed by Ollama.
    pub fn new(config: Config, registry: PluginRegistry) -> Self {
        let provider = Arc::new(OllamaProvider::from_config(&config.llm));
        Self::with_provider(config, registry, provider)
    }

    /// Creates a server over any provider.
    pub fn with_provider(
        config: Config,
        registry: PluginRegistry,
        provider: Arc<dyn Provider>,
    ) -> Self {
        let orchestrator = QueryOrchestrator::new(&config, provider);
        let handler = Arc::new(RequestHandler::new(orchestrator, Arc::new(registry)));
        Self {
            handler,
            transport: UnixSocketTransport::new(config.server.socket_path.clone()),
            seed_on_startup: config.rag.seed_on_startup,
        }
    }

    pub fn handler(&self) -> &Arc<RequestHandler> {
        &self.handler
    }

    /// Seeds the store if configured, then serves until Ctrl-C.
    pub async fn start(&self) -> Result<()> {
        if self.seed_on_startup {
            self.handler
                .orchestrator()
                .store()
                .seed()
                .await
                .context("Failed to seed knowledge base")?;
        }

        let listener = self
            .transport
            .bind()
            .await
            .with_context(|| format!("Failed to bind {}", self.transport.socket_path()))?;
        info!(socket = self.transport.socket_path(), "Server listening");

        let shutdown = signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, _)) => {
                            let handler = Arc::clone(&self.handler);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, handler).await {
                                    error!(error = %e, "Connection error");
                                }
                            });
                        }
                        Err(e) => error!(error = %e, "Failed to accept connection"),
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutting down");
                    self.transport.cleanup();
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Serves request lines on one connection until the client hangs up.
async fn handle_connection(
    stream: UnixStream,
    handler: Arc<RequestHandler>,
) -> transport::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    while let Some(line) = transport::read_line(&mut reader).await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match transport::parse_request(&line) {
            Ok(request) => {
                debug!(?request, "Handling request");
                handler.handle(request).await
            }
            Err(e) => Response::error(ErrorKind::BadRequest, e),
        };
        transport::write_response(&mut writer, &response).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ChatRequest, ChatResponse};
    use async_trait::async_trait;
    use grounded_plugin::Permission;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        async fn chat<'a>(
            &'a self,
            request: ChatRequest,
            mut callback: Box<dyn FnMut(ChatResponse) + Send + 'a>,
        ) -> crate::provider::Result<()> {
            callback(ChatResponse::chunk(&request.model, "grounded answer"));
            callback(ChatResponse::done(&request.model));
            Ok(())
        }

        async fn embed(&self, text: &str, _model: &str) -> crate::provider::Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn test_connection_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("grounded.sock");
        let socket = socket.to_string_lossy().to_string();

        let mut config = Config::default();
        config.server.socket_path = socket.clone();
        let server = Server::with_provider(
            config,
            PluginRegistry::new(Permission::READ_ONLY),
            Arc::new(EchoProvider),
        );

        let listener = server.transport.bind().await.unwrap();
        let handler = Arc::clone(server.handler());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                tokio::spawn(handle_connection(stream, handler));
            }
        });

        let response = send_request(&socket, &Request::query("What's our policy?"))
            .await
            .unwrap();
        assert_eq!(
            response,
            Response::Answer(crate::Answer {
                query: "What's our policy?".into(),
                answer: "grounded answer".into(),
            })
        );

        let response = send_request(&socket, &Request::Query { query: None })
            .await
            .unwrap();
        assert_eq!(
            response,
            Response::error(
                ErrorKind::InvalidQuery,
                "Missing or empty 'query' in request body"
            )
        );

        let response = send_request(&socket, &Request::Stats).await.unwrap();
        assert_eq!(response, Response::Documents { documents: 0 });
    }
}
