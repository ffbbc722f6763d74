//! Ollama provider implementation.
//!
//! Speaks the Ollama HTTP API: streamed NDJSON from `/api/chat` and
//! batch embeddings from `/api/embed`.

use super::types::*;
use crate::config::LlmConfig;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ollama HTTP API provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
    http_client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(&config.base_url)
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn chat<'a>(
        &'a self,
        request: ChatRequest,
        mut callback: Box<dyn FnMut(ChatResponse) + Send + 'a>,
    ) -> Result<()> {
        let url = format!("{}/api/chat", self.base_url);

        let ollama_request = OllamaChatRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            options: {
                let mut opts = HashMap::new();
                opts.insert("temperature".to_string(), serde_json::json!(request.temperature));
                Some(opts)
            },
            stream: true,
        };

        let response = self.http_client.post(&url).json(&ollama_request).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api(error_text));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            buffer.extend_from_slice(&chunk);

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line = buffer.drain(..=newline_pos).collect::<Vec<_>>();
                if line.len() <= 1 {
                    continue;
                }

                let line_str = String::from_utf8_lossy(&line[..line.len() - 1]);
                let parsed: OllamaChatResponse = serde_json::from_str(&line_str)?;

                if let Some(error) = parsed.error {
                    return Err(ProviderError::Api(error));
                }

                callback(ChatResponse {
                    model: parsed.model,
                    content: parsed.message.map(|m| m.content).unwrap_or_default(),
                    done: parsed.done,
                });
            }
        }

        Ok(())
    }

    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embed", self.base_url);

        let embed_request = EmbedRequest {
            model: model.to_string(),
            input: text.to_string(),
        };

        let response = self.http_client.post(&url).json(&embed_request).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api(error_text));
        }

        let embed_response = response.json::<EmbedResponse>().await?;

        embed_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Other("No embeddings returned".to_string()))
    }
}

// Ollama-specific request/response types (internal)

#[derive(Debug, Clone, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<HashMap<String, serde_json::Value>>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider = OllamaProvider::new("http://localhost:11434/");
        assert_eq!(provider.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_parse_stream_line() {
        let line = r#"{"model":"llama3.2","created_at":"2024-01-01T00:00:00Z","message":{"role":"assistant","content":"Seven"},"done":false}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(line).unwrap();
        assert_eq!(parsed.message.unwrap().content, "Seven");
        assert!(!parsed.done);
    }

    #[test]
    fn test_parse_error_line() {
        let parsed: OllamaChatResponse =
            serde_json::from_str(r#"{"error":"model not found"}"#).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("model not found"));
    }
}
