use grounded_plugin::Permission;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for the whole answering service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Permissions granted to registered tools.
    #[serde(default)]
    pub permission: Permission,
}

/// Configuration for the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    /// Upper bound on a single call to the model server, generation or
    /// embedding, in seconds.
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What to do when retrieval finds no context for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyContextPolicy {
    /// Ask the model anyway, telling it that the answer is not grounded.
    #[default]
    Answer,
    /// Return the configured decline message without calling the model.
    Decline,
}

/// Configuration for retrieval and prompt augmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub embedding_model: String,
    /// Maximum number of chunks passed to the model.
    pub top_k: usize,
    /// Minimum similarity a chunk needs to be used as context.
    pub similarity_threshold: f32,
    pub on_empty_context: EmptyContextPolicy,
    pub decline_message: String,
    /// Seed the store with the sample policy corpus when the server starts.
    /// Documents are not deduplicated, so disable this for long-lived stores.
    pub seed_on_startup: bool,
    pub indexer: IndexerConfig,
}

/// Configuration for directory ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Chunk size in bytes.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in bytes.
    pub chunk_overlap: usize,
    /// File extensions to index (e.g., ["md", "txt"]).
    /// Empty list means index all readable text files.
    pub extensions: Vec<String>,
    /// Skips directories/files whose name contains one of these strings.
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub socket_path: String,
}

fn default_system_prompt() -> String {
    "You are a careful assistant that answers questions about internal policies and records. \
     Only state facts that appear in the provided context."
        .to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_model: "nomic-embed-text".to_string(),
            top_k: 5,
            similarity_threshold: 0.5,
            on_empty_context: EmptyContextPolicy::default(),
            decline_message:
                "I couldn't find anything in the knowledge base to answer that question."
                    .to_string(),
            seed_on_startup: true,
            indexer: IndexerConfig::default(),
        }
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
            extensions: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Directories and files skipped by default when indexing.
pub fn default_exclude_patterns() -> Vec<String> {
    [
        ".git",
        ".svn",
        "target",
        "node_modules",
        "__pycache__",
        ".venv",
        ".idea",
        ".vscode",
        ".DS_Store",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/grounded.sock".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            system_prompt: default_system_prompt(),
            rag: RagConfig::default(),
            server: ServerConfig::default(),
            permission: Permission::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, using defaults only when the file does
    /// not exist. A file that exists but cannot be read, parsed or validated
    /// is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.rag.top_k == 0 {
            return Err(ConfigError::Invalid("rag.top_k must be at least 1".to_string()));
        }
        if !self.rag.similarity_threshold.is_finite() {
            return Err(ConfigError::Invalid(
                "rag.similarity_threshold must be a finite number".to_string(),
            ));
        }
        let indexer = &self.rag.indexer;
        if indexer.chunk_size == 0 || indexer.chunk_overlap >= indexer.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "rag.indexer.chunk_overlap ({}) must be smaller than chunk_size ({})",
                indexer.chunk_overlap, indexer.chunk_size
            )));
        }
        Ok(())
    }
}
