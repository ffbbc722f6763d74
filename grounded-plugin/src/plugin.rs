use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    /// The arguments did not match the tool's parameter schema.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tool failed: {0}")]
    ExecutionFailed(String),

    /// The tool needs more than the registry was granted.
    #[error("Permission denied for tool '{0}'")]
    PermissionDenied(String),

    #[error("Tool '{0}' is already registered")]
    Duplicate(String),

    #[error("Unknown tool: {0}")]
    UnknownPlugin(String),
}

pub type Result<T> = std::result::Result<T, PluginError>;

/// Access a tool needs, or that the operator grants to every registered tool.
///
/// Read as a set of capabilities: a grant covers a requirement when it has
/// every capability the requirement asks for. Missing fields in config take
/// the read-only defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permission {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Permission {
    /// Inspect server state and the knowledge base; the default grant.
    pub const READ_ONLY: Self = Self {
        read: true,
        write: false,
        execute: false,
    };

    /// Pure tools that touch nothing outside their arguments.
    pub const NONE: Self = Self {
        read: false,
        write: false,
        execute: false,
    };

    pub fn allows(&self, required: &Permission) -> bool {
        (self.read || !required.read)
            && (self.write || !required.write)
            && (self.execute || !required.execute)
    }
}

impl Default for Permission {
    fn default() -> Self {
        Self::READ_ONLY
    }
}

/// Text returned by a tool, plus optional structured data for clients.
#[derive(Debug, Clone)]
pub struct PluginOutput {
    pub content: String,
    pub metadata: Option<Value>,
}

impl PluginOutput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A named tool callable over the `tool` request.
///
/// Tools are registered into a [`PluginRegistry`](crate::PluginRegistry)
/// before the server starts and are never discovered at runtime.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Name clients call the tool by; unique within a registry.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the `arguments` object.
    fn parameter_schema(&self) -> Value;

    fn required_permission(&self) -> Permission;

    async fn execute(&self, input: Value) -> Result<PluginOutput>;
}
