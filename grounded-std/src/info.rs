use async_trait::async_trait;
use grounded_plugin::{Permission, Plugin, PluginOutput, Result};
use serde_json::Value;

const PROJECT_INFO: &str = "grounded answers questions from a private knowledge base. \
Queries are matched against ingested policy chunks, and the closest chunks are passed \
to the language model as context so answers stay grounded in your own documents.";

/// Describes this server.
pub struct ProjectInfoPlugin;

impl ProjectInfoPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProjectInfoPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for ProjectInfoPlugin {
    fn name(&self) -> &str {
        "get_project_info"
    }

    fn description(&self) -> &str {
        "Get a short description of this server and what it does"
    }

    fn parameter_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    fn required_permission(&self) -> Permission {
        Permission::NONE
    }

    async fn execute(&self, _input: Value) -> Result<PluginOutput> {
        Ok(PluginOutput::new(PROJECT_INFO))
    }
}

/// Lists the tools exposed by this server.
///
/// The names are captured when the plugin is built, since the registry that
/// holds this plugin cannot be borrowed from inside it.
pub struct ListToolsPlugin {
    names: Vec<String>,
}

impl ListToolsPlugin {
    pub const NAME: &'static str = "list_demo_tools";

    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl Plugin for ListToolsPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "List the names of the tools this server exposes"
    }

    fn parameter_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    fn required_permission(&self) -> Permission {
        Permission::NONE
    }

    async fn execute(&self, _input: Value) -> Result<PluginOutput> {
        let content = format!("This server exposes: {}.", self.names.join(", "));
        Ok(PluginOutput::new(content).with_metadata(serde_json::json!({ "tools": self.names })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_tools_output() {
        let plugin = ListToolsPlugin::new(vec!["a".to_string(), "b".to_string()]);
        let output = plugin.execute(Value::Null).await.unwrap();
        assert_eq!(output.content, "This server exposes: a, b.");
        assert_eq!(output.metadata.unwrap()["tools"][1], "b");
    }
}
