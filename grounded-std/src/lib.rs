//! Built-in tools for grounded
//!
//! A small set of plugins that work out of the box:
//! - Project information and tool listing
//! - Live server status (time, uptime, call count)
//! - Text analysis

mod info;
mod status;
mod text;

pub use info::{ListToolsPlugin, ProjectInfoPlugin};
pub use status::ServerStatusPlugin;
pub use text::{AnalyzeTextPlugin, TextStats};

use grounded_plugin::{Plugin, PluginRegistry, Result};
use std::sync::Arc;
use tracing::debug;

/// Registers every built-in tool into `registry`.
///
/// The status tool reads the registry's own runtime, so its call count covers
/// every tool dispatched through this registry. `list_demo_tools` lists the
/// tools registered when this runs, itself included; tools added afterwards
/// are not listed. Nothing is registered if any built-in is rejected.
pub fn register_defaults(registry: &mut PluginRegistry) -> Result<()> {
    let mut plugins: Vec<Arc<dyn Plugin>> = vec![
        Arc::new(ProjectInfoPlugin::new()),
        Arc::new(ServerStatusPlugin::new(Arc::clone(registry.runtime()))),
        Arc::new(AnalyzeTextPlugin::new()),
    ];

    let mut names: Vec<String> = registry.names();
    names.extend(plugins.iter().map(|p| p.name().to_string()));
    names.push(ListToolsPlugin::NAME.to_string());
    names.sort();
    plugins.push(Arc::new(ListToolsPlugin::new(names)));

    registry.register_all(plugins)?;
    debug!(tools = registry.len(), "Registered built-in tools");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grounded_plugin::{Permission, PluginError};
    use serde_json::Value;

    #[tokio::test]
    async fn test_register_defaults() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        register_defaults(&mut registry).unwrap();

        assert_eq!(
            registry.names(),
            vec![
                "analyze_text",
                "get_project_info",
                "get_server_status",
                "list_demo_tools"
            ]
        );

        let listed = registry.execute("list_demo_tools", Value::Null).await.unwrap();
        assert!(listed.content.contains("get_server_status"));

        let status = registry.execute("get_server_status", Value::Null).await.unwrap();
        assert!(status.content.contains("toolCallsSinceStartup=2"));
    }

    #[test]
    fn test_register_defaults_twice_fails() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        register_defaults(&mut registry).unwrap();
        assert!(register_defaults(&mut registry).is_err());
    }

    #[test]
    fn test_status_requires_read_permission() {
        let mut registry = PluginRegistry::new(Permission::NONE);
        assert!(register_defaults(&mut registry).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_registration_leaves_registry_unchanged() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        registry.register(Arc::new(AnalyzeTextPlugin::new())).unwrap();

        let err = register_defaults(&mut registry).unwrap_err();
        assert!(matches!(err, PluginError::Duplicate(name) if name == "analyze_text"));
        assert_eq!(registry.names(), vec!["analyze_text"]);
    }

    #[tokio::test]
    async fn test_tool_list_is_fixed_at_registration() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        register_defaults(&mut registry).unwrap();
        let listed = registry.execute("list_demo_tools", Value::Null).await.unwrap();
        assert_eq!(
            listed.metadata.unwrap()["tools"],
            serde_json::json!(["analyze_text", "get_project_info", "get_server_status", "list_demo_tools"])
        );
    }
}
