use crate::{Permission, Plugin, PluginError, PluginOutput, Result, ServerRuntime};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Registry mapping operation names to plugins.
///
/// The registry is built once at startup and is responsible for:
/// - Validating registrations (unique names, permission checks)
/// - Looking up plugins by name
/// - Executing plugins and counting calls on the shared [`ServerRuntime`]
/// - Providing plugin specifications to clients
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn Plugin>>,
    granted_permissions: Permission,
    runtime: Arc<ServerRuntime>,
}

impl PluginRegistry {
    /// Create a new plugin registry with the given permissions and a fresh runtime.
    pub fn new(granted_permissions: Permission) -> Self {
        Self::with_runtime(granted_permissions, Arc::new(ServerRuntime::new()))
    }

    /// Create a registry that counts calls on an existing runtime.
    pub fn with_runtime(granted_permissions: Permission, runtime: Arc<ServerRuntime>) -> Self {
        Self {
            plugins: BTreeMap::new(),
            granted_permissions,
            runtime,
        }
    }

    /// Register a plugin.
    ///
    /// Fails if another plugin already uses the same name, or if the plugin
    /// requires more than the granted permissions.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        self.register_all(vec![plugin])
    }

    /// Register several plugins at once.
    ///
    /// Every plugin is checked before any is inserted, so on error the
    /// registry is unchanged.
    pub fn register_all(&mut self, plugins: Vec<Arc<dyn Plugin>>) -> Result<()> {
        {
            let mut incoming = BTreeSet::new();
            for plugin in &plugins {
                self.check(plugin.as_ref(), &mut incoming)?;
            }
        }

        for plugin in plugins {
            self.plugins.insert(plugin.name().to_string(), plugin);
        }
        Ok(())
    }

    fn check<'a>(&self, plugin: &'a dyn Plugin, incoming: &mut BTreeSet<&'a str>) -> Result<()> {
        let name = plugin.name();
        if self.plugins.contains_key(name) || !incoming.insert(name) {
            return Err(PluginError::Duplicate(name.to_string()));
        }

        if !self.granted_permissions.allows(&plugin.required_permission()) {
            warn!(plugin = %name, "Plugin requires permissions that were not granted");
            return Err(PluginError::PermissionDenied(name.to_string()));
        }
        Ok(())
    }

    /// Get a plugin by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.get(name)
    }

    /// Names of all registered plugins, ordered.
    pub fn names(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn runtime(&self) -> &Arc<ServerRuntime> {
        &self.runtime
    }

    /// Execute a plugin by name.
    ///
    /// Every dispatched call is counted, including calls that fail inside the plugin.
    pub async fn execute(&self, name: &str, input: Value) -> Result<PluginOutput> {
        let plugin = self
            .get(name)
            .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))?;

        let calls = self.runtime.increment_and_get_call_count();
        info!(plugin = %name, calls, "tool called");

        plugin.execute(input).await
    }

    /// Get plugin specifications for clients.
    pub fn plugin_specs(&self) -> Vec<Value> {
        self.plugins
            .values()
            .map(|plugin| {
                serde_json::json!({
                    "name": plugin.name(),
                    "description": plugin.description(),
                    "parameters": plugin.parameter_schema(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct TestPlugin {
        name: &'static str,
        permission: Permission,
    }

    impl TestPlugin {
        fn read_only(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                permission: Permission::READ_ONLY,
            })
        }
    }

    #[async_trait]
    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "A test plugin"
        }

        fn parameter_schema(&self) -> Value {
            serde_json::json!({})
        }

        fn required_permission(&self) -> Permission {
            self.permission
        }

        async fn execute(&self, _input: Value) -> crate::Result<PluginOutput> {
            Ok(PluginOutput::new("test output"))
        }
    }

    #[test]
    fn test_registry_permissions() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);

        assert!(registry.register(TestPlugin::read_only("test")).is_ok());
        assert!(registry.get("test").is_some());
    }

    #[test]
    fn test_registry_permission_denial() {
        let mut registry = PluginRegistry::new(Permission::NONE);

        let err = registry.register(TestPlugin::read_only("test")).unwrap_err();
        assert!(matches!(err, PluginError::PermissionDenied(_)));
        assert!(registry.get("test").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        registry.register(TestPlugin::read_only("test")).unwrap();

        let err = registry.register(TestPlugin::read_only("test")).unwrap_err();
        assert!(matches!(err, PluginError::Duplicate(name) if name == "test"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_all_is_all_or_nothing() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        registry.register(TestPlugin::read_only("existing")).unwrap();

        let err = registry
            .register_all(vec![TestPlugin::read_only("fresh"), TestPlugin::read_only("existing")])
            .unwrap_err();
        assert!(matches!(err, PluginError::Duplicate(name) if name == "existing"));
        assert_eq!(registry.names(), vec!["existing"]);

        let err = registry
            .register_all(vec![TestPlugin::read_only("twin"), TestPlugin::read_only("twin")])
            .unwrap_err();
        assert!(matches!(err, PluginError::Duplicate(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_all_checks_permissions_first() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        let needs_write = Arc::new(TestPlugin {
            name: "writer",
            permission: Permission {
                write: true,
                ..Permission::READ_ONLY
            },
        });

        let err = registry
            .register_all(vec![TestPlugin::read_only("reader"), needs_write])
            .unwrap_err();
        assert!(matches!(err, PluginError::PermissionDenied(name) if name == "writer"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        registry.register(TestPlugin::read_only("zeta")).unwrap();
        registry.register(TestPlugin::read_only("alpha")).unwrap();

        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert_eq!(registry.plugin_specs()[0]["name"], "alpha");
    }

    #[tokio::test]
    async fn test_execute_counts_calls() {
        let mut registry = PluginRegistry::new(Permission::READ_ONLY);
        registry.register(TestPlugin::read_only("test")).unwrap();

        let output = registry.execute("test", Value::Null).await.unwrap();
        assert_eq!(output.content, "test output");
        registry.execute("test", Value::Null).await.unwrap();
        assert_eq!(registry.runtime().call_count(), 2);
    }

    #[tokio::test]
    async fn test_execute_unknown_plugin_is_not_counted() {
        let registry = PluginRegistry::new(Permission::READ_ONLY);

        let err = registry.execute("missing", Value::Null).await.unwrap_err();
        assert!(matches!(err, PluginError::UnknownPlugin(_)));
        assert_eq!(registry.runtime().call_count(), 0);
    }
}
