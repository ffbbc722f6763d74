//! Registering a custom tool next to the built-in ones.

use async_trait::async_trait;
use grounded::prelude::*;
use grounded::grounded_plugin::{PluginError, PluginOutput};
use serde_json::{json, Value};
use std::sync::Arc;

/// Looks up how long a record category is retained.
struct RetentionLookup;

#[async_trait]
impl Plugin for RetentionLookup {
    fn name(&self) -> &str {
        "retention_lookup"
    }

    fn description(&self) -> &str {
        "Returns the retention period for a record category"
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "category": { "type": "string" } },
            "required": ["category"]
        })
    }

    fn required_permission(&self) -> Permission {
        Permission::READ_ONLY
    }

    async fn execute(&self, input: Value) -> grounded::grounded_plugin::Result<PluginOutput> {
        let category = input["category"]
            .as_str()
            .ok_or_else(|| PluginError::InvalidInput("missing 'category'".to_string()))?;
        let years = match category {
            "customer" | "payroll" => 7,
            "employee" => 6,
            other => return Err(PluginError::ExecutionFailed(format!("unknown category: {}", other))),
        };
        Ok(PluginOutput::new(format!("{} records: {} years", category, years)))
    }
}

#[tokio::test]
async fn custom_tool_registers_alongside_defaults() -> anyhow::Result<()> {
    let mut registry = PluginRegistry::new(Permission::READ_ONLY);
    registry.register(Arc::new(RetentionLookup))?;
    register_defaults(&mut registry)?;

    let listing = registry.execute("list_demo_tools", Value::Null).await?;
    assert!(listing.content.contains("retention_lookup"));

    let output = registry
        .execute("retention_lookup", json!({"category": "employee"}))
        .await?;
    assert_eq!(output.content, "employee records: 6 years");

    let err = registry
        .execute("retention_lookup", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, PluginError::InvalidInput(_)));

    let status = registry.execute("get_server_status", Value::Null).await?;
    assert!(status.content.contains("toolCallsSinceStartup=4"));
    Ok(())
}
