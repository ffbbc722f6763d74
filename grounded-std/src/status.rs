use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use grounded_plugin::{format_uptime, Permission, Plugin, PluginOutput, Result, ServerRuntime};
use serde_json::Value;
use std::sync::Arc;

/// Reports live server-side data: current time, uptime and tool call count.
pub struct ServerStatusPlugin {
    runtime: Arc<ServerRuntime>,
}

impl ServerStatusPlugin {
    pub fn new(runtime: Arc<ServerRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl Plugin for ServerStatusPlugin {
    fn name(&self) -> &str {
        "get_server_status"
    }

    fn description(&self) -> &str {
        "Get current server status: current time (UTC), uptime, and number of tool calls since startup. \
         Use this when you need live server-side data that cannot be obtained from the knowledge base."
    }

    fn parameter_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    fn required_permission(&self) -> Permission {
        Permission::READ_ONLY
    }

    async fn execute(&self, _input: Value) -> Result<PluginOutput> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let uptime = self.runtime.uptime();
        let calls = self.runtime.call_count();

        let content = format!(
            "Server status: currentTimeUtc={}, uptime={}, toolCallsSinceStartup={}",
            now,
            format_uptime(uptime),
            calls
        );

        Ok(PluginOutput::new(content).with_metadata(serde_json::json!({
            "current_time_utc": now,
            "uptime_secs": uptime.as_secs(),
            "tool_calls": calls,
        })))
    }
}
