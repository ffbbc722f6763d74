mod plugin;
mod registry;
mod runtime;

pub use plugin::{Permission, Plugin, PluginError, PluginOutput, Result};
pub use registry::PluginRegistry;
pub use runtime::{format_uptime, ServerRuntime};
