//! grounded - Answers grounded in a private knowledge base
//!
//! This is the convenience wrapper crate that re-exports grounded components
//! with optional feature flags for easy usage.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! grounded = "0.1"  # Includes core + built-in tools by default
//! ```
//!
//! # Features
//!
//! - `std` (default): Include the built-in tools

// Re-export core
pub use grounded_core::*;
pub use grounded_plugin;

// Re-export built-in tools if feature is enabled
#[cfg(feature = "std")]
pub use grounded_std;

/// Prelude module for convenient imports
pub mod prelude {
    pub use grounded_core::rag::{Document, DocumentStore, SearchRequest};
    pub use grounded_core::{Answer, Config, QueryError, QueryOrchestrator, Server};
    pub use grounded_plugin::{Permission, Plugin, PluginRegistry};

    #[cfg(feature = "std")]
    pub use grounded_std::register_defaults;
}
