//! Reasongraph Common Library
//!
//! Shared types and services for the Reasongraph workspace:
//!
//! - [`model`] - Reasoning graph data model (`ReasoningProject`, `ReasoningNode`, `NodeType`)
//! - [`store`] - `GraphStore` mutation interface and file-backed `ProjectStore`
//! - [`export`] - JSON and Markdown export
//! - [`expansion`] - Model-driven node expansion through OpenRouter
//! - [`serialization`] - JSON/CBOR encoding and decoding
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod expansion;
pub mod export;
pub mod model;
pub mod serialization;
pub mod store;

// Re-export commonly used types at the crate root
pub use config::{AiConfig, LogFormat, LoggingConfig, load_config, parse_config};
pub use error::{Error, Result};
pub use expansion::{ExpansionSettings, OpenRouterClient, apply_expansion, parse_response};
pub use model::{
    AiModel, NodeId, NodeMetadata, NodeType, ProjectId, ProjectSettings, ReasoningNode,
    ReasoningProject, WorldPoint,
};
pub use serialization::{Format, decode, decode_auto, encode};
pub use store::{
    Connection, GraphStore, NodePatch, PersistRequest, ProjectPatch, ProjectStore, persist,
};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))
}
