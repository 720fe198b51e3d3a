//! HTTP API for Reasongraph projects.
//!
//! This crate serves the project store over HTTP so browser or scripted
//! clients can read and edit reasoning graphs, download exports, and request
//! model-driven expansion of a node.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   HTTP client   │────>│   axum router   │────>│  ProjectStore   │
//! │  (/api/**)      │     │   (envelopes)   │     │  (JSON / CBOR)  │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! reasongraph-server --config server.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ServerConfig`] for configuration options.

pub mod config;
pub mod http;

pub use config::ServerConfig;
pub use http::{AppState, HttpServer, SharedStore, create_router};
