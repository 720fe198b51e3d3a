//! Reasongraph - infinite-canvas editor for reasoning graphs.
//!
//! The interaction engine lives in [`canvas`] and has no iced dependency;
//! [`view`] adapts it to iced widgets and [`app`] ties both to the project
//! store.

pub mod app;
pub mod canvas;
pub mod config;
pub mod message;
pub mod view;

// Re-export commonly used types
pub use app::Reasongraph;
pub use config::AppConfig;
pub use message::Message;
