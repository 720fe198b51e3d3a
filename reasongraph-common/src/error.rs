use thiserror::Error;

/// Common error type for Reasongraph components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CBOR serialization error: {0}")]
    Cbor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Node {0} cannot be connected to itself")]
    SelfConnection(String),

    #[error("Expansion error: {0}")]
    Expansion(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Cbor(e.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(e: ciborium::de::Error<std::io::Error>) -> Self {
        Error::Cbor(e.to_string())
    }
}

impl Error {
    /// Whether this error means the addressed entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NodeNotFound(_) | Error::ProjectNotFound(_))
    }
}

/// Result type alias using Reasongraph's Error.
pub type Result<T> = std::result::Result<T, Error>;
