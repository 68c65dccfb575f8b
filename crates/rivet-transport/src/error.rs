//! Error types for the transport layer.

use thiserror::Error;

/// Errors raised while starting or running the HTTP listener.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured route path is unusable.
    #[error("invalid route path `{0}`")]
    InvalidPath(String),

    /// I/O failure while serving.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
