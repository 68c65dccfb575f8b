//! Runtime error types.

use std::io;

use rivet_core::VerifyError;
use rivet_framework::RegistryError;
use rivet_transport::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building or running a Rivet application.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The command and component definitions do not form a valid registry.
    #[error("Invalid registry: {0}")]
    Registry(#[from] RegistryError),

    /// The HTTP listener failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The configured public key could not be turned into a verifier.
    #[error("Invalid application public key: {0}")]
    InvalidPublicKey(#[from] VerifyError),

    /// Installing the shutdown signal handlers failed.
    #[error("Failed to listen for shutdown signals: {0}")]
    Signal(#[source] io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
