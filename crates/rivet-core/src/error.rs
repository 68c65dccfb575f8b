//! Error taxonomy shared by every Rivet crate.
//!
//! Leaf components report their own errors ([`VerifyError`], [`DecodeError`]);
//! the dispatch pipeline folds everything that can go wrong while answering a
//! single interaction into [`DispatchError`], whose [`ErrorCategory`] decides
//! how the failure is surfaced to the platform.

use std::time::Duration;

use thiserror::Error;

use crate::model::InteractionType;

// =============================================================================
// Verification Errors
// =============================================================================

/// Errors produced while checking a request signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// A required signature header was absent.
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    /// The signature header was not 64 hex-encoded bytes.
    #[error("malformed signature")]
    MalformedSignature,

    /// The configured public key could not be parsed.
    #[error("malformed public key: {0}")]
    MalformedKey(String),

    /// The signature did not verify against the configured key.
    #[error("signature mismatch")]
    BadSignature,
}

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors produced while decoding a verified body into an interaction.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The body was not valid JSON or did not match the expected shape.
    #[error("invalid interaction payload: {0}")]
    Json(String),

    /// The `type` discriminant is not one this endpoint understands.
    #[error("unknown interaction type: {0}")]
    UnknownType(u64),

    /// A non-ping interaction arrived without its `data` object.
    #[error("interaction of type {0:?} is missing data")]
    MissingData(InteractionType),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Coarse classification of a [`DispatchError`].
///
/// The category decides the HTTP status and whether the platform receives an
/// ephemeral error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Signature verification failed. Answered with 401.
    Authentication,
    /// The payload or its arguments could not be understood.
    MalformedPayload,
    /// No registered definition matches the interaction.
    UnknownRoute,
    /// The handler failed, panicked, timed out or produced an invalid reply.
    HandlerFault,
}

/// Everything that can go wrong while answering one interaction.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Signature verification failed.
    #[error("authentication failed: {0}")]
    Authentication(#[from] VerifyError),

    /// The envelope or its arguments were malformed.
    #[error("malformed payload: {reason}")]
    MalformedPayload {
        /// Human-readable reason, safe to show the invoking user.
        reason: String,
    },

    /// Nothing is registered for this interaction.
    #[error("unknown route: {reason}")]
    UnknownRoute {
        /// Description of what could not be matched.
        reason: String,
    },

    /// The handler returned an error, panicked or produced an invalid reply.
    #[error("handler fault: {reason}")]
    HandlerFault {
        /// Internal description. Logged, never shown to the user.
        reason: String,
    },

    /// The handler exceeded its response budget.
    #[error("handler timed out after {}ms", budget.as_millis())]
    Timeout {
        /// The budget that was exceeded.
        budget: Duration,
    },
}

impl DispatchError {
    /// Creates a malformed-payload error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// Creates an unknown-route error.
    pub fn unknown_route(reason: impl Into<String>) -> Self {
        Self::UnknownRoute {
            reason: reason.into(),
        }
    }

    /// Creates a handler-fault error.
    pub fn fault(reason: impl Into<String>) -> Self {
        Self::HandlerFault {
            reason: reason.into(),
        }
    }

    /// Returns the coarse category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::MalformedPayload { .. } => ErrorCategory::MalformedPayload,
            Self::UnknownRoute { .. } => ErrorCategory::UnknownRoute,
            Self::HandlerFault { .. } | Self::Timeout { .. } => ErrorCategory::HandlerFault,
        }
    }

    /// Returns the text shown to the invoking user in an ephemeral response.
    ///
    /// Handler faults are deliberately generic; their details go to the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Authentication(_) => "Request could not be verified.".to_string(),
            Self::MalformedPayload { reason } => format!("Invalid input: {reason}"),
            Self::UnknownRoute { .. } => {
                "This interaction is no longer available.".to_string()
            }
            Self::HandlerFault { .. } | Self::Timeout { .. } => {
                "Something went wrong while handling this interaction.".to_string()
            }
        }
    }
}

impl From<DecodeError> for DispatchError {
    fn from(err: DecodeError) -> Self {
        Self::malformed(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for signature verification.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Result type for payload decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for the dispatch pipeline.
pub type DispatchResult<T> = Result<T, DispatchError>;
