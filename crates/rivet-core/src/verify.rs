//! Ed25519 request verification.
//!
//! The platform signs every request with the application's key pair. The
//! signed message is the `X-Signature-Timestamp` header value immediately
//! followed by the raw request body; the signature itself arrives hex-encoded
//! in `X-Signature-Ed25519`.
//!
//! # Example
//!
//! ```rust,ignore
//! use rivet_core::SignatureVerifier;
//!
//! let verifier = SignatureVerifier::from_hex(&config.application.public_key)?;
//! verifier.verify(timestamp, signature, &body)?;
//! ```

use std::fmt;

use ed25519_dalek::{PUBLIC_KEY_LENGTH, Signature, VerifyingKey};

use crate::error::{VerifyError, VerifyResult};

/// Header carrying the hex-encoded Ed25519 signature.
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";

/// Header carrying the timestamp that prefixes the signed message.
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Verifies request signatures against the application's public key.
///
/// Cheap to clone; the key is 32 bytes.
#[derive(Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Creates a verifier from an already-parsed key.
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Parses a hex-encoded 32-byte public key.
    pub fn from_hex(public_key: &str) -> VerifyResult<Self> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| VerifyError::MalformedKey(e.to_string()))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|b: Vec<u8>| {
            VerifyError::MalformedKey(format!(
                "expected {PUBLIC_KEY_LENGTH} bytes, got {}",
                b.len()
            ))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| VerifyError::MalformedKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Checks `signature` (hex) over `timestamp ‖ body`.
    ///
    /// Uses strict verification, which rejects small-order keys and
    /// non-canonical signatures.
    pub fn verify(&self, timestamp: &str, signature: &str, body: &[u8]) -> VerifyResult<()> {
        let raw = hex::decode(signature.trim()).map_err(|_| VerifyError::MalformedSignature)?;
        let signature =
            Signature::from_slice(&raw).map_err(|_| VerifyError::MalformedSignature)?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify_strict(&message, &signature)
            .map_err(|_| VerifyError::BadSignature)
    }

    /// Like [`verify`](Self::verify), but takes the headers as they arrive
    /// from the transport, reporting which one is missing.
    pub fn verify_headers(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> VerifyResult<()> {
        let timestamp = timestamp.ok_or(VerifyError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = signature.ok_or(VerifyError::MissingHeader(SIGNATURE_HEADER))?;
        self.verify(timestamp, signature, body)
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("key", &hex::encode(self.key.as_bytes()))
            .finish()
    }
}
