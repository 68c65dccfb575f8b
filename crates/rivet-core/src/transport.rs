//! Transport-neutral request and reply types.
//!
//! A transport adapter (see `rivet-transport`) converts whatever its server
//! library hands it into an [`InteractionRequest`] and writes the returned
//! [`InteractionReply`] back verbatim. Nothing in between knows about HTTP
//! libraries.

/// The raw inputs of one interactions request.
///
/// Headers are optional here; a missing header is a verification failure,
/// not a transport failure.
#[derive(Debug, Clone, Default)]
pub struct InteractionRequest {
    /// Value of `X-Signature-Timestamp`.
    pub timestamp: Option<String>,
    /// Value of `X-Signature-Ed25519`.
    pub signature: Option<String>,
    /// Raw, unparsed body bytes.
    pub body: Vec<u8>,
}

impl InteractionRequest {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_signature(mut self, timestamp: impl Into<String>, signature: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self.signature = Some(signature.into());
        self
    }
}

/// What the transport writes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionReply {
    /// HTTP status code.
    pub status: u16,
    /// JSON body; empty for 401.
    pub body: Vec<u8>,
}

impl InteractionReply {
    /// 200 with a JSON body.
    pub fn json(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }

    /// 401 with an empty body.
    pub fn unauthorized() -> Self {
        Self {
            status: 401,
            body: Vec::new(),
        }
    }

    /// 400 with a short JSON error.
    pub fn bad_request(reason: &str) -> Self {
        let body = serde_json::to_vec(&serde_json::json!({ "error": reason }))
            .unwrap_or_default();
        Self { status: 400, body }
    }

    /// 500 with an empty body.
    pub fn internal_error() -> Self {
        Self {
            status: 500,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
