//! The request pipeline: verify, decode, dispatch, encode.
//!
//! ```text
//! InteractionRequest
//!        │ verify_headers  ── fail ──▶ 401 (empty body)
//!        │ decode          ── fail ──▶ 400
//!        │ ping?           ── yes  ──▶ 200 {"type":1}
//!        │ Dispatcher::dispatch
//!        ▼
//! InteractionReply 200 (JSON response)
//! ```
//!
//! [`InteractionApp`] is a plain tower [`Service`], so it can be mounted
//! behind the bundled HTTP server or any other transport.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use rivet_core::{
    InteractionReply, InteractionRequest, InteractionResponse, InteractionType, SignatureVerifier,
    decode_interaction,
};
use rivet_framework::{Dispatcher, Executor, Registry};
use tower::Service;
use tracing::{debug, error, warn};

/// Verifies, decodes and dispatches interaction requests.
///
/// Cheap to clone; the verifier and dispatcher are shared.
#[derive(Debug, Clone)]
pub struct InteractionApp {
    verifier: Arc<SignatureVerifier>,
    dispatcher: Dispatcher,
}

impl InteractionApp {
    pub fn new(verifier: SignatureVerifier, registry: Arc<Registry>, executor: Executor) -> Self {
        Self {
            verifier: Arc::new(verifier),
            dispatcher: Dispatcher::new(registry, executor),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Answers one raw request. Never fails; every outcome is a reply.
    pub async fn handle(&self, request: InteractionRequest) -> InteractionReply {
        if let Err(e) = self.verifier.verify_headers(
            request.timestamp.as_deref(),
            request.signature.as_deref(),
            &request.body,
        ) {
            warn!(error = %e, "Rejected unauthenticated request");
            return InteractionReply::unauthorized();
        }

        let interaction = match decode_interaction(&request.body) {
            Ok(interaction) => interaction,
            Err(e) => {
                warn!(error = %e, len = request.body.len(), "Rejected malformed payload");
                return InteractionReply::bad_request(&e.to_string());
            }
        };

        let response = if interaction.interaction_type() == InteractionType::Ping {
            debug!("Answering ping");
            InteractionResponse::pong()
        } else {
            self.dispatcher.dispatch(interaction).await
        };

        match response.to_json() {
            Ok(body) => InteractionReply::json(body),
            Err(e) => {
                error!(error = %e, "Failed to encode interaction response");
                InteractionReply::internal_error()
            }
        }
    }

    /// Boxes the app for the HTTP server.
    #[cfg(feature = "http-server")]
    pub fn into_service(self) -> rivet_transport::InteractionService {
        tower::util::BoxCloneSyncService::new(self)
    }
}

impl Service<InteractionRequest> for InteractionApp {
    type Response = InteractionReply;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<InteractionReply, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: InteractionRequest) -> Self::Future {
        let app = self.clone();
        Box::pin(async move { Ok(app.handle(request).await) })
    }
}
