//! Axum server exposing the interactions endpoint.
//!
//! The server knows nothing about interactions beyond the two signature
//! headers: it lifts each `POST` into an [`InteractionRequest`], hands it to
//! a tower service and writes the returned [`InteractionReply`] back.
//!
//! ```text
//! POST /interactions ──▶ InteractionRequest ──▶ InteractionService
//!                                                      │
//!      200/400/401 ◀── InteractionReply ◀──────────────┘
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use rivet_core::{InteractionReply, InteractionRequest, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower::util::BoxCloneSyncService;
use tracing::{debug, error, info, trace};

use crate::error::{TransportError, TransportResult};

/// The service the server forwards every request to.
pub type InteractionService = BoxCloneSyncService<InteractionRequest, InteractionReply, Infallible>;

/// Configuration of one listening endpoint.
#[derive(Debug, Clone)]
pub struct HttpServer {
    addr: String,
    path: String,
}

impl HttpServer {
    /// Creates a server that will listen on `addr` (`host:port`) and accept
    /// interactions at `path`.
    pub fn new(addr: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            path: path.into(),
        }
    }

    /// Binds the listener and starts serving in the background.
    pub async fn start(self, service: InteractionService) -> TransportResult<ServerHandle> {
        let router = build_router(&self.path, service)?;
        let path = normalize_path(&self.path);

        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: self.addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, path = %path, "HTTP server listening");

        let token = CancellationToken::new();
        let shutdown = token.clone();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, router);
            tokio::select! {
                result = server => {
                    if let Err(e) = result {
                        error!(error = %e, "HTTP server error");
                    }
                }
                () = shutdown.cancelled() => {
                    info!(addr = %local_addr, "HTTP server shutting down");
                }
            }
        });

        Ok(ServerHandle {
            local_addr,
            path,
            token,
            task,
        })
    }
}

/// A running server.
///
/// Dropping the handle leaves the server running; call
/// [`shutdown`](Self::shutdown) to stop it.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    path: String,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound address, including an OS-assigned port.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// A token that stops the server when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stops accepting requests and waits for the serve loop to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "HTTP server task failed");
        }
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Builds the axum router for `path`.
///
/// Exposed so the endpoint can be mounted into a larger application or
/// driven directly in tests.
pub fn build_router(path: &str, service: InteractionService) -> TransportResult<Router> {
    let path = normalize_path(path);
    if path.contains(['{', '}', '*', ' ']) {
        return Err(TransportError::InvalidPath(path));
    }
    Ok(Router::new()
        .route(&path, post(interaction_endpoint))
        .with_state(service))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Axum handler for interaction POSTs.
async fn interaction_endpoint(
    State(service): State<InteractionService>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    trace!(len = body.len(), "Received interaction POST");

    let mut request = InteractionRequest::new(body.to_vec());
    request.signature = header(&headers, SIGNATURE_HEADER).map(str::to_owned);
    request.timestamp = header(&headers, TIMESTAMP_HEADER).map(str::to_owned);

    let reply = match service.oneshot(request).await {
        Ok(reply) => reply,
        Err(never) => match never {},
    };
    debug!(status = reply.status, "Interaction request answered");

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if reply.body.is_empty() {
        status.into_response()
    } else {
        (status, [(CONTENT_TYPE, "application/json")], reply.body).into_response()
    }
}
