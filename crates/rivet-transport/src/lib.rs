//! # Rivet Transport
//!
//! The HTTP edge of a Rivet application.
//!
//! ## Features
//!
//! - `http-server` (default): an axum listener serving the interactions
//!   endpoint
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  rivet-runtime       │  (verification, decoding, dispatch)
//! ├──────────────────────┤
//! │  rivet-transport     │  <- This crate (HTTP ⇄ InteractionRequest)
//! ├──────────────────────┤
//! │  Network (TCP/HTTP)  │
//! └──────────────────────┘
//! ```
//!
//! The transport is deliberately thin: anything implementing
//! `Service<InteractionRequest, Response = InteractionReply>` can sit behind
//! it.
//!
//! ```rust,ignore
//! use rivet_transport::http::HttpServer;
//!
//! let handle = HttpServer::new("0.0.0.0:8080", "/interactions")
//!     .start(BoxCloneSyncService::new(app))
//!     .await?;
//! // ...
//! handle.shutdown().await;
//! ```

pub mod error;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{TransportError, TransportResult};

#[cfg(feature = "http-server")]
pub use http::{HttpServer, InteractionService, ServerHandle};
