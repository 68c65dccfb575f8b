//! Rivet Runtime - hosting layer for Rivet interaction handlers.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`, `RivetConfig`)
//! - Logging setup (`LoggingBuilder`, `init_from_config`)
//! - The request pipeline (`InteractionApp`): signature check, decoding,
//!   dispatch and response encoding
//! - Lifecycle management (`RivetRuntime`)
//!
//! # Features
//!
//! - `toml-config` *(default)*: `rivet.toml` files
//! - `yaml-config`: `rivet.yaml` files
//! - `json-log`: JSON log lines
//! - `http-server` *(default)*: serve the endpoint with the bundled axum server
//!
//! ```ignore
//! use rivet_runtime::RivetRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     RivetRuntime::builder()
//!         .command(echo_command())
//!         .build()?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! Without `http-server`, mount [`InteractionApp`] behind any transport that
//! can call a tower service.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use app::InteractionApp;
pub use config::{ConfigError, ConfigLoader, ConfigResult, Profile, RivetConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};
pub use runtime::{RivetRuntime, RuntimeBuilder, wait_for_shutdown};

#[cfg(feature = "http-server")]
pub use rivet_transport::{HttpServer, ServerHandle};

pub use tracing;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
