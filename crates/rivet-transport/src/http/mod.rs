//! HTTP server for the interactions endpoint.

mod server;

pub use server::{HttpServer, InteractionService, ServerHandle, build_router};
