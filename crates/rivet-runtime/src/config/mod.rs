//! Configuration for the Rivet runtime.
//!
//! Layered figment loading, the typed schema and post-load validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    ApplicationConfig, ExecutionConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
    RivetConfig, ServerConfig, SpanEventConfig,
};
pub use validation::validate_config;
