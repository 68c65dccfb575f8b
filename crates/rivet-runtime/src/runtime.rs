//! Application lifecycle.
//!
//! [`RivetRuntime`] ties the pieces together: it loads configuration,
//! initialises logging, freezes the registry, builds the executor and
//! verifier, then serves the interactions endpoint until shutdown.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rivet_runtime::RivetRuntime;
//!
//! RivetRuntime::builder()
//!     .config_file("rivet.toml")
//!     .command(CommandDefinition::new("echo").param(text).handler(echo))
//!     .component(counter_button())
//!     .build()?
//!     .run()
//!     .await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use rivet_core::SignatureVerifier;
use rivet_framework::{CommandDefinition, ComponentDefinition, Executor, Registry, RegistryBuilder};
use tracing::info;

use crate::app::InteractionApp;
use crate::config::{ConfigLoader, RivetConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// A configured application, ready to serve.
#[derive(Debug, Clone)]
pub struct RivetRuntime {
    config: RivetConfig,
    app: InteractionApp,
}

impl RivetRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already-loaded configuration.
    ///
    /// Validates `config` and installs the global subscriber described by
    /// its logging section.
    pub fn from_config(config: RivetConfig, registry: Arc<Registry>) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let verifier = SignatureVerifier::from_hex(&config.application.public_key)?;
        let executor = Executor::new(
            config.execution.worker_threads,
            config.execution.response_timeout(),
        );

        info!(
            application_id = config.application.application_id.as_deref().unwrap_or("-"),
            commands = registry.commands().count(),
            components = registry.components().len(),
            worker_threads = executor.worker_threads(),
            timeout_ms = executor.timeout().as_millis() as u64,
            "Runtime initialized"
        );

        let app = InteractionApp::new(verifier, registry, executor);
        Ok(Self { config, app })
    }

    pub fn config(&self) -> &RivetConfig {
        &self.config
    }

    /// The request pipeline, for mounting behind a custom transport.
    pub fn app(&self) -> &InteractionApp {
        &self.app
    }

    /// Starts the HTTP server in the background.
    #[cfg(feature = "http-server")]
    pub async fn start(&self) -> RuntimeResult<rivet_transport::ServerHandle> {
        let server = rivet_transport::HttpServer::new(
            self.config.server.addr(),
            self.config.server.path.clone(),
        );
        Ok(server.start(self.app.clone().into_service()).await?)
    }

    /// Serves until Ctrl+C or SIGTERM.
    #[cfg(feature = "http-server")]
    pub async fn run(&self) -> RuntimeResult<()> {
        let handle = self.start().await?;
        info!("Rivet is running. Press Ctrl+C to stop.");

        let result = wait_for_shutdown().await;
        handle.shutdown().await;
        info!("Runtime stopped");
        result
    }

    /// Serves until `shutdown` resolves.
    #[cfg(feature = "http-server")]
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let handle = self.start().await?;
        shutdown.await;
        handle.shutdown().await;
        info!("Runtime stopped");
        Ok(())
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn wait_for_shutdown() -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).map_err(RuntimeError::Signal)?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(RuntimeError::Signal)?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map_err(RuntimeError::Signal)?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Collects configuration sources and definitions for a [`RivetRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    registry: RegistryBuilder,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            registry: RegistryBuilder::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: RivetConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Overrides one dotted configuration key, e.g. `server.port`.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    pub fn command(mut self, definition: CommandDefinition) -> Self {
        self.registry.add_command(definition);
        self
    }

    pub fn component(mut self, definition: ComponentDefinition) -> Self {
        self.registry.add_component(definition);
        self
    }

    /// Loads configuration, freezes the registry and builds the runtime.
    pub fn build(self) -> RuntimeResult<RivetRuntime> {
        let config = self.config_loader.extract()?;
        let registry = self.registry.build()?;
        RivetRuntime::from_config(config, registry)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
