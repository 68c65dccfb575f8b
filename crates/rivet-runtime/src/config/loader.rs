//! Configuration loader using figment.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults, or a base config passed to [`ConfigLoader::merge`]
//! 2. Main config file (`rivet.toml` / `rivet.yaml`)
//! 3. Profile-specific config file (`rivet.{profile}.toml`)
//! 4. Environment variables (`RIVET_*`)
//! 5. Single keys set with [`ConfigLoader::set`]
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files
//! - `yaml-config`: enables YAML configuration files
//!
//! # Environment Variable Mapping
//!
//! Variables use the `RIVET_` prefix with `__` separating nested keys:
//!
//! - `RIVET_APPLICATION__PUBLIC_KEY=...` → `application.public_key`
//! - `RIVET_SERVER__PORT=9000` → `server.port = 9000`
//! - `RIVET_EXECUTION__RESPONSE_TIMEOUT_MS=2000` → `execution.response_timeout_ms`
//!
//! # Example
//!
//! ```rust,ignore
//! use rivet_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./deploy/rivet.toml")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::RivetConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "RIVET_";
const PROFILE_VAR: &str = "RIVET_PROFILE";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `prod` and `dev` are accepted as aliases.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `RIVET_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multi-source configuration loader.
pub struct ConfigLoader {
    base: Figment,
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            base: Figment::new(),
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory searched for `rivet.*` files.
    ///
    /// When no search path is given, the current directory and the user
    /// config directory (`~/.config/rivet` on Linux) are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching.
    ///
    /// A profile-specific sibling (`rivet.production.toml` next to
    /// `rivet.toml`) is still layered on top when present.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Replaces the built-in defaults with `config`.
    ///
    /// Files and environment variables still override it.
    pub fn merge(mut self, config: RivetConfig) -> Self {
        self.base = self.base.merge(Serialized::defaults(config));
        self
    }

    /// Overrides a single dotted key after every other source.
    ///
    /// ```rust,ignore
    /// let config = ConfigLoader::new().set("server.port", 9000).load()?;
    /// ```
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Loads and validates the configuration.
    pub fn load(self) -> ConfigResult<RivetConfig> {
        let config = self.extract()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Loads the configuration without validating it.
    pub fn extract(self) -> ConfigResult<RivetConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: RivetConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;

        debug!(
            profile = %profile,
            addr = %config.server.addr(),
            path = %config.server.path,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(RivetConfig::default()));
        figment = figment.merge(std::mem::take(&mut self.base));

        if let Some(path) = self.config_file.take() {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_config_file(figment, &path)?;

            let sibling = profile_variant(&path, &self.profile);
            if let Some(sibling) = sibling.filter(|p| p.exists()) {
                debug!(path = %sibling.display(), "Loading profile-specific config");
                figment = merge_config_file(figment, &sibling)?;
            }
        } else {
            figment = self.load_config_files(figment)?;
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("rivet"));
        }
        paths
    }

    /// Uses the first directory holding a base file for any enabled format.
    fn load_config_files(&self, mut figment: Figment) -> ConfigResult<Figment> {
        for dir in self.resolve_search_paths() {
            let found: Vec<PathBuf> = base_file_names()
                .iter()
                .map(|name| dir.join(name))
                .filter(|p| p.exists())
                .collect();
            let Some(base) = found.first() else {
                continue;
            };

            info!(path = %base.display(), "Loading configuration file");
            figment = merge_config_file(figment, base)?;
            if let Some(sibling) = profile_variant(base, &self.profile).filter(|p| p.exists()) {
                debug!(path = %sibling.display(), "Loading profile-specific config");
                figment = merge_config_file(figment, &sibling)?;
            }
            return Ok(figment);
        }

        warn!("No configuration file found, using defaults");
        Ok(figment)
    }
}

fn base_file_names() -> &'static [&'static str] {
    &[
        #[cfg(feature = "toml-config")]
        "rivet.toml",
        #[cfg(feature = "yaml-config")]
        "rivet.yaml",
        #[cfg(feature = "yaml-config")]
        "rivet.yml",
    ]
}

/// `dir/rivet.toml` → `dir/rivet.{profile}.toml`.
fn profile_variant(path: &Path, profile: &Profile) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{stem}.{profile}.{ext}")))
}

/// Dispatches on the file extension; only enabled formats are accepted.
fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::ParseError(format!(
            "Unsupported or disabled configuration file format: .{ext}"
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
