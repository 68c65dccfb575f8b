//! Configuration validation.

use rivet_core::{SignatureVerifier, Snowflake};

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    ApplicationConfig, ExecutionConfig, LogOutput, LoggingConfig, RivetConfig, ServerConfig,
};

/// Upper bound on the response timeout; the platform gives up after 3 s.
pub const MAX_RESPONSE_TIMEOUT_MS: u64 = 3000;

/// Validates the entire configuration.
pub fn validate_config(config: &RivetConfig) -> ConfigResult<()> {
    validate_application(&config.application)?;
    validate_server(&config.server)?;
    validate_execution(&config.execution)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_application(app: &ApplicationConfig) -> ConfigResult<()> {
    if app.public_key.trim().is_empty() {
        return Err(ConfigError::missing_field("application.public_key"));
    }
    SignatureVerifier::from_hex(app.public_key.trim())
        .map_err(|e| ConfigError::InvalidPublicKey(e.to_string()))?;

    if let Some(id) = &app.application_id
        && id.parse::<Snowflake>().is_err()
    {
        return Err(ConfigError::validation(format!(
            "application.application_id is not a snowflake: {id}"
        )));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> ConfigResult<()> {
    if server.host.is_empty() {
        return Err(ConfigError::missing_field("server.host"));
    }
    if server.port == 0 {
        return Err(ConfigError::InvalidPort(server.port));
    }
    if !server.path.starts_with('/') {
        return Err(ConfigError::validation(format!(
            "server.path must start with '/': {}",
            server.path
        )));
    }
    Ok(())
}

fn validate_execution(execution: &ExecutionConfig) -> ConfigResult<()> {
    if execution.worker_threads == 0 {
        return Err(ConfigError::validation(
            "execution.worker_threads must be at least 1",
        ));
    }
    if execution.response_timeout_ms == 0
        || execution.response_timeout_ms >= MAX_RESPONSE_TIMEOUT_MS
    {
        return Err(ConfigError::validation(format!(
            "execution.response_timeout_ms must be between 1 and {}",
            MAX_RESPONSE_TIMEOUT_MS - 1
        )));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    fn valid() -> RivetConfig {
        let mut config = RivetConfig::default();
        config.application.public_key = KEY.to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_public_key() {
        let mut config = valid();
        config.application.public_key = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.application.public_key = "not-hex".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_application_id() {
        let mut config = valid();
        config.application.application_id = Some("1234567890".to_string());
        assert!(validate_config(&config).is_ok());
        config.application.application_id = Some("abc".to_string());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_server() {
        let mut config = valid();
        config.server.port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPort(0))
        ));

        let mut config = valid();
        config.server.path = "interactions".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_execution_bounds() {
        let mut config = valid();
        config.execution.worker_threads = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.execution.response_timeout_ms = MAX_RESPONSE_TIMEOUT_MS;
        assert!(validate_config(&config).is_err());
        config.execution.response_timeout_ms = 2999;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = valid();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));
        config.logging.file_path = Some("rivet.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
