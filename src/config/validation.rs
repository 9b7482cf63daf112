//! Configuration validation
//!
//! Checks a [`ClientConfig`] before any request is made:
//! - base URL overrides parse and use http or https
//! - the timeout is usable
//! - a login id has somewhere to read its API key from

use super::client_config::ClientConfig;
use crate::Error;

/// Longest per-request timeout we accept, in seconds
const MAX_TIMEOUT_SECS: u64 = 600;

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a client configuration, collecting every problem found
pub fn validate_config(config: &ClientConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(ref base_url) = config.base_url {
        if let Err(e) = validate_base_url(base_url) {
            errors.push(e);
        }
    }

    if config.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "timeout_secs",
            "Timeout must be greater than 0",
        ));
    } else if config.timeout_secs > MAX_TIMEOUT_SECS {
        errors.push(ValidationError::new(
            "timeout_secs",
            format!("Timeout must be at most {} seconds", MAX_TIMEOUT_SECS),
        ));
    }

    if let Some(ref login_id) = config.login_id {
        if login_id.trim().is_empty() {
            errors.push(ValidationError::new("login_id", "Login id cannot be empty"));
        }
    }

    if config.api_key_env.trim_start_matches('$').trim().is_empty() {
        errors.push(ValidationError::new(
            "api_key_env",
            "API key environment variable name cannot be empty",
        ));
    } else if config.login_id.is_some() && config.api_key().is_none() {
        tracing::warn!(
            env_var = %config.api_key_env.trim_start_matches('$'),
            "API key environment variable not set (this may be intentional if set at runtime)"
        );
    }

    if let Some(ref token_env) = config.auth_token_env {
        if token_env.trim_start_matches('$').trim().is_empty() {
            errors.push(ValidationError::new(
                "auth_token_env",
                "Auth token environment variable name cannot be empty",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_base_url(base_url: &str) -> std::result::Result<(), ValidationError> {
    let url = reqwest::Url::parse(base_url).map_err(|e| {
        ValidationError::new("base_url", format!("Invalid URL '{}': {}", base_url, e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::new(
            "base_url",
            format!("Unsupported URL scheme '{}', expected http or https", other),
        )),
    }
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &ClientConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        Error::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
