use core_config::{ConfigError, FromEnv, env_parse, env_required};
use std::time::Duration;

/// OAuth provider configuration.
///
/// Loaded from environment variables:
/// - `OAUTH_API_BASE_URL` (required) - base URL of the token service
/// - `OAUTH_TIMEOUT_MS` (default: 200) - budget for one token lookup
///
/// # Example
///
/// ```ignore
/// use axum_helpers::OAuthConfig;
/// use core_config::FromEnv;
///
/// let config = OAuthConfig::from_env()?;
/// let config = OAuthConfig::new("http://localhost:8080");
/// ```
#[derive(Clone, Debug)]
pub struct OAuthConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl OAuthConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(200),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for OAuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_required("OAUTH_API_BASE_URL")?;
        if base_url.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: "OAUTH_API_BASE_URL".to_string(),
                details: "must not be empty".to_string(),
            });
        }

        Ok(Self::new(base_url.trim())
            .with_timeout(Duration::from_millis(env_parse("OAUTH_TIMEOUT_MS", 200)?)))
    }
}
