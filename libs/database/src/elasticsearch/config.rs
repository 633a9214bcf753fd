use std::time::Duration;
use strum::{Display, EnumString};

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse, env_required};

/// Refresh behaviour requested on write operations.
///
/// Maps 1:1 to the engine's `refresh` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RefreshPolicy {
    /// Do not refresh (engine default behaviour, explicit)
    False,
    /// Refresh the affected shards immediately
    True,
    /// Block until the next scheduled refresh makes the write visible to search
    WaitFor,
}

/// Elasticsearch connection configuration
///
/// # Example
///
/// ```ignore
/// use database::elasticsearch::EsConfig;
///
/// let config = EsConfig::new(["http://localhost:9200"]);
///
/// // From environment variables (requires `config` feature)
/// let config = EsConfig::from_env()?;
/// ```
#[derive(Clone, Debug)]
pub struct EsConfig {
    /// Node base URLs, used round-robin
    pub nodes: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Skip TLS certificate verification (local development clusters only)
    pub accept_invalid_certs: bool,
    pub connect_timeout: Duration,
    /// Budget for single-document calls (index, get, update, delete)
    pub point_timeout: Duration,
    /// Budget for search and index-management calls
    pub search_timeout: Duration,
    pub refresh: Option<RefreshPolicy>,
}

impl EsConfig {
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes
                .into_iter()
                .map(|n| n.into().trim_end_matches('/').to_string())
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeouts(mut self, point: Duration, search: Duration) -> Self {
        self.point_timeout = point;
        self.search_timeout = search;
        self
    }

    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Split a `;`- or `,`-separated address list into trimmed node URLs.
    pub fn parse_nodes(raw: &str) -> Vec<String> {
        raw.split([';', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.trim_end_matches('/').to_string())
            .collect()
    }
}

impl Default for EsConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            username: None,
            password: None,
            accept_invalid_certs: false,
            connect_timeout: Duration::from_secs(10),
            point_timeout: Duration::from_secs(2),
            search_timeout: Duration::from_secs(5),
            refresh: None,
        }
    }
}

/// Load EsConfig from environment variables
///
/// - `ES_HOST_ADDRESSES` (required) - node URLs separated by `;` or `,`
/// - `ES_USERNAME` / `ES_PASSWORD` (optional) - basic auth
/// - `ES_ACCEPT_INVALID_CERTS` (default: false)
/// - `ES_CONNECT_TIMEOUT_SECS` (default: 10)
/// - `ES_POINT_TIMEOUT_MS` (default: 2000)
/// - `ES_SEARCH_TIMEOUT_MS` (default: 5000)
/// - `ES_REFRESH` (optional) - `false`, `true` or `wait_for`
#[cfg(feature = "config")]
impl FromEnv for EsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_required("ES_HOST_ADDRESSES")?;
        let nodes = Self::parse_nodes(&raw);
        if nodes.is_empty() {
            return Err(ConfigError::ParseError {
                key: "ES_HOST_ADDRESSES".to_string(),
                details: "no node addresses given".to_string(),
            });
        }

        let refresh = match std::env::var("ES_REFRESH") {
            Ok(value) if !value.trim().is_empty() => {
                Some(value.trim().parse().map_err(|_| ConfigError::ParseError {
                    key: "ES_REFRESH".to_string(),
                    details: format!("expected false, true or wait_for, got '{}'", value),
                })?)
            }
            _ => None,
        };

        Ok(Self {
            nodes,
            username: std::env::var("ES_USERNAME").ok(),
            password: std::env::var("ES_PASSWORD").ok(),
            accept_invalid_certs: env_parse("ES_ACCEPT_INVALID_CERTS", false)?,
            connect_timeout: Duration::from_secs(env_parse("ES_CONNECT_TIMEOUT_SECS", 10)?),
            point_timeout: Duration::from_millis(env_parse("ES_POINT_TIMEOUT_MS", 2000)?),
            search_timeout: Duration::from_millis(env_parse("ES_SEARCH_TIMEOUT_MS", 5000)?),
            refresh,
        })
    }
}
