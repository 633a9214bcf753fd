use axum_helpers::OAuthConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};

// Import Elasticsearch config from the database library
use database::elasticsearch::EsConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub elasticsearch: EsConfig,
    pub oauth: OAuthConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let elasticsearch = EsConfig::from_env()?;
        let oauth = OAuthConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            elasticsearch,
            oauth,
            server,
            environment,
        })
    }
}
