//! Elasticsearch connection management
//!
//! Holds node addresses, credentials, per-call-class timeouts and the pooled
//! HTTP client. Document-level operations live with the domain that owns the
//! documents; this module only gets a caller to a healthy cluster.

mod config;
mod connector;
mod health;

pub use config::{EsConfig, RefreshPolicy};
pub use connector::{
    ClusterInfo, ClusterVersion, EsConnection, connect, connect_from_config,
    connect_from_config_with_retry,
};
pub use health::{HealthStatus, check_health, check_health_detailed};

// Re-export the HTTP types callers build requests with
pub use reqwest::{Method, StatusCode};
