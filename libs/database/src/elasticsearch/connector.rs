use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

use super::{EsConfig, RefreshPolicy};
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry, retry_with_backoff};

/// Cluster identity returned by `GET /`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    pub cluster_name: String,
    pub version: ClusterVersion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterVersion {
    pub number: String,
}

/// Shared handle to an Elasticsearch cluster.
///
/// Cloning is cheap; all clones share one pooled `reqwest::Client` and one
/// round-robin cursor over the configured nodes.
#[derive(Clone)]
pub struct EsConnection {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    nodes: Vec<String>,
    cursor: AtomicUsize,
    username: Option<String>,
    password: Option<String>,
    point_timeout: Duration,
    search_timeout: Duration,
    refresh: Option<RefreshPolicy>,
}

impl EsConnection {
    /// Build a connection handle without touching the network.
    pub fn new(config: &EsConfig) -> DatabaseResult<Self> {
        if config.nodes.is_empty() {
            return Err(DatabaseError::ConfigError(
                "at least one Elasticsearch node is required".to_string(),
            ));
        }
        for node in &config.nodes {
            reqwest::Url::parse(node).map_err(|e| {
                DatabaseError::ConfigError(format!("invalid node URL '{}': {}", node, e))
            })?;
        }

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                nodes: config.nodes.clone(),
                cursor: AtomicUsize::new(0),
                username: config.username.clone(),
                password: config.password.clone(),
                point_timeout: config.point_timeout,
                search_timeout: config.search_timeout,
                refresh: config.refresh,
            }),
        })
    }

    /// Absolute URL for `path` on the next node in rotation.
    pub fn url(&self, path: &str) -> String {
        let idx = self.inner.cursor.fetch_add(1, Ordering::Relaxed) % self.inner.nodes.len();
        format!("{}/{}", self.inner.nodes[idx], path.trim_start_matches('/'))
    }

    /// Start a request against the next node, with credentials applied.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.inner.http.request(method, self.url(path));
        match &self.inner.username {
            Some(user) => builder.basic_auth(user, self.inner.password.as_deref()),
            None => builder,
        }
    }

    pub fn point_timeout(&self) -> Duration {
        self.inner.point_timeout
    }

    pub fn search_timeout(&self) -> Duration {
        self.inner.search_timeout
    }

    pub fn refresh(&self) -> Option<RefreshPolicy> {
        self.inner.refresh
    }

    pub fn nodes(&self) -> &[String] {
        &self.inner.nodes
    }

    /// Ask the cluster who it is.
    pub async fn cluster_info(&self) -> DatabaseResult<ClusterInfo> {
        let response = self
            .request(Method::GET, "/")
            .timeout(self.inner.search_timeout)
            .send()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DatabaseError::ConnectionFailed(format!(
                "cluster answered {}",
                response.status()
            )));
        }

        Ok(response.json::<ClusterInfo>().await?)
    }
}

impl std::fmt::Debug for EsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsConnection")
            .field("nodes", &self.inner.nodes)
            .field("point_timeout", &self.inner.point_timeout)
            .field("search_timeout", &self.inner.search_timeout)
            .finish_non_exhaustive()
    }
}

/// Connect to a single node with default settings.
///
/// # Example
/// ```ignore
/// let conn = database::elasticsearch::connect("http://localhost:9200").await?;
/// ```
pub async fn connect(url: &str) -> DatabaseResult<EsConnection> {
    connect_from_config(&EsConfig::new([url])).await
}

/// Build a connection from config and verify the cluster answers.
pub async fn connect_from_config(config: &EsConfig) -> DatabaseResult<EsConnection> {
    info!(nodes = ?config.nodes, "Attempting to connect to Elasticsearch");

    let conn = EsConnection::new(config)?;
    let cluster = conn.cluster_info().await?;

    info!(
        cluster = %cluster.cluster_name,
        version = %cluster.version.number,
        "Elasticsearch client connected"
    );
    Ok(conn)
}

/// [`connect_from_config`] with exponential backoff; useful while the
/// cluster is still starting next to the service.
pub async fn connect_from_config_with_retry(
    config: &EsConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<EsConnection> {
    match retry_config {
        Some(policy) => retry_with_backoff(|| connect_from_config(config), policy).await,
        None => retry(|| connect_from_config(config)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_node_list() {
        let config = EsConfig {
            nodes: vec![],
            ..EsConfig::default()
        };
        assert!(matches!(
            EsConnection::new(&config),
            Err(DatabaseError::ConfigError(_))
        ));
    }

    #[test]
    fn test_new_rejects_malformed_url() {
        let config = EsConfig::new(["not a url"]);
        assert!(matches!(
            EsConnection::new(&config),
            Err(DatabaseError::ConfigError(_))
        ));
    }

    #[test]
    fn test_url_rotates_across_nodes() {
        let config = EsConfig::new(["http://es-1:9200", "http://es-2:9200"]);
        let conn = EsConnection::new(&config).unwrap();

        assert_eq!(conn.url("/items/_doc/1"), "http://es-1:9200/items/_doc/1");
        assert_eq!(conn.url("items/_doc/1"), "http://es-2:9200/items/_doc/1");
        assert_eq!(conn.url("/"), "http://es-1:9200/");
    }

    #[test]
    fn test_clones_share_rotation() {
        let config = EsConfig::new(["http://es-1:9200", "http://es-2:9200"]);
        let conn = EsConnection::new(&config).unwrap();
        let other = conn.clone();

        conn.url("/");
        assert_eq!(other.url("/"), "http://es-2:9200/");
    }

    #[tokio::test]
    #[ignore] // Requires a running Elasticsearch
    async fn test_connect() {
        let url = std::env::var("ES_URL").unwrap_or_else(|_| "http://localhost:9200".to_string());
        assert!(connect(&url).await.is_ok());
    }
}
