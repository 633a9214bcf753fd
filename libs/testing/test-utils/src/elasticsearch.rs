//! Elasticsearch test infrastructure
//!
//! Provides a `TestElasticsearch` helper that runs a single-node cluster in a container.

use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::elastic_search::ElasticSearch;

/// Test Elasticsearch wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestElasticsearch;
///
/// # async fn example() {
/// let es = TestElasticsearch::new().await;
/// let nodes = vec![es.url().to_string()];
/// // Build the engine connection from `nodes`
/// # }
/// ```
pub struct TestElasticsearch {
    #[allow(dead_code)]
    container: ContainerAsync<ElasticSearch>,
    pub url: String,
}

impl TestElasticsearch {
    /// Start a single-node cluster with security disabled.
    pub async fn new() -> Self {
        let image = ElasticSearch::default()
            .with_env_var("discovery.type", "single-node")
            .with_env_var("xpack.security.enabled", "false")
            .with_env_var("ES_JAVA_OPTS", "-Xms512m -Xmx512m");

        let container = image
            .start()
            .await
            .expect("Failed to start Elasticsearch container");

        let host_port = container
            .get_host_port_ipv4(9200)
            .await
            .expect("Failed to get Elasticsearch port");

        let url = format!("http://127.0.0.1:{}", host_port);

        tracing::info!(port = host_port, "Test Elasticsearch ready");

        Self { container, url }
    }

    /// Base URL of the single node, e.g. `http://127.0.0.1:49153`
    pub fn url(&self) -> &str {
        &self.url
    }
}

// Container is automatically cleaned up when TestElasticsearch is dropped
impl Drop for TestElasticsearch {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Elasticsearch container");
    }
}
