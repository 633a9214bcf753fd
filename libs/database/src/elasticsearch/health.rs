use reqwest::Method;
use serde::Deserialize;
use std::time::Instant;

use super::EsConnection;

/// Health check status for Elasticsearch
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Cluster reachable and not red
    pub healthy: bool,
    /// `green`, `yellow` or `red` when the cluster answered
    pub cluster_status: Option<String>,
    /// Error details when unhealthy
    pub message: Option<String>,
    pub response_time_ms: u64,
}

#[derive(Deserialize)]
struct ClusterHealth {
    status: String,
}

/// `true` when `_cluster/health` answers with a non-red status.
///
/// A single-node development cluster with zero replicas reports green;
/// yellow is still considered serviceable.
pub async fn check_health(conn: &EsConnection) -> bool {
    check_health_detailed(conn).await.healthy
}

/// Like [`check_health`], with timing and the reported cluster status.
pub async fn check_health_detailed(conn: &EsConnection) -> HealthStatus {
    let start = Instant::now();
    let result = fetch_cluster_health(conn).await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(health) => HealthStatus {
            healthy: health.status != "red",
            message: (health.status == "red").then(|| "cluster status is red".to_string()),
            cluster_status: Some(health.status),
            response_time_ms,
        },
        Err(message) => HealthStatus {
            healthy: false,
            cluster_status: None,
            message: Some(message),
            response_time_ms,
        },
    }
}

async fn fetch_cluster_health(conn: &EsConnection) -> Result<ClusterHealth, String> {
    let response = conn
        .request(Method::GET, "/_cluster/health")
        .timeout(conn.point_timeout())
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("cluster health answered {}", response.status()));
    }

    response
        .json::<ClusterHealth>()
        .await
        .map_err(|e| e.to_string())
}
