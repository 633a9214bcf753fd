/// Errors raised while establishing or probing a backing store.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "elasticsearch")]
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection failed (node unreachable, cluster not answering)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Configuration error (bad node URL, unusable credentials)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
