//! Connectors for the backing stores used by the service
//!
//! # Features
//!
//! - `elasticsearch` (default) - Elasticsearch connection, retry and health checks
//! - `config` - `core_config::FromEnv` support for connection settings
//!
//! # Example
//!
//! ```ignore
//! use database::elasticsearch::{self, EsConfig};
//! use core_config::FromEnv;
//!
//! let config = EsConfig::from_env()?;
//! let conn = elasticsearch::connect_from_config_with_retry(&config, None).await?;
//! assert!(elasticsearch::check_health(&conn).await);
//! ```

pub mod common;

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;

pub use common::{DatabaseError, DatabaseResult};
