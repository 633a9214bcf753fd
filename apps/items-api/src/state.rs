//! Application state management.

use axum_helpers::OAuthClient;
use database::elasticsearch::EsConnection;
use domain_items::{EsItemRepository, ItemService};

/// Shared application state.
///
/// Cloned for each router (inexpensive Arc clones); the engine connection
/// pool and the OAuth HTTP client are shared by every clone.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// Elasticsearch connection (round-robin over the configured nodes)
    pub es: EsConnection,
    pub oauth: OAuthClient,
    pub items: ItemService<EsItemRepository>,
}
