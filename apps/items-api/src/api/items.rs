//! Items API routes

use axum::Router;
use domain_items::{IndexStatus, ItemService, ItemRepository, RequestContext, handlers};
use std::time::Duration;
use tracing::info;

use crate::state::AppState;

/// Budget for creating the items index at boot.
const INDEX_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Create items router
pub fn router(state: &AppState) -> Router {
    handlers::router(state.items.clone(), state.oauth.clone())
}

/// Create the items index if absent. Failure is fatal for the process.
pub async fn init_index<R: ItemRepository>(service: &ItemService<R>) -> eyre::Result<()> {
    let ctx = RequestContext::with_timeout(INDEX_BOOTSTRAP_TIMEOUT);
    let status = service
        .ensure_index(&ctx)
        .await
        .map_err(|e| eyre::eyre!("Failed to create items index: {}", e))?;

    match status {
        IndexStatus::Created => info!("Items index created"),
        IndexStatus::AlreadyExists => info!("Items index already exists"),
    }
    Ok(())
}
