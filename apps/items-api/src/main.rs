use axum::{middleware, routing::get};
use axum_helpers::OAuthClient;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_items::{EsDocumentClient, EsItemRepository, ItemService};
use observability::{init_metrics, metrics_handler, metrics_middleware};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let dotenv_loaded = core_config::load_dotenv();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.environment);
    if dotenv_loaded {
        info!("Loaded environment from .env");
    }

    init_metrics();

    // Connect to Elasticsearch with retry
    let es = database::elasticsearch::connect_from_config_with_retry(&config.elasticsearch, None)
        .await?;

    let items = ItemService::new(EsItemRepository::new(EsDocumentClient::new(es.clone())));

    // The service cannot run without its index
    api::items::init_index(&items).await?;

    let oauth = OAuthClient::new(&config.oauth)?;

    // Initialize the application state
    let state = AppState {
        config,
        es,
        oauth,
        items,
    };

    // Build router with API routes
    let api_routes = api::routes(&state);

    // Create a router with OpenAPI docs
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge health, readiness and metrics endpoints
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware));

    info!(
        address = %state.config.server.address(),
        "Starting Items API"
    );

    let server = state.config.server.clone();
    create_production_app(app, &server, server.shutdown_timeout, async move {
        info!("Shutting down: releasing Elasticsearch connection pool");
        drop(state);
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Items API shutdown complete");
    Ok(())
}
