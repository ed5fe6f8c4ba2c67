mod ai;
mod config;
mod error;
mod handlers;
mod metadata;
mod models;
mod services;
mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::ai::{CompletionClient, OpenRouterClient};
use crate::config::{AssetProvider, Config};
use crate::metadata::MetadataStore;
use crate::storage::AssetStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub metadata: Arc<MetadataStore>,
    pub assets: Arc<dyn AssetStore>,
    pub completion: Arc<dyn CompletionClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local .env fallback for credentials
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wardrobe=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Virtual Wardrobe...");

    // Load configuration
    let config = Arc::new(Config::load()?);
    tracing::info!("Configuration loaded");

    let metadata = Arc::new(MetadataStore::new(&config.metadata.path));
    tracing::info!("Metadata file: {}", metadata.path().display());

    let assets = storage::from_config(&config);
    tracing::info!("Asset store: {}", assets.storage_type());

    let completion: Arc<dyn CompletionClient> = Arc::new(OpenRouterClient::new(&config.openrouter)?);

    // Create app state
    let state = AppState {
        config: config.clone(),
        metadata,
        assets,
        completion,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/closet", get(handlers::closet::browse_closet))
        .route("/options", get(handlers::closet::tag_options))
        .route("/items", post(handlers::closet::upload_item))
        .route("/items/:position", delete(handlers::closet::delete_item))
        .route("/outfits/suggest", post(handlers::outfit::suggest_outfits));

    let mut app = Router::new().nest("/api/v1", api_routes);

    // Locally stored images are served by the application itself
    if state.config.assets.provider == AssetProvider::Local {
        app = app.nest_service("/assets", ServeDir::new(&state.config.assets.local_path));
    }

    let upload_limit = state.config.server.max_upload_mb * 1024 * 1024;

    app.layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
