//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api;
use crate::models::AppConfig;
use crate::services::{
    FileSessionStore, InMemorySessionStore, LayeredSessionStore, SessionManager, SessionStore,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub config: Arc<AppConfig>,
}

impl FromRef<AppState> for Arc<SessionManager> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Create application state from configuration.
///
/// Sessions live in memory only unless `data_dir` is set, in which case they
/// are cached in memory and written through to disk.
pub async fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn SessionStore> = match &config.data_dir {
        Some(dir) => {
            let durable = FileSessionStore::open(dir)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to open session store: {e}"))?;
            Arc::new(LayeredSessionStore::new(Arc::new(durable)))
        }
        None => {
            tracing::info!("No data directory configured, sessions are kept in memory");
            Arc::new(InMemorySessionStore::new())
        }
    };

    let sessions = Arc::new(SessionManager::new(
        store,
        config.generation.clone(),
        config.display.clone(),
    ));

    Ok(AppState {
        sessions,
        config: Arc::new(config),
    })
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        // Session lifecycle
        .route("/api/session", post(api::create_session))
        .route(
            "/api/upload/:id",
            post(api::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/generate/:id", post(api::generate))
        .route("/api/params/:id", post(api::update_params))
        .route("/api/undo/:id", post(api::undo))
        .route("/api/row-at/:id", post(api::row_at))
        // Palette
        .route("/api/palette/:id", get(api::get_palette))
        .route("/api/color/replace/:id", post(api::replace_color))
        .route("/api/color/delete/:id", post(api::delete_color))
        .route("/api/color/merge/:id", post(api::merge_colors))
        .route("/api/clusters/:id", get(api::get_clusters))
        .route("/api/simplify/:id", post(api::simplify))
        .route("/api/simplify-bw/:id", post(api::simplify_bw))
        // Grid
        .route("/api/cell/:id", post(api::paint_cell))
        .route("/api/region/:id", post(api::region_replace))
        .route("/api/grid/:id", get(api::get_grid))
        .route("/api/grid/:id/png", get(api::get_grid_png))
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state and tracing
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // The chart editor is served from a different origin
        .layer(CorsLayer::permissive())
}
