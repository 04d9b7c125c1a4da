use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    error::AppResult,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        providers::build_http_client, DiscordApi, DiscordClient, InvidiousProvider,
        RecommendationService, VideoProvider, YoutubeHtmlProvider,
    },
};

pub mod discord;
pub mod recommendations;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
    pub discord: Arc<dyn DiscordApi>,
}

impl AppState {
    pub fn new(recommendations: RecommendationService, discord: Arc<dyn DiscordApi>) -> Self {
        Self {
            recommendations: Arc::new(recommendations),
            discord,
        }
    }

    /// Wires the production providers, in fallback order, and the Discord client
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http_client = build_http_client(config)?;

        let providers: Vec<Arc<dyn VideoProvider>> = vec![
            Arc::new(InvidiousProvider::new(
                http_client.clone(),
                config.instance_directory_url.clone(),
                config.max_instances,
            )),
            Arc::new(YoutubeHtmlProvider::new(
                http_client.clone(),
                config.youtube_base_url.clone(),
            )),
        ];

        Ok(Self::new(
            RecommendationService::new(providers),
            Arc::new(DiscordClient::new(http_client, config)),
        ))
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommendations", get(recommendations::recommend))
        .route("/api/recommendations/youtube", get(recommendations::recommend))
        .nest("/discord", discord_routes())
        .nest("/api/discord", discord_routes())
        .layer(
            // Outermost first: the request ID must exist before the trace span is made
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// Discord connection and delivery routes
fn discord_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(discord::authorize))
        .route("/callback", get(discord::callback))
        .route("/channels", post(discord::channels))
        .route("/send-message", post(discord::send_message))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
