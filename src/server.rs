use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::{ClassificationResult, VisionPipeline};
use crate::vision::TextRecognitionResult;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<VisionPipeline>,
    default_image_url: Arc<str>,
}

impl AppState {
    pub fn new(pipeline: VisionPipeline, default_image_url: &str) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            default_image_url: Arc::from(default_image_url),
        }
    }

    fn image_url(&self, query: ImageQuery) -> String {
        query
            .url_image
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.default_image_url.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    url_image: Option<String>,
}

/// Any fault the pipelines do not turn into a JSON error body.
///
/// Logged in full, answered with a bare 500.
pub struct InternalError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for InternalError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for InternalError {
    fn into_response(self) -> Response {
        log::error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Build the router with both analysis routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/text_recognition", get(text_recognition_handler))
        .route("/classification", get(classification_handler))
        .with_state(state)
}

async fn text_recognition_handler(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Json<TextRecognitionResult>, InternalError> {
    let url = state.image_url(query);
    let result = state.pipeline.text_recognition(&url).await?;
    Ok(Json(result))
}

async fn classification_handler(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Json<ClassificationResult>, InternalError> {
    let url = state.image_url(query);
    let result = state.pipeline.classification(&url).await?;
    Ok(Json(result))
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(config: &Config) -> Result<()> {
    let missing = config.missing_credentials();
    if !missing.is_empty() {
        log::warn!("Credentials not set: {}", missing.join(", "));
    }

    let state = AppState::new(VisionPipeline::new(config), &config.server.default_image_url);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    log::info!("Listening on http://{addr}");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
