//! Routes and error mapping.
//!
//! | Method | Path                     | Body / response                         |
//! |--------|--------------------------|-----------------------------------------|
//! | GET    | `/`                      | service status                          |
//! | GET    | `/api/health/ollama`     | [`GenerativeHealth`]                    |
//! | POST   | `/api/summarize/search`  | [`SearchRequest`] → [`BatchResult`]     |
//!
//! Validation failures are 400 with `{"detail": ...}`; anything else is a 500
//! with a generic detail so upstream errors never leak to callers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::generative;
use crate::error::PipelineError;
use crate::models::{BatchResult, SearchRequest};
use crate::pipeline::Pipeline;
use crate::summarize::{GenerativeHealth, health_report};

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// 400 with the given detail.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, detail: detail.into() }
    }

    /// 500 with the generic detail.
    #[must_use]
    pub fn internal() -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, detail: "Internal server error".to_string() }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        if err.is_client_error() {
            Self::bad_request(err.to_user_message())
        } else {
            tracing::error!(error = %err, "Summarize search failed");
            Self::internal()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Build the router with permissive CORS and request tracing.
pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health/ollama", get(ollama_health))
        .route("/api/summarize/search", post(summarize_search))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(pipeline)
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "medlit-summarizer",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ollama_health(State(pipeline): State<Arc<Pipeline>>) -> Json<GenerativeHealth> {
    let report = match pipeline.summarizer().generative() {
        Some(backend) => health_report(backend.as_ref()).await,
        None => GenerativeHealth {
            ollama_status: "disconnected".to_string(),
            model: generative::DEFAULT_MODEL.to_string(),
            available_models: Vec::new(),
            backend_status: "operational".to_string(),
        },
    };
    Json(report)
}

async fn summarize_search(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    tracing::info!(query = %request.query, num_papers = request.num_papers, "Summarize search request");

    let batch = pipeline.process_request(&request).await?;
    Ok(Json(batch))
}
