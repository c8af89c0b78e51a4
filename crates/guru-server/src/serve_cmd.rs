use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use guru_core::prompt::{self, ChatTurn};
use guru_core::section::{ANNUAL_PLAN, DAILY_PACKAGE, DAILY_PACKAGE_WITH_VIDEO};
use guru_core::{FragmentStream, Generator, GeneratorError, demux_stream};

use crate::relay;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    /// The upstream failure is logged here; clients get a fixed message
    /// rather than provider internals.
    pub fn upstream(err: GeneratorError) -> Self {
        tracing::error!(error = %err, "generation request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Gagal memproses permintaan.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub mata_pelajaran: String,
    #[serde(default)]
    pub kelas: String,
    #[serde(default)]
    pub topik: String,
    #[serde(default)]
    pub with_video: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRequest {
    #[serde(default)]
    pub mata_pelajaran: String,
    #[serde(default)]
    pub kelas: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub context: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn Generator>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/generate", post(generate))
        .route("/api/planning", post(planning))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(generator: Arc<dyn Generator>, listen: &str) -> Result<()> {
    let app = build_router(AppState { generator });
    let addr: SocketAddr = listen.parse()?;
    tracing::info!("guru serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("guru serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Html<&'static str> {
    Html(
        "<!DOCTYPE html>\
<html><head><title>guru</title></head><body>\
<h1>guru</h1>\
<p><code>POST /api/generate</code> | <code>POST /api/planning</code> | <code>POST /api/chat</code></p>\
<p><a href=\"/healthz\">/healthz</a></p>\
</body></html>",
    )
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<axum::response::Response, AppError> {
    if request.mata_pelajaran.trim().is_empty()
        || request.kelas.trim().is_empty()
        || request.topik.trim().is_empty()
    {
        return Err(AppError::bad_request("Input tidak lengkap."));
    }

    let sections = if request.with_video {
        DAILY_PACKAGE_WITH_VIDEO
    } else {
        DAILY_PACKAGE
    };
    let prompt = prompt::lesson_package(
        &request.mata_pelajaran,
        &request.kelas,
        &request.topik,
        sections,
    );

    let fragments = state
        .generator
        .stream(&prompt)
        .await
        .map_err(AppError::upstream)?;
    Ok(relay::section_response(demux_stream(fragments, sections)))
}

async fn planning(
    State(state): State<AppState>,
    Json(request): Json<PlanningRequest>,
) -> Result<axum::response::Response, AppError> {
    if request.mata_pelajaran.trim().is_empty() || request.kelas.trim().is_empty() {
        return Err(AppError::bad_request("Input tidak lengkap."));
    }

    let prompt = prompt::annual_plan(&request.mata_pelajaran, &request.kelas, ANNUAL_PLAN);

    let fragments = state
        .generator
        .stream(&prompt)
        .await
        .map_err(AppError::upstream)?;
    Ok(relay::section_response(demux_stream(fragments, ANNUAL_PLAN)))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<axum::response::Response, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::bad_request("Input tidak lengkap."));
    }

    let context = if request.context.trim().is_empty() {
        None
    } else {
        Some(request.context.as_str())
    };
    let prompt = prompt::chat(&request.history, context, &request.message);

    let fragments = state
        .generator
        .stream(&prompt)
        .await
        .map_err(AppError::upstream)?;
    Ok(relay::fragment_response(passthrough(fragments)))
}

/// Chat responses are relayed untagged, so decode failures are simply
/// dropped instead of wedging a section.
fn passthrough(fragments: FragmentStream) -> impl Stream<Item = String> + Send + 'static {
    fragments.filter_map(|fragment| async move {
        match fragment {
            Ok(text) => Some(text),
            Err(error) => {
                tracing::warn!(error = %error, "skipping undecodable fragment");
                None
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
