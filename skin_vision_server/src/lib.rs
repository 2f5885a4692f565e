use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use skin_vision::{AnalysisError, AnalysisOutcome, AnalysisPool, PipelineConfig, SkinReport};
use tracing::{error, info};

pub mod concerns;

use concerns::{Concern, concerns_for};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Overrides the pool's default worker count.
    pub worker_count: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5001".to_string(),
            worker_count: None,
        }
    }
}

impl ServerConfig {
    /// Reads `SKIN_VISION_BIND` and `SKIN_VISION_WORKERS`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Some(bind) = lookup("SKIN_VISION_BIND").filter(|bind| !bind.is_empty()) {
            cfg.bind_addr = bind;
        }
        if let Some(workers) = lookup("SKIN_VISION_WORKERS").filter(|workers| !workers.is_empty()) {
            let parsed: usize = workers
                .parse()
                .with_context(|| format!("SKIN_VISION_WORKERS must be a positive integer, got {workers:?}"))?;
            anyhow::ensure!(parsed > 0, "SKIN_VISION_WORKERS must be a positive integer, got {workers:?}");
            cfg.worker_count = Some(parsed);
        }
        Ok(cfg)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut pipeline = PipelineConfig::default();
        if let Some(workers) = self.worker_count {
            pipeline.worker_count = workers;
        }
        pipeline
    }
}

/// Everything a handler needs. Built once before serving and passed to the router.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<AnalysisPool>,
}

impl AppState {
    pub fn new(pool: AnalysisPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub image_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConcernsResponse {
    pub analysis: SkinReport,
    pub concerns: Vec<Concern>,
}

fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::NotFound { .. } => StatusCode::NOT_FOUND,
        AnalysisError::Decode { .. } | AnalysisError::EmptyImage { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::MissingAttribute(_) | AnalysisError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: AnalysisError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        error!(%error, "analysis failed");
    }
    let body = AnalysisOutcome::Error {
        error: error.client_message(),
    };
    (status, Json(body)).into_response()
}

pub async fn analyze_handler(State(state): State<AppState>, Json(request): Json<AnalyzeRequest>) -> Response {
    match state.pool.analyze(request.image_path).await {
        Ok(report) => Json(report).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn concerns_handler(State(state): State<AppState>, Json(request): Json<AnalyzeRequest>) -> Response {
    match state.pool.analyze(request.image_path).await {
        Ok(report) => Json(ConcernsResponse {
            concerns: concerns_for(&report),
            analysis: report,
        })
        .into_response(),
        Err(error) => error_response(error),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze_handler))
        .route("/concerns", post(concerns_handler))
        .with_state(state)
}

/// Binds `cfg.bind_addr` and serves on a background task.
pub async fn start_server(
    state: AppState,
    cfg: &ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    let local_addr = listener.local_addr()?;
    let app = router(state);

    let server = tokio::spawn(async move {
        info!("Skin analysis server listening on http://{local_addr}");
        if let Err(err) = axum::serve(listener, app).await {
            error!(%err, "server stopped");
        }
    });

    Ok((local_addr, server))
}
