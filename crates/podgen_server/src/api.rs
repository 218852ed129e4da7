//! HTTP job runner: synchronous job execution, health and metrics.

use crate::{JobHandler, ServerConfig};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use podgen_core::{Job, JobResponse};
use podgen_error::{PodgenResult, ServerError, ServerErrorKind};
use serde_json::json;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{info, instrument};

/// Creates the job runner router.
pub fn create_router(handler: JobHandler) -> Router {
    Router::new()
        .route("/runsync", post(run_sync))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .with_state(handler)
}

/// Run one job to completion and return its output.
#[instrument(skip_all)]
async fn run_sync(State(handler): State<JobHandler>, Json(job): Json<Job>) -> impl IntoResponse {
    let id = job
        .id()
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let output = handler.handle(&job).await;
    (StatusCode::OK, Json(JobResponse::completed(id, output)))
}

/// Health check endpoint.
#[instrument(skip_all)]
async fn health_check(State(handler): State<JobHandler>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "model": handler.adapter().model() })),
    )
}

/// Job counters in JSON format.
#[instrument(skip_all)]
async fn get_metrics(State(handler): State<JobHandler>) -> impl IntoResponse {
    (StatusCode::OK, Json(handler.metrics().snapshot()))
}

/// Bind the listening socket described by `config`.
pub async fn bind(config: &ServerConfig) -> PodgenResult<TcpListener> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        ServerError::new(ServerErrorKind::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })
    })?;
    Ok(listener)
}

/// Serve jobs on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, handler: JobHandler, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    info!(addr = %addr, model = handler.adapter().model(), "Job runner listening");

    axum::serve(listener, create_router(handler))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;

    info!("Job runner stopped");
    Ok(())
}
