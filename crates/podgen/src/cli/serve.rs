//! Serve command handler.

use anyhow::Context;
use podgen_engine::{EngineAdapter, EngineConfig};
use podgen_server::{JobHandler, JobMetrics, ServerConfig, ServerConfigBuilder, bind, serve};
use std::sync::Arc;
use tracing::info;

/// Handle the `serve` command
pub async fn handle_serve_command(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let engine_config = EngineConfig::from_env()?;
    let server_config = override_listen(ServerConfig::from_env()?, host, port)?;

    info!(model = %engine_config.model_name(), "Starting podgen worker");
    let adapter = EngineAdapter::from_config(&engine_config)
        .await
        .context("Engine startup failed")?;

    let handler = JobHandler::new(Arc::new(adapter), Arc::new(job_metrics()));
    let listener = bind(&server_config).await?;

    serve(listener, handler, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    })
    .await?;

    Ok(())
}

fn override_listen(
    config: ServerConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<ServerConfig> {
    if host.is_none() && port.is_none() {
        return Ok(config);
    }
    let config = ServerConfigBuilder::default()
        .host(host.unwrap_or_else(|| config.host().clone()))
        .port(port.unwrap_or(*config.port()))
        .build()?;
    config.socket_addr()?;
    Ok(config)
}

#[cfg(feature = "metrics")]
fn job_metrics() -> JobMetrics {
    JobMetrics::with_instruments()
}

#[cfg(not(feature = "metrics"))]
fn job_metrics() -> JobMetrics {
    JobMetrics::new()
}
