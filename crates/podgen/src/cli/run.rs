//! Run command handler.

use anyhow::Context;
use podgen_core::Job;
use podgen_engine::{EngineAdapter, EngineConfig};
use podgen_server::{JobHandler, JobMetrics};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Parse a job input given inline or as `@path`.
///
/// A job record (any object whose `input` is an object, such as
/// `{"id": "x", "input": {...}}`) is unwrapped to its input mapping.
pub fn read_job_input(arg: &str) -> anyhow::Result<Value> {
    let raw = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job input from {}", path))?,
        None => arg.to_string(),
    };
    let value: Value = serde_json::from_str(&raw).context("Job input is not valid JSON")?;
    Ok(match value {
        Value::Object(mut map) if map.get("input").is_some_and(Value::is_object) => {
            map.remove("input").unwrap_or_default()
        }
        other => other,
    })
}

/// Handle the `run` command
pub async fn handle_run_command(input: &str, pretty: bool) -> anyhow::Result<()> {
    let input = read_job_input(input)?;
    let config = EngineConfig::from_env()?;
    let adapter = EngineAdapter::from_config(&config)
        .await
        .context("Engine startup failed")?;
    let handler = JobHandler::new(Arc::new(adapter), Arc::new(JobMetrics::new()));

    info!("Running single job");
    let result = handler.handle(&Job::new(None, input)).await;

    let rendered = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", rendered);
    Ok(())
}
