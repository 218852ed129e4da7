//! Job handling for the podgen worker.
//!
//! [`JobHandler`] is the single per-job entry point. The HTTP runner in
//! this crate stands in for the serverless platform locally: it accepts
//! jobs on `POST /runsync`, reports `GET /health` and serves job counters
//! on `GET /metrics`.

mod api;
mod config;
mod handler;
mod metrics;

pub use api::{bind, create_router, serve};
pub use config::{ServerConfig, ServerConfigBuilder};
pub use handler::JobHandler;
pub use metrics::{JobMetrics, JobMetricsSnapshot, JobOutcome};
