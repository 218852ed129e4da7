//! Tracing subscriber and OpenTelemetry metrics initialization.

#[cfg(feature = "metrics")]
use opentelemetry::{KeyValue, global};
#[cfg(feature = "metrics")]
use opentelemetry_otlp::{MetricExporter as OtlpExporter, WithExportConfig};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
};
#[cfg(feature = "metrics")]
use opentelemetry_stdout::MetricExporter as StdoutExporter;
use podgen_error::ConfigError;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;
#[cfg(feature = "metrics")]
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

/// Provider registered by [`init_observability`], kept for shutdown.
#[cfg(feature = "metrics")]
static METER_PROVIDER: OnceLock<SdkMeterProvider> = OnceLock::new();

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Reads `PODGEN_LOG_FORMAT` ("json" selects JSON, anything else pretty).
    pub fn from_env() -> Self {
        match std::env::var("PODGEN_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

/// Initialize OpenTelemetry metrics with OTLP or stdout export.
///
/// Checks the `OTEL_EXPORTER` environment variable:
/// - "otlp" -> OTLP exporter to `OTEL_EXPORTER_OTLP_ENDPOINT` (default: http://localhost:4318)
/// - "stdout" or unset -> stdout exporter
///
/// When the `metrics` feature is disabled, this function returns `Ok(())` immediately.
#[instrument(skip_all, fields(service_name))]
pub fn init_observability(
    service_name: &'static str,
    export_interval_secs: u64,
) -> Result<(), ConfigError> {
    #[cfg(not(feature = "metrics"))]
    {
        let _ = export_interval_secs;
        info!(
            service_name = service_name,
            "Metrics feature disabled - skipping metrics initialization"
        );
        Ok(())
    }

    #[cfg(feature = "metrics")]
    {
        info!(
            service_name = service_name,
            export_interval_secs = export_interval_secs,
            "Initializing OpenTelemetry metrics"
        );

        let resource = Resource::builder_empty()
            .with_attributes([KeyValue::new("service.name", service_name)])
            .build();

        let exporter_type = std::env::var("OTEL_EXPORTER").unwrap_or_else(|_| "stdout".to_string());
        info!(exporter_type = %exporter_type, "Selecting metrics exporter");

        let meter_provider = match exporter_type.as_str() {
            "otlp" => {
                let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:4318".to_string());
                info!(endpoint = %endpoint, "Using OTLP metrics exporter");

                let exporter = OtlpExporter::builder()
                    .with_http()
                    .with_endpoint(&endpoint)
                    .with_timeout(Duration::from_secs(10))
                    .build()
                    .map_err(|e| {
                        ConfigError::new(format!("Failed to create OTLP exporter: {}", e))
                    })?;

                let reader = PeriodicReader::builder(exporter)
                    .with_interval(Duration::from_secs(export_interval_secs))
                    .build();

                SdkMeterProvider::builder()
                    .with_resource(resource)
                    .with_reader(reader)
                    .build()
            }
            _ => {
                info!("Using stdout metrics exporter");
                let reader = PeriodicReader::builder(StdoutExporter::default())
                    .with_interval(Duration::from_secs(export_interval_secs))
                    .build();

                SdkMeterProvider::builder()
                    .with_resource(resource)
                    .with_reader(reader)
                    .build()
            }
        };

        if METER_PROVIDER.set(meter_provider.clone()).is_err() {
            debug!("Meter provider already initialized; replacing global provider");
        }
        global::set_meter_provider(meter_provider);
        debug!("Meter provider registered globally");
        Ok(())
    }
}

/// Shutdown metrics provider gracefully, flushing the final export.
#[instrument]
pub fn shutdown_observability() {
    info!("Shutting down observability");

    #[cfg(feature = "metrics")]
    if let Some(provider) = METER_PROVIDER.get() {
        match provider.shutdown() {
            Ok(()) => debug!("Meter provider flushed and shut down"),
            Err(e) => tracing::warn!(error = %e, "Meter provider shutdown failed"),
        }
    }

    debug!("Observability shutdown complete");
}
