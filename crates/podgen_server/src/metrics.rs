//! Job counters for the worker.
//!
//! Counts are always kept in process and served as a JSON snapshot. With
//! the `metrics` feature the same events also go to OpenTelemetry
//! instruments on the global meter.

#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// How a job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobOutcome {
    /// Generation produced output
    Succeeded,
    /// Generation returned an error payload
    Failed,
    /// Input had neither `messages` nor `prompt`
    Rejected,
}

impl JobOutcome {
    /// Label used for the outcome attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Succeeded => "succeeded",
            JobOutcome::Failed => "failed",
            JobOutcome::Rejected => "rejected",
        }
    }
}

/// OpenTelemetry instruments for job handling.
///
/// Available with the `metrics` feature.
#[cfg(feature = "metrics")]
#[derive(Clone)]
struct JobInstruments {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    jobs: Counter<u64>,
    duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl JobInstruments {
    fn new() -> Self {
        let meter = global::meter("podgen_jobs");
        Self {
            _meter: meter.clone(),
            jobs: meter
                .u64_counter("job.count")
                .with_description("Jobs handled, by outcome")
                .build(),
            duration: meter
                .f64_histogram("job.duration")
                .with_unit("seconds")
                .with_description("Job handling duration")
                .build(),
        }
    }

    fn record(&self, outcome: JobOutcome, elapsed: Duration) {
        let labels = &[KeyValue::new("outcome", outcome.as_str())];
        self.jobs.add(1, labels);
        self.duration.record(elapsed.as_secs_f64(), labels);
    }
}

/// Process-wide job counters.
#[derive(Default)]
pub struct JobMetrics {
    received: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
    total_micros: AtomicU64,
    #[cfg(feature = "metrics")]
    instruments: Option<JobInstruments>,
}

impl std::fmt::Debug for JobMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobMetrics")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl JobMetrics {
    /// Counters only, no OpenTelemetry export.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters plus OpenTelemetry instruments on the global meter.
    #[cfg(feature = "metrics")]
    pub fn with_instruments() -> Self {
        Self {
            instruments: Some(JobInstruments::new()),
            ..Self::default()
        }
    }

    /// Count a job as it arrives.
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a finished job.
    pub fn record_finished(&self, outcome: JobOutcome, elapsed: Duration) {
        let counter = match outcome {
            JobOutcome::Succeeded => &self.succeeded,
            JobOutcome::Failed => &self.failed,
            JobOutcome::Rejected => &self.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total_micros.fetch_add(micros, Ordering::Relaxed);
        debug!(outcome = outcome.as_str(), elapsed_ms = elapsed.as_millis() as u64, "Job finished");

        #[cfg(feature = "metrics")]
        if let Some(instruments) = &self.instruments {
            instruments.record(outcome, elapsed);
        }
    }

    /// Current counter values.
    pub fn snapshot(&self) -> JobMetricsSnapshot {
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let finished = succeeded + failed + rejected;
        let total_secs = self.total_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;

        JobMetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            succeeded,
            failed,
            rejected,
            total_duration_secs: total_secs,
            avg_duration_secs: if finished == 0 {
                0.0
            } else {
                total_secs / finished as f64
            },
        }
    }
}

/// Job counters at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, derive_getters::Getters)]
pub struct JobMetricsSnapshot {
    /// Jobs received
    received: u64,
    /// Jobs that produced output
    succeeded: u64,
    /// Jobs that returned a generation error
    failed: u64,
    /// Jobs rejected for invalid input
    rejected: u64,
    /// Cumulative handling time in seconds
    total_duration_secs: f64,
    /// Mean handling time in seconds
    avg_duration_secs: f64,
}
