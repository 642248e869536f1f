//! Optional observability side-channel.
//!
//! The orchestrator only ever talks to a [`TelemetryHandle`]. With no backend
//! attached every call is a no-op, and nothing recorded here feeds back into
//! control flow.

use crate::constants::{STATUS_ALL_FAILED, STATUS_STRATEGY_FAILED, STATUS_SUCCESS};
use crate::metrics::FetchMetrics;
use tracing::{debug, Span};

/// Key/value pairs attached to a metrics event or span
pub type Attributes = Vec<(String, String)>;

pub fn attr(key: impl Into<String>, value: impl ToString) -> (String, String) {
    (key.into(), value.to_string())
}

fn lookup<'a>(attributes: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// A telemetry backend
pub trait Telemetry: Send + Sync {
    fn record_metrics(
        &self,
        operation_id: &str,
        phase: &str,
        status: &str,
        duration_ms: f64,
        attributes: &[(String, String)],
    );

    fn set_span_attributes(&self, span: &Span, attributes: &[(String, String)]);
}

/// Borrowed, possibly absent telemetry backend
#[derive(Clone, Copy, Default)]
pub struct TelemetryHandle<'a> {
    backend: Option<&'a dyn Telemetry>,
}

impl<'a> TelemetryHandle<'a> {
    pub fn new(backend: Option<&'a dyn Telemetry>) -> Self {
        Self { backend }
    }

    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn is_active(&self) -> bool {
        self.backend.is_some()
    }

    pub fn record_metrics(
        &self,
        operation_id: &str,
        phase: &str,
        status: &str,
        duration_ms: f64,
        attributes: &[(String, String)],
    ) {
        if let Some(backend) = self.backend {
            backend.record_metrics(operation_id, phase, status, duration_ms, attributes);
        }
    }

    pub fn set_span_attributes(&self, span: &Span, attributes: &[(String, String)]) {
        if let Some(backend) = self.backend {
            backend.set_span_attributes(span, attributes);
        }
    }
}

/// Telemetry backed by the `metrics` facade and `tracing` spans
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsTelemetry;

impl MetricsTelemetry {
    pub fn new() -> Self {
        Self
    }
}

impl Telemetry for MetricsTelemetry {
    fn record_metrics(
        &self,
        operation_id: &str,
        phase: &str,
        status: &str,
        duration_ms: f64,
        attributes: &[(String, String)],
    ) {
        FetchMetrics::record_operation(phase, status, duration_ms);

        let strategy = lookup(attributes, "strategy").unwrap_or("unknown");
        match status {
            STATUS_SUCCESS => {
                let job_count = lookup(attributes, "job_count")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                FetchMetrics::record_success(strategy, job_count);
            }
            STATUS_STRATEGY_FAILED => FetchMetrics::record_strategy_failure(strategy),
            STATUS_ALL_FAILED => {
                let attempted = lookup(attributes, "strategies_attempted")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                FetchMetrics::record_exhausted(attempted);
            }
            _ => {}
        }

        debug!(
            operation_id,
            phase,
            status,
            duration_ms,
            attributes = ?attributes,
            "telemetry event"
        );
    }

    fn set_span_attributes(&self, span: &Span, attributes: &[(String, String)]) {
        // Fields not declared on the span are ignored by `record`, so mirror them as an event
        for (key, value) in attributes {
            span.record(key.as_str(), value.as_str());
        }
        debug!(parent: span, attributes = ?attributes, "span attributes");
    }
}
