//! Metrics infrastructure for the fetch pipeline
//!
//! Each phase defines its metrics in a dedicated submodule. The recorder is only
//! installed when the process opts in; until then every `metrics` macro call is a no-op.

pub mod fetch;
pub mod registry;

pub use fetch::FetchMetrics;

use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder with an HTTP listener at `addr`.
///
/// Idempotent: later calls return `true` without reinstalling.
pub fn init_metrics(addr: &str) -> bool {
    if HANDLE.get().is_some() {
        return true;
    }

    let addr = match addr.parse::<SocketAddr>() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics addr '{}': {}", addr, e);
            return false;
        }
    };

    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Prometheus handle was already stored");
            }
            info!("Prometheus exporter listening at http://{}/metrics", addr);
            registry::register_all_metrics();
            true
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            false
        }
    }
}

/// Implemented by each pipeline phase's metric collection
pub trait PhaseMetrics {
    /// Pre-register so metrics show up on `/metrics` before first use
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    #[allow(dead_code)]
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// Phase-scoped metric names: `jobs_{phase}_{name}` with `_total` on counters
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("jobs_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("jobs_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
