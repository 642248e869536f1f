//! Fetch phase metrics
//!
//! Strategy attempts, their outcomes and timings, and how many postings each
//! successful fetch produced.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct FetchMetrics;

impl FetchMetrics {
    /// Every telemetry event, labelled by phase and status
    pub fn record_operation(phase: &str, status: &str, duration_ms: f64) {
        ::metrics::counter!(
            phase_metric!(counter, "fetch", "operations"),
            "phase" => phase.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        ::metrics::histogram!(
            phase_metric!(histogram, "fetch", "duration_ms"),
            "phase" => phase.to_string(),
            "status" => status.to_string()
        )
        .record(duration_ms);
    }

    pub fn record_success(strategy: &str, job_count: usize) {
        ::metrics::counter!(
            phase_metric!(counter, "fetch", "strategy_success"),
            "strategy" => strategy.to_string()
        )
        .increment(1);
        ::metrics::histogram!(
            phase_metric!(histogram, "fetch", "job_count"),
            "strategy" => strategy.to_string()
        )
        .record(job_count as f64);
    }

    pub fn record_strategy_failure(strategy: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "fetch", "strategy_failures"),
            "strategy" => strategy.to_string()
        )
        .increment(1);
    }

    pub fn record_exhausted(strategies_attempted: usize) {
        ::metrics::counter!(phase_metric!(counter, "fetch", "all_strategies_failed")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "fetch", "strategies_attempted"))
            .record(strategies_attempted as f64);
    }
}

impl PhaseMetrics for FetchMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "fetch", "operations"));
        let _ = counter!(phase_metric!(counter, "fetch", "strategy_success"));
        let _ = counter!(phase_metric!(counter, "fetch", "strategy_failures"));
        let _ = counter!(phase_metric!(counter, "fetch", "all_strategies_failed"));

        let _ = histogram!(phase_metric!(histogram, "fetch", "duration_ms"));
        let _ = histogram!(phase_metric!(histogram, "fetch", "job_count"));
        let _ = histogram!(phase_metric!(histogram, "fetch", "strategies_attempted"));
    }

    fn phase_name() -> &'static str {
        "fetch"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "fetch", "operations"),
                metric_type: MetricType::Counter,
                help: "Telemetry events recorded by the fetch orchestrator",
                labels: vec!["phase", "status"],
            },
            MetricDoc {
                name: phase_metric!(counter, "fetch", "strategy_success"),
                metric_type: MetricType::Counter,
                help: "Fetches won by each strategy",
                labels: vec!["strategy"],
            },
            MetricDoc {
                name: phase_metric!(counter, "fetch", "strategy_failures"),
                metric_type: MetricType::Counter,
                help: "Strategy attempts that failed and fell back",
                labels: vec!["strategy"],
            },
            MetricDoc {
                name: phase_metric!(counter, "fetch", "all_strategies_failed"),
                metric_type: MetricType::Counter,
                help: "Fetches where no strategy succeeded",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "fetch", "duration_ms"),
                metric_type: MetricType::Histogram,
                help: "Elapsed time from operation start to the recorded event, in milliseconds",
                labels: vec!["phase", "status"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "fetch", "job_count"),
                metric_type: MetricType::Histogram,
                help: "Normalized postings returned by a successful fetch",
                labels: vec!["strategy"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "fetch", "strategies_attempted"),
                metric_type: MetricType::Histogram,
                help: "Strategies attempted before a fetch gave up",
                labels: vec![],
            },
        ]
    }
}
