use crate::normalize::to_iso;
use crate::types::{FetchConfig, JobSource};
use chrono::{DateTime, Utc};
use std::time::Instant;
use uuid::Uuid;

/// Per-invocation identity and timing, built once by the orchestrator and only read afterwards
#[derive(Debug, Clone)]
pub struct OperationContext {
    start_time: Instant,
    fetched_at: DateTime<Utc>,
    operation_id: String,
    source: JobSource,
    company_id: String,
}

impl OperationContext {
    pub fn new(config: &FetchConfig, source: JobSource) -> Self {
        Self {
            start_time: Instant::now(),
            fetched_at: Utc::now(),
            operation_id: Uuid::new_v4().to_string(),
            source,
            company_id: config.company_id.clone(),
        }
    }

    /// Wall-clock time the operation started; doubles as the batch `processedAt`
    pub fn fetched_at(&self) -> &DateTime<Utc> {
        &self.fetched_at
    }

    pub fn fetched_at_iso(&self) -> String {
        to_iso(&self.fetched_at)
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn source(&self) -> JobSource {
        self.source
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}
