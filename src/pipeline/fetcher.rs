use super::orchestrator::FetchOrchestrator;
use crate::app::ports::HttpClientPort;
use crate::error::Result;
use crate::infra::ReqwestHttp;
use crate::strategies::FetchStrategy;
use crate::telemetry::{Telemetry, TelemetryHandle};
use crate::types::{FetchConfig, FetchResult, JobSource};
use std::sync::Arc;
use tracing::instrument;

/// Entry point used by webhook handlers, schedulers and the CLI.
///
/// Owns the network capability, the strategy list in priority order and an
/// optional telemetry backend. Holds no per-fetch state, so one fetcher can serve
/// concurrent calls for different companies.
pub struct JobFetcher {
    http: Arc<dyn HttpClientPort>,
    strategies: Vec<Box<dyn FetchStrategy>>,
    telemetry: Option<Arc<dyn Telemetry>>,
    orchestrator: FetchOrchestrator,
}

impl JobFetcher {
    pub fn new(http: Arc<dyn HttpClientPort>, strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        Self {
            http,
            strategies,
            telemetry: None,
            orchestrator: FetchOrchestrator::new(),
        }
    }

    /// Reqwest transport sized from the config's timeout and retries
    pub fn from_config(
        config: &FetchConfig,
        strategies: Vec<Box<dyn FetchStrategy>>,
    ) -> Result<Self> {
        let http = ReqwestHttp::from_config(config)?;
        Ok(Self::new(Arc::new(http), strategies))
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    #[instrument(skip(self, config), fields(company_id = %config.company_id))]
    pub async fn fetch_jobs(&self, config: &FetchConfig, source: JobSource) -> FetchResult {
        let telemetry = TelemetryHandle::new(self.telemetry.as_deref());
        self.orchestrator
            .execute(config, source, &self.strategies, self.http.as_ref(), telemetry)
            .await
    }
}
