/// Strategy names, used for logging, telemetry and `FetchResult::method`

pub const JSON_API_STRATEGY: &str = "json_api";
pub const HTML_SCRAPE_STRATEGY: &str = "html_scrape";

/// Reported as `method` when no strategy produced a result
pub const NO_METHOD: &str = "none";

/// The only error text a caller ever sees from a failed fetch
pub const ALL_STRATEGIES_FAILED: &str = "All fetch strategies failed";

/// Telemetry phase and status labels
pub const FETCH_PHASE: &str = "fetch";
pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_STRATEGY_FAILED: &str = "strategy_failed";
pub const STATUS_ALL_FAILED: &str = "all_strategies_failed";

pub const DEFAULT_EMPLOYMENT_TYPE: &str = "Full-time";

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_METRICS_ADDR: &str = "127.0.0.1:9898";

pub const USER_AGENT: &str = concat!("job_scraper/", env!("CARGO_PKG_VERSION"));

/// All built-in strategy names, in default priority order
pub fn get_supported_strategies() -> Vec<&'static str> {
    vec![JSON_API_STRATEGY, HTML_SCRAPE_STRATEGY]
}
