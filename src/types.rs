use crate::constants::{ALL_STRATEGIES_FAILED, DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS, NO_METHOD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw posting data exactly as a strategy pulled it from the source
pub type RawRecord = serde_json::Value;

/// Which caller context triggered a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    Webhook,
    Scheduled,
    Manual,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Webhook => "webhook",
            JobSource::Scheduled => "scheduled",
            JobSource::Manual => "manual",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webhook" => Ok(JobSource::Webhook),
            "scheduled" => Ok(JobSource::Scheduled),
            "manual" => Ok(JobSource::Manual),
            other => Err(format!(
                "unknown job source '{other}' (expected webhook, scheduled or manual)"
            )),
        }
    }
}

/// A posting in the canonical schema handed to downstream delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub description: String,
    /// RFC 3339 / ISO-8601, always parseable
    pub posted_date: String,
    pub apply_url: String,
    pub source: JobSource,
    pub raw_data: RawRecord,
    pub processed_at: String,
}

/// Where and how to fetch postings for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    #[serde(default, alias = "company_id")]
    pub company_id: String,
    /// Primary source URL (careers page or API)
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "alternate_urls")]
    pub alternate_urls: Vec<String>,
    #[serde(default = "default_timeout_ms", alias = "timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl FetchConfig {
    pub fn new(company_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            url: url.into(),
            alternate_urls: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn with_alternate_urls(mut self, urls: Vec<String>) -> Self {
        self.alternate_urls = urls;
        self
    }
}

/// Outcome of one `fetch_jobs` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub jobs: Vec<NormalizedRecord>,
    pub method: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub fetched_at: String,
    pub total_count: usize,
}

impl FetchResult {
    pub fn succeeded(method: &str, jobs: Vec<NormalizedRecord>, fetched_at: String) -> Self {
        let total_count = jobs.len();
        Self {
            message: Some(format!("Fetched {total_count} jobs via {method}")),
            jobs,
            method: method.to_string(),
            success: true,
            error: None,
            fetched_at,
            total_count,
        }
    }

    /// Terminal result once every strategy failed or was inapplicable
    pub fn exhausted(fetched_at: String) -> Self {
        Self {
            jobs: Vec::new(),
            method: NO_METHOD.to_string(),
            success: false,
            error: Some(ALL_STRATEGIES_FAILED.to_string()),
            message: None,
            fetched_at,
            total_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_source_parses_case_insensitively() {
        assert_eq!("Webhook".parse::<JobSource>().unwrap(), JobSource::Webhook);
        assert_eq!(" scheduled ".parse::<JobSource>().unwrap(), JobSource::Scheduled);
        assert!("cron".parse::<JobSource>().is_err());
    }

    #[test]
    fn test_fetch_config_defaults_from_toml() {
        let config: FetchConfig = toml::from_str(
            r#"
            company_id = "acme"
            url = "https://acme.example/careers"
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.retries, DEFAULT_RETRIES);
        assert!(config.alternate_urls.is_empty());
    }

    #[test]
    fn test_exhausted_result_shape() {
        let result = FetchResult::exhausted("2025-01-01T00:00:00.000Z".into());
        assert!(!result.success);
        assert_eq!(result.method, "none");
        assert_eq!(result.error.as_deref(), Some("All fetch strategies failed"));
        assert_eq!(result.total_count, 0);
        assert!(result.jobs.is_empty());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalCount"], 0);
        assert!(json.get("message").is_none());
    }
}
