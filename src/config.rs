use crate::constants::DEFAULT_METRICS_ADDR;
use crate::error::{FetchError, Result};
use crate::types::FetchConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Company and URL may come from the file or from `JOBS_*` variables;
/// `validate` checks them once every layer is applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

fn default_metrics_addr() -> String {
    DEFAULT_METRICS_ADDR.to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_metrics_addr(),
        }
    }
}

impl AppConfig {
    /// File (an explicit path must exist; the default one is optional) plus environment,
    /// without validation so callers can layer further overrides first
    pub fn from_sources(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            None => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FetchError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Overlay values from `lookup` (normally the process environment)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(company_id) = lookup("JOBS_COMPANY_ID") {
            self.fetch.company_id = company_id;
        }
        if let Some(url) = lookup("JOBS_SOURCE_URL") {
            self.fetch.url = url;
        }
        if let Some(urls) = lookup("JOBS_ALTERNATE_URLS") {
            self.fetch.alternate_urls = urls
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(timeout) = lookup("JOBS_TIMEOUT_MS") {
            self.fetch.timeout_ms = parse_number("JOBS_TIMEOUT_MS", &timeout)?;
        }
        if let Some(retries) = lookup("JOBS_RETRIES") {
            self.fetch.retries = parse_number("JOBS_RETRIES", &retries)?;
        }
        if let Some(addr) = lookup("JOBS_METRICS_ADDR") {
            self.metrics.addr = addr;
            self.metrics.enabled = true;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.company_id.trim().is_empty() {
            return Err(FetchError::Config("company id is required".to_string()));
        }
        if self.fetch.url.trim().is_empty() {
            return Err(FetchError::Config("source url is required".to_string()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| FetchError::Config(format!("{key} must be a number, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[fetch]
company_id = "acme"
url = "https://acme.example/careers"
alternate_urls = ["https://api.acme.example/jobs"]
timeout_ms = 5000

[metrics]
enabled = true
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.fetch.company_id, "acme");
        assert_eq!(config.fetch.alternate_urls.len(), 1);
        assert_eq!(config.fetch.timeout_ms, 5000);
        assert_eq!(config.fetch.retries, crate::constants::DEFAULT_RETRIES);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.addr, DEFAULT_METRICS_ADDR);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .with_env_overrides(env(&[
                ("JOBS_COMPANY_ID", "globex"),
                ("JOBS_SOURCE_URL", "https://globex.example/jobs"),
                ("JOBS_ALTERNATE_URLS", "https://a.example/api, ,https://b.example/api"),
                ("JOBS_RETRIES", "5"),
            ]))
            .unwrap();
        assert_eq!(config.fetch.company_id, "globex");
        assert_eq!(
            config.fetch.alternate_urls,
            vec!["https://a.example/api", "https://b.example/api"]
        );
        assert_eq!(config.fetch.retries, 5);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_invalid_number_and_missing_fields() {
        let err = AppConfig::default()
            .with_env_overrides(env(&[
                ("JOBS_COMPANY_ID", "globex"),
                ("JOBS_SOURCE_URL", "https://globex.example/jobs"),
                ("JOBS_TIMEOUT_MS", "soon"),
            ]))
            .unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));

        let err = AppConfig::default()
            .with_env_overrides(env(&[]))
            .and_then(|config| config.validate())
            .unwrap_err();
        assert!(err.to_string().contains("company id"));
    }

    #[test]
    fn test_file_and_env_split_required_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\ncompany_id = \"acme\"").unwrap();

        let from_file = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(from_file.fetch.company_id, "acme");
        assert_eq!(from_file.fetch.url, "");
        assert!(from_file.validate().is_err());

        let config = from_file
            .with_env_overrides(env(&[("JOBS_SOURCE_URL", "https://acme.example/careers")]))
            .unwrap();
        config.validate().unwrap();
        assert_eq!(config.fetch.url, "https://acme.example/careers");
        assert_eq!(config.fetch.timeout_ms, crate::constants::DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_metrics_only_file_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[metrics]\nenabled = true").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.metrics.enabled);
        assert_eq!(config.fetch, crate::types::FetchConfig::default());
    }
}
