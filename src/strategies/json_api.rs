use super::{is_http_url, FetchStrategy};
use crate::app::ports::{HeaderList, HttpClientPort};
use crate::constants::JSON_API_STRATEGY;
use crate::error::{FetchError, Result};
use crate::types::{FetchConfig, RawRecord};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Keys a job board API commonly wraps its posting array in, in lookup order
const ARRAY_KEYS: [&str; 5] = ["jobs", "postings", "data", "results", "positions"];
const MAX_WRAPPER_DEPTH: usize = 2;

/// Reads postings from a JSON job-board endpoint.
///
/// Alternate endpoints from the config are tried first, then the primary URL if it
/// looks like an API. The first endpoint that answers 2xx with a posting array wins.
pub struct JsonApiStrategy;

impl Default for JsonApiStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonApiStrategy {
    pub fn new() -> Self {
        Self
    }

    fn looks_like_api(url: &str) -> bool {
        let url = url.to_ascii_lowercase();
        let path = url.split(['?', '#']).next().unwrap_or_default();
        url.contains("/api/")
            || url.contains("://api.")
            || path.ends_with(".json")
            || url.contains("format=json")
    }

    fn endpoints(config: &FetchConfig) -> Vec<&str> {
        let mut endpoints: Vec<&str> = config
            .alternate_urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| is_http_url(u))
            .collect();
        let primary = config.url.trim();
        if is_http_url(primary) && Self::looks_like_api(primary) && !endpoints.contains(&primary) {
            endpoints.push(primary);
        }
        endpoints
    }

    /// Locate the posting array in a response body
    fn find_postings(value: Value, depth: usize) -> Option<Vec<Value>> {
        match value {
            Value::Array(items) => Some(items),
            Value::Object(mut map) if depth < MAX_WRAPPER_DEPTH => ARRAY_KEYS
                .iter()
                .find_map(|key| map.remove(*key))
                .and_then(|inner| Self::find_postings(inner, depth + 1)),
            _ => None,
        }
    }

    fn parse_body(url: &str, body: &str) -> Result<Vec<RawRecord>> {
        let value: Value = serde_json::from_str(body)?;
        Self::find_postings(value, 0).ok_or_else(|| {
            FetchError::Malformed(format!("no posting array in response from {url}"))
        })
    }
}

#[async_trait::async_trait]
impl FetchStrategy for JsonApiStrategy {
    fn name(&self) -> &'static str {
        JSON_API_STRATEGY
    }

    fn can_handle(&self, config: &FetchConfig) -> bool {
        !Self::endpoints(config).is_empty()
    }

    #[instrument(skip(self, config, http), fields(company_id = %config.company_id))]
    async fn extract(
        &self,
        config: &FetchConfig,
        http: &dyn HttpClientPort,
    ) -> Result<Vec<RawRecord>> {
        let headers: HeaderList = vec![("Accept".to_string(), "application/json".to_string())];
        let mut last_error = None;

        for url in Self::endpoints(config) {
            debug!("Trying JSON endpoint {}", url);
            let response = match http.get(url, &headers).await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("JSON endpoint {} unreachable: {}", url, e);
                    last_error = Some(e);
                    continue;
                }
            };

            if !response.success {
                warn!("JSON endpoint {} returned {}", url, response.status);
                last_error = Some(FetchError::Status {
                    status: response.status,
                    status_text: response.status_text,
                    url: url.to_string(),
                });
                continue;
            }

            match Self::parse_body(url, &response.body) {
                Ok(records) => {
                    info!("Fetched {} raw postings from {}", records.len(), url);
                    return Ok(records);
                }
                Err(e) => {
                    warn!("JSON endpoint {} gave an unusable body: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FetchError::Config("no JSON endpoint configured".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HttpResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeHttp {
        responses: HashMap<String, HttpResponse>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeHttp {
        fn new(responses: Vec<(&str, HttpResponse)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(url, resp)| (url.to_string(), resp))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClientPort for FakeHttp {
        async fn get(&self, url: &str, _headers: &HeaderList) -> Result<HttpResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Network(format!("connection refused: {url}")))
        }
    }

    fn config(url: &str, alternates: &[&str]) -> FetchConfig {
        FetchConfig::new("acme", url)
            .with_alternate_urls(alternates.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_can_handle_requires_an_api_endpoint() {
        let strategy = JsonApiStrategy::new();
        assert!(strategy.can_handle(&config("https://acme.example/api/jobs", &[])));
        assert!(strategy.can_handle(&config("https://acme.example/jobs.json?page=1", &[])));
        assert!(strategy.can_handle(&config(
            "https://acme.example/careers",
            &["https://boards.example/acme"]
        )));
        assert!(!strategy.can_handle(&config("https://acme.example/careers", &[])));
        assert!(!strategy.can_handle(&config("", &["not a url"])));
    }

    #[tokio::test]
    async fn test_falls_through_failing_endpoints() {
        let http = FakeHttp::new(vec![
            (
                "https://alt.example/down",
                HttpResponse::with_status(503, "Service Unavailable", ""),
            ),
            (
                "https://alt.example/jobs",
                HttpResponse::ok(json!({"jobs": [{"title": "SRE"}, {"title": "QA"}]}).to_string()),
            ),
        ]);
        let cfg = config(
            "https://acme.example/careers",
            &["https://alt.example/down", "https://alt.example/missing", "https://alt.example/jobs"],
        );

        let records = JsonApiStrategy::new().extract(&cfg, &http).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "SRE");
        assert_eq!(http.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_nested_wrapper_and_empty_board() {
        let http = FakeHttp::new(vec![(
            "https://acme.example/api/jobs",
            HttpResponse::ok(json!({"data": {"positions": []}}).to_string()),
        )]);
        let cfg = config("https://acme.example/api/jobs", &[]);
        let records = JsonApiStrategy::new().extract(&cfg, &http).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_body_without_array_is_malformed() {
        let http = FakeHttp::new(vec![(
            "https://acme.example/api/jobs",
            HttpResponse::ok(json!({"status": "ok"}).to_string()),
        )]);
        let cfg = config("https://acme.example/api/jobs", &[]);
        let err = JsonApiStrategy::new().extract(&cfg, &http).await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_last_error_is_reported() {
        let http = FakeHttp::new(vec![(
            "https://acme.example/api/jobs",
            HttpResponse::with_status(404, "Not Found", ""),
        )]);
        let cfg = config("https://acme.example/api/jobs", &[]);
        let err = JsonApiStrategy::new().extract(&cfg, &http).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
