use crate::app::ports::{HeaderList, HttpClientPort, HttpResponse};
use crate::constants::USER_AGENT;
use crate::error::{FetchError, Result};
use crate::types::FetchConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

const BACKOFF_BASE_MS: u64 = 250;

/// `reqwest`-backed network capability with per-request timeout and retry on
/// transport errors and 5xx responses.
pub struct ReqwestHttp {
    client: reqwest::Client,
    retries: u32,
}

impl ReqwestHttp {
    pub fn new(timeout: Duration, retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, retries })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        Self::new(Duration::from_millis(config.timeout_ms), config.retries)
    }

    fn backoff(attempt: u32) -> Duration {
        Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(1u64 << attempt.min(6)))
    }

    async fn send_once(&self, url: &str, headers: &HeaderList) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        Ok(HttpResponse {
            success: status.is_success(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get(&self, url: &str, headers: &HeaderList) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            match self.send_once(url, headers).await {
                Ok(resp) if resp.status >= 500 && attempt < self.retries => {
                    warn!(
                        "GET {} returned {} (attempt {}/{}), retrying",
                        url,
                        resp.status,
                        attempt + 1,
                        self.retries + 1
                    );
                }
                Ok(resp) => {
                    debug!("GET {} -> {} ({} bytes)", url, resp.status, resp.body.len());
                    return Ok(resp);
                }
                Err(e) if attempt < self.retries => {
                    warn!(
                        "GET {} failed (attempt {}/{}): {}",
                        url,
                        attempt + 1,
                        self.retries + 1,
                        e
                    );
                }
                Err(FetchError::Http(e)) if e.is_timeout() => {
                    return Err(FetchError::Network(format!("request to {url} timed out")));
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(Self::backoff(attempt)).await;
            attempt += 1;
        }
    }
}
