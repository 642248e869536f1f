use crate::error::Result;
use crate::types::RawRecord;
use async_trait::async_trait;

/// Request headers passed to the network capability
pub type HeaderList = Vec<(String, String)>;

/// Network-fetch capability used by strategies.
///
/// Transport failures (unreachable host, timeout after retries) are `Err`.
/// Any HTTP response, including 4xx/5xx, comes back as `Ok` with `success` set accordingly.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str, headers: &HeaderList) -> Result<HttpResponse>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub success: bool,
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            success: true,
            status: 200,
            status_text: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            success: (200..300).contains(&status),
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }
}

/// Markup extraction capability consumed by the HTML strategy
pub trait MarkupExtractor: Send + Sync {
    fn parse_from_markup(&self, markup: &str, base_url: &str) -> Result<Vec<RawRecord>>;
}
