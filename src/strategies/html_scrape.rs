use super::{is_http_url, FetchStrategy};
use crate::app::ports::{HeaderList, HttpClientPort, MarkupExtractor};
use crate::constants::HTML_SCRAPE_STRATEGY;
use crate::error::{FetchError, Result};
use crate::types::{FetchConfig, RawRecord};
use tracing::{info, instrument};

/// Fetches the primary careers page and hands the markup to an extractor
pub struct HtmlScrapeStrategy {
    extractor: Box<dyn MarkupExtractor>,
}

impl HtmlScrapeStrategy {
    pub fn new(extractor: Box<dyn MarkupExtractor>) -> Self {
        Self { extractor }
    }
}

#[async_trait::async_trait]
impl FetchStrategy for HtmlScrapeStrategy {
    fn name(&self) -> &'static str {
        HTML_SCRAPE_STRATEGY
    }

    fn can_handle(&self, config: &FetchConfig) -> bool {
        is_http_url(&config.url)
    }

    #[instrument(skip(self, config, http), fields(company_id = %config.company_id))]
    async fn extract(
        &self,
        config: &FetchConfig,
        http: &dyn HttpClientPort,
    ) -> Result<Vec<RawRecord>> {
        let url = config.url.trim();
        let headers: HeaderList = vec![(
            "Accept".to_string(),
            "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8".to_string(),
        )];

        let response = http.get(url, &headers).await?;
        if !response.success {
            return Err(FetchError::Status {
                status: response.status,
                status_text: response.status_text,
                url: url.to_string(),
            });
        }

        let records = self.extractor.parse_from_markup(&response.body, url)?;
        info!("Extracted {} raw postings from {}", records.len(), url);
        Ok(records)
    }
}
