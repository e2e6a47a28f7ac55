use async_trait::async_trait;
use log::debug;
use std::time::Duration;

use super::{build_client, check_status, BookSearchProvider, ProviderError};
use crate::config::UpstreamConfig;
use crate::models::{BookSummary, VolumesResponse};

/// Book search client
pub struct HttpBookSearchProvider {
    client: reqwest::Client,
    url: String,
    max_results: u32,
    timeout: Duration,
}

impl HttpBookSearchProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProviderError> {
        let timeout = config.timeout();
        Ok(Self {
            client: build_client(timeout)?,
            url: config.book_search_url.clone(),
            max_results: config.max_results,
            timeout,
        })
    }
}

#[async_trait]
impl BookSearchProvider for HttpBookSearchProvider {
    async fn search_books(&self, query: &str) -> Result<Vec<BookSummary>, ProviderError> {
        debug!("Searching books for '{}'", query);

        let max_results = self.max_results.to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", query), ("maxResults", max_results.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let volumes = check_status(response, self.timeout)
            .await?
            .json::<VolumesResponse>()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let books = volumes.into_summaries();
        debug!("Book search for '{}' returned {} items", query, books.len());
        Ok(books)
    }
}
