use async_trait::async_trait;
use log::debug;
use std::time::Duration;

use super::{build_client, check_status, ProviderError, VideoSearchProvider};
use crate::config::UpstreamConfig;

/// Video search client; asks for video results only
pub struct HttpVideoSearchProvider {
    client: reqwest::Client,
    url: String,
    api_key: String,
    max_results: u32,
    timeout: Duration,
}

impl HttpVideoSearchProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProviderError> {
        let timeout = config.timeout();
        Ok(Self {
            client: build_client(timeout)?,
            url: config.video_search_url.clone(),
            api_key: config.video_api_key.clone(),
            max_results: config.max_results,
            timeout,
        })
    }
}

#[async_trait]
impl VideoSearchProvider for HttpVideoSearchProvider {
    async fn search_videos(&self, query: &str) -> Result<serde_json::Value, ProviderError> {
        debug!("Searching videos for '{}'", query);

        let max_results = self.max_results.to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("q", query),
                ("key", self.api_key.as_str()),
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        check_status(response, self.timeout)
            .await?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))
    }
}
