use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::VideoSearch;
use crate::common::config::VideoConfig;
use crate::common::error::ProviderError;
use crate::core::document::VideoLink;

/// YouTube Data API v3 search.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(config: &VideoConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("videos.api_key is not set".to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoLink>, ProviderError> {
        let max_results = limit.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::InvalidResponse(format!(
                "video search returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        Ok(parse_search_results(&body, limit))
    }
}

fn parse_search_results(body: &Value, limit: usize) -> Vec<VideoLink> {
    body.get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let id = item.pointer("/id/videoId").and_then(Value::as_str)?;
                    let title = item
                        .pointer("/snippet/title")
                        .and_then(Value::as_str)
                        .unwrap_or(id);
                    Some(VideoLink {
                        title: title.to_string(),
                        url: format!("https://www.youtube.com/watch?v={}", id),
                    })
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

/// Used when no video API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVideoSearch;

#[async_trait]
impl VideoSearch for NoVideoSearch {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<VideoLink>, ProviderError> {
        Ok(Vec::new())
    }
}
