//! NeoWs client
//!
//! Every request goes cache → retried GET → cache insert. Only successful
//! responses are cached.

use std::sync::Arc;

use neo_risk_core::ResponseCache;
use reqwest::Client;
use serde_json::Value;

use super::retry::RetryPolicy;
use super::{json_body, UpstreamError};
use crate::config::Config;

#[derive(Clone)]
pub struct NeoWsClient {
    http: Client,
    base_url: String,
    api_key: String,
    cache: Arc<ResponseCache<Value>>,
    retry: RetryPolicy,
}

impl NeoWsClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.nasa_base_url.trim_end_matches('/').to_string(),
            api_key: config.nasa_api_key.clone(),
            cache: Arc::new(ResponseCache::new(config.cache_duration(), config.cache_capacity)),
            retry: RetryPolicy::new(config.max_retries, config.retry_base_delay()),
        }
    }

    /// Close-approach feed for `start..=end` (`YYYY-MM-DD`)
    pub async fn feed(&self, start: &str, end: &str) -> Result<Value, UpstreamError> {
        self.get("/feed", &[("start_date", start), ("end_date", end)]).await
    }

    /// Single object by NeoWs id
    pub async fn lookup(&self, id: &str) -> Result<Value, UpstreamError> {
        self.get(&format!("/neo/{}", id), &[]).await
    }

    pub fn cache(&self) -> &ResponseCache<Value> {
        &self.cache
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        let key = ResponseCache::<Value>::key(endpoint, params);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("NeoWs cache hit: {}", key);
            return Ok(hit);
        }

        let url = format!("{}{}", self.base_url, endpoint);
        let url = url.as_str();
        let http = &self.http;
        let api_key = self.api_key.as_str();

        let value = self
            .retry
            .run(endpoint, move || async move {
                let response = http
                    .get(url)
                    .query(params)
                    .query(&[("api_key", api_key)])
                    .send()
                    .await?;
                json_body(response).await
            })
            .await?;

        self.cache.insert(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offline_client() -> NeoWsClient {
        let config = crate::tests::offline_config();
        NeoWsClient::new(crate::upstream::build_http_client(&config).unwrap(), &config)
    }

    #[tokio::test]
    async fn test_cached_response_skips_network() {
        let client = offline_client();
        let body = json!({ "id": "3542519", "name": "(2010 PK9)" });
        client
            .cache()
            .insert(ResponseCache::<Value>::key("/neo/3542519", &[]), body.clone());

        assert_eq!(client.lookup("3542519").await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_not_cached() {
        let client = offline_client();

        let err = client.feed("2024-01-01", "2024-01-02").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Request(_)));
        assert!(client.cache().is_empty());
    }
}
