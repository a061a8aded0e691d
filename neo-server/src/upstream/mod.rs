//! Upstream API clients
//!
//! `nasa` talks to NeoWs (cached, retried), `horizons` talks to JPL
//! Horizons (single attempt, synthesized fallback). Both share one
//! `reqwest::Client` built with the configured timeout.

pub mod horizons;
pub mod nasa;
pub mod retry;

use reqwest::Client;
use thiserror::Error;

use crate::config::Config;

pub use horizons::HorizonsClient;
pub use nasa::NeoWsClient;

pub const USER_AGENT: &str = "Asteroid-Impact-Predictor/1.0";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("upstream reported an error: {0}")]
    Api(String),

    #[error("response has no {0} field")]
    MissingField(&'static str),
}

/// Shared HTTP client with the configured timeout
pub fn build_http_client(config: &Config) -> Result<Client, UpstreamError> {
    Ok(Client::builder()
        .timeout(config.request_timeout())
        .user_agent(USER_AGENT)
        .build()?)
}

/// Fail on non-2xx, otherwise decode the body as JSON
pub(crate) async fn json_body(response: reqwest::Response) -> Result<serde_json::Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            url: response.url().path().to_string(),
        });
    }
    Ok(response.json().await?)
}
