//! Configuration module

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_NASA_BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1";
pub const DEFAULT_HORIZONS_URL: &str = "https://ssd.jpl.nasa.gov/api/horizons.api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// NeoWs API key, appended to every feed/lookup request
    pub nasa_api_key: String,

    /// NeoWs base URL (`/feed` and `/neo/{id}` live under it)
    pub nasa_base_url: String,

    /// JPL Horizons API endpoint
    pub horizons_url: String,

    /// Lifetime of cached NeoWs responses
    pub cache_duration_secs: u64,

    /// Maximum cached NeoWs responses
    pub cache_capacity: usize,

    /// Timeout applied to every outbound request
    pub request_timeout_secs: u64,

    /// NeoWs attempts before the error is returned
    pub max_retries: u32,

    /// Backoff unit; attempt `n` waits `2^n` of these
    pub retry_base_delay_ms: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT").unwrap_or(5000),

            nasa_api_key: env::var("NASA_API_KEY")
                .unwrap_or_else(|_| "DEMO_KEY".to_string()),

            nasa_base_url: env::var("NASA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_NASA_BASE_URL.to_string()),

            horizons_url: env::var("HORIZONS_URL")
                .unwrap_or_else(|_| DEFAULT_HORIZONS_URL.to_string()),

            cache_duration_secs: parse_var("CACHE_DURATION_SECS").unwrap_or(3600),

            cache_capacity: parse_var("CACHE_CAPACITY")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(1000),

            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS").unwrap_or(30),

            max_retries: parse_var("MAX_RETRIES")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(3),

            retry_base_delay_ms: parse_var("RETRY_BASE_DELAY_MS").unwrap_or(1000),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
