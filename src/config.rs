use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApplinError;

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_resource_timeout_ms() -> u64 {
    60_000
}

fn default_start_page() -> String {
    "/".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,

    /// Bound on connecting and sending one request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Bound on a whole exchange, including the response body.
    #[serde(default = "default_resource_timeout_ms")]
    pub resource_timeout_ms: u64,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default = "default_start_page")]
    pub start_page: String,
}

/// Backoff applied by poll and stream tasks after failed fetches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = (self.multiplier.max(1) as u64)
            .checked_pow(attempt)
            .unwrap_or(u64::MAX);
        let ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApplinError> {
        let cfg = Self {
            base_url: base_url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            resource_timeout_ms: default_resource_timeout_ms(),
            retry: RetryPolicy::default(),
            start_page: default_start_page(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ApplinError> {
        let bytes = std::fs::read(path).map_err(|e| {
            ApplinError::App(format!("error reading config '{}': {}", path.display(), e))
        })?;
        let cfg: ClientConfig = serde_json::from_slice(&bytes).map_err(|e| {
            ApplinError::App(format!("error parsing config '{}': {}", path.display(), e))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ApplinError> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ApplinError::App(format!("bad base_url '{}': {}", self.base_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ApplinError::App(format!(
                "base_url must be http or https: {}",
                self.base_url
            )));
        }
        if self.request_timeout_ms == 0 || self.resource_timeout_ms == 0 {
            return Err(ApplinError::App("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn resource_timeout(&self) -> Duration {
        Duration::from_millis(self.resource_timeout_ms)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
