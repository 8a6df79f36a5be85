//! HTTP exchanges with the page server.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use time::OffsetDateTime;

use crate::config::ClientConfig;
use crate::error::ApplinError;
use crate::model::{PageSpec, Var};

mod cache_meta;
pub use self::cache_meta::{CacheMeta, parse_http_date};

mod http_client;
pub use self::http_client::{APPLIN_RESPONSE, classify, content_type_base};
use self::http_client::{classify_error, decode_envelope};

mod types;
pub use self::types::*;
mod fetch;
mod stream;
pub use self::stream::PageStream;

/// One request/response exchange per call. Retries belong to the caller.
pub struct ServerCaller {
    base_url: String,
    client: reqwest::Client,
    /// Same cookies, no total timeout: a stream lasts until the server ends it.
    stream_client: reqwest::Client,
    resource_timeout: Duration,
}

impl ServerCaller {
    pub fn new(config: &ClientConfig) -> Result<Self, ApplinError> {
        config.validate()?;
        let jar = Arc::new(Jar::default());
        let builder = || {
            reqwest::Client::builder()
                .user_agent("applin")
                .cookie_provider(Arc::clone(&jar))
                .connect_timeout(config.request_timeout())
        };
        let client = builder()
            .timeout(config.resource_timeout())
            .build()
            .map_err(|e| ApplinError::App(format!("build http client: {}", e)))?;
        let stream_client = builder()
            .build()
            .map_err(|e| ApplinError::App(format!("build stream http client: {}", e)))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            stream_client,
            resource_timeout: config.resource_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn header_content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}
