//! Credentialed HTTP fetching on reqwest.

use crate::ResourceError;
use async_trait::async_trait;
use fieldreport_traits::{FetchError, FetchedMedia, MediaFetcher};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct HttpFetcherOptions {
    /// `name=value` session cookie sent to `cookie_origin`.
    pub session_cookie: Option<String>,
    pub cookie_origin: Option<String>,
    pub bearer_token: Option<String>,
    /// Whole-request timeout. Callers usually bound fetches themselves.
    pub timeout: Option<Duration>,
}

/// Fetches with the user's session and caching disabled.
///
/// Cookies set by responses are kept for later requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(options: HttpFetcherOptions) -> Result<Self, ResourceError> {
        let jar = Arc::new(Jar::default());
        if let (Some(cookie), Some(origin)) = (&options.session_cookie, &options.cookie_origin) {
            let url = Url::parse(origin).map_err(|e| ResourceError::Client(format!("cookie origin '{}': {}", origin, e)))?;
            jar.add_cookie_str(cookie, &url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        if let Some(token) = &options.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ResourceError::Client(format!("invalid bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder().cookie_provider(jar).default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ResourceError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError> {
        let network = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string(), millis: 0 }
            } else {
                FetchError::Network { url: url.to_string(), message: e.to_string() }
            }
        };

        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(network)?;
        log::debug!("Fetched {} ({} bytes)", url, bytes.len());

        Ok(FetchedMedia { bytes: Arc::new(bytes.to_vec()), content_type })
    }

    fn name(&self) -> &'static str {
        "HttpFetcher"
    }
}
