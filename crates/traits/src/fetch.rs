//! MediaFetcher trait for abstracting credentialed network reads.
//!
//! Image inlining and attachment merging both need "fetch these bytes with
//! the user's session, bypassing caches". This trait lets the pipeline do so
//! without being tied to a particular HTTP client.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for fetch operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request to '{url}' failed with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Request to '{url}' failed: {message}")]
    Network { url: String, message: String },

    #[error("Request to '{url}' timed out after {millis} ms")]
    Timeout { url: String, millis: u64 },
}

/// Shared response body (reference-counted bytes).
pub type SharedBytes = Arc<Vec<u8>>;

/// A successfully fetched response body.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub bytes: SharedBytes,
    /// The `Content-Type` reported by the origin, if any.
    pub content_type: Option<String>,
}

/// A trait for fetching remote media with credentials and caching disabled.
///
/// # Implementations
///
/// - `HttpFetcher` (in `fieldreport-resource`): reqwest with a cookie store
/// - `InMemoryFetcher`: pre-populated responses, for tests and offline use
#[async_trait]
pub trait MediaFetcher: Send + Sync + Debug {
    /// Fetch the body at `url`. Non-success statuses are errors.
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError>;

    /// Returns a human-readable name for this fetcher (for logging/debugging).
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
enum Canned {
    Body(FetchedMedia),
    Status(u16),
}

/// An in-memory fetcher.
///
/// Responses are registered up front. Unregistered URLs answer 404. Every
/// call is counted so callers can assert how often a URL was requested.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    responses: RwLock<HashMap<String, Canned>>,
    calls: RwLock<Vec<String>>,
    total: AtomicUsize,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a successful response.
    pub fn add(&self, url: impl Into<String>, bytes: Vec<u8>, content_type: Option<&str>) {
        let media = FetchedMedia {
            bytes: Arc::new(bytes),
            content_type: content_type.map(str::to_string),
        };
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(url.into(), Canned::Body(media));
        }
    }

    /// Register a failing response with the given HTTP status.
    pub fn fail_with_status(&self, url: impl Into<String>, status: u16) {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(url.into(), Canned::Status(status));
        }
    }

    pub fn remove(&self, url: &str) -> bool {
        self.responses
            .write()
            .map(|mut r| r.remove(url).is_some())
            .unwrap_or(false)
    }

    /// Total number of fetch calls made.
    pub fn call_count(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Number of fetch calls made for `url`.
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls
            .read()
            .map(|c| c.iter().filter(|u| u.as_str() == url).count())
            .unwrap_or(0)
    }

    /// URLs requested so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MediaFetcher for InMemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.write() {
            calls.push(url.to_string());
        }

        let canned = self
            .responses
            .read()
            .map_err(|_| FetchError::Network {
                url: url.to_string(),
                message: "response store lock poisoned".to_string(),
            })?
            .get(url)
            .cloned();

        match canned {
            Some(Canned::Body(media)) => Ok(media),
            Some(Canned::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(FetchError::NotFound(url.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "InMemoryFetcher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_registered_body() {
        let fetcher = InMemoryFetcher::new();
        fetcher.add("http://media/a.png", vec![1, 2, 3], Some("image/png"));

        let media = fetcher.fetch("http://media/a.png").await.unwrap();
        assert_eq!(&*media.bytes, &[1, 2, 3]);
        assert_eq!(media.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn unknown_url_is_not_found() {
        let fetcher = InMemoryFetcher::new();
        let result = fetcher.fetch("http://media/missing.png").await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn failing_status_is_reported() {
        let fetcher = InMemoryFetcher::new();
        fetcher.fail_with_status("http://media/x.pdf", 500);
        let err = fetcher.fetch("http://media/x.pdf").await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status { url: "http://media/x.pdf".into(), status: 500 }
        );
    }

    #[tokio::test]
    async fn counts_calls_per_url() {
        let fetcher = InMemoryFetcher::new();
        fetcher.add("a", vec![], None);
        let _ = fetcher.fetch("a").await;
        let _ = fetcher.fetch("a").await;
        let _ = fetcher.fetch("b").await;
        assert_eq!(fetcher.call_count(), 3);
        assert_eq!(fetcher.calls_for("a"), 2);
        assert_eq!(fetcher.requested(), vec!["a", "a", "b"]);
    }
}
