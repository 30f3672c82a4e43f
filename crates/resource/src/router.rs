use async_trait::async_trait;
use fieldreport_traits::{FetchError, FetchedMedia, MediaFetcher};
use std::sync::Arc;

/// Dispatches each URL to the first route whose prefix matches, else to the fallback.
#[derive(Debug, Clone)]
pub struct RoutedFetcher {
    routes: Vec<(String, Arc<dyn MediaFetcher>)>,
    fallback: Arc<dyn MediaFetcher>,
}

impl RoutedFetcher {
    pub fn new(fallback: Arc<dyn MediaFetcher>) -> Self {
        Self { routes: Vec::new(), fallback }
    }

    pub fn route(mut self, prefix: impl Into<String>, fetcher: Arc<dyn MediaFetcher>) -> Self {
        self.routes.push((prefix.into(), fetcher));
        self
    }

    fn pick(&self, url: &str) -> &Arc<dyn MediaFetcher> {
        self.routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, f)| f)
            .unwrap_or(&self.fallback)
    }
}

#[async_trait]
impl MediaFetcher for RoutedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError> {
        let fetcher = self.pick(url);
        log::debug!("Fetching {} via {}", url, fetcher.name());
        fetcher.fetch(url).await
    }

    fn name(&self) -> &'static str {
        "RoutedFetcher"
    }
}
