use crate::data_uri;
use crate::resolve::SourceResolver;
use fieldreport_layout::LaidOutPage;
use fieldreport_traits::{FetchError, MediaFetcher};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Default upper bound on a single image fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// What happened while inlining one set of pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineReport {
    /// Unique sources rewritten into data URIs.
    pub inlined: usize,
    /// Resolved sources that could not be fetched, in document order.
    pub failed: Vec<String>,
}

/// Pages with every reachable image rewritten into a data URI.
#[derive(Debug, Clone)]
pub struct InlinedPages {
    pub pages: Vec<LaidOutPage>,
    pub report: InlineReport,
}

/// Fetches remote images and embeds them so capture never touches the network.
#[derive(Debug, Clone)]
pub struct Inliner {
    fetcher: Arc<dyn MediaFetcher>,
    resolver: SourceResolver,
    timeout: Duration,
}

impl Inliner {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, resolver: SourceResolver) -> Self {
        Self { fetcher, resolver, timeout: DEFAULT_FETCH_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    /// Resolves and inlines every image on `pages`, returning new pages.
    ///
    /// Each unique source is fetched once. Failures are logged and leave the
    /// resolved URL in place, which later decodes as failed and renders blank.
    pub async fn inline(&self, pages: &[LaidOutPage]) -> InlinedPages {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for page in pages {
            for src in page.image_sources() {
                let resolved = self.resolver.resolve(src);
                if seen.insert(resolved.clone()) {
                    order.push(resolved);
                }
            }
        }

        let mut tasks = JoinSet::new();
        for resolved in &order {
            let Some(url) = self.resolver.fetch_url(resolved) else {
                continue;
            };
            let fetcher = Arc::clone(&self.fetcher);
            let timeout = self.timeout;
            let key = resolved.clone();
            tasks.spawn(async move {
                let outcome = tokio::time::timeout(timeout, fetcher.fetch(&url)).await;
                let result = match outcome {
                    Ok(Ok(media)) => {
                        let mime = data_uri::content_type(media.content_type.as_deref(), &media.bytes);
                        Ok(data_uri::encode(&mime, &media.bytes))
                    }
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(FetchError::Timeout { url, millis: timeout.as_millis() as u64 }),
                };
                (key, result)
            });
        }

        let mut inlined: HashMap<String, String> = HashMap::new();
        let mut failed_set = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, Ok(uri))) => {
                    log::debug!("Inlined image {}", key);
                    inlined.insert(key, uri);
                }
                Ok((key, Err(e))) => {
                    log::warn!("Could not inline image {}: {}", key, e);
                    failed_set.insert(key);
                }
                Err(e) => log::warn!("Image fetch task failed: {}", e),
            }
        }

        let resolver = &self.resolver;
        let rewrite = |src: &str| {
            let resolved = resolver.resolve(src);
            inlined.get(&resolved).cloned().unwrap_or(resolved)
        };
        let pages = pages.iter().map(|p| p.map_images(&rewrite)).collect();

        let report = InlineReport {
            inlined: inlined.len(),
            failed: order.into_iter().filter(|s| failed_set.contains(s)).collect(),
        };
        log::info!(
            "Inlined {} image(s), {} failed",
            report.inlined,
            report.failed.len()
        );
        InlinedPages { pages, report }
    }
}
