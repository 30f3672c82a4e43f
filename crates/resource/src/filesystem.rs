//! Serves page-origin assets (logo, watermark, QR code) from a local directory.
//!
//! # Security
//!
//! Resolved paths must stay within the base directory; traversal attempts such
//! as `../../../etc/passwd` are answered as not found.

use async_trait::async_trait;
use fieldreport_traits::{FetchError, FetchedMedia, MediaFetcher};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A fetcher mapping `<origin>/<path>` URLs onto `<base>/<path>` files.
#[derive(Debug)]
pub struct FilesystemFetcher {
    origin: String,
    base_path: PathBuf,
    /// Canonicalized base path for containment checks.
    canonical_base: Option<PathBuf>,
}

impl FilesystemFetcher {
    /// `origin` is stripped from requested URLs before lookup, e.g.
    /// `http://app.test/assets/logo.png` under origin `http://app.test`
    /// reads `<base>/assets/logo.png`.
    pub fn new<P: AsRef<Path>>(origin: impl Into<String>, base_path: P) -> Self {
        let base = base_path.as_ref().to_path_buf();
        let canonical = base.canonicalize().ok();
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            base_path: base,
            canonical_base: canonical,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    /// Whether `url` belongs to this fetcher's origin.
    pub fn serves(&self, url: &str) -> bool {
        url.strip_prefix(&self.origin)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Maps `url` to a file below the base, or `None` if it would escape it.
    fn resolve_path_safe(&self, url: &str) -> Option<PathBuf> {
        let rest = url.strip_prefix(&self.origin)?;
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        let relative = rest.trim_start_matches('/');
        if relative.is_empty() || Path::new(relative).is_absolute() {
            return None;
        }
        if Path::new(relative)
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return None;
        }

        let full_path = self.base_path.join(relative);
        if let (Ok(canonical), Some(base)) = (full_path.canonicalize(), &self.canonical_base) {
            return canonical.starts_with(base).then_some(canonical);
        }
        Some(full_path)
    }
}

#[async_trait]
impl MediaFetcher for FilesystemFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError> {
        let path = self
            .resolve_path_safe(url)
            .ok_or_else(|| FetchError::NotFound(format!("{} (outside asset directory)", url)))?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(FetchedMedia { bytes: Arc::new(bytes), content_type: None }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound(url.to_string())),
            Err(e) => Err(FetchError::Network { url: url.to_string(), message: e.to_string() }),
        }
    }

    fn name(&self) -> &'static str {
        "FilesystemFetcher"
    }
}
