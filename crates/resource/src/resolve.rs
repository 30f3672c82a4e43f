use crate::origin::MediaOrigins;

/// Path prefixes of assets bundled with the front end rather than uploaded.
pub const DEFAULT_LOCAL_ASSET_PREFIXES: [&str; 2] = ["/assets/", "/static/"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Empty,
    DataUri,
    /// `http://` or `https://`, any case.
    Absolute,
    /// `//host/path`.
    ProtocolRelative,
    /// Root-relative path under one of the local asset prefixes.
    LocalAsset,
    /// Anything else: a storage path relative to the media origin.
    Storage,
}

impl SourceKind {
    /// Whether sources of this kind are fetched over the network when inlining.
    pub fn is_remote(self) -> bool {
        !matches!(self, SourceKind::Empty | SourceKind::DataUri)
    }
}

pub fn classify(raw: &str, local_prefixes: &[String]) -> SourceKind {
    let src = raw.trim();
    if src.is_empty() {
        return SourceKind::Empty;
    }
    if src.starts_with("data:") {
        return SourceKind::DataUri;
    }
    let lower = src.get(..8).unwrap_or(src).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return SourceKind::Absolute;
    }
    if src.starts_with("//") {
        return SourceKind::ProtocolRelative;
    }
    if local_prefixes.iter().any(|p| src.starts_with(p.as_str())) {
        return SourceKind::LocalAsset;
    }
    SourceKind::Storage
}

/// Turns raw image references into absolute URLs.
///
/// Resolution is idempotent: a resolved source resolves to itself.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    origins: MediaOrigins,
    local_prefixes: Vec<String>,
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new(MediaOrigins::default(), Vec::new())
    }
}

impl SourceResolver {
    /// An empty prefix list selects [`DEFAULT_LOCAL_ASSET_PREFIXES`].
    pub fn new(origins: MediaOrigins, local_prefixes: Vec<String>) -> Self {
        let local_prefixes = if local_prefixes.is_empty() {
            DEFAULT_LOCAL_ASSET_PREFIXES.iter().map(|p| p.to_string()).collect()
        } else {
            local_prefixes
        };
        Self { origins, local_prefixes }
    }

    pub fn origins(&self) -> &MediaOrigins {
        &self.origins
    }

    pub fn kind(&self, raw: &str) -> SourceKind {
        classify(raw, &self.local_prefixes)
    }

    pub fn resolve(&self, raw: &str) -> String {
        let src = raw.trim();
        match self.kind(src) {
            SourceKind::Empty => String::new(),
            SourceKind::DataUri | SourceKind::Absolute | SourceKind::ProtocolRelative => src.to_string(),
            SourceKind::LocalAsset => format!("{}{}", self.origins.page, src),
            SourceKind::Storage => {
                if src.starts_with('/') {
                    format!("{}{}", self.origins.media, src)
                } else {
                    format!("{}/{}", self.origins.media, src)
                }
            }
        }
    }

    /// URL to request for a resolved source, or `None` when nothing is fetched.
    ///
    /// Protocol-relative sources take the scheme of the page origin.
    pub fn fetch_url(&self, resolved: &str) -> Option<String> {
        match self.kind(resolved) {
            SourceKind::Empty | SourceKind::DataUri => None,
            SourceKind::ProtocolRelative => {
                let scheme = self.origins.page.split("//").next().unwrap_or("https:");
                Some(format!("{}{}", scheme, resolved.trim()))
            }
            _ => Some(self.resolve(resolved)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SourceResolver {
        SourceResolver::new(
            MediaOrigins::from_api_base("https://api.kms.co.id/api/v1", "https://app.kms.co.id"),
            Vec::new(),
        )
    }

    #[test]
    fn classification() {
        let r = resolver();
        assert_eq!(r.kind("   "), SourceKind::Empty);
        assert_eq!(r.kind("data:image/png;base64,AAAA"), SourceKind::DataUri);
        assert_eq!(r.kind("HTTPS://cdn.example.com/a.png"), SourceKind::Absolute);
        assert_eq!(r.kind("//cdn.example.com/a.png"), SourceKind::ProtocolRelative);
        assert_eq!(r.kind("/assets/logo.png"), SourceKind::LocalAsset);
        assert_eq!(r.kind("uploads/a.jpg"), SourceKind::Storage);
        assert_eq!(r.kind("/uploads/a.jpg"), SourceKind::Storage);
    }

    #[test]
    fn resolves_against_the_right_origin() {
        let r = resolver();
        assert_eq!(r.resolve(""), "");
        assert_eq!(r.resolve(" uploads/a.jpg "), "https://api.kms.co.id/uploads/a.jpg");
        assert_eq!(r.resolve("/uploads/a.jpg"), "https://api.kms.co.id/uploads/a.jpg");
        assert_eq!(r.resolve("/assets/logo.png"), "https://app.kms.co.id/assets/logo.png");
        assert_eq!(r.resolve("http://x.test/a.png"), "http://x.test/a.png");
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = resolver();
        for raw in [
            "",
            "uploads/a.jpg",
            "/uploads/b.jpg",
            "/assets/logo.png",
            "//cdn.example.com/c.png",
            "https://cdn.example.com/d.png",
            "data:image/png;base64,AAAA",
        ] {
            let once = r.resolve(raw);
            assert_eq!(r.resolve(&once), once, "source {raw:?}");
        }
    }

    #[test]
    fn fetch_urls() {
        let r = resolver();
        assert_eq!(r.fetch_url("data:image/png;base64,AAAA"), None);
        assert_eq!(r.fetch_url(""), None);
        assert_eq!(
            r.fetch_url("//cdn.example.com/c.png").as_deref(),
            Some("https://cdn.example.com/c.png")
        );
    }
}
