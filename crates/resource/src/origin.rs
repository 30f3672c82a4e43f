use reqwest::Url;

/// Media origin used when the API base URL is missing or unparsable.
pub const FALLBACK_MEDIA_ORIGIN: &str = "http://localhost:8080";

/// Origins image references are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaOrigins {
    /// Origin of the API serving stored uploads, e.g. `https://api.example.com`.
    pub media: String,
    /// Origin the report pages are served from; bundled assets live here.
    pub page: String,
}

impl MediaOrigins {
    /// Derives the media origin from the configured API base URL, e.g.
    /// `https://api.example.com/api/v1` gives `https://api.example.com`.
    pub fn from_api_base(api_base: &str, page_origin: &str) -> Self {
        let media = origin_of(api_base).unwrap_or_else(|| {
            log::warn!(
                "Cannot derive media origin from '{}', using {}",
                api_base,
                FALLBACK_MEDIA_ORIGIN
            );
            FALLBACK_MEDIA_ORIGIN.to_string()
        });
        let page = origin_of(page_origin).unwrap_or_else(|| media.clone());
        Self { media, page }
    }
}

impl Default for MediaOrigins {
    fn default() -> Self {
        Self::from_api_base("http://localhost:8080/api/v1", FALLBACK_MEDIA_ORIGIN)
    }
}

fn origin_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
