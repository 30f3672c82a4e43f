//! Print pipeline configuration.
//!
//! Values come from defaults, an optional TOML file and `FIELDREPORT__*`
//! environment variables, in increasing order of precedence. Nested keys use
//! `__`, e.g. `FIELDREPORT__BRANDING__COMPANY_NAME`.

use fieldreport_layout::{Branding, LayoutConfig};
use fieldreport_render::RenderOptions;
use fieldreport_resource::{MediaOrigins, SourceResolver, DEFAULT_FETCH_TIMEOUT};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "FIELDREPORT";
pub const DEFAULT_PAGE_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_PRINT_FALLBACK: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Base URL of the report API. Stored media is served from its origin.
    pub api_base_url: String,
    /// Origin the application's own assets are served from.
    pub page_origin: String,
    /// Root-relative prefixes that name application assets rather than
    /// stored media. Empty means `/assets/` and `/static/`.
    pub local_asset_prefixes: Vec<String>,
    pub image_fetch_timeout_ms: u64,
    /// How long to wait for the print dialog to report completion before
    /// tearing the portal down anyway.
    pub print_fallback_ms: u64,
    pub device_scale: f32,
    pub jpeg_quality: u8,
    pub max_fit_passes: u32,
    pub branding: Branding,
}

impl Default for PrintConfig {
    fn default() -> Self {
        let render = RenderOptions::default();
        Self {
            api_base_url: String::new(),
            page_origin: DEFAULT_PAGE_ORIGIN.to_string(),
            local_asset_prefixes: Vec::new(),
            image_fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT.as_millis() as u64,
            print_fallback_ms: DEFAULT_PRINT_FALLBACK.as_millis() as u64,
            device_scale: render.device_scale,
            jpeg_quality: render.jpeg_quality,
            max_fit_passes: LayoutConfig::default().max_fit_passes,
            branding: Branding::default(),
        }
    }
}

impl PrintConfig {
    pub fn builder() -> PrintConfigBuilder {
        PrintConfigBuilder::default()
    }

    /// Loads defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("local_asset_prefixes"),
        );
        let config: PrintConfig = builder.build()?.try_deserialize()?;
        log::debug!("Loaded print configuration: {:?}", config);
        Ok(config)
    }

    pub fn origins(&self) -> MediaOrigins {
        MediaOrigins::from_api_base(&self.api_base_url, &self.page_origin)
    }

    pub fn resolver(&self) -> SourceResolver {
        SourceResolver::new(self.origins(), self.local_asset_prefixes.clone())
    }

    pub fn image_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.image_fetch_timeout_ms)
    }

    pub fn print_fallback(&self) -> Duration {
        Duration::from_millis(self.print_fallback_ms)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { device_scale: self.device_scale, jpeg_quality: self.jpeg_quality }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig { max_fit_passes: self.max_fit_passes.max(1), ..LayoutConfig::default() }
    }
}

/// Programmatic construction of a [`PrintConfig`].
#[derive(Debug, Clone, Default)]
pub struct PrintConfigBuilder {
    config: PrintConfig,
}

impl PrintConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn page_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.page_origin = origin.into();
        self
    }

    pub fn local_asset_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.local_asset_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn image_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.image_fetch_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn print_fallback(mut self, fallback: Duration) -> Self {
        self.config.print_fallback_ms = fallback.as_millis() as u64;
        self
    }

    pub fn device_scale(mut self, scale: f32) -> Self {
        self.config.device_scale = scale;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn max_fit_passes(mut self, passes: u32) -> Self {
        self.config.max_fit_passes = passes;
        self
    }

    pub fn branding(mut self, branding: Branding) -> Self {
        self.config.branding = branding;
        self
    }

    pub fn build(self) -> PrintConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = PrintConfig::default();
        assert_eq!(config.image_fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.print_fallback(), Duration::from_secs(3));
        assert_eq!(config.render_options().effective_scale(), 3.0);
        assert_eq!(config.origins().media, "http://localhost:8080");
    }

    #[test]
    fn builder_overrides() {
        let config = PrintConfig::builder()
            .api_base_url("https://api.example.com/api/v1")
            .page_origin("https://app.example.com")
            .print_fallback(Duration::from_millis(250))
            .branding(Branding::text_only())
            .build();
        assert_eq!(config.origins().media, "https://api.example.com");
        assert_eq!(config.print_fallback(), Duration::from_millis(250));
        assert!(config.branding.logo.is_empty());
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
api_base_url = "https://api.example.com/api"
print_fallback_ms = 1500
local_asset_prefixes = ["/assets/", "/img/"]

[branding]
company_name = "ACME SERVICE"
"#
        )
        .unwrap();

        let config = PrintConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com/api");
        assert_eq!(config.print_fallback(), Duration::from_millis(1500));
        assert_eq!(config.local_asset_prefixes, vec!["/assets/", "/img/"]);
        assert_eq!(config.branding.company_name, "ACME SERVICE");
        assert_eq!(config.branding.qr_caption, Branding::default().qr_caption);
        assert_eq!(config.jpeg_quality, 92);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(PrintConfig::load(Some(Path::new("/nonexistent/fieldreport.toml"))).is_err());
    }
}
