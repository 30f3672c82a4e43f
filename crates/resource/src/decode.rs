use crate::{data_uri, ResourceError};
use fieldreport_layout::LaidOutPage;
use image::RgbaImage;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

/// How one image settled.
#[derive(Debug, Clone)]
pub enum ImageStatus {
    Loaded(Arc<RgbaImage>),
    Failed(String),
}

impl ImageStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ImageStatus::Loaded(_))
    }
}

/// Every image on a set of prepared pages, keyed by source.
#[derive(Debug, Clone, Default)]
pub struct DecodedImages {
    images: HashMap<String, ImageStatus>,
}

impl DecodedImages {
    /// Records an already-decoded bitmap under `src`.
    pub fn with_image(mut self, src: impl Into<String>, image: RgbaImage) -> Self {
        self.images.insert(src.into(), ImageStatus::Loaded(Arc::new(image)));
        self
    }

    /// The decoded bitmap, if the image loaded.
    pub fn get(&self, src: &str) -> Option<&RgbaImage> {
        match self.images.get(src) {
            Some(ImageStatus::Loaded(img)) => Some(img.as_ref()),
            _ => None,
        }
    }

    pub fn status(&self, src: &str) -> Option<&ImageStatus> {
        self.images.get(src)
    }

    /// Number of images that reported, loaded or failed.
    pub fn reported(&self) -> usize {
        self.images.len()
    }

    pub fn loaded(&self) -> usize {
        self.images.values().filter(|s| s.is_loaded()).count()
    }

    pub fn failed(&self) -> usize {
        self.reported() - self.loaded()
    }
}

/// Decodes every image on `pages` and returns once each has loaded or failed.
///
/// Only data URIs can load: anything still pointing at the network was not
/// inlined and reports failed.
pub async fn await_images(pages: &[LaidOutPage]) -> Result<DecodedImages, ResourceError> {
    let mut seen = HashSet::new();
    let mut tasks = JoinSet::new();
    for page in pages {
        for src in page.image_sources() {
            if !seen.insert(src.to_string()) {
                continue;
            }
            let src = src.to_string();
            tasks.spawn_blocking(move || {
                let status = decode_source(&src);
                (src, status)
            });
        }
    }

    let mut decoded = DecodedImages::default();
    while let Some(joined) = tasks.join_next().await {
        let (src, status) = joined.map_err(|e| ResourceError::Task(e.to_string()))?;
        if let ImageStatus::Failed(reason) = &status {
            log::warn!("Image will render blank: {}", reason);
        }
        decoded.images.insert(src, status);
    }

    log::debug!(
        "{} image(s) settled: {} loaded, {} failed",
        decoded.reported(),
        decoded.loaded(),
        decoded.failed()
    );
    Ok(decoded)
}

fn decode_source(src: &str) -> ImageStatus {
    if !src.starts_with("data:") {
        return ImageStatus::Failed(format!("'{}' was not inlined", src));
    }
    let decoded = data_uri::parse(src).and_then(|uri| {
        image::load_from_memory(&uri.bytes).map_err(|e| ResourceError::Decode {
            src: format!("data:{}", uri.mime),
            message: e.to_string(),
        })
    });
    match decoded {
        Ok(img) => ImageStatus::Loaded(Arc::new(img.to_rgba8())),
        Err(e) => ImageStatus::Failed(e.to_string()),
    }
}
