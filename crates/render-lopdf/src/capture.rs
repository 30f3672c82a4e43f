use crate::clean::CleanPrintMode;
use crate::raster::Rasterizer;
use crate::RenderError;
use fieldreport_layout::{LaidOutPage, PaintItem, TextMetrics};
use fieldreport_resource::DecodedImages;
use fieldreport_types::Color;
use image::codecs::jpeg::JpegEncoder;
use std::sync::Arc;

/// Captures are never taken below three device pixels per CSS pixel.
pub const MIN_DEVICE_SCALE: f32 = 3.0;
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub device_scale: f32,
    pub jpeg_quality: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { device_scale: MIN_DEVICE_SCALE, jpeg_quality: DEFAULT_JPEG_QUALITY }
    }
}

impl RenderOptions {
    /// The requested device scale, raised to the minimum.
    pub fn effective_scale(&self) -> f32 {
        if self.device_scale.is_finite() {
            self.device_scale.max(MIN_DEVICE_SCALE)
        } else {
            MIN_DEVICE_SCALE
        }
    }

    pub fn effective_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}

/// A text run kept for the vector overlay, in CSS pixels from the page's
/// top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub baseline: f32,
    pub size: f32,
    pub bold: bool,
    pub color: Color,
    pub tracking: f32,
    pub text: String,
}

/// One page as a JPEG bitmap plus the text drawn over it.
#[derive(Debug, Clone)]
pub struct CapturedPage {
    pub index: usize,
    pub width_px: u32,
    pub height_px: u32,
    pub jpeg: Vec<u8>,
    pub text: Vec<TextRun>,
}

/// Captures `pages` in order. Clean print mode stays engaged until the last
/// page is captured and is released on every exit path.
pub async fn capture_pages(
    pages: &[LaidOutPage],
    images: Arc<DecodedImages>,
    metrics: &TextMetrics,
    options: RenderOptions,
    clean: &CleanPrintMode,
) -> Result<Vec<CapturedPage>, RenderError> {
    let _guard = clean.engage();
    let rasterizer = Rasterizer::new(options.effective_scale(), clean.clone());
    let quality = options.effective_quality();

    let mut captured = Vec::with_capacity(pages.len());
    for page in pages {
        let paint = page.paint(metrics);
        let text = paint
            .items
            .iter()
            .filter_map(|item| match item {
                PaintItem::Text { x, baseline, size, bold, color, tracking, text } if !text.trim().is_empty() => {
                    Some(TextRun {
                        x: *x,
                        baseline: *baseline,
                        size: *size,
                        bold: *bold,
                        color: *color,
                        tracking: *tracking,
                        text: text.clone(),
                    })
                }
                _ => None,
            })
            .collect();

        let index = page.index;
        let rasterizer = rasterizer.clone();
        let images = Arc::clone(&images);
        let (width_px, height_px, jpeg) = tokio::task::spawn_blocking(move || {
            let bitmap = rasterizer.render(&paint, &images)?;
            let mut jpeg = Vec::new();
            JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&bitmap)?;
            Ok::<_, RenderError>((bitmap.width(), bitmap.height(), jpeg))
        })
        .await
        .map_err(|e| RenderError::Capture { page: index, message: e.to_string() })??;

        log::debug!("Captured page {} at {}x{} ({} bytes)", index + 1, width_px, height_px, jpeg.len());
        captured.push(CapturedPage { index, width_px, height_px, jpeg, text });
    }
    Ok(captured)
}
