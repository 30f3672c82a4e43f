//! Raster capture and PDF assembly for report pages.
//!
//! Each laid-out page is rasterized at a device scale of at least 3, JPEG
//! encoded and placed full-bleed on an A4 portrait PDF page, with the page's
//! text drawn on top as a vector Helvetica layer.

mod assembler;
mod capture;
mod clean;
mod raster;
mod text;

pub use assembler::assemble;
pub use capture::{capture_pages, CapturedPage, RenderOptions, TextRun, MIN_DEVICE_SCALE};
pub use clean::{CleanGuard, CleanPrintMode};
pub use raster::Rasterizer;
pub use text::encode_win_ansi;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Image encoding error: {0}")]
    Encode(String),
    #[error("Capture of page {page} failed: {message}")]
    Capture { page: usize, message: String },
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<fieldreport_pdf_composer::ComposerError> for RenderError {
    fn from(err: fieldreport_pdf_composer::ComposerError) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Encode(err.to_string())
    }
}
