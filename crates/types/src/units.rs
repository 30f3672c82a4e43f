//! A4 page dimensions in the three unit systems the pipeline touches.
//!
//! Layout works in CSS pixels (96 per inch), the print style sheet in
//! millimetres and the PDF writer in points (72 per inch).

/// A4 portrait width in CSS pixels.
pub const PAGE_WIDTH_PX: f32 = 793.7;
/// A4 portrait height in CSS pixels.
pub const PAGE_HEIGHT_PX: f32 = 1122.5;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// A4 portrait width in PDF points.
pub const PAGE_WIDTH_PT: f32 = 595.28;
/// A4 portrait height in PDF points.
pub const PAGE_HEIGHT_PT: f32 = 841.89;

const PX_PER_INCH: f32 = 96.0;
const PT_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

pub fn px_to_pt(px: f32) -> f32 {
    px * PT_PER_INCH / PX_PER_INCH
}

pub fn mm_to_px(mm: f32) -> f32 {
    mm * PX_PER_INCH / MM_PER_INCH
}
