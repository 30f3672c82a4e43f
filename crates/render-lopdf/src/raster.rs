use crate::clean::CleanPrintMode;
use crate::RenderError;
use fieldreport_layout::{Blend, ImageFit, PagePaint, PaintItem};
use fieldreport_resource::DecodedImages;
use fieldreport_types::{Color, Rect};
use image::{RgbImage, RgbaImage};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect as SkRect, Stroke,
    StrokeDash, Transform,
};

const SHADOW_OFFSET: f32 = 2.0;
const SHADOW_ALPHA: f32 = 0.08;
const DASH_ON: f32 = 4.0;
const DASH_OFF: f32 = 3.0;
const STROKE_WIDTH: f32 = 1.0;

/// Paints the non-text part of a page into an RGB bitmap.
///
/// Text runs are skipped; they are written as a vector layer over the
/// bitmap when the PDF is assembled.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    scale: f32,
    clean: CleanPrintMode,
}

impl Rasterizer {
    pub fn new(device_scale: f32, clean: CleanPrintMode) -> Self {
        Self { scale: device_scale, clean }
    }

    pub fn device_scale(&self) -> f32 {
        self.scale
    }

    /// Bitmap dimensions for `paint` at this device scale.
    pub fn pixel_size(&self, paint: &PagePaint) -> (u32, u32) {
        (
            (paint.width * self.scale).round().max(1.0) as u32,
            (paint.height * self.scale).round().max(1.0) as u32,
        )
    }

    pub fn render(&self, paint: &PagePaint, images: &DecodedImages) -> Result<RgbImage, RenderError> {
        let (width, height) = self.pixel_size(paint);
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Other(format!("invalid raster size {}x{}", width, height)))?;
        pixmap.fill(tiny_skia::Color::WHITE);
        // Paint items are in CSS pixels; the transform maps them to device pixels.
        let device = Transform::from_scale(self.scale, self.scale);

        for item in &paint.items {
            match self.clean.apply(item) {
                PaintItem::Rect { rect, fill, stroke, dashed, shadow, .. } => {
                    if shadow {
                        let offset = Rect::new(
                            rect.x + SHADOW_OFFSET,
                            rect.y + SHADOW_OFFSET,
                            rect.width,
                            rect.height,
                        );
                        fill_rect(&mut pixmap, offset, Color::BLACK, SHADOW_ALPHA, device);
                    }
                    if let Some(color) = fill {
                        fill_rect(&mut pixmap, rect, color, 1.0, device);
                    }
                    if let Some(color) = stroke {
                        stroke_rect(&mut pixmap, rect, color, dashed, device);
                    }
                }
                PaintItem::Image { rect, src, fit, opacity, blend } => match images.get(&src) {
                    Some(bitmap) => draw_image(&mut pixmap, rect, bitmap, fit, opacity, blend, device),
                    None => log::trace!("Skipping unloaded image {:.40}", src),
                },
                PaintItem::Text { .. } => {}
            }
        }
        Ok(to_rgb(&pixmap))
    }
}

fn sk_rect(rect: Rect) -> Option<SkRect> {
    SkRect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

fn solid_paint(color: Color, alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
    paint.anti_alias = true;
    paint
}

fn fill_rect(pixmap: &mut Pixmap, rect: Rect, color: Color, alpha: f32, transform: Transform) {
    if let Some(rect) = sk_rect(rect) {
        pixmap.fill_rect(rect, &solid_paint(color, alpha), transform, None);
    }
}

/// Strokes the inside edge of `rect` with a one pixel line.
fn stroke_rect(pixmap: &mut Pixmap, rect: Rect, color: Color, dashed: bool, transform: Transform) {
    let half = STROKE_WIDTH / 2.0;
    let inset = Rect::new(rect.x + half, rect.y + half, rect.width - STROKE_WIDTH, rect.height - STROKE_WIDTH);
    let Some(inset) = sk_rect(inset) else {
        return;
    };
    let path = PathBuilder::from_rect(inset);
    let mut stroke = Stroke { width: STROKE_WIDTH, ..Stroke::default() };
    if dashed {
        stroke.dash = StrokeDash::new(vec![DASH_ON, DASH_OFF], 0.0);
    }
    pixmap.stroke_path(&path, &solid_paint(color, 1.0), &stroke, transform, None);
}

fn draw_image(
    pixmap: &mut Pixmap,
    rect: Rect,
    bitmap: &RgbaImage,
    fit: ImageFit,
    opacity: f32,
    blend: Blend,
    transform: Transform,
) {
    let (Some(frame), Some(image)) = (sk_rect(rect), to_pixmap(bitmap)) else {
        return;
    };
    let (iw, ih) = (image.width() as f32, image.height() as f32);
    let ratio = match fit {
        ImageFit::Cover => (rect.width / iw).max(rect.height / ih),
        ImageFit::Contain => (rect.width / iw).min(rect.height / ih),
    };
    let dx = rect.x + (rect.width - iw * ratio) / 2.0;
    let dy = rect.y + (rect.height - ih * ratio) / 2.0;
    let placement = transform.pre_concat(Transform::from_row(ratio, 0.0, 0.0, ratio, dx, dy));

    // Cover overflows the frame and is clipped back to it.
    let clip = match fit {
        ImageFit::Cover => Mask::new(pixmap.width(), pixmap.height()).map(|mut mask| {
            mask.fill_path(&PathBuilder::from_rect(frame), FillRule::Winding, true, transform);
            mask
        }),
        ImageFit::Contain => None,
    };

    let paint = PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0),
        blend_mode: match blend {
            Blend::Normal => BlendMode::SourceOver,
            Blend::Multiply => BlendMode::Multiply,
        },
        quality: FilterQuality::Bilinear,
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, placement, clip.as_ref());
}

/// Copies a decoded image into a premultiplied pixmap.
fn to_pixmap(bitmap: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(bitmap.width(), bitmap.height())?;
    for (src, dst) in bitmap.as_raw().chunks_exact(4).zip(pixmap.data_mut().chunks_exact_mut(4)) {
        let a = src[3];
        dst[0] = premultiply(src[0], a);
        dst[1] = premultiply(src[1], a);
        dst[2] = premultiply(src[2], a);
        dst[3] = a;
    }
    Some(pixmap)
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((channel as u16 * alpha as u16 + 127) / 255) as u8
}

/// The canvas starts opaque white, so every pixel is opaque and needs no
/// demultiplying.
fn to_rgb(pixmap: &Pixmap) -> RgbImage {
    let rgb = pixmap.data().chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect();
    RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb).unwrap_or_else(|| RgbImage::new(pixmap.width(), pixmap.height()))
}
