//! Display lists: what a laid-out page looks like, in page pixels.

mod arrange;

pub use arrange::{arrange, measure};

use crate::node::{Align, ImageFit};
use fieldreport_types::{Color, Rect};

/// Which part of the page an item belongs to.
///
/// Clean print mode keeps the `Page` background and strips decoration from
/// everything in `Content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Page,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    #[default]
    Normal,
    Multiply,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintItem {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
        dashed: bool,
        shadow: bool,
        layer: Layer,
    },
    Text {
        /// Left edge of the run.
        x: f32,
        baseline: f32,
        size: f32,
        bold: bool,
        color: Color,
        tracking: f32,
        text: String,
    },
    Image {
        rect: Rect,
        src: String,
        fit: ImageFit,
        opacity: f32,
        blend: Blend,
    },
}

impl PaintItem {
    /// Applies the body transform: uniform `scale` anchored at (`ox`, `oy`).
    pub fn scaled(self, ox: f32, oy: f32, scale: f32) -> PaintItem {
        if scale == 1.0 {
            return self;
        }
        match self {
            PaintItem::Rect { rect, fill, stroke, dashed, shadow, layer } => PaintItem::Rect {
                rect: rect.scale_from(ox, oy, scale),
                fill,
                stroke,
                dashed,
                shadow,
                layer,
            },
            PaintItem::Text { x, baseline, size, bold, color, tracking, text } => PaintItem::Text {
                x: ox + (x - ox) * scale,
                baseline: oy + (baseline - oy) * scale,
                size: size * scale,
                bold,
                color,
                tracking: tracking * scale,
                text,
            },
            PaintItem::Image { rect, src, fit, opacity, blend } => PaintItem::Image {
                rect: rect.scale_from(ox, oy, scale),
                src,
                fit,
                opacity,
                blend,
            },
        }
    }
}

/// One page flattened for capture, in CSS pixels with a top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePaint {
    pub width: f32,
    pub height: f32,
    pub items: Vec<PaintItem>,
}

impl PagePaint {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PaintItem::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PaintItem::Image { src, .. } => Some(src.as_str()),
            _ => None,
        })
    }
}

pub(crate) fn align_x(align: Align, x: f32, width: f32, line_width: f32) -> f32 {
    match align {
        Align::Left => x,
        Align::Center => x + ((width - line_width) / 2.0).max(0.0),
        Align::Right => x + (width - line_width).max(0.0),
    }
}
