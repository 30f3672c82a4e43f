//! The fixed A4 page frame: header, scaled body and watermark.

use crate::autofit::{settle, FitOutcome};
use crate::config::LayoutConfig;
use crate::node::{Align, ImageFit, ImageNode, Node, Track};
use crate::painting::{arrange, measure, Blend, Layer, PagePaint, PaintItem};
use crate::style;
use crate::text::TextMetrics;
use crate::LayoutError;
use fieldreport_types::units::{PAGE_HEIGHT_PX, PAGE_WIDTH_PX};
use fieldreport_types::{Color, Edges, Rect};
use serde::Deserialize;

/// Page geometry in CSS px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
    pub padding: Edges,
    /// Space between the header and the body.
    pub gap: f32,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            width: PAGE_WIDTH_PX,
            height: PAGE_HEIGHT_PX,
            padding: Edges::symmetric(24.0, 36.0),
            gap: 20.0,
        }
    }
}

impl PageSpec {
    /// The page minus its padding.
    pub fn frame(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height).inset(self.padding)
    }
}

/// Company identity printed on every page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub company_name: String,
    pub tagline: String,
    /// Small tracked caption above the company name.
    pub eyebrow: String,
    pub logo: String,
    /// Logomark drawn faintly behind the page content. Empty disables it.
    pub watermark: String,
    /// Customer satisfaction survey QR code. Empty hides the section.
    pub qr: String,
    pub qr_caption: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company_name: "PT. KANDA MEDICAL SOLUTIONS INDONESIA".to_string(),
            tagline: "medical equipment business, Service and maintenance.".to_string(),
            eyebrow: "Hasil Print PDF".to_string(),
            logo: "/assets/logo-kms.png".to_string(),
            watermark: "/assets/logomark-kms.png".to_string(),
            qr: "/assets/satisfaction-qr.png".to_string(),
            qr_caption: "Scan to rate our service".to_string(),
        }
    }
}

impl Branding {
    /// Branding without any image, for tests and text-only output.
    pub fn text_only() -> Self {
        Self {
            logo: String::new(),
            watermark: String::new(),
            qr: String::new(),
            ..Self::default()
        }
    }
}

/// What one page shows before layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageContent {
    /// Right-aligned header lines, e.g. `Dispatch No: 123`.
    pub meta: Vec<String>,
    pub sections: Vec<Node>,
}

/// A page with its body scale settled.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutPage {
    pub index: usize,
    pub spec: PageSpec,
    pub header: Node,
    pub body: Node,
    pub watermark: String,
    pub fit: FitOutcome,
}

impl LaidOutPage {
    pub fn compose(
        index: usize,
        spec: PageSpec,
        branding: &Branding,
        content: PageContent,
        metrics: &TextMetrics,
        config: &LayoutConfig,
    ) -> Result<Self, LayoutError> {
        let frame = spec.frame();
        let header = header_node(branding, &content.meta);
        let header_height = measure(&header, frame.width, metrics);
        let available = frame.height - header_height - spec.gap;
        if available <= 0.0 {
            return Err(LayoutError::NoBodySpace { header: header_height, available: frame.height });
        }

        let body = Node::stack(style::SECTION_GAP, content.sections);
        let fit = settle(frame.width, available, config.max_fit_passes, |w| measure(&body, w, metrics));
        log::debug!("Page {} body scale {:.3}", index + 1, fit.scale);

        Ok(Self {
            index,
            spec,
            header,
            body,
            watermark: branding.watermark.clone(),
            fit,
        })
    }

    /// Where the unscaled body starts and how tall the frame leaves it.
    pub fn body_frame(&self, metrics: &TextMetrics) -> Rect {
        let frame = self.spec.frame();
        let header_height = measure(&self.header, frame.width, metrics);
        let top = frame.y + header_height + self.spec.gap;
        Rect::new(frame.x, top, frame.width, frame.bottom() - top)
    }

    /// Flattens the page into a display list, body scale applied.
    pub fn paint(&self, metrics: &TextMetrics) -> PagePaint {
        let frame = self.spec.frame();
        let mut items = vec![PaintItem::Rect {
            rect: Rect::new(0.0, 0.0, self.spec.width, self.spec.height),
            fill: Some(Color::WHITE),
            stroke: Some(style::PAGE_BORDER),
            dashed: false,
            shadow: false,
            layer: Layer::Page,
        }];

        if !self.watermark.trim().is_empty() {
            let size = style::WATERMARK_SIZE.min(frame.width);
            items.push(PaintItem::Image {
                rect: Rect::new(
                    (self.spec.width - size) / 2.0,
                    (self.spec.height - size) / 2.0,
                    size,
                    size,
                ),
                src: self.watermark.clone(),
                fit: ImageFit::Contain,
                opacity: style::WATERMARK_OPACITY,
                blend: Blend::Multiply,
            });
        }

        arrange(&self.header, frame.x, frame.y, frame.width, metrics, &mut items);

        let body = self.body_frame(metrics);
        let mut body_items = Vec::new();
        arrange(&self.body, body.x, body.y, self.fit.layout_width, metrics, &mut body_items);
        items.extend(
            body_items
                .into_iter()
                .map(|item| item.scaled(body.x, body.y, self.fit.scale)),
        );

        PagePaint { width: self.spec.width, height: self.spec.height, items }
    }

    /// Returns a copy with every image source rewritten. The fit is unchanged
    /// since image boxes have fixed sizes.
    pub fn map_images<F>(&self, f: &F) -> LaidOutPage
    where
        F: Fn(&str) -> String,
    {
        LaidOutPage {
            index: self.index,
            spec: self.spec,
            header: self.header.map_images(f),
            body: self.body.map_images(f),
            watermark: if self.watermark.is_empty() { String::new() } else { f(&self.watermark) },
            fit: self.fit,
        }
    }

    /// Every non-empty image source on the page, watermark first.
    pub fn image_sources(&self) -> Vec<&str> {
        std::iter::once(self.watermark.as_str())
            .chain(self.header.image_sources())
            .chain(self.body.image_sources())
            .filter(|src| !src.trim().is_empty())
            .collect()
    }
}

fn header_node(branding: &Branding, meta: &[String]) -> Node {
    let brand_text = Node::stack(
        2.0,
        vec![
            Node::caption(&branding.eyebrow, style::EYEBROW_SIZE, style::EYEBROW_TRACKING, style::TAGLINE),
            Node::bold(&branding.company_name, style::COMPANY_SIZE, style::COMPANY),
            Node::text(&branding.tagline, style::SMALL_SIZE, style::TAGLINE),
        ],
    );

    let brand = if branding.logo.trim().is_empty() {
        brand_text
    } else {
        let logo = Node::Image(ImageNode {
            src: branding.logo.clone(),
            alt: branding.company_name.clone(),
            width: Some(style::LOGO_WIDTH),
            height: style::LOGO_HEIGHT,
            fit: ImageFit::Contain,
            border: None,
        });
        Node::columns(16.0, vec![Track::Fixed(style::LOGO_WIDTH), Track::Flex(1.0)], vec![logo, brand_text])
    };

    let meta_lines = Node::stack(
        2.0,
        meta.iter()
            .map(|line| Node::bold(line, style::SMALL_SIZE, style::TAGLINE).aligned(Align::Right))
            .collect(),
    );

    Node::stack(
        16.0,
        vec![
            Node::columns(16.0, vec![Track::Flex(1.0), Track::Fixed(200.0)], vec![brand, meta_lines]),
            Node::Rule(style::TABLE_RULE),
        ],
    )
}
