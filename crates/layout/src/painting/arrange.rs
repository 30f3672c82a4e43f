use super::{align_x, Blend, Layer, PaintItem};
use crate::node::{BoxStyle, ImageNode, Node, Track};
use crate::text::{wrap_lines, TextMetrics};
use fieldreport_types::Rect;

/// Natural height of `node` laid out at `width`.
pub fn measure(node: &Node, width: f32, metrics: &TextMetrics) -> f32 {
    match node {
        Node::Stack(s) => {
            let inner = (width - s.style.padding.horizontal()).max(0.0);
            let content = stack_content_height(&s.children, s.gap, inner, metrics);
            box_height(&s.style, content)
        }
        Node::Columns(c) => {
            let inner = (width - c.style.padding.horizontal()).max(0.0);
            let widths = resolve_tracks(&c.tracks, inner, c.gap);
            let row = c
                .children
                .iter()
                .zip(widths.iter())
                .map(|(child, w)| measure(child, *w, metrics))
                .fold(0.0f32, f32::max);
            box_height(&c.style, row)
        }
        Node::Text(t) => metrics.block_height(&t.content, t.size, t.bold, t.tracking, width),
        Node::Image(img) => img.height,
        Node::Rule(_) => 1.0,
        Node::Spacer(h) => *h,
    }
}

/// Lays `node` out at (`x`, `y`) with the given width, appending paint items.
/// Returns the height consumed, which always equals [`measure`].
pub fn arrange(
    node: &Node,
    x: f32,
    y: f32,
    width: f32,
    metrics: &TextMetrics,
    out: &mut Vec<PaintItem>,
) -> f32 {
    match node {
        Node::Stack(s) => {
            let inner_w = (width - s.style.padding.horizontal()).max(0.0);
            let content = stack_content_height(&s.children, s.gap, inner_w, metrics);
            let height = box_height(&s.style, content);
            paint_box(&s.style, Rect::new(x, y, width, height), out);

            let inner_x = x + s.style.padding.left;
            let mut cursor = y + s.style.padding.top;
            if s.center {
                let free = height - s.style.padding.vertical() - content;
                cursor += (free / 2.0).max(0.0);
            }
            for (i, child) in s.children.iter().enumerate() {
                if i > 0 {
                    cursor += s.gap;
                }
                let child_x = match child {
                    Node::Image(ImageNode { width: Some(w), .. }) if s.center && *w < inner_w => {
                        inner_x + (inner_w - w) / 2.0
                    }
                    _ => inner_x,
                };
                cursor += arrange(child, child_x, cursor, inner_w, metrics, out);
            }
            height
        }
        Node::Columns(c) => {
            let inner_w = (width - c.style.padding.horizontal()).max(0.0);
            let widths = resolve_tracks(&c.tracks, inner_w, c.gap);
            let row = c
                .children
                .iter()
                .zip(widths.iter())
                .map(|(child, w)| measure(child, *w, metrics))
                .fold(0.0f32, f32::max);
            let height = box_height(&c.style, row);
            paint_box(&c.style, Rect::new(x, y, width, height), out);

            let mut cursor_x = x + c.style.padding.left;
            let top = y + c.style.padding.top;
            for (child, w) in c.children.iter().zip(widths.iter()) {
                arrange(child, cursor_x, top, *w, metrics, out);
                cursor_x += w + c.gap;
            }
            height
        }
        Node::Text(t) => {
            let lines = wrap_lines(metrics, &t.content, t.size, t.bold, t.tracking, width);
            let line_h = metrics.line_height(t.size);
            for (i, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let line_w = metrics.text_width(line, t.size, t.bold, t.tracking);
                out.push(PaintItem::Text {
                    x: align_x(t.align, x, width, line_w),
                    baseline: y + i as f32 * line_h + metrics.baseline_offset(t.size),
                    size: t.size,
                    bold: t.bold,
                    color: t.color,
                    tracking: t.tracking,
                    text: line.clone(),
                });
            }
            lines.len().max(1) as f32 * line_h
        }
        Node::Image(img) => {
            let w = img.width.map_or(width, |w| w.min(width));
            let rect = Rect::new(x, y, w, img.height);
            if !img.src.trim().is_empty() {
                out.push(PaintItem::Image {
                    rect,
                    src: img.src.clone(),
                    fit: img.fit,
                    opacity: 1.0,
                    blend: Blend::Normal,
                });
            }
            if let Some(border) = img.border {
                out.push(PaintItem::Rect {
                    rect,
                    fill: None,
                    stroke: Some(border),
                    dashed: false,
                    shadow: false,
                    layer: Layer::Content,
                });
            }
            img.height
        }
        Node::Rule(color) => {
            out.push(PaintItem::Rect {
                rect: Rect::new(x, y, width, 1.0),
                fill: Some(*color),
                stroke: None,
                dashed: false,
                shadow: false,
                layer: Layer::Content,
            });
            1.0
        }
        Node::Spacer(h) => *h,
    }
}

fn stack_content_height(children: &[Node], gap: f32, width: f32, metrics: &TextMetrics) -> f32 {
    let gaps = gap * children.len().saturating_sub(1) as f32;
    children.iter().map(|c| measure(c, width, metrics)).sum::<f32>() + gaps
}

fn box_height(style: &BoxStyle, content: f32) -> f32 {
    (content + style.padding.vertical()).max(style.min_height)
}

fn paint_box(style: &BoxStyle, rect: Rect, out: &mut Vec<PaintItem>) {
    if style.is_decorated() {
        out.push(PaintItem::Rect {
            rect,
            fill: style.background,
            stroke: style.border,
            dashed: style.dashed,
            shadow: style.shadow,
            layer: Layer::Content,
        });
    }
}

/// Splits `width` between tracks: fixed tracks first, flex tracks share the rest.
pub(crate) fn resolve_tracks(tracks: &[Track], width: f32, gap: f32) -> Vec<f32> {
    let gaps = gap * tracks.len().saturating_sub(1) as f32;
    let fixed: f32 = tracks
        .iter()
        .map(|t| match t {
            Track::Fixed(w) => *w,
            Track::Flex(_) => 0.0,
        })
        .sum();
    let flex_total: f32 = tracks
        .iter()
        .map(|t| match t {
            Track::Flex(f) => *f,
            Track::Fixed(_) => 0.0,
        })
        .sum();
    let remaining = (width - gaps - fixed).max(0.0);

    tracks
        .iter()
        .map(|t| match t {
            Track::Fixed(w) => *w,
            Track::Flex(f) if flex_total > 0.0 => remaining * f / flex_total,
            Track::Flex(_) => 0.0,
        })
        .collect()
}
