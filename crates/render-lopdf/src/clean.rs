use fieldreport_layout::{Layer, PaintItem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Print-clean mode: while engaged, captured pages lose the non-white
/// backgrounds and shadows of their content. The page's own white
/// background is kept.
///
/// The mode counts live guards, so a capture that is still running keeps it
/// engaged when an older one finishes.
#[derive(Debug, Clone, Default)]
pub struct CleanPrintMode {
    holders: Arc<AtomicUsize>,
}

impl CleanPrintMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }

    /// Engages clean mode until the returned guard is dropped.
    pub fn engage(&self) -> CleanGuard {
        self.holders.fetch_add(1, Ordering::SeqCst);
        CleanGuard { holders: Arc::clone(&self.holders) }
    }

    /// The item as it is captured under the current mode.
    pub fn apply(&self, item: &PaintItem) -> PaintItem {
        if !self.is_active() {
            return item.clone();
        }
        match item {
            PaintItem::Rect { rect, fill, stroke, dashed, layer: Layer::Content, .. } => PaintItem::Rect {
                rect: *rect,
                fill: fill.filter(|c| c.is_white()),
                stroke: *stroke,
                dashed: *dashed,
                shadow: false,
                layer: Layer::Content,
            },
            other => other.clone(),
        }
    }
}

/// Releases its hold on drop, whether capture succeeded or not. Normal
/// rendering returns once the last guard is gone.
#[derive(Debug)]
pub struct CleanGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for CleanGuard {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldreport_types::{Color, Rect};

    fn card(layer: Layer) -> PaintItem {
        PaintItem::Rect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            fill: Some(Color::rgb(0xf8, 0xf9, 0xfc)),
            stroke: Some(Color::rgb(0xd4, 0xd9, 0xe7)),
            dashed: false,
            shadow: true,
            layer,
        }
    }

    #[test]
    fn guard_restores_on_drop() {
        let mode = CleanPrintMode::new();
        {
            let _guard = mode.engage();
            assert!(mode.is_active());
        }
        assert!(!mode.is_active());
    }

    #[test]
    fn overlapping_captures_keep_the_mode_engaged() {
        let mode = CleanPrintMode::new();
        let stale = mode.engage();
        let current = mode.engage();
        drop(stale);
        assert!(mode.is_active());
        drop(current);
        assert!(!mode.is_active());
    }

    #[test]
    fn strips_content_decoration_only_while_engaged() {
        let mode = CleanPrintMode::new();
        assert_eq!(mode.apply(&card(Layer::Content)), card(Layer::Content));

        let _guard = mode.engage();
        let PaintItem::Rect { fill, shadow, stroke, .. } = mode.apply(&card(Layer::Content)) else {
            panic!("expected rect");
        };
        assert_eq!(fill, None);
        assert!(!shadow);
        assert!(stroke.is_some());

        assert_eq!(mode.apply(&card(Layer::Page)), card(Layer::Page));
    }

    #[test]
    fn white_fills_survive() {
        let mode = CleanPrintMode::new();
        let _guard = mode.engage();
        let white = PaintItem::Rect {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            fill: Some(Color::WHITE),
            stroke: None,
            dashed: false,
            shadow: false,
            layer: Layer::Content,
        };
        assert_eq!(mode.apply(&white), white);
    }
}
