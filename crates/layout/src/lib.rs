//! Page layout for printable service reports.
//!
//! The engine turns a [`PrintableReport`](fieldreport_types::PrintableReport)
//! into exactly two fixed-size A4 page trees, measures each page body and
//! shrinks it uniformly until it fits the frame. Pages are flattened into a
//! display list of rectangles, text runs and images for capture.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Page frame leaves no room for the body: header needs {header:.2}px of {available:.2}px.")]
    NoBodySpace { header: f32, available: f32 },
}

pub mod autofit;
pub mod config;
pub mod node;
pub mod page;
pub mod painting;
pub mod report;
pub mod style;
pub mod text;

pub use self::autofit::{fit_scale, layout_width, AutoFit, FitOutcome};
pub use self::config::LayoutConfig;
pub use self::node::{Align, BoxStyle, Columns, ImageFit, ImageNode, Node, Stack, TextNode, Track};
pub use self::page::{Branding, LaidOutPage, PageContent, PageSpec};
pub use self::painting::{Blend, Layer, PagePaint, PaintItem};
pub use self::report::{DateFormatter, ReportLayout, REPORT_PAGE_COUNT};
pub use self::text::TextMetrics;

// Re-export geometry types used by nodes and painters to prevent type mismatches
pub use fieldreport_types::geometry::{Edges, Rect, Size};
