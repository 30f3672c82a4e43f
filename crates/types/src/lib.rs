pub mod color;
pub mod geometry;
pub mod report;
pub mod units;

pub use color::Color;
pub use geometry::{Edges, Rect, Size};
pub use report::{
    AttachmentRef, DeviceRow, EvidenceSet, PrintableReport, SparePartRow, ToolRow,
    MAX_EVIDENCE_IMAGES,
};
