//! Print and PDF export for field-service reports.
//!
//! A [`PrintableReport`] snapshot is built from form values or a stored
//! record ([`SnapshotBuilder`]), laid out onto two A4 pages, has its images
//! inlined and settled, and is captured into a PDF ([`ReportPipeline`]).
//! Attachment PDFs can be appended after the report ([`AttachmentMerger`]).
//! [`PrintSession`] drives printing and downloading through a host
//! [`PrintPlatform`].

pub mod config;
pub mod error;
pub mod format;
pub mod merge;
pub mod pipeline;
pub mod platform;
pub mod session;
pub mod snapshot;

pub use config::{PrintConfig, PrintConfigBuilder};
pub use error::PipelineError;
pub use format::format_display_date;
pub use merge::{AttachmentMerger, MergeError, MergedPdf};
pub use pipeline::{PreparedReport, ReportPipeline};
pub use platform::SpoolPlatform;
pub use session::{CloseHandle, PrintSession, SessionError, SessionState};
pub use snapshot::{ReportForm, ServiceReportRecord, SnapshotBuilder};

pub use fieldreport_layout::Branding;
pub use fieldreport_resource::{
    FilesystemFetcher, HttpFetcher, HttpFetcherOptions, InMemoryFetcher, MediaFetcher, RoutedFetcher,
};
pub use fieldreport_traits::{PlatformError, PortalDocument, PrintPlatform, PrintSignal};
pub use fieldreport_types::{AttachmentRef, EvidenceSet, PrintableReport};
