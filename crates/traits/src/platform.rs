//! The host capabilities the print orchestrator drives.
//!
//! A browser host maps these onto style/portal DOM injection, `window.print`
//! with `afterprint`, anchor downloads and blob URLs. Headless hosts spool
//! files instead.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Element '{0}' could not be mounted: {1}")]
    Mount(String, String),

    #[error("Print dialog unavailable: {0}")]
    PrintUnavailable(String),

    #[error("Failed to save '{name}': {message}")]
    Save { name: String, message: String },

    #[error("Unknown object URL: {0}")]
    UnknownObjectUrl(String),

    #[error("Platform error: {0}")]
    Other(String),
}

/// Fires when the print dialog reports completion. A host that never
/// signals may simply drop the sender or keep it alive forever; the
/// orchestrator bounds the wait with its own fallback timer.
pub type PrintSignal = oneshot::Receiver<()>;

/// The print-only subtree mounted outside the normal view hierarchy.
///
/// `document` holds the prepared (scaled, inlined) pages already captured
/// into a print-ready PDF.
#[derive(Debug, Clone)]
pub struct PortalDocument {
    pub root_id: String,
    pub style_id: String,
    pub style_sheet: String,
    pub page_count: usize,
    pub document: Arc<Vec<u8>>,
}

pub trait PrintPlatform: Send + Sync {
    /// Inject a uniquely identified style element. Injecting an existing id
    /// replaces it.
    fn inject_style(&self, id: &str, css: &str) -> Result<(), PlatformError>;

    fn remove_style(&self, id: &str);

    /// Mount a portal root. A root with the same id must not already exist.
    fn mount_portal(&self, portal: &PortalDocument) -> Result<(), PlatformError>;

    fn unmount_portal(&self, root_id: &str);

    /// Open the native print dialog for the mounted portal.
    fn open_print_dialog(&self) -> Result<PrintSignal, PlatformError>;

    /// Trigger a named-file download of binary content.
    fn save_file(&self, name: &str, bytes: &[u8]) -> Result<(), PlatformError>;

    fn create_object_url(&self, bytes: Arc<Vec<u8>>, mime: &str) -> Result<String, PlatformError>;

    fn revoke_object_url(&self, url: &str);

    /// Render `url` in the embedded preview frame.
    fn show_frame(&self, url: &str) -> Result<(), PlatformError>;

    /// Invoke the embedded frame's own print capability.
    fn print_frame(&self, url: &str) -> Result<(), PlatformError>;
}
