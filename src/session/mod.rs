//! Print and download orchestration for one open report.
//!
//! A [`PrintSession`] owns everything transient about printing a snapshot:
//! the prepared pages, the captured report PDF, the print portal mounted on
//! the host and the object URL of a merged PDF. Closing the session (or
//! opening another snapshot) releases all of it.
//!
//! ```text
//! Idle -> Preparing -> Ready -> Printing ----> Idle
//!                          \--> Merging -----> Ready
//!                          \--> Downloading -> (previous state)
//! ```

mod portal;
mod state;

pub use portal::{portal_document, print_style_sheet, PRINT_ROOT_ID, PRINT_STYLE_ID};
pub use state::SessionState;

use crate::error::PipelineError;
use crate::merge::{AttachmentMerger, MergeError};
use crate::pipeline::{PreparedReport, ReportPipeline};
use fieldreport_traits::{PlatformError, PrintPlatform};
use fieldreport_types::PrintableReport;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Another operation is in progress ({0})")]
    Busy(SessionState),

    #[error("No report is open")]
    NoReport,

    #[error("Report must be finalized before printing.")]
    NotFinalized,

    #[error("The session was closed while the operation was running")]
    Cancelled,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Default)]
struct Shared {
    state: SessionState,
    /// Bumped by every open and close; work started under an older value is stale.
    generation: u64,
    report: Option<Arc<PrintableReport>>,
    prepared: Option<Arc<PreparedReport>>,
    report_pdf: Option<Arc<Vec<u8>>>,
    portal_mounted: bool,
    merged_url: Option<String>,
    status: Option<String>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unmount(shared: &mut Shared, platform: &dyn PrintPlatform) {
    if shared.portal_mounted {
        platform.unmount_portal(PRINT_ROOT_ID);
        platform.remove_style(PRINT_STYLE_ID);
        shared.portal_mounted = false;
        log::debug!("Print portal removed");
    }
}

fn teardown(shared: &mut Shared, platform: &dyn PrintPlatform) {
    unmount(shared, platform);
    if let Some(url) = shared.merged_url.take() {
        platform.revoke_object_url(&url);
        log::debug!("Revoked merged PDF {}", url);
    }
}

/// Closes a session from another task, e.g. while preparation is awaiting.
#[derive(Clone)]
pub struct CloseHandle {
    shared: Arc<Mutex<Shared>>,
    platform: Arc<dyn PrintPlatform>,
}

impl CloseHandle {
    /// Cancels in-flight work, removes the portal, revokes the merged PDF URL
    /// and returns the session to idle.
    pub fn close(&self) {
        let mut shared = lock(&self.shared);
        teardown(&mut shared, self.platform.as_ref());
        let generation = shared.generation + 1;
        *shared = Shared { generation, ..Shared::default() };
        log::info!("Print session closed");
    }
}

pub struct PrintSession {
    pipeline: Arc<ReportPipeline>,
    merger: AttachmentMerger,
    platform: Arc<dyn PrintPlatform>,
    shared: Arc<Mutex<Shared>>,
}

impl PrintSession {
    pub fn new(pipeline: Arc<ReportPipeline>, platform: Arc<dyn PrintPlatform>) -> Self {
        let config = pipeline.config();
        let merger = AttachmentMerger::new(Arc::clone(pipeline.fetcher()), config.resolver(), config.image_fetch_timeout());
        Self { pipeline, merger, platform, shared: Arc::new(Mutex::new(Shared::default())) }
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle { shared: Arc::clone(&self.shared), platform: Arc::clone(&self.platform) }
    }

    pub fn close(&self) {
        self.close_handle().close();
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// The last error or notice to show next to the print controls.
    pub fn status_message(&self) -> Option<String> {
        self.lock().status.clone()
    }

    /// Print and download controls are usable only while nothing is running.
    pub fn controls_enabled(&self) -> bool {
        !self.lock().state.is_busy()
    }

    pub fn report(&self) -> Option<Arc<PrintableReport>> {
        self.lock().report.clone()
    }

    pub fn prepared(&self) -> Option<Arc<PreparedReport>> {
        self.lock().prepared.clone()
    }

    pub fn portal_mounted(&self) -> bool {
        self.lock().portal_mounted
    }

    pub fn merged_url(&self) -> Option<String> {
        self.lock().merged_url.clone()
    }

    /// Opens `report` for printing, replacing whatever was open.
    ///
    /// Lays the report out, inlines and settles its images and captures the
    /// report PDF. Reports without attachments get a print portal mounted.
    /// With `auto_print` the report is printed as soon as it is ready.
    pub async fn open(&self, report: PrintableReport, auto_print: bool) -> Result<(), SessionError> {
        let report = Arc::new(report);
        let generation = {
            let mut shared = self.lock();
            if shared.state.is_busy() {
                return Err(SessionError::Busy(shared.state));
            }
            teardown(&mut shared, self.platform.as_ref());
            let generation = shared.generation + 1;
            *shared = Shared {
                generation,
                state: SessionState::Preparing,
                report: Some(Arc::clone(&report)),
                ..Shared::default()
            };
            generation
        };
        log::info!("Preparing report '{}' for print", report.dispatch_no);

        if let Err(e) = self.prepare(&report, generation).await {
            self.fail(generation, &e);
            return Err(e);
        }
        if auto_print {
            self.print().await?;
        }
        Ok(())
    }

    async fn prepare(&self, report: &PrintableReport, generation: u64) -> Result<(), SessionError> {
        let (pdf, page_count) = self.ensure_report_pdf(report, generation).await?;
        let mut shared = self.lock();
        if shared.generation != generation {
            return Err(SessionError::Cancelled);
        }
        if !report.has_attachments() {
            self.mount(&mut shared, pdf, page_count)?;
        }
        shared.state = SessionState::Ready;
        log::info!("Report '{}' ready ({} page(s))", report.dispatch_no, page_count);
        Ok(())
    }

    /// Prints the open report.
    ///
    /// Without attachments the native print dialog is opened exactly once
    /// over the portal; the portal is removed when the dialog signals
    /// completion or the fallback timer fires. With attachments the merged
    /// PDF is shown and printed in the embedded frame instead.
    pub async fn print(&self) -> Result<(), SessionError> {
        let (report, generation) = {
            let mut shared = self.lock();
            if shared.state.is_busy() {
                return Err(SessionError::Busy(shared.state));
            }
            let report = shared.report.clone().ok_or(SessionError::NoReport)?;
            if !report.is_finalized() {
                shared.status = Some(SessionError::NotFinalized.to_string());
                return Err(SessionError::NotFinalized);
            }
            shared.state = if report.has_attachments() { SessionState::Merging } else { SessionState::Printing };
            shared.status = None;
            (report, shared.generation)
        };

        let result = if report.has_attachments() {
            self.print_merged(&report, generation).await
        } else {
            self.print_native(&report, generation).await
        };
        if let Err(e) = &result {
            self.fail(generation, e);
        }
        result
    }

    async fn print_native(&self, report: &PrintableReport, generation: u64) -> Result<(), SessionError> {
        let (pdf, page_count) = self.ensure_report_pdf(report, generation).await?;
        {
            let mut shared = self.lock();
            if shared.generation != generation {
                return Err(SessionError::Cancelled);
            }
            if !shared.portal_mounted {
                self.mount(&mut shared, pdf, page_count)?;
            }
        }

        let signal = match self.platform.open_print_dialog() {
            Ok(signal) => signal,
            Err(e) => {
                let mut shared = self.lock();
                if shared.generation == generation {
                    unmount(&mut shared, self.platform.as_ref());
                }
                return Err(e.into());
            }
        };
        let fallback = self.pipeline.config().print_fallback();
        match tokio::time::timeout(fallback, signal).await {
            Ok(Ok(())) => log::debug!("Print dialog reported completion"),
            Ok(Err(_)) => log::warn!("Print dialog closed without reporting completion"),
            Err(_) => log::warn!("No print completion after {:?}; removing portal", fallback),
        }

        let mut shared = self.lock();
        if shared.generation != generation {
            return Err(SessionError::Cancelled);
        }
        unmount(&mut shared, self.platform.as_ref());
        shared.state = SessionState::Idle;
        Ok(())
    }

    async fn print_merged(&self, report: &PrintableReport, generation: u64) -> Result<(), SessionError> {
        let cached = self.lock().merged_url.clone();
        let url = match cached {
            Some(url) => {
                log::debug!("Reusing merged PDF {}", url);
                url
            }
            None => {
                let (pdf, _) = self.ensure_report_pdf(report, generation).await?;
                let merged = self.merger.merge(&pdf, &report.attachments).await?;
                let mut shared = self.lock();
                if shared.generation != generation {
                    return Err(SessionError::Cancelled);
                }
                let url = self.platform.create_object_url(Arc::new(merged.bytes), PDF_MIME)?;
                shared.merged_url = Some(url.clone());
                url
            }
        };

        self.platform.show_frame(&url)?;
        self.platform.print_frame(&url)?;

        let mut shared = self.lock();
        if shared.generation != generation {
            return Err(SessionError::Cancelled);
        }
        shared.state = SessionState::Ready;
        Ok(())
    }

    /// Saves a freshly rendered, report-only PDF named after the dispatch
    /// number and returns the file name. Attachments are never included.
    pub async fn download(&self) -> Result<String, SessionError> {
        let (report, generation, previous) = {
            let mut shared = self.lock();
            if shared.state.is_busy() {
                return Err(SessionError::Busy(shared.state));
            }
            let report = shared.report.clone().ok_or(SessionError::NoReport)?;
            let previous = shared.state;
            shared.state = SessionState::Downloading;
            shared.status = None;
            (report, shared.generation, previous)
        };

        let result = self.save_report(&report, generation).await;

        let mut shared = self.lock();
        if shared.generation != generation {
            return Err(SessionError::Cancelled);
        }
        shared.state = previous;
        match result {
            Ok(name) => {
                log::info!("Saved {}", name);
                Ok(name)
            }
            Err(e) => {
                log::error!("Download failed: {}", e);
                shared.status = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn save_report(&self, report: &PrintableReport, generation: u64) -> Result<String, SessionError> {
        let bytes = self.pipeline.render_pdf(report).await?;
        self.ensure_current(generation)?;
        let name = report.pdf_file_name();
        self.platform.save_file(&name, &bytes)?;
        Ok(name)
    }

    /// The captured report PDF, rendering it first if this session has none.
    async fn ensure_report_pdf(
        &self,
        report: &PrintableReport,
        generation: u64,
    ) -> Result<(Arc<Vec<u8>>, usize), SessionError> {
        {
            let shared = self.lock();
            if let (Some(pdf), Some(prepared)) = (&shared.report_pdf, &shared.prepared) {
                return Ok((Arc::clone(pdf), prepared.page_count()));
            }
        }

        let prepared = self.pipeline.prepare(report).await?;
        self.ensure_current(generation)?;
        log::debug!(
            "{} image(s) inlined, {} of {} decoded",
            prepared.inline.inlined,
            prepared.images.loaded(),
            prepared.images.reported()
        );
        let pdf = Arc::new(self.pipeline.capture(&prepared).await?);

        let mut shared = self.lock();
        if shared.generation != generation {
            return Err(SessionError::Cancelled);
        }
        let page_count = prepared.page_count();
        shared.prepared = Some(Arc::new(prepared));
        shared.report_pdf = Some(Arc::clone(&pdf));
        Ok((pdf, page_count))
    }

    fn mount(&self, shared: &mut Shared, pdf: Arc<Vec<u8>>, page_count: usize) -> Result<(), PlatformError> {
        let portal = portal_document(pdf, page_count);
        self.platform.inject_style(&portal.style_id, &portal.style_sheet)?;
        if let Err(e) = self.platform.mount_portal(&portal) {
            self.platform.remove_style(&portal.style_id);
            return Err(e);
        }
        shared.portal_mounted = true;
        log::debug!("Print portal mounted with {} page(s)", page_count);
        Ok(())
    }

    fn ensure_current(&self, generation: u64) -> Result<(), SessionError> {
        if self.lock().generation == generation {
            Ok(())
        } else {
            log::debug!("Discarding stale result of generation {}", generation);
            Err(SessionError::Cancelled)
        }
    }

    /// Records a failure unless the work that failed is stale.
    fn fail(&self, generation: u64, error: &SessionError) {
        if matches!(error, SessionError::Cancelled) {
            return;
        }
        let mut shared = self.lock();
        if shared.generation != generation {
            return;
        }
        log::error!("Print operation failed: {}", error);
        shared.state = if shared.report_pdf.is_some() { SessionState::Ready } else { SessionState::Idle };
        shared.status = Some(error.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock(&self.shared)
    }
}
