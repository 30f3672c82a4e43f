pub mod fixtures;
pub mod pdf_assertions;

use async_trait::async_trait;
use fieldreport::{
    InMemoryFetcher, MediaFetcher, PlatformError, PortalDocument, PrintPlatform, PrintSession, PrintSignal,
    PrintConfig, ReportPipeline,
};
use fieldreport_traits::{FetchError, FetchedMedia};
use lopdf::Document as LopdfDocument;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Semaphore};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// How a [`RecordingPlatform`] answers the print dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum DialogBehavior {
    /// Completion is reported as soon as the dialog opens.
    Completes,
    /// The dialog never reports completion.
    Hangs,
    /// The completion sender is dropped without firing.
    Drops,
    /// The dialog cannot be opened at all.
    Fails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    InjectStyle(String),
    RemoveStyle(String),
    Mount(String),
    Unmount(String),
    PrintDialog,
    Save(String),
    CreateObjectUrl(String),
    Revoke(String),
    ShowFrame(String),
    PrintFrame(String),
}

#[derive(Default)]
struct Recorded {
    calls: Vec<PlatformCall>,
    styles: HashMap<String, String>,
    portal: Option<PortalDocument>,
    saved: Vec<(String, Vec<u8>)>,
    objects: HashMap<String, Arc<Vec<u8>>>,
    frame: Option<String>,
    printed_frames: Vec<Arc<Vec<u8>>>,
    pending: Vec<oneshot::Sender<()>>,
    next_url: usize,
}

/// An in-memory host that records every call the session makes.
pub struct RecordingPlatform {
    behavior: DialogBehavior,
    inner: Mutex<Recorded>,
}

#[allow(dead_code)]
impl RecordingPlatform {
    pub fn new(behavior: DialogBehavior) -> Arc<Self> {
        Arc::new(Self { behavior, inner: Mutex::new(Recorded::default()) })
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&PlatformCall) -> bool) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|c| matches(c)).count()
    }

    pub fn dialog_opens(&self) -> usize {
        self.count(|c| *c == PlatformCall::PrintDialog)
    }

    pub fn portal(&self) -> Option<PortalDocument> {
        self.inner.lock().unwrap().portal.clone()
    }

    pub fn style(&self, id: &str) -> Option<String> {
        self.inner.lock().unwrap().styles.get(id).cloned()
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.inner.lock().unwrap().saved.clone()
    }

    pub fn live_objects(&self) -> usize {
        self.inner.lock().unwrap().objects.len()
    }

    pub fn frame(&self) -> Option<String> {
        self.inner.lock().unwrap().frame.clone()
    }

    pub fn printed_frames(&self) -> Vec<Arc<Vec<u8>>> {
        self.inner.lock().unwrap().printed_frames.clone()
    }
}

impl PrintPlatform for RecordingPlatform {
    fn inject_style(&self, id: &str, css: &str) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::InjectStyle(id.to_string()));
        inner.styles.insert(id.to_string(), css.to_string());
        Ok(())
    }

    fn remove_style(&self, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::RemoveStyle(id.to_string()));
        inner.styles.remove(id);
    }

    fn mount_portal(&self, portal: &PortalDocument) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::Mount(portal.root_id.clone()));
        if inner.portal.is_some() {
            return Err(PlatformError::Mount(portal.root_id.clone(), "already mounted".into()));
        }
        inner.portal = Some(portal.clone());
        Ok(())
    }

    fn unmount_portal(&self, root_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::Unmount(root_id.to_string()));
        inner.portal = None;
    }

    fn open_print_dialog(&self) -> Result<PrintSignal, PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::PrintDialog);
        if inner.portal.is_none() {
            return Err(PlatformError::PrintUnavailable("no portal mounted".into()));
        }
        if self.behavior == DialogBehavior::Fails {
            return Err(PlatformError::PrintUnavailable("printing disabled".into()));
        }
        let (tx, rx) = oneshot::channel();
        match self.behavior {
            DialogBehavior::Completes => {
                let _ = tx.send(());
            }
            DialogBehavior::Hangs => inner.pending.push(tx),
            DialogBehavior::Drops | DialogBehavior::Fails => drop(tx),
        }
        Ok(rx)
    }

    fn save_file(&self, name: &str, bytes: &[u8]) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::Save(name.to_string()));
        inner.saved.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn create_object_url(&self, bytes: Arc<Vec<u8>>, mime: &str) -> Result<String, PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_url += 1;
        let url = format!("blob:test/{}", inner.next_url);
        inner.calls.push(PlatformCall::CreateObjectUrl(mime.to_string()));
        inner.objects.insert(url.clone(), bytes);
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::Revoke(url.to_string()));
        inner.objects.remove(url);
    }

    fn show_frame(&self, url: &str) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::ShowFrame(url.to_string()));
        if !inner.objects.contains_key(url) {
            return Err(PlatformError::UnknownObjectUrl(url.to_string()));
        }
        inner.frame = Some(url.to_string());
        Ok(())
    }

    fn print_frame(&self, url: &str) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlatformCall::PrintFrame(url.to_string()));
        let bytes = inner.objects.get(url).cloned().ok_or_else(|| PlatformError::UnknownObjectUrl(url.to_string()))?;
        inner.printed_frames.push(bytes);
        Ok(())
    }
}

/// Holds every fetch until [`GatedFetcher::release`] is called.
#[derive(Debug)]
pub struct GatedFetcher {
    inner: Arc<InMemoryFetcher>,
    gate: Semaphore,
}

#[allow(dead_code)]
impl GatedFetcher {
    pub fn new(inner: Arc<InMemoryFetcher>) -> Arc<Self> {
        Arc::new(Self { inner, gate: Semaphore::new(0) })
    }

    pub fn release(&self) {
        self.gate.add_permits(1 << 16);
    }
}

#[async_trait]
impl MediaFetcher for GatedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError> {
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.inner.fetch(url).await
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

/// A session over `fetcher` and a recording platform.
#[allow(dead_code)]
pub fn session_with(
    config: PrintConfig,
    fetcher: Arc<dyn MediaFetcher>,
    behavior: DialogBehavior,
) -> (Arc<PrintSession>, Arc<RecordingPlatform>) {
    let platform = RecordingPlatform::new(behavior);
    let pipeline = Arc::new(ReportPipeline::new(config, fetcher));
    let session = Arc::new(PrintSession::new(pipeline, Arc::clone(&platform) as Arc<dyn PrintPlatform>));
    (session, platform)
}
