//! A headless [`PrintPlatform`] that writes to a spool directory.
//!
//! Saved files land in the directory under their own names. Printing the
//! portal writes its document as `print-<n>.pdf`; printing the embedded
//! frame writes the framed object as `frame-<n>.pdf`. The print dialog
//! reports completion immediately.

use fieldreport_traits::{PlatformError, PortalDocument, PrintPlatform, PrintSignal};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct SpoolState {
    styles: HashMap<String, String>,
    portal: Option<PortalDocument>,
    objects: HashMap<String, Arc<Vec<u8>>>,
    frame: Option<String>,
}

#[derive(Debug)]
pub struct SpoolPlatform {
    dir: PathBuf,
    state: Mutex<SpoolState>,
    next_id: AtomicUsize,
}

impl SpoolPlatform {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), state: Mutex::new(SpoolState::default()), next_id: AtomicUsize::new(1) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SpoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, PlatformError> {
        let file_name = Path::new(name)
            .file_name()
            .ok_or_else(|| PlatformError::Save { name: name.to_string(), message: "not a file name".into() })?;
        let path = self.dir.join(file_name);
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, bytes))
            .map_err(|e| PlatformError::Save { name: name.to_string(), message: e.to_string() })?;
        log::info!("Spooled {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

impl PrintPlatform for SpoolPlatform {
    fn inject_style(&self, id: &str, css: &str) -> Result<(), PlatformError> {
        self.state().styles.insert(id.to_string(), css.to_string());
        Ok(())
    }

    fn remove_style(&self, id: &str) {
        self.state().styles.remove(id);
    }

    fn mount_portal(&self, portal: &PortalDocument) -> Result<(), PlatformError> {
        let mut state = self.state();
        if state.portal.as_ref().is_some_and(|p| p.root_id == portal.root_id) {
            return Err(PlatformError::Mount(portal.root_id.clone(), "already mounted".into()));
        }
        state.portal = Some(portal.clone());
        Ok(())
    }

    fn unmount_portal(&self, root_id: &str) {
        let mut state = self.state();
        if state.portal.as_ref().is_some_and(|p| p.root_id == root_id) {
            state.portal = None;
        }
    }

    fn open_print_dialog(&self) -> Result<PrintSignal, PlatformError> {
        let document = self
            .state()
            .portal
            .as_ref()
            .map(|p| Arc::clone(&p.document))
            .ok_or_else(|| PlatformError::PrintUnavailable("no portal mounted".into()))?;
        self.write(&format!("print-{}.pdf", self.next()), &document)?;
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        Ok(rx)
    }

    fn save_file(&self, name: &str, bytes: &[u8]) -> Result<(), PlatformError> {
        self.write(name, bytes).map(|_| ())
    }

    fn create_object_url(&self, bytes: Arc<Vec<u8>>, mime: &str) -> Result<String, PlatformError> {
        let url = format!("blob:spool/{}?type={}", self.next(), mime);
        self.state().objects.insert(url.clone(), bytes);
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        self.state().objects.remove(url);
    }

    fn show_frame(&self, url: &str) -> Result<(), PlatformError> {
        let mut state = self.state();
        if !state.objects.contains_key(url) {
            return Err(PlatformError::UnknownObjectUrl(url.to_string()));
        }
        state.frame = Some(url.to_string());
        Ok(())
    }

    fn print_frame(&self, url: &str) -> Result<(), PlatformError> {
        let bytes = {
            let state = self.state();
            if state.frame.as_deref() != Some(url) {
                return Err(PlatformError::PrintUnavailable(format!("'{}' is not shown", url)));
            }
            state.objects.get(url).cloned().ok_or_else(|| PlatformError::UnknownObjectUrl(url.to_string()))?
        };
        self.write(&format!("frame-{}.pdf", self.next()), &bytes).map(|_| ())
    }
}
