//! Appending attachment PDFs after the generated report.

use fieldreport_pdf_composer::{append_document, empty_document, load, to_bytes, ComposerError};
use fieldreport_resource::{FetchError, MediaFetcher, SourceResolver};
use fieldreport_types::AttachmentRef;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Generated report could not be read: {0}")]
    Report(#[source] ComposerError),

    #[error("Failed to fetch attachment '{name}': {source}")]
    AttachmentFetch {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("Attachment '{name}' is not a readable PDF: {source}")]
    AttachmentParse {
        name: String,
        #[source]
        source: ComposerError,
    },

    #[error("Failed to write merged PDF: {0}")]
    Compose(#[from] ComposerError),
}

impl MergeError {
    /// The attachment that stopped the merge, if one did.
    pub fn attachment(&self) -> Option<&str> {
        match self {
            MergeError::AttachmentFetch { name, .. } | MergeError::AttachmentParse { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A merged document and where its pages came from.
#[derive(Debug, Clone)]
pub struct MergedPdf {
    pub bytes: Vec<u8>,
    pub report_pages: usize,
    pub attachment_pages: usize,
}

impl MergedPdf {
    pub fn page_count(&self) -> usize {
        self.report_pages + self.attachment_pages
    }
}

/// Fetches attachment PDFs and appends their pages after the report's.
///
/// The merge is all-or-nothing: every attachment is fetched and parsed before
/// the output document is assembled, and the first failure aborts it.
#[derive(Debug, Clone)]
pub struct AttachmentMerger {
    fetcher: Arc<dyn MediaFetcher>,
    resolver: SourceResolver,
    timeout: Duration,
}

impl AttachmentMerger {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, resolver: SourceResolver, timeout: Duration) -> Self {
        Self { fetcher, resolver, timeout }
    }

    pub async fn merge(&self, report_pdf: &[u8], attachments: &[AttachmentRef]) -> Result<MergedPdf, MergeError> {
        let report = load(report_pdf).map_err(MergeError::Report)?;

        let mut sources = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            let name = attachment.display_name().to_string();
            let bytes = self.fetch(attachment).await.map_err(|source| {
                log::error!("Attachment '{}' could not be fetched: {}", name, source);
                MergeError::AttachmentFetch { name: name.clone(), source }
            })?;
            let doc = load(&bytes).map_err(|source| {
                log::error!("Attachment '{}' could not be parsed: {}", name, source);
                MergeError::AttachmentParse { name: name.clone(), source }
            })?;
            log::debug!("Attachment '{}' has {} page(s)", name, doc.get_pages().len());
            sources.push(doc);
        }

        let mut output = empty_document();
        let report_pages = append_document(&mut output, &report)?;
        let mut attachment_pages = 0;
        for doc in &sources {
            attachment_pages += append_document(&mut output, doc)?;
        }
        let bytes = to_bytes(&mut output)?;

        log::info!(
            "Merged {} report page(s) with {} attachment page(s) from {} attachment(s)",
            report_pages,
            attachment_pages,
            attachments.len()
        );
        Ok(MergedPdf { bytes, report_pages, attachment_pages })
    }

    async fn fetch(&self, attachment: &AttachmentRef) -> Result<Arc<Vec<u8>>, FetchError> {
        let resolved = self.resolver.resolve(&attachment.url);
        let url = self
            .resolver
            .fetch_url(&resolved)
            .ok_or_else(|| FetchError::NotFound(attachment.url.clone()))?;
        match tokio::time::timeout(self.timeout, self.fetcher.fetch(&url)).await {
            Ok(result) => Ok(result?.bytes),
            Err(_) => Err(FetchError::Timeout { url, millis: self.timeout.as_millis() as u64 }),
        }
    }
}
