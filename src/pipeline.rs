//! The report print pipeline: layout, image inlining, decode, capture and
//! PDF assembly.

use crate::config::PrintConfig;
use crate::error::PipelineError;
use crate::format::format_display_date;
use fieldreport_layout::{LaidOutPage, ReportLayout};
use fieldreport_render::{assemble, capture_pages, CleanPrintMode};
use fieldreport_resource::{await_images, DecodedImages, InlineReport, Inliner, MediaFetcher};
use fieldreport_types::PrintableReport;
use std::sync::Arc;
use std::time::Instant;

/// Pages ready for capture: laid out, images inlined and every image settled.
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub pages: Vec<LaidOutPage>,
    pub images: Arc<DecodedImages>,
    pub inline: InlineReport,
}

impl PreparedReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Runs a snapshot through to PDF bytes.
///
/// Each stage is exposed on its own so that a caller can check for
/// cancellation between awaits; [`ReportPipeline::render_pdf`] runs them all.
#[derive(Debug)]
pub struct ReportPipeline {
    config: PrintConfig,
    layout: ReportLayout,
    inliner: Inliner,
    fetcher: Arc<dyn MediaFetcher>,
    clean: CleanPrintMode,
}

impl ReportPipeline {
    pub fn new(config: PrintConfig, fetcher: Arc<dyn MediaFetcher>) -> Self {
        let layout = ReportLayout::new(config.layout_config(), config.branding.clone(), format_display_date);
        let inliner = Inliner::new(Arc::clone(&fetcher), config.resolver()).with_timeout(config.image_fetch_timeout());
        Self { config, layout, inliner, fetcher, clean: CleanPrintMode::new() }
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Arc<dyn MediaFetcher> {
        &self.fetcher
    }

    pub fn inliner(&self) -> &Inliner {
        &self.inliner
    }

    /// The print-clean switch shared by every capture of this pipeline.
    pub fn clean_mode(&self) -> &CleanPrintMode {
        &self.clean
    }

    pub fn layout(&self, report: &PrintableReport) -> Result<Vec<LaidOutPage>, PipelineError> {
        let pages = self.layout.layout(report)?;
        for page in &pages {
            log::debug!(
                "Page {}: scale {:.3}, layout width {:.1}px",
                page.index + 1,
                page.fit.scale,
                page.fit.layout_width
            );
        }
        Ok(pages)
    }

    /// Inlines images into a copy of `pages` and waits for every image to
    /// decode or fail.
    pub async fn settle_images(&self, pages: &[LaidOutPage]) -> Result<PreparedReport, PipelineError> {
        let inlined = self.inliner.inline(pages).await;
        let images = await_images(&inlined.pages).await?;
        Ok(PreparedReport { pages: inlined.pages, images: Arc::new(images), inline: inlined.report })
    }

    pub async fn prepare(&self, report: &PrintableReport) -> Result<PreparedReport, PipelineError> {
        let pages = self.layout(report)?;
        self.settle_images(&pages).await
    }

    /// Captures prepared pages and assembles them into a PDF.
    pub async fn capture(&self, prepared: &PreparedReport) -> Result<Vec<u8>, PipelineError> {
        let captured = capture_pages(
            &prepared.pages,
            Arc::clone(&prepared.images),
            self.layout.metrics(),
            self.config.render_options(),
            &self.clean,
        )
        .await
        .inspect_err(|e| log::error!("Page capture failed: {}", e))?;
        Ok(assemble(&captured)?)
    }

    /// Renders a fresh report-only PDF for `report`.
    pub async fn render_pdf(&self, report: &PrintableReport) -> Result<Vec<u8>, PipelineError> {
        let start = Instant::now();
        log::info!("Rendering report '{}'", report.dispatch_no);
        let prepared = self.prepare(report).await?;
        let bytes = self.capture(&prepared).await?;
        log::info!(
            "Rendered {} page(s) in {:.2?} ({} bytes)",
            prepared.page_count(),
            start.elapsed(),
            bytes.len()
        );
        Ok(bytes)
    }
}
