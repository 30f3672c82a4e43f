mod common;

use common::fixtures::{attachment_pdf, test_config};
use common::pdf_assertions::page_content;
use common::{GeneratedPdf, TestResult};
use fieldreport::{AttachmentMerger, AttachmentRef, InMemoryFetcher, MergeError};
use fieldreport_traits::FetchError;
use std::sync::Arc;
use std::time::Duration;

fn merger(fetcher: Arc<InMemoryFetcher>) -> AttachmentMerger {
    let config = test_config();
    AttachmentMerger::new(fetcher, config.resolver(), Duration::from_secs(2))
}

#[tokio::test]
async fn appends_attachments_after_report_in_order() -> TestResult {
    let fetcher = Arc::new(InMemoryFetcher::new());
    fetcher.add("http://api.test/uploads/a.pdf", attachment_pdf(2, "Alpha"), Some("application/pdf"));
    fetcher.add("http://api.test/uploads/b.pdf", attachment_pdf(1, "Beta"), Some("application/pdf"));
    let report = attachment_pdf(2, "Report");

    let attachments = vec![
        AttachmentRef::new("uploads/a.pdf", Some("Alpha.pdf".into())),
        AttachmentRef::new("/uploads/b.pdf", None),
    ];
    let merged = merger(Arc::clone(&fetcher)).merge(&report, &attachments).await?;

    assert_eq!(merged.report_pages, 2);
    assert_eq!(merged.attachment_pages, 3);
    assert_eq!(merged.page_count(), 5);

    let pdf = GeneratedPdf::from_bytes(merged.bytes)?;
    assert_eq!(pdf.page_count(), 5);
    assert!(page_content(&pdf.doc, 1).contains("Report 1"));
    assert!(page_content(&pdf.doc, 2).contains("Report 2"));
    assert!(page_content(&pdf.doc, 3).contains("Alpha 1"));
    assert!(page_content(&pdf.doc, 4).contains("Alpha 2"));
    assert!(page_content(&pdf.doc, 5).contains("Beta 1"));
    Ok(())
}

#[tokio::test]
async fn failed_fetch_aborts_the_whole_merge() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    fetcher.add("http://api.test/uploads/a.pdf", attachment_pdf(2, "Alpha"), None);
    fetcher.fail_with_status("http://api.test/uploads/b.pdf", 500);
    fetcher.add("http://api.test/uploads/c.pdf", attachment_pdf(1, "Gamma"), None);

    let attachments = vec![
        AttachmentRef::new("uploads/a.pdf", None),
        AttachmentRef::new("uploads/b.pdf", Some("Calibration certificate".into())),
        AttachmentRef::new("uploads/c.pdf", None),
    ];
    let err = merger(Arc::clone(&fetcher))
        .merge(&attachment_pdf(2, "Report"), &attachments)
        .await
        .unwrap_err();

    match &err {
        MergeError::AttachmentFetch { name, source } => {
            assert_eq!(name, "Calibration certificate");
            assert!(matches!(source, FetchError::Status { status: 500, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.attachment(), Some("Calibration certificate"));
    assert!(err.to_string().contains("Calibration certificate"));
    // Nothing after the failing attachment is requested.
    assert_eq!(fetcher.calls_for("http://api.test/uploads/c.pdf"), 0);
}

#[tokio::test]
async fn unparsable_attachment_is_named_by_url_when_unnamed() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    fetcher.add("http://api.test/uploads/broken.pdf", b"this is not a pdf".to_vec(), None);

    let attachments = vec![AttachmentRef::new("http://api.test/uploads/broken.pdf", None)];
    let err = merger(fetcher).merge(&attachment_pdf(1, "Report"), &attachments).await.unwrap_err();

    assert!(matches!(err, MergeError::AttachmentParse { .. }));
    assert_eq!(err.attachment(), Some("http://api.test/uploads/broken.pdf"));
}

#[tokio::test]
async fn unreadable_report_is_not_blamed_on_an_attachment() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    let err = merger(Arc::clone(&fetcher)).merge(b"%PDF-garbage", &[]).await.unwrap_err();

    assert!(matches!(err, MergeError::Report(_)));
    assert_eq!(err.attachment(), None);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn merge_without_attachments_copies_the_report() -> TestResult {
    let merged = merger(Arc::new(InMemoryFetcher::new())).merge(&attachment_pdf(2, "Report"), &[]).await?;
    assert_eq!(merged.page_count(), 2);
    assert_eq!(merged.attachment_pages, 0);
    assert_eq!(GeneratedPdf::from_bytes(merged.bytes)?.page_count(), 2);
    Ok(())
}
