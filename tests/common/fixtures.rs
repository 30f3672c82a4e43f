use fieldreport::{AttachmentRef, Branding, EvidenceSet, InMemoryFetcher, PrintConfig, PrintableReport};
use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

pub const API_BASE: &str = "http://api.test/api";
pub const PAGE_ORIGIN: &str = "http://app.test";

pub const BEFORE_1: &str = "uploads/before-1.png";
pub const BEFORE_2: &str = "/uploads/before-2.png";
pub const AFTER_1: &str = "http://api.test/uploads/after-1.png";

/// The fetch URLs the three evidence images resolve to.
pub const EVIDENCE_URLS: [&str; 3] = [
    "http://api.test/uploads/before-1.png",
    "http://api.test/uploads/before-2.png",
    "http://api.test/uploads/after-1.png",
];

pub const ATTACHMENT_URL: &str = "http://api.test/uploads/manual.pdf";

/// A small solid-colour PNG.
pub fn png_bytes(color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(8, 6, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A text-only Letter-sized PDF with `pages` pages reading "`label` 1", "`label` 2", ...
pub fn attachment_pdf(pages: usize, label: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(format!("{} {}", label, i).into_bytes(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// A finalized report with two "before" and one "after" evidence image.
pub fn finalized_report() -> PrintableReport {
    PrintableReport {
        dispatch_no: "20240101-1200".into(),
        dispatch_date: "2024-01-01".into(),
        finalized_date: "2024-01-03T09:30:00Z".into(),
        customer_name: "RS Harapan Sehat".into(),
        customer_person: "dr. Sari".into(),
        department: "Radiology".into(),
        address: "Jl. Merdeka 10, Jakarta".into(),
        phone: "021-555-0101".into(),
        job_info: vec!["Preventive Maintenance".into()],
        problem_description: "Unit reports intermittent calibration drift.".into(),
        service_description: "Recalibrated sensors and replaced worn cable.".into(),
        conclusion: "Unit operating within tolerance.".into(),
        recommendation: "Schedule next inspection in six months.".into(),
        carried_by: "Budi Santoso".into(),
        carried_date: "2024-01-03".into(),
        approved_by: "dr. Sari".into(),
        approved_date: "2024-01-03".into(),
        travel_start_time: "08:00".into(),
        travel_finish_time: "11:30".into(),
        before_evidence: EvidenceSet::from_images([BEFORE_1, BEFORE_2]),
        after_evidence: EvidenceSet::from_images([AFTER_1]),
        ..PrintableReport::default()
    }
}

pub fn report_with_attachment() -> PrintableReport {
    PrintableReport {
        attachments: vec![AttachmentRef::new(ATTACHMENT_URL, Some("Service manual".into()))],
        ..finalized_report()
    }
}

/// Configuration against the test origins, without branding images.
pub fn test_config() -> PrintConfig {
    PrintConfig::builder()
        .api_base_url(API_BASE)
        .page_origin(PAGE_ORIGIN)
        .branding(Branding::text_only())
        .print_fallback(Duration::from_millis(200))
        .build()
}

/// A fetcher serving the three evidence images and a three-page attachment.
pub fn media_fetcher() -> Arc<InMemoryFetcher> {
    let fetcher = Arc::new(InMemoryFetcher::new());
    let colors = [[200, 40, 40, 255], [40, 160, 60, 255], [40, 60, 200, 255]];
    for (url, color) in EVIDENCE_URLS.iter().zip(colors) {
        fetcher.add(*url, png_bytes(color), Some("image/png"));
    }
    fetcher.add(ATTACHMENT_URL, attachment_pdf(3, "Manual page"), Some("application/pdf"));
    fetcher
}
