use crate::capture::{CapturedPage, TextRun};
use crate::text::encode_win_ansi;
use crate::RenderError;
use fieldreport_pdf_composer::{empty_document, overlay_content, to_bytes};
use fieldreport_types::units::{px_to_pt, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const PAGE_IMAGE: &str = "Im0";

/// Builds an A4 portrait PDF with one page per capture, in capture order.
///
/// Each page carries its bitmap scaled to the full page and its text as a
/// Helvetica layer on top.
pub fn assemble(pages: &[CapturedPage]) -> Result<Vec<u8>, RenderError> {
    if pages.is_empty() {
        return Err(RenderError::Other("No pages were captured".to_string()));
    }

    let mut doc = empty_document();
    let pages_id = doc.catalog()?.get(b"Pages")?.as_reference()?;
    let regular = doc.add_object(font("Helvetica"));
    let bold = doc.add_object(font("Helvetica-Bold"));

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = add_page(&mut doc, pages_id, page, regular, bold)?;
        if !page.text.is_empty() {
            overlay_content(&mut doc, page_id, text_layer(&page.text).encode()?)?;
        }
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages_dict = doc.get_dictionary_mut(pages_id)?;
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", count);

    let bytes = to_bytes(&mut doc)?;
    log::info!("Assembled {} page PDF ({} bytes)", count, bytes.len());
    Ok(bytes)
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    page: &CapturedPage,
    regular: ObjectId,
    bold: ObjectId,
) -> Result<ObjectId, RenderError> {
    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => page.width_px as i64,
            "Height" => page.height_px as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        page.jpeg.clone(),
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![PAGE_WIDTH_PT.into(), 0.into(), 0.into(), PAGE_HEIGHT_PT.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(PAGE_IMAGE.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH_PT.into(), PAGE_HEIGHT_PT.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { PAGE_IMAGE => image_id },
            "Font" => dictionary! { REGULAR_FONT => regular, BOLD_FONT => bold },
        },
    }))
}

/// Text runs as PDF operations. Coordinates move from CSS pixels with a
/// top-left origin to points with a bottom-left origin.
fn text_layer(runs: &[TextRun]) -> Content {
    let mut operations = Vec::with_capacity(runs.len() * 6);
    for run in runs {
        let [r, g, b] = run.color.to_unit();
        let font = if run.bold { BOLD_FONT } else { REGULAR_FONT };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), px_to_pt(run.size).into()]));
        operations.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        operations.push(Operation::new("Tc", vec![px_to_pt(run.tracking).into()]));
        operations.push(Operation::new(
            "Td",
            vec![px_to_pt(run.x).into(), (PAGE_HEIGHT_PT - px_to_pt(run.baseline)).into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&run.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}
