use lopdf::Document as LopdfDocument;
use std::collections::BTreeSet;

/// Decoded content stream of a 1-based page, as lossy text.
pub fn page_content(doc: &LopdfDocument, page: u32) -> String {
    let pages = doc.get_pages();
    let Some(page_id) = pages.get(&page) else {
        return String::new();
    };
    doc.get_page_content(*page_id)
        .map(|c| String::from_utf8_lossy(&c).into_owned())
        .unwrap_or_default()
}

/// Content of every page, in page order.
pub fn all_page_contents(doc: &LopdfDocument) -> Vec<String> {
    (1..=doc.get_pages().len() as u32).map(|p| page_content(doc, p)).collect()
}

/// MediaBox width and height of each page, in points.
pub fn media_boxes(doc: &LopdfDocument) -> Vec<(f32, f32)> {
    doc.get_pages()
        .values()
        .filter_map(|id| {
            let page = doc.get_dictionary(*id).ok()?;
            let media_box = page.get(b"MediaBox").ok()?.as_array().ok()?;
            let number = |o: &lopdf::Object| o.as_float().ok().or_else(|| o.as_i64().ok().map(|v| v as f32));
            let width = number(media_box.get(2)?)? - number(media_box.first()?)?;
            let height = number(media_box.get(3)?)? - number(media_box.get(1)?)?;
            Some((width, height))
        })
        .collect()
}

pub fn assert_a4_portrait(doc: &LopdfDocument) {
    for (width, height) in media_boxes(doc) {
        assert!((width - 595.28).abs() < 0.5, "page width {} is not A4", width);
        assert!((height - 841.89).abs() < 0.5, "page height {} is not A4", height);
    }
}

/// BaseFont names referenced anywhere in the document.
pub fn font_names(doc: &LopdfDocument) -> BTreeSet<String> {
    doc.objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .filter(|dict| dict.get(b"Type").and_then(|t| t.as_name()).is_ok_and(|n| n == b"Font"))
        .filter_map(|dict| dict.get(b"BaseFont").and_then(|b| b.as_name()).ok())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect()
}

/// Number of JPEG image XObjects in the document.
pub fn jpeg_image_count(doc: &LopdfDocument) -> usize {
    doc.objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .filter(|stream| stream.dict.get(b"Subtype").and_then(|s| s.as_name()).is_ok_and(|n| n == b"Image"))
        .filter(|stream| stream.dict.get(b"Filter").and_then(|f| f.as_name()).is_ok_and(|n| n == b"DCTDecode"))
        .count()
}
