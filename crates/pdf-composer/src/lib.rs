//! PDF composition utilities for assembling output documents.
//!
//! This crate provides low-level PDF manipulation using lopdf:
//! - Deep object copying with cycle detection
//! - Appending every page of one document to another
//! - Content overlaying (vector layers over a page)
//! - Loading and serializing with the checks the pipeline relies on

mod error;

pub use error::ComposerError;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page trees deeper than this are treated as malformed.
const MAX_TREE_DEPTH: usize = 64;

/// A helper struct to manage the state of copying objects between documents.
struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source_doc: &'a Document, target_doc: &'a mut Document) -> Self {
        Self { source_doc, target_doc, id_map: HashMap::new() }
    }

    /// Deep copies an object and everything it references. Each source object
    /// is copied at most once.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }
        let obj = self.source_doc.get_object(source_id)?.clone();
        self.copy_as(source_id, obj)
    }

    /// Copies a page detached from its source page tree, with inherited
    /// attributes made explicit.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        let mut page = self.source_doc.get_dictionary(page_id)?.clone();
        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited_attribute(self.source_doc, &page, key)
            {
                page.set(key, value);
            }
        }
        page.remove(b"Parent");
        self.copy_as(page_id, Object::Dictionary(page))
    }

    fn copy_as(&mut self, source_id: ObjectId, obj: Object) -> Result<ObjectId, lopdf::Error> {
        // Reserve the target id before recursing so reference cycles
        // (Page -> Annots -> P -> Page) terminate.
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let new_obj = self.remap_references(obj)?;
        match self.target_doc.objects.get_mut(&new_id) {
            Some(target_obj) => *target_obj = new_obj,
            None => return Err(lopdf::Error::ObjectNotFound(new_id)),
        }
        Ok(new_id)
    }

    /// Replaces every `Object::Reference` with the id of its copy.
    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(mut dict) => {
                self.remap_dictionary(&mut dict)?;
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                self.remap_dictionary(&mut stream.dict)?;
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }

    fn remap_dictionary(&mut self, dict: &mut Dictionary) -> Result<(), lopdf::Error> {
        for (_, value) in dict.iter_mut() {
            *value = self.remap_references(value.clone())?;
        }
        Ok(())
    }
}

fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// A document with an empty page tree, ready to receive pages.
pub fn empty_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Parses a document for composition. Encrypted and page-less documents are rejected.
pub fn load(bytes: &[u8]) -> Result<Document, ComposerError> {
    let doc = Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        return Err(ComposerError::Encrypted);
    }
    if doc.get_pages().is_empty() {
        return Err(ComposerError::NoPages);
    }
    Ok(doc)
}

pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>, ComposerError> {
    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| ComposerError::Save(e.to_string()))?;
    Ok(out)
}

/// Ids of the page tree root of `doc`.
fn pages_root(doc: &Document) -> Result<ObjectId, ComposerError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    Ok(doc.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?)
}

/// Appends every page of `source` to the end of `target`, in page order.
///
/// Pages are deep copied together with everything they reference (content
/// streams, resources, fonts, images) under fresh object ids. Returns the
/// number of pages appended.
pub fn append_document(target: &mut Document, source: &Document) -> Result<usize, ComposerError> {
    let source_pages = source.get_pages();
    if source_pages.is_empty() {
        return Ok(0);
    }
    let pages_id = pages_root(target)?;

    // `get_pages` is keyed by page number, so iteration is in page order.
    let mut copier = ObjectCopier::new(source, target);
    let mut copied = Vec::with_capacity(source_pages.len());
    for page_id in source_pages.values() {
        copied.push(copier.copy_page(*page_id)?);
    }

    for page_id in &copied {
        if let Ok(page) = target.get_dictionary_mut(*page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    let pages_dict = target.get_dictionary_mut(pages_id)?;
    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    let count = pages_dict.get(b"Count")?.as_i64()?;
    kids.extend(copied.iter().map(|id| Object::Reference(*id)));
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", count + copied.len() as i64);

    log::debug!("Appended {} page(s)", copied.len());
    Ok(copied.len())
}

/// Adds a new content stream to an existing page, drawn on top of its
/// existing content.
pub fn overlay_content(
    doc: &mut Document,
    page_id: ObjectId,
    content_stream: Vec<u8>,
) -> Result<(), ComposerError> {
    let stream = Stream::new(dictionary! {}, content_stream);
    let new_content_id = doc.add_object(Object::Stream(stream));

    let page_dict = doc.get_dictionary_mut(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(Object::Array(arr)) => {
            let mut arr = arr.clone();
            arr.push(Object::Reference(new_content_id));
            arr
        }
        Ok(single) => vec![single.clone(), Object::Reference(new_content_id)],
        Err(_) => vec![Object::Reference(new_content_id)],
    };
    page_dict.set("Contents", Object::Array(contents));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, StringFormat};

    /// A document whose pages each show "<prefix> <n>". Resources and the
    /// media box live on the page tree root and are inherited.
    fn create_dummy_pdf(num_pages: u32, text_prefix: &str) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = vec![];
        for i in 1..=num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 700.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("{} {}", text_prefix, i).into_bytes(),
                            StringFormat::Literal,
                        )],
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
            page_ids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => num_pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, pages_dict.into());

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc
    }

    fn page_text(doc: &Document, number: u32) -> String {
        let pages = doc.get_pages();
        let content = doc.get_page_content(*pages.get(&number).unwrap()).unwrap();
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn appends_pages_in_order() {
        let mut target = create_dummy_pdf(2, "Report Page");
        let source = create_dummy_pdf(3, "Attachment Page");

        assert_eq!(append_document(&mut target, &source).unwrap(), 3);
        assert_eq!(target.get_pages().len(), 5);
        assert!(page_text(&target, 2).contains("Report Page 2"));
        assert!(page_text(&target, 3).contains("Attachment Page 1"));
        assert!(page_text(&target, 5).contains("Attachment Page 3"));
    }

    #[test]
    fn builds_from_empty_document() {
        let mut out = empty_document();
        append_document(&mut out, &create_dummy_pdf(2, "A")).unwrap();
        append_document(&mut out, &create_dummy_pdf(1, "B")).unwrap();

        let bytes = to_bytes(&mut out).unwrap();
        let reloaded = load(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 3);
        assert!(page_text(&reloaded, 3).contains("B 1"));
    }

    #[test]
    fn copied_pages_keep_inherited_attributes() {
        let mut out = empty_document();
        append_document(&mut out, &create_dummy_pdf(1, "Inherited")).unwrap();

        let page_id = *out.get_pages().get(&1).unwrap();
        let page = out.get_dictionary(page_id).unwrap();
        assert!(page.has(b"Resources"));
        assert!(page.has(b"MediaBox"));
        let parent = page.get(b"Parent").unwrap().as_reference().unwrap();
        assert_eq!(parent, pages_root(&out).unwrap());
    }

    #[test]
    fn load_rejects_garbage_and_empty_documents() {
        assert!(matches!(load(b"not a pdf"), Err(ComposerError::Pdf(_))));

        let mut empty = empty_document();
        let bytes = to_bytes(&mut empty).unwrap();
        assert!(matches!(load(&bytes), Err(ComposerError::NoPages)));
    }

    #[test]
    fn test_overlay_content() {
        let mut doc = create_dummy_pdf(1, "Original Content");
        let page_id = doc.get_pages().get(&1).cloned().unwrap();

        let overlay_stream = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 100.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        "Overlay Content".to_string().into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        }
        .encode()
        .unwrap();

        overlay_content(&mut doc, page_id, overlay_stream).unwrap();

        let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let contents_array = page_dict.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents_array.len(), 2);

        let content_str = page_text(&doc, 1);
        assert!(content_str.contains("Original Content"));
        assert!(content_str.contains("Overlay Content"));
    }
}
