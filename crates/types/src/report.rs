//! The print snapshot: a flat, immutable record of everything the two report
//! pages display.

use serde::{Deserialize, Serialize};

/// Upper bound on each evidence collection ("before" and "after").
pub const MAX_EVIDENCE_IMAGES: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceRow {
    pub part_no: String,
    pub description: String,
    pub serial_no: String,
    pub sw_version: String,
    pub location: String,
    pub work_start: String,
    pub work_finish: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SparePartRow {
    pub qty: String,
    pub part_no: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolRow {
    pub code: String,
    pub description: String,
    pub usable_limit: String,
}

/// An externally hosted PDF appended after the report pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AttachmentRef {
    pub fn new(url: impl Into<String>, name: Option<String>) -> Self {
        Self { url: url.into(), name }
    }

    /// Name shown to the user; falls back to the URL.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.url,
        }
    }
}

/// An ordered evidence collection, capped at [`MAX_EVIDENCE_IMAGES`].
///
/// `primary` mirrors element 0 for consumers of the older single-image
/// payload shape and is kept in sync by every mutator. Deserialized sets go
/// through [`EvidenceSet::from_legacy`], so the cap and the mirror hold for
/// snapshots read back from JSON as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, from = "EvidenceWire")]
pub struct EvidenceSet {
    images: Vec<String>,
    primary: Option<String>,
}

/// The serialized shape of an [`EvidenceSet`], before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EvidenceWire {
    images: Vec<String>,
    primary: Option<String>,
}

impl From<EvidenceWire> for EvidenceSet {
    fn from(wire: EvidenceWire) -> Self {
        EvidenceSet::from_legacy(wire.primary.as_deref(), &wire.images)
    }
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from the plural collection, keeping the first
    /// [`MAX_EVIDENCE_IMAGES`] non-empty entries.
    pub fn from_images<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        set.extend(images);
        set
    }

    /// Merges the legacy singular field with the plural collection.
    ///
    /// A non-empty plural collection is authoritative. A lone singular value
    /// becomes a one-element collection.
    pub fn from_legacy(single: Option<&str>, images: &[String]) -> Self {
        let plural = Self::from_images(images.iter().cloned());
        if !plural.is_empty() {
            return plural;
        }
        match single.map(str::trim).filter(|s| !s.is_empty()) {
            Some(single) => Self::from_images([single]),
            None => Self::new(),
        }
    }

    /// Appends an image; returns `false` when the set is full or the source is empty.
    pub fn push(&mut self, src: impl Into<String>) -> bool {
        let src = src.into();
        if src.trim().is_empty() || self.images.len() >= MAX_EVIDENCE_IMAGES {
            return false;
        }
        self.images.push(src);
        self.sync_primary();
        true
    }

    /// Appends images in order, silently dropping those past the cap.
    pub fn extend<I, S>(&mut self, images: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for src in images {
            if self.is_full() {
                break;
            }
            self.push(src);
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index >= self.images.len() {
            return None;
        }
        let removed = self.images.remove(index);
        self.sync_primary();
        Some(removed)
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.images.len() >= MAX_EVIDENCE_IMAGES
    }

    fn sync_primary(&mut self) {
        self.primary = self.images.first().cloned();
    }
}

/// The flattened snapshot handed to the layout engine for one print/export
/// operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintableReport {
    pub dispatch_no: String,
    pub dispatch_date: String,
    pub notif_open: String,
    pub finalized_date: String,

    pub customer_name: String,
    pub customer_person: String,
    pub department: String,
    pub address: String,
    pub phone: String,
    pub email: String,

    pub job_info: Vec<String>,

    pub problem_description: String,
    pub service_description: String,
    pub conclusion: String,
    pub recommendation: String,
    pub changed_note: String,

    pub carried_by: String,
    pub carried_date: String,
    pub approved_by: String,
    pub approved_date: String,
    pub carried_signature: String,
    pub approved_signature: String,
    pub travel_start_time: String,
    pub travel_finish_time: String,

    pub device_rows: Vec<DeviceRow>,
    pub spareparts: Vec<SparePartRow>,
    pub tools: Vec<ToolRow>,

    pub before_evidence: EvidenceSet,
    pub after_evidence: EvidenceSet,

    pub attachments: Vec<AttachmentRef>,
}

impl PrintableReport {
    /// A report is finalized once its finalize date is set.
    pub fn is_finalized(&self) -> bool {
        !self.finalized_date.trim().is_empty()
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// File name for downloads, derived from the dispatch number.
    pub fn pdf_file_name(&self) -> String {
        let stem = self.dispatch_no.trim();
        if stem.is_empty() {
            "service-report.pdf".to_string()
        } else {
            format!("{}.pdf", stem)
        }
    }

    pub fn evidence_count(&self) -> usize {
        self.before_evidence.len() + self.after_evidence.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialized_evidence_is_capped_and_mirrored() {
        let json = r#"{"images":["1","2","3","4","5","6","7","8"],"primary":"zzz"}"#;
        let set: EvidenceSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), MAX_EVIDENCE_IMAGES);
        assert_eq!(set.images()[5], "6");
        assert_eq!(set.primary(), Some("1"));

        let lone: EvidenceSet = serde_json::from_str(r#"{"primary":"only.png"}"#).unwrap();
        assert_eq!(lone.images(), &["only.png".to_string()]);

        let round_trip: EvidenceSet = serde_json::from_str(&serde_json::to_string(&set).unwrap()).unwrap();
        assert_eq!(round_trip, set);
    }

    #[test]
    fn evidence_cap_keeps_first_six_in_order() {
        let mut set = EvidenceSet::new();
        let sources: Vec<String> = (1..=8).map(|i| format!("img-{}.png", i)).collect();
        set.extend(sources.iter().cloned());
        assert_eq!(set.len(), MAX_EVIDENCE_IMAGES);
        assert_eq!(set.images(), &sources[..6]);
        assert!(!set.push("img-9.png"));
        assert_eq!(set.len(), MAX_EVIDENCE_IMAGES);
    }

    #[test]
    fn legacy_single_becomes_one_element_collection() {
        let set = EvidenceSet::from_legacy(Some("uploads/a.jpg"), &[]);
        assert_eq!(set.images(), &["uploads/a.jpg".to_string()]);
        assert_eq!(set.primary(), Some("uploads/a.jpg"));
    }

    #[test]
    fn plural_collection_wins_over_legacy_single() {
        let plural = vec!["uploads/b.jpg".to_string(), "uploads/c.jpg".to_string()];
        let set = EvidenceSet::from_legacy(Some("uploads/a.jpg"), &plural);
        assert_eq!(set.images(), plural.as_slice());
        assert_eq!(set.primary(), Some("uploads/b.jpg"));
    }

    #[test]
    fn removing_first_image_updates_primary() {
        let mut set = EvidenceSet::from_images(["a", "b"]);
        set.remove(0);
        assert_eq!(set.primary(), Some("b"));
        set.remove(0);
        assert_eq!(set.primary(), None);
    }

    #[test]
    fn pdf_file_name_falls_back_when_dispatch_missing() {
        let mut report = PrintableReport::default();
        assert_eq!(report.pdf_file_name(), "service-report.pdf");
        report.dispatch_no = "20240101-1200".into();
        assert_eq!(report.pdf_file_name(), "20240101-1200.pdf");
    }

    #[test]
    fn attachment_display_name_falls_back_to_url() {
        let a = AttachmentRef::new("http://x/y.pdf", Some("  ".into()));
        assert_eq!(a.display_name(), "http://x/y.pdf");
        let b = AttachmentRef::new("http://x/y.pdf", Some("Calibration".into()));
        assert_eq!(b.display_name(), "Calibration");
    }
}
