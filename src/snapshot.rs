//! Building the print snapshot from form values or a stored report record.

use fieldreport_types::{
    AttachmentRef, DeviceRow, EvidenceSet, PrintableReport, SparePartRow, ToolRow,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The service report form as edited by administrators and technicians.
///
/// Evidence may arrive in the older single-image shape (`beforeImage`), the
/// collection shape (`beforeImages`) or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportForm {
    pub dispatch_no: String,
    pub dispatch_date: String,
    pub fse_name: String,
    pub customer_name: String,
    pub customer_person: String,
    pub department: String,
    pub address: String,
    pub customer_ref: String,
    pub phone: String,
    pub email: String,
    pub notif_open: String,
    pub finalized_date: String,
    pub job_info: Vec<String>,
    pub problem_description: String,
    pub device_rows: Vec<DeviceRow>,
    pub tools: Vec<ToolRow>,
    pub spareparts: Vec<SparePartRow>,
    pub service_description: String,
    pub travel_start: String,
    pub travel_finish: String,
    pub travel_start_time: String,
    pub travel_finish_time: String,
    pub waiting_start: String,
    pub waiting_finish: String,
    pub conclusion: String,
    pub recommendation: String,
    pub changed_note: String,
    pub carried_by: String,
    pub carried_date: String,
    pub approved_by: String,
    pub approved_date: String,
    pub carried_signature: String,
    pub approved_signature: String,
    pub before_image: Option<String>,
    pub before_images: Vec<String>,
    pub after_image: Option<String>,
    pub after_images: Vec<String>,
}

impl ReportForm {
    pub fn is_finalized(&self) -> bool {
        !self.finalized_date.trim().is_empty()
    }

    /// Names of the fields a technician must fill before finalizing, in form order.
    pub fn missing_for_finalize(&self) -> Vec<&'static str> {
        let filled = |value: &str| !value.trim().is_empty();
        let first_device = self.device_rows.first().map(|r| r.description.as_str()).unwrap_or("");
        let first_spare = self.spareparts.first().map(|r| r.description.as_str()).unwrap_or("");
        let first_tool = self.tools.first().map(|r| r.description.as_str()).unwrap_or("");

        [
            (filled(first_device), "Device description"),
            (filled(&self.service_description), "Service Description / Analysis"),
            (filled(&self.travel_start_time), "Travel start time"),
            (filled(&self.travel_finish_time), "Travel finish time"),
            (filled(&self.conclusion), "Conclusion"),
            (filled(first_spare), "Spare part description"),
            (filled(first_tool), "Tool description"),
            (filled(&self.carried_signature), "Service engineer signature"),
            (filled(&self.approved_signature), "Customer signature"),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, label)| label)
        .collect()
    }

    pub fn before_evidence(&self) -> EvidenceSet {
        EvidenceSet::from_legacy(self.before_image.as_deref(), &self.before_images)
    }

    pub fn after_evidence(&self) -> EvidenceSet {
        EvidenceSet::from_legacy(self.after_image.as_deref(), &self.after_images)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Open,
    Progress,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoKind {
    Before,
    After,
    #[default]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPhoto {
    #[serde(rename = "type")]
    pub kind: PhotoKind,
    pub file_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportAttachment {
    pub file_path: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
}

/// A service report as stored by the report API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceReportRecord {
    pub id: u64,
    pub dispatch_no: String,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_contact: String,
    pub status: ReportStatus,
    pub opened_at: Option<String>,
    pub completed_at: Option<String>,
    /// Values entered by the dispatching administrator.
    pub form_payload: Option<Value>,
    /// Values entered by the technician; these take precedence.
    pub teknisi_payload: Option<Value>,
    pub photos: Vec<ReportPhoto>,
    pub attachments: Vec<ReportAttachment>,
}

impl ServiceReportRecord {
    /// The effective form: technician values over administrator values, with
    /// record columns filling customer fields both left empty.
    pub fn form(&self) -> Result<ReportForm, serde_json::Error> {
        let mut merged = Map::new();
        for payload in [&self.form_payload, &self.teknisi_payload].into_iter().flatten() {
            if let Value::Object(fields) = payload {
                for (key, value) in fields {
                    if is_present(value) {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        let mut form: ReportForm = serde_json::from_value(Value::Object(merged))?;

        fill_if_empty(&mut form.dispatch_no, &self.dispatch_no);
        fill_if_empty(&mut form.customer_name, &self.customer_name);
        fill_if_empty(&mut form.address, &self.customer_address);
        if self.customer_contact.contains('@') {
            fill_if_empty(&mut form.email, &self.customer_contact);
        } else {
            fill_if_empty(&mut form.phone, &self.customer_contact);
        }
        Ok(form)
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn fill_if_empty(field: &mut String, fallback: &str) {
    if field.trim().is_empty() && !fallback.trim().is_empty() {
        *field = fallback.to_string();
    }
}

/// Assembles one immutable [`PrintableReport`] per print or export.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    form: ReportForm,
    stored_before: Vec<String>,
    stored_after: Vec<String>,
    local_before: Option<Vec<String>>,
    local_after: Option<Vec<String>>,
    attachments: Vec<AttachmentRef>,
}

impl SnapshotBuilder {
    pub fn from_form(form: ReportForm) -> Self {
        Self { form, ..Self::default() }
    }

    /// Starts from a stored record: typed photos join the payload evidence
    /// and stored attachments become attachment references.
    pub fn from_record(record: &ServiceReportRecord) -> Result<Self, serde_json::Error> {
        let form = record.form()?;
        let photos = |kind: PhotoKind| {
            record
                .photos
                .iter()
                .filter(move |p| p.kind == kind)
                .map(|p| p.file_path.clone())
                .collect::<Vec<_>>()
        };
        let attachments = record
            .attachments
            .iter()
            .filter(|a| !a.file_path.trim().is_empty())
            .map(|a| {
                let name = Some(a.file_name.clone()).filter(|n| !n.trim().is_empty());
                AttachmentRef::new(a.file_path.clone(), name)
            })
            .collect();
        Ok(Self {
            form,
            stored_before: photos(PhotoKind::Before),
            stored_after: photos(PhotoKind::After),
            attachments,
            ..Self::default()
        })
    }

    /// Evidence held locally (uploaded but not yet saved). Replaces whatever
    /// the form or record carries for both collections.
    pub fn with_local_evidence(mut self, before: Vec<String>, after: Vec<String>) -> Self {
        self.local_before = Some(before);
        self.local_after = Some(after);
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<AttachmentRef>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn form(&self) -> &ReportForm {
        &self.form
    }

    pub fn build(&self) -> PrintableReport {
        let form = &self.form;
        let evidence = |local: &Option<Vec<String>>, payload: EvidenceSet, stored: &[String]| match local {
            Some(images) => EvidenceSet::from_images(images.iter().cloned()),
            None => {
                let mut set = payload;
                set.extend(stored.iter().cloned());
                set
            }
        };

        PrintableReport {
            dispatch_no: form.dispatch_no.clone(),
            dispatch_date: form.dispatch_date.clone(),
            notif_open: form.notif_open.clone(),
            finalized_date: form.finalized_date.clone(),
            customer_name: form.customer_name.clone(),
            customer_person: form.customer_person.clone(),
            department: form.department.clone(),
            address: form.address.clone(),
            phone: form.phone.clone(),
            email: form.email.clone(),
            job_info: form.job_info.iter().filter(|j| !j.trim().is_empty()).cloned().collect(),
            problem_description: form.problem_description.clone(),
            service_description: form.service_description.clone(),
            conclusion: form.conclusion.clone(),
            recommendation: form.recommendation.clone(),
            changed_note: form.changed_note.clone(),
            carried_by: form.carried_by.clone(),
            carried_date: form.carried_date.clone(),
            approved_by: form.approved_by.clone(),
            approved_date: form.approved_date.clone(),
            carried_signature: form.carried_signature.clone(),
            approved_signature: form.approved_signature.clone(),
            travel_start_time: form.travel_start_time.clone(),
            travel_finish_time: form.travel_finish_time.clone(),
            device_rows: form.device_rows.clone(),
            spareparts: form.spareparts.clone(),
            tools: form.tools.clone(),
            before_evidence: evidence(&self.local_before, form.before_evidence(), &self.stored_before),
            after_evidence: evidence(&self.local_after, form.after_evidence(), &self.stored_after),
            attachments: self.attachments.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_form() -> ReportForm {
        ReportForm {
            device_rows: vec![DeviceRow { description: "Ventilator".into(), ..Default::default() }],
            service_description: "Replaced sensor".into(),
            travel_start_time: "08:00".into(),
            travel_finish_time: "09:00".into(),
            conclusion: "Working".into(),
            spareparts: vec![SparePartRow { description: "O2 sensor".into(), ..Default::default() }],
            tools: vec![ToolRow { description: "Multimeter".into(), ..Default::default() }],
            carried_signature: "data:image/png;base64,AAAA".into(),
            approved_signature: "data:image/png;base64,BBBB".into(),
            ..Default::default()
        }
    }

    #[test]
    fn complete_form_is_ready_to_finalize() {
        assert!(complete_form().missing_for_finalize().is_empty());
    }

    #[test]
    fn missing_fields_are_listed_in_form_order() {
        let form = ReportForm {
            conclusion: String::new(),
            approved_signature: String::new(),
            device_rows: Vec::new(),
            ..complete_form()
        };
        assert_eq!(
            form.missing_for_finalize(),
            vec!["Device description", "Conclusion", "Customer signature"]
        );
    }

    #[test]
    fn legacy_single_image_becomes_a_collection() {
        let form: ReportForm = serde_json::from_value(json!({ "beforeImage": "uploads/a.jpg" })).unwrap();
        let report = SnapshotBuilder::from_form(form).build();
        assert_eq!(report.before_evidence.images(), ["uploads/a.jpg"]);
        assert_eq!(report.before_evidence.primary(), Some("uploads/a.jpg"));
    }

    #[test]
    fn collection_wins_over_legacy_image() {
        let form: ReportForm = serde_json::from_value(json!({
            "afterImage": "uploads/old.jpg",
            "afterImages": ["uploads/new1.jpg", "uploads/new2.jpg"],
        }))
        .unwrap();
        let report = SnapshotBuilder::from_form(form).build();
        assert_eq!(report.after_evidence.images(), ["uploads/new1.jpg", "uploads/new2.jpg"]);
        assert_eq!(report.after_evidence.primary(), Some("uploads/new1.jpg"));
    }

    #[test]
    fn local_evidence_takes_precedence_and_is_capped() {
        let form = ReportForm { before_images: vec!["uploads/saved.jpg".into()], ..Default::default() };
        let local: Vec<String> = (1..=8).map(|i| format!("data:image/png;base64,{}", i)).collect();
        let report = SnapshotBuilder::from_form(form).with_local_evidence(local.clone(), Vec::new()).build();
        assert_eq!(report.before_evidence.images(), &local[..6]);
        assert!(report.after_evidence.is_empty());
    }

    #[test]
    fn record_overlays_technician_payload() {
        let record: ServiceReportRecord = serde_json::from_value(json!({
            "id": 7,
            "dispatch_no": "20240101-1200",
            "customer_name": "RS Harapan",
            "customer_address": "Jl. Merdeka 1",
            "customer_contact": "021-555",
            "status": "done",
            "form_payload": {
                "customerName": "",
                "problemDescription": "Alarm keeps sounding",
                "jobInfo": ["Repair"]
            },
            "teknisi_payload": {
                "problemDescription": "",
                "serviceDescription": "Recalibrated",
                "finalizedDate": "2024-01-02",
                "storedAt": "2024-01-02T10:00:00Z"
            },
            "photos": [
                { "type": "before", "file_path": "uploads/b1.jpg" },
                { "type": "other", "file_path": "uploads/x.jpg" },
                { "type": "after", "file_path": "uploads/a1.jpg" }
            ],
            "attachments": [
                { "file_path": "uploads/manual.pdf", "file_name": "Manual.pdf", "content_type": "application/pdf", "size": 1024 }
            ]
        }))
        .unwrap();

        let report = SnapshotBuilder::from_record(&record).unwrap().build();
        assert_eq!(report.dispatch_no, "20240101-1200");
        assert_eq!(report.customer_name, "RS Harapan");
        assert_eq!(report.address, "Jl. Merdeka 1");
        assert_eq!(report.phone, "021-555");
        assert_eq!(report.problem_description, "Alarm keeps sounding");
        assert_eq!(report.service_description, "Recalibrated");
        assert_eq!(report.job_info, vec!["Repair"]);
        assert!(report.is_finalized());
        assert_eq!(report.before_evidence.images(), ["uploads/b1.jpg"]);
        assert_eq!(report.after_evidence.images(), ["uploads/a1.jpg"]);
        assert_eq!(report.attachments, vec![AttachmentRef::new("uploads/manual.pdf", Some("Manual.pdf".into()))]);
        assert_eq!(record.status, ReportStatus::Done);
    }
}
