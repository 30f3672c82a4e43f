//! The two report pages built from a snapshot.

use crate::config::LayoutConfig;
use crate::node::{Align, BoxStyle, Columns, ImageFit, ImageNode, Node, Stack, Track};
use crate::page::{Branding, LaidOutPage, PageContent, PageSpec};
use crate::style;
use crate::text::TextMetrics;
use crate::LayoutError;
use fieldreport_types::{Color, Edges, EvidenceSet, PrintableReport, MAX_EVIDENCE_IMAGES};

/// Every report lays out to exactly this many pages.
pub const REPORT_PAGE_COUNT: usize = 2;

/// Tools table shows at most this many rows.
const MAX_TOOL_ROWS: usize = 6;

/// Renders stored dates for display. Must return its input unchanged when it
/// cannot parse it.
pub type DateFormatter = fn(&str) -> String;

fn identity_date(value: &str) -> String {
    value.to_string()
}

#[derive(Debug, Clone)]
pub struct ReportLayout {
    config: LayoutConfig,
    spec: PageSpec,
    branding: Branding,
    metrics: TextMetrics,
    format_date: DateFormatter,
}

impl ReportLayout {
    pub fn new(config: LayoutConfig, branding: Branding, format_date: DateFormatter) -> Self {
        Self {
            metrics: TextMetrics::new(&config),
            config,
            spec: PageSpec::default(),
            branding,
            format_date,
        }
    }

    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    pub fn layout(&self, report: &PrintableReport) -> Result<Vec<LaidOutPage>, LayoutError> {
        log::debug!("Laying out report '{}'", report.dispatch_no);
        let contents = [self.page_one(report), self.page_two(report)];
        contents
            .into_iter()
            .enumerate()
            .map(|(index, content)| {
                LaidOutPage::compose(index, self.spec, &self.branding, content, &self.metrics, &self.config)
            })
            .collect()
    }

    fn date(&self, value: &str) -> String {
        if value.trim().is_empty() {
            return "-".to_string();
        }
        or_dash(&(self.format_date)(value))
    }

    fn page_one(&self, r: &PrintableReport) -> PageContent {
        let device = r.device_rows.first().cloned().unwrap_or_default();
        let job = r.job_info.join(", ");

        let customer = vec![
            ("Dispatch No", or_dash(&r.dispatch_no)),
            ("Dispatch Date", self.date(&r.dispatch_date)),
            ("Customer Name", or_dash(&r.customer_name)),
            ("Department", or_dash(&r.department)),
            ("Contact", or_dash(&r.customer_person)),
            ("Phone", or_dash(&r.phone)),
            ("Email", or_dash(&r.email)),
            ("Address", or_dash(&r.address)),
        ];
        let equipment = vec![
            ("Equipment Status", or_dash(&job)),
            ("Product Description", or_dash(&device.description)),
            ("Part Number", or_dash(&device.part_no)),
            ("Serial Number", or_dash(&device.serial_no)),
        ];
        let activity = vec![
            ("Activity", or_dash(&job)),
            ("Report Problem", or_dash(&r.problem_description)),
            ("Identified Problem", or_dash(&r.service_description)),
            ("Solution", or_dash(&r.conclusion)),
            ("Close Date", self.date(&r.finalized_date)),
            ("Field Engineer", or_dash(&r.carried_by)),
        ];

        let engineer = if r.carried_by.trim().is_empty() { &r.customer_person } else { &r.carried_by };

        PageContent {
            meta: vec![
                format!("Dispatch No: {}", or_dash(&r.dispatch_no)),
                format!("Service Engineer: {}", or_dash(engineer)),
            ],
            sections: vec![
                section_card("Customer Details", definition_grid(&customer, 2)),
                section_card("Equipment Details", definition_grid(&equipment, 2)),
                section_card("Activity", definition_grid(&activity, 1)),
                section_card("Evidence", evidence(&r.before_evidence, &r.after_evidence)),
            ],
        }
    }

    fn page_two(&self, r: &PrintableReport) -> PageContent {
        let labor_type = r
            .job_info
            .first()
            .filter(|tag| !tag.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| "Maintenance".to_string());
        let hours = if !r.travel_start_time.is_empty() && !r.travel_finish_time.is_empty() {
            format!("{} - {}", r.travel_start_time, r.travel_finish_time)
        } else {
            "-".to_string()
        };

        let labor = Node::grid(
            16.0,
            vec![
                labeled_value("Date", self.date(&r.carried_date)),
                labeled_value("Type", labor_type),
                labeled_value("Hours", hours),
            ],
            3,
        );

        let mut tool_rows: Vec<Vec<String>> = r
            .tools
            .iter()
            .take(MAX_TOOL_ROWS)
            .map(|t| vec![or_dash(&t.code), or_dash(&t.description), or_dash(&t.usable_limit)])
            .collect();
        if tool_rows.is_empty() {
            tool_rows.push(vec!["-".to_string(); 3]);
        }
        let tools = table(
            &[("Code/SN", Track::Fixed(128.0)), ("Description", Track::Flex(1.0)), ("Usable limits", Track::Fixed(128.0))],
            tool_rows,
        );

        let mut material_rows: Vec<Vec<String>> = r
            .spareparts
            .iter()
            .map(|p| vec![or_dash(&p.qty), or_dash(&p.part_no), or_dash(&p.description), or_dash(&p.status)])
            .collect();
        if material_rows.is_empty() {
            material_rows.push(vec!["-".to_string(); 4]);
        }
        let materials = table(
            &[
                ("Qty", Track::Fixed(38.0)),
                ("Part No", Track::Fixed(98.0)),
                ("Description", Track::Flex(1.0)),
                ("Status", Track::Fixed(108.0)),
            ],
            material_rows,
        );

        let recommendation_text = if r.recommendation.trim().is_empty() {
            "Tidak ada catatan."
        } else {
            r.recommendation.as_str()
        };
        let recommendation = Node::stack(
            20.0,
            vec![
                Node::styled_stack(
                    BoxStyle::padded(Edges::symmetric(12.0, 16.0))
                        .with_background(Color::WHITE)
                        .with_border(style::DASHED)
                        .dashed()
                        .with_min_height(style::RECOMMENDATION_MIN_HEIGHT),
                    0.0,
                    vec![Node::text(recommendation_text, style::BODY_SIZE, style::STRONG)],
                ),
                Node::grid(
                    16.0,
                    vec![
                        self.signature_block("Engineer Signature", &r.carried_by, &r.carried_signature, &r.carried_date),
                        self.signature_block("Customer Signature", &r.approved_by, &r.approved_signature, &r.approved_date),
                    ],
                    2,
                ),
            ],
        );

        let mut sections = vec![
            section_card("Labor", labor),
            section_card("Tools", tools),
            section_card("Materials", materials),
            section_card("Recommendation & Signature", recommendation),
        ];
        if !self.branding.qr.trim().is_empty() {
            sections.push(section_card("Customer Satisfaction", self.satisfaction()));
        }

        PageContent {
            meta: vec![
                format!("Labor Date: {}", self.date(&r.carried_date)),
                format!("Customer: {}", or_dash(&r.customer_name)),
            ],
            sections,
        }
    }

    fn signature_block(&self, title: &str, name: &str, signature: &str, date: &str) -> Node {
        let mark = if signature.trim().is_empty() {
            Node::text("No signature", style::SMALL_SIZE, style::PLACEHOLDER).aligned(Align::Center)
        } else {
            Node::Image(ImageNode {
                src: signature.to_string(),
                alt: format!("{} signature", title),
                width: Some(160.0),
                height: style::SIGNATURE_IMAGE_HEIGHT,
                fit: ImageFit::Contain,
                border: None,
            })
        };
        let pad = Node::Stack(Stack {
            style: BoxStyle::padded(Edges::all(12.0))
                .with_background(Color::WHITE)
                .with_border(style::DASHED)
                .dashed()
                .with_min_height(style::SIGNATURE_BOX_HEIGHT),
            gap: 0.0,
            center: true,
            children: vec![mark],
        });

        Node::styled_stack(
            BoxStyle::padded(Edges::all(12.0))
                .with_background(style::SIGNATURE_BG)
                .with_border(style::SIGNATURE_BORDER),
            8.0,
            vec![
                Node::caption(title, style::LABEL_SIZE, style::CAPTION_TRACKING, style::MUTED),
                pad,
                Node::bold(or_dash(name), style::BODY_SIZE, style::STRONG),
                Node::text(self.date(date), style::SMALL_SIZE, style::TAGLINE),
            ],
        )
    }

    fn satisfaction(&self) -> Node {
        let qr = Node::Image(ImageNode {
            src: self.branding.qr.clone(),
            alt: "Customer satisfaction QR".to_string(),
            width: Some(style::QR_SIZE),
            height: style::QR_SIZE,
            fit: ImageFit::Contain,
            border: None,
        });
        Node::columns(
            16.0,
            vec![Track::Fixed(style::QR_SIZE), Track::Flex(1.0)],
            vec![
                qr,
                Node::stack(
                    4.0,
                    vec![
                        Node::caption("Survey", style::LABEL_SIZE, style::CAPTION_TRACKING, style::MUTED),
                        Node::text(&self.branding.qr_caption, style::BODY_SIZE, style::STRONG),
                    ],
                ),
            ],
        )
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::new(LayoutConfig::default(), Branding::default(), identity_date)
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() { "-".to_string() } else { value.to_string() }
}

fn section_card(title: &str, content: Node) -> Node {
    let title_bar = Node::styled_stack(
        BoxStyle::padded(Edges::symmetric(10.0, 20.0)).with_background(style::CARD_TITLE_BG),
        0.0,
        vec![Node::caption(title, style::CARD_TITLE_SIZE, style::CARD_TITLE_TRACKING, style::CARD_TITLE)],
    );
    Node::styled_stack(
        BoxStyle::default().with_background(Color::WHITE).with_border(style::CARD_BORDER),
        0.0,
        vec![
            title_bar,
            Node::Rule(style::CARD_TITLE_RULE),
            Node::styled_stack(BoxStyle::padded(Edges::symmetric(14.0, 20.0)), 0.0, vec![content]),
        ],
    )
}

/// Label/value rows split into `columns` groups of equal length.
fn definition_grid(rows: &[(&str, String)], columns: usize) -> Node {
    let columns = columns.max(1);
    let chunk = rows.len().div_ceil(columns).max(1);
    let groups: Vec<Node> = rows
        .chunks(chunk)
        .map(|group| {
            Node::stack(
                0.0,
                group
                    .iter()
                    .map(|(label, value)| {
                        Node::Columns(Columns {
                            style: BoxStyle::padded(Edges::symmetric(4.0, 0.0)),
                            gap: 8.0,
                            tracks: vec![Track::Fixed(style::DEFINITION_LABEL_WIDTH), Track::Flex(1.0)],
                            children: vec![
                                Node::caption(label, style::LABEL_SIZE, style::LABEL_TRACKING, style::LABEL),
                                Node::bold(format!(": {}", value), style::VALUE_SIZE, style::VALUE),
                            ],
                        })
                    })
                    .collect(),
            )
        })
        .collect();
    Node::grid(12.0, groups, columns)
}

fn evidence(before: &EvidenceSet, after: &EvidenceSet) -> Node {
    if before.is_empty() && after.is_empty() {
        return Node::styled_stack(
            BoxStyle::default()
                .with_background(Color::WHITE)
                .with_border(style::DASHED)
                .dashed()
                .with_min_height(style::EMPTY_EVIDENCE_HEIGHT),
            0.0,
            Vec::new(),
        );
    }
    Node::grid(16.0, vec![evidence_column("Before", before), evidence_column("After", after)], 2)
}

fn evidence_column(title: &str, set: &EvidenceSet) -> Node {
    let thumbs: Vec<Node> = set
        .images()
        .iter()
        .take(MAX_EVIDENCE_IMAGES)
        .enumerate()
        .map(|(i, src)| {
            Node::Image(ImageNode {
                src: src.clone(),
                alt: format!("{} {}", title, i + 1),
                width: None,
                height: style::THUMBNAIL_HEIGHT,
                fit: ImageFit::Cover,
                border: Some(style::TABLE_RULE),
            })
        })
        .collect();

    let mut children = vec![Node::caption(title, style::LABEL_SIZE, style::CAPTION_TRACKING, style::MUTED)];
    if !thumbs.is_empty() {
        let rows = thumbs.chunks(3).map(|row| Node::grid(8.0, row.to_vec(), 3)).collect();
        children.push(Node::stack(8.0, rows));
    }
    Node::stack(8.0, children)
}

fn labeled_value(label: &str, value: String) -> Node {
    Node::stack(
        4.0,
        vec![
            Node::caption(label, style::LABEL_SIZE, style::CAPTION_TRACKING, style::MUTED),
            Node::bold(value, style::EMPHASIS_SIZE, style::STRONG),
        ],
    )
}

fn table(headers: &[(&str, Track)], rows: Vec<Vec<String>>) -> Node {
    let tracks: Vec<Track> = headers.iter().map(|(_, t)| *t).collect();
    let head = Node::Columns(Columns {
        style: BoxStyle::padded(Edges::symmetric(8.0, 16.0)).with_background(style::TABLE_HEAD_BG),
        gap: 32.0,
        tracks: tracks.clone(),
        children: headers
            .iter()
            .map(|(title, _)| Node::caption(title, style::TABLE_HEAD_SIZE, style::TABLE_HEAD_TRACKING, style::TAGLINE))
            .collect(),
    });

    let mut children = vec![head, Node::Rule(style::TABLE_RULE)];
    for (i, row) in rows.into_iter().enumerate() {
        if i > 0 {
            children.push(Node::Rule(style::ROW_RULE));
        }
        children.push(Node::Columns(Columns {
            style: BoxStyle::padded(Edges::symmetric(8.0, 16.0)),
            gap: 32.0,
            tracks: tracks.clone(),
            children: row.into_iter().map(|cell| Node::text(cell, style::BODY_SIZE, style::STRONG)).collect(),
        }));
    }

    Node::styled_stack(BoxStyle::default().with_border(style::TABLE_RULE), 0.0, children)
}
