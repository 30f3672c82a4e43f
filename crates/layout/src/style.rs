//! Report palette and type scale, in CSS px.

use fieldreport_types::Color;

pub const CARD_BORDER: Color = Color::rgb(0xd4, 0xd9, 0xe7);
pub const CARD_TITLE_BG: Color = Color::rgb(0xf8, 0xf9, 0xfc);
pub const CARD_TITLE_RULE: Color = Color::rgb(0xe4, 0xe7, 0xf2);
pub const CARD_TITLE: Color = Color::rgb(0x6f, 0x74, 0x8a);
pub const LABEL: Color = Color::rgb(0x7b, 0x81, 0x9a);
pub const VALUE: Color = Color::rgb(0x14, 0x1b, 0x2d);
pub const STRONG: Color = Color::rgb(0x15, 0x1b, 0x2f);
pub const MUTED: Color = Color::rgb(0x90, 0x96, 0xab);
pub const PLACEHOLDER: Color = Color::rgb(0xad, 0xb2, 0xc4);
pub const DASHED: Color = Color::rgb(0xcf, 0xd4, 0xe4);
pub const TABLE_HEAD_BG: Color = Color::rgb(0xf4, 0xf6, 0xfb);
pub const TABLE_RULE: Color = Color::rgb(0xe3, 0xe6, 0xf0);
pub const ROW_RULE: Color = Color::rgb(0xee, 0xf1, 0xf8);
pub const SIGNATURE_BG: Color = Color::rgb(0xf8, 0xf9, 0xfe);
pub const SIGNATURE_BORDER: Color = Color::rgb(0xe1, 0xe4, 0xf0);
pub const PAGE_BORDER: Color = Color::rgb(0xc9, 0xcf, 0xe0);
pub const COMPANY: Color = Color::rgb(0x1b, 0x1f, 0x32);
pub const TAGLINE: Color = Color::rgb(0x7b, 0x80, 0x97);

pub const CARD_TITLE_SIZE: f32 = 10.0;
pub const CARD_TITLE_TRACKING: f32 = 0.4;
pub const LABEL_SIZE: f32 = 10.0;
pub const LABEL_TRACKING: f32 = 0.25;
pub const CAPTION_TRACKING: f32 = 0.35;
pub const VALUE_SIZE: f32 = 13.0;
pub const BODY_SIZE: f32 = 14.0;
pub const SMALL_SIZE: f32 = 12.0;
pub const EMPHASIS_SIZE: f32 = 16.0;
pub const TABLE_HEAD_SIZE: f32 = 11.0;
pub const TABLE_HEAD_TRACKING: f32 = 0.3;

pub const EYEBROW_SIZE: f32 = 11.0;
pub const EYEBROW_TRACKING: f32 = 0.6;
pub const COMPANY_SIZE: f32 = 24.0;
pub const LOGO_HEIGHT: f32 = 56.0;
pub const LOGO_WIDTH: f32 = 56.0;

/// Gap between section cards in a page body.
pub const SECTION_GAP: f32 = 16.0;
pub const DEFINITION_LABEL_WIDTH: f32 = 120.0;
pub const THUMBNAIL_HEIGHT: f32 = 56.0;
pub const EMPTY_EVIDENCE_HEIGHT: f32 = 90.0;
pub const RECOMMENDATION_MIN_HEIGHT: f32 = 120.0;
pub const SIGNATURE_BOX_HEIGHT: f32 = 90.0;
pub const SIGNATURE_IMAGE_HEIGHT: f32 = 64.0;
pub const QR_SIZE: f32 = 96.0;

pub const WATERMARK_SIZE: f32 = 420.0;
pub const WATERMARK_OPACITY: f32 = 0.06;
