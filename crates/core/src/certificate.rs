//! Certificate of completion layout.
//!
//! Turns a [`Certificate`] record into an ordered list of drawing
//! instructions for a single landscape page: a coloured accent panel on
//! the left carrying the organisation name and document type, and a
//! content panel on the right with the recipient, course, issuance
//! details, signature block and footer. Layout is computed directly from
//! the page size; there is no text measurement. Rendering the
//! instructions (PDF, image, print) is left to the caller.

use std::fmt::Write as _;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Serialize, Serializer};

use crate::error::CoreError;
use crate::models::Certificate;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const ORGANIZATION_NAME: &str = "Edu Learn Pro";
pub const DOCUMENT_TYPE: &str = "Certificate";
pub const DOCUMENT_TYPE_QUALIFIER: &str = "of Completion";
pub const PRESENTATION_LINE: &str = "THIS CERTIFICATE IS PROUDLY PRESENTED TO";
pub const COURSE_LINE: &str = "for successfully completing the course";
pub const CLOSING_LINE: &str = "Congratulations on successfully completing your learning journey!";
pub const SIGNATORY_NAME: &str = "Natalie Taylor";
pub const SIGNATORY_LABEL: &str = "Course Speaker";

/// Default issuance date format (`1/15/2024`).
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Share of the page width taken by the accent panel.
const ACCENT_PANEL_RATIO: f32 = 0.35;
/// Left margin of the content column, measured from the accent panel edge.
const CONTENT_MARGIN: f32 = 40.0;
const SIGNATURE_RULE_WIDTH: f32 = 160.0;
const FOOTER_DATE_OFFSET: f32 = 250.0;

#[derive(Clone, Copy)]
struct TextStyle {
    size: f32,
    weight: FontWeight,
    color: Color,
    align: TextAlign,
}

const fn style(size: f32, weight: FontWeight, color: Color, align: TextAlign) -> TextStyle {
    TextStyle {
        size,
        weight,
        color,
        align,
    }
}

const PANEL_TITLE: TextStyle = style(28.0, FontWeight::Bold, palette::WHITE, TextAlign::Center);
const PANEL_HEADING: TextStyle = style(20.0, FontWeight::Bold, palette::WHITE, TextAlign::Center);
const PANEL_SUBHEADING: TextStyle =
    style(16.0, FontWeight::Bold, palette::WHITE, TextAlign::Center);
const RECIPIENT: TextStyle = style(32.0, FontWeight::Bold, palette::INK, TextAlign::Left);
const LEAD: TextStyle = style(14.0, FontWeight::Normal, palette::INK, TextAlign::Left);
const LEAD_BOLD: TextStyle = style(14.0, FontWeight::Bold, palette::INK, TextAlign::Left);
const BODY: TextStyle = style(12.0, FontWeight::Normal, palette::INK, TextAlign::Left);
const BODY_BOLD: TextStyle = style(12.0, FontWeight::Bold, palette::INK, TextAlign::Left);
const SMALL: TextStyle = style(10.0, FontWeight::Normal, palette::INK, TextAlign::Left);

// ---------------------------------------------------------------------------
// Drawing primitives
// ---------------------------------------------------------------------------

/// Opaque RGB colour, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

pub mod palette {
    use super::Color;

    pub const ACCENT_PANEL: Color = Color::rgb(0x1D, 0x4E, 0xD8);
    pub const CONTENT_PANEL: Color = Color::rgb(0xF8, 0xFA, 0xFC);
    pub const ORANGE: Color = Color::rgb(0xFD, 0xBA, 0x74);
    pub const CYAN: Color = Color::rgb(0x22, 0xD3, 0xEE);
    pub const VIOLET: Color = Color::rgb(0x7C, 0x3A, 0xED);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const INK: Color = Color::rgb(0x0F, 0x17, 0x2A);
}

/// A point in page units, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4_LANDSCAPE: PageSize = PageSize {
        width: 841.89,
        height: 595.28,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4_LANDSCAPE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    Helvetica,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Horizontal anchoring of a text block relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub content: String,
    /// Baseline anchor point.
    pub position: Point,
    pub font: Font,
    pub size: f32,
    pub weight: FontWeight,
    pub color: Color,
    pub align: TextAlign,
}

/// One drawing step. Instructions are painted in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawInstruction {
    FillRegion { rect: Rect, color: Color },
    DrawPolygon { points: Vec<Point>, color: Color },
    DrawText(TextBlock),
}

impl DrawInstruction {
    /// Text content if this is a text instruction.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::DrawText(block) => Some(&block.content),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Lays out certificates on a fixed page size.
#[derive(Debug, Clone)]
pub struct CertificateDocumentBuilder {
    page: PageSize,
    date_format: String,
    utc_offset: FixedOffset,
}

impl Default for CertificateDocumentBuilder {
    fn default() -> Self {
        Self::new(PageSize::A4_LANDSCAPE)
    }
}

impl CertificateDocumentBuilder {
    pub fn new(page: PageSize) -> Self {
        Self {
            page,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            utc_offset: Utc.fix(),
        }
    }

    /// Use a `chrono` strftime pattern for the issuance date, e.g.
    /// `%d.%m.%Y` for a German locale.
    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Print the issuance date in the reader's local time instead of UTC.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn page(&self) -> PageSize {
        self.page
    }

    /// Produce the drawing instructions for a certificate.
    ///
    /// Fails before emitting anything if a required field is missing, so
    /// a partially labelled document is never produced.
    pub fn build(&self, certificate: &Certificate) -> Result<Vec<DrawInstruction>, CoreError> {
        let issued_at = validate_certificate(certificate)?;
        self.validate_page()?;
        let issued_on = format_date(&issued_at, self.utc_offset, &self.date_format)?;
        let certificate_id = certificate_id(certificate);
        let student_name = certificate.student_name.trim();
        let course_title = certificate.course_title.trim();

        let PageSize { width, height } = self.page;
        let left = width * ACCENT_PANEL_RATIO;
        let mut doc = Vec::with_capacity(24);

        // Panels and accent shapes.
        doc.push(fill(Rect::new(0.0, 0.0, left, height), palette::ACCENT_PANEL));
        doc.push(fill(
            Rect::new(left, 0.0, width - left, height),
            palette::CONTENT_PANEL,
        ));
        doc.push(fill(Rect::new(left - 25.0, 40.0, 60.0, 60.0), palette::ORANGE));
        doc.push(fill(
            Rect::new(width - 120.0, height - 140.0, 80.0, 80.0),
            palette::CYAN,
        ));
        doc.push(DrawInstruction::DrawPolygon {
            points: vec![
                Point::new(left - 40.0, height - 80.0),
                Point::new(left + 20.0, height),
                Point::new(left + 20.0, height - 80.0),
            ],
            color: palette::VIOLET,
        });

        // Accent panel labels.
        let centre = left / 2.0;
        doc.push(text(ORGANIZATION_NAME, Point::new(centre, 100.0), PANEL_TITLE));
        doc.push(text(DOCUMENT_TYPE, Point::new(centre, 180.0), PANEL_HEADING));
        doc.push(text(DOCUMENT_TYPE_QUALIFIER, Point::new(centre, 210.0), PANEL_SUBHEADING));

        // Content column, top to bottom.
        let x = left + CONTENT_MARGIN;
        let lines = [
            (0.0, PRESENTATION_LINE.to_string(), BODY),
            (30.0, student_name.to_string(), RECIPIENT),
            (30.0, COURSE_LINE.to_string(), LEAD),
            (25.0, course_title.to_string(), LEAD_BOLD),
            (50.0, format!("Issued to: {student_name}"), BODY),
            (20.0, format!("Completed on: {issued_on}"), BODY),
            (
                20.0,
                format!("Progress: {}", format_percent(certificate.progress_percent)),
                BODY,
            ),
            (40.0, CLOSING_LINE.to_string(), BODY),
        ];
        let mut y = 120.0;
        for (advance, content, style) in lines {
            y += advance;
            doc.push(text(&content, Point::new(x, y), style));
        }

        // Signature block.
        let signature_y = height - 120.0;
        doc.push(fill(
            Rect::new(x, signature_y - 24.0, SIGNATURE_RULE_WIDTH, 1.0),
            palette::INK,
        ));
        doc.push(text(SIGNATORY_NAME, Point::new(x, signature_y), BODY_BOLD));
        doc.push(text(SIGNATORY_LABEL, Point::new(x, signature_y + 14.0), SMALL));

        // Footer.
        let footer_y = height - 80.0;
        doc.push(text(
            &format!("Certificate ID: {certificate_id}"),
            Point::new(x, footer_y),
            SMALL,
        ));
        doc.push(text(
            &format!("Issued: {issued_on}"),
            Point::new(x + FOOTER_DATE_OFFSET, footer_y),
            SMALL,
        ));

        Ok(doc)
    }

    fn validate_page(&self) -> Result<(), CoreError> {
        let PageSize { width, height } = self.page;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CoreError::Validation(format!(
                "Page size must be positive, got {width}x{height}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Check the fields every certificate must carry, returning the issuance
/// timestamp on success.
pub fn validate_certificate(certificate: &Certificate) -> Result<Timestamp, CoreError> {
    let required = [
        ("enrollment_id", certificate.enrollment_id.as_str()),
        ("student_name", certificate.student_name.as_str()),
        ("course_title", certificate.course_title.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(CoreError::MissingField {
                entity: "certificate",
                field,
            });
        }
    }

    let issued_at = certificate.issued_at.ok_or(CoreError::MissingField {
        entity: "certificate",
        field: "issued_at",
    })?;

    let pct = certificate.progress_percent;
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(CoreError::Validation(format!(
            "progress_percent must be between 0 and 100, got {pct}"
        )));
    }

    Ok(issued_at)
}

/// Identifier printed on the certificate, derived from the enrollment.
pub fn certificate_id(certificate: &Certificate) -> String {
    certificate.enrollment_id.trim().to_string()
}

/// Download file name for a course's certificate:
/// `"Intro to X"` becomes `certificate-intro-to-x.pdf`.
pub fn certificate_file_name(course_title: &str) -> String {
    let slug = course_title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "certificate.pdf".to_string()
    } else {
        format!("certificate-{slug}.pdf")
    }
}

/// Render a percentage without trailing zeros: `100%`, `66.67%`, `33.3%`.
pub fn format_percent(value: f64) -> String {
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}%")
}

fn format_date(ts: &Timestamp, offset: FixedOffset, format: &str) -> Result<String, CoreError> {
    let mut out = String::new();
    write!(out, "{}", ts.with_timezone(&offset).format(format))
        .map_err(|_| CoreError::Validation(format!("Invalid date format '{format}'")))?;
    Ok(out)
}

fn fill(rect: Rect, color: Color) -> DrawInstruction {
    DrawInstruction::FillRegion { rect, color }
}

fn text(content: &str, position: Point, style: TextStyle) -> DrawInstruction {
    DrawInstruction::DrawText(TextBlock {
        content: content.to_string(),
        position,
        font: Font::Helvetica,
        size: style.size,
        weight: style.weight,
        color: style.color,
        align: style.align,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn certificate() -> Certificate {
        Certificate {
            enrollment_id: "e1".to_string(),
            course_id: "c1".to_string(),
            course_title: "Intro to X".to_string(),
            student_id: "s1".to_string(),
            student_name: "Jane Doe".to_string(),
            issued_at: Some(chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            progress_percent: 100.0,
        }
    }

    fn texts(doc: &[DrawInstruction]) -> Vec<&str> {
        doc.iter().filter_map(DrawInstruction::text).collect()
    }

    // -- build ----------------------------------------------------------------

    #[test]
    fn build_includes_recipient_and_course() {
        let doc = CertificateDocumentBuilder::default()
            .build(&certificate())
            .unwrap();
        let texts = texts(&doc);
        assert!(!doc.is_empty());
        assert!(texts.contains(&"Jane Doe"));
        assert!(texts.contains(&"Intro to X"));
    }

    #[test]
    fn build_includes_all_labels() {
        let doc = CertificateDocumentBuilder::default()
            .build(&certificate())
            .unwrap();
        let texts = texts(&doc);
        for expected in [
            ORGANIZATION_NAME,
            DOCUMENT_TYPE,
            SIGNATORY_LABEL,
            "Completed on: 1/1/2024",
            "Progress: 100%",
            "Certificate ID: e1",
            "Issued: 1/1/2024",
        ] {
            assert!(texts.contains(&expected), "missing text {expected:?}");
        }
    }

    #[test]
    fn build_starts_with_two_panels() {
        let page = PageSize {
            width: 1000.0,
            height: 500.0,
        };
        let doc = CertificateDocumentBuilder::new(page)
            .build(&certificate())
            .unwrap();
        assert_eq!(
            doc[0],
            DrawInstruction::FillRegion {
                rect: Rect::new(0.0, 0.0, 350.0, 500.0),
                color: palette::ACCENT_PANEL,
            }
        );
        assert_eq!(
            doc[1],
            DrawInstruction::FillRegion {
                rect: Rect::new(350.0, 0.0, 650.0, 500.0),
                color: palette::CONTENT_PANEL,
            }
        );
    }

    #[test]
    fn build_is_deterministic() {
        let builder = CertificateDocumentBuilder::default();
        let a = builder.build(&certificate()).unwrap();
        let b = builder.build(&certificate()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn custom_date_format_is_used() {
        let doc = CertificateDocumentBuilder::default()
            .with_date_format("%d.%m.%Y")
            .build(&certificate())
            .unwrap();
        assert!(texts(&doc).contains(&"Completed on: 01.01.2024"));
    }

    #[test]
    fn issuance_date_uses_caller_offset() {
        // Midnight UTC is still the previous evening in UTC-5.
        let doc = CertificateDocumentBuilder::default()
            .with_utc_offset(FixedOffset::west_opt(5 * 3600).unwrap())
            .build(&certificate())
            .unwrap();
        let texts = texts(&doc);
        assert!(texts.contains(&"Completed on: 12/31/2023"));
        assert!(texts.contains(&"Issued: 12/31/2023"));
    }

    #[test]
    fn invalid_date_format_is_rejected() {
        let result = CertificateDocumentBuilder::default()
            .with_date_format("%Q")
            .build(&certificate());
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    // -- Validation -----------------------------------------------------------

    #[test]
    fn missing_student_name_is_rejected() {
        let mut cert = certificate();
        cert.student_name = "   ".to_string();
        let result = CertificateDocumentBuilder::default().build(&cert);
        assert_matches!(
            result,
            Err(CoreError::MissingField {
                entity: "certificate",
                field: "student_name"
            })
        );
    }

    #[test]
    fn missing_issued_at_is_rejected() {
        let mut cert = certificate();
        cert.issued_at = None;
        assert_matches!(
            validate_certificate(&cert),
            Err(CoreError::MissingField {
                field: "issued_at",
                ..
            })
        );
    }

    #[test]
    fn missing_enrollment_id_is_rejected() {
        let mut cert = certificate();
        cert.enrollment_id.clear();
        assert_matches!(
            validate_certificate(&cert),
            Err(CoreError::MissingField {
                field: "enrollment_id",
                ..
            })
        );
    }

    #[test]
    fn out_of_range_progress_is_rejected() {
        let mut cert = certificate();
        cert.progress_percent = 120.0;
        assert_matches!(validate_certificate(&cert), Err(CoreError::Validation(_)));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let page = PageSize {
            width: 0.0,
            height: 595.0,
        };
        let result = CertificateDocumentBuilder::new(page).build(&certificate());
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    // -- Helpers --------------------------------------------------------------

    #[test]
    fn file_name_is_slugged() {
        assert_eq!(
            certificate_file_name("Intro to  X"),
            "certificate-intro-to-x.pdf"
        );
        assert_eq!(certificate_file_name("  "), "certificate.pdf");
    }

    #[test]
    fn percent_drops_trailing_zeros() {
        assert_eq!(format_percent(100.0), "100%");
        assert_eq!(format_percent(66.67), "66.67%");
        assert_eq!(format_percent(33.3), "33.3%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn color_serializes_as_hex() {
        let json = serde_json::to_value(palette::VIOLET).unwrap();
        assert_eq!(json, serde_json::json!("#7C3AED"));
    }

    #[test]
    fn instruction_serializes_with_kind_tag() {
        let instruction = DrawInstruction::FillRegion {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            color: palette::WHITE,
        };
        let json = serde_json::to_value(&instruction).unwrap();
        assert_eq!(json["kind"], "fill_region");
        assert_eq!(json["color"], "#FFFFFF");
    }
}
