//! Section descriptors and the catalogs for each generation variant.
//!
//! A generation request expects the model to return every document wrapped
//! in a unique tag pair, in a fixed order. That order is configuration
//! data known before the stream starts -- it is never inferred from the
//! stream itself. Each request variant (daily package, daily package with
//! video suggestions, annual plan) has its own catalog below.

use serde::Serialize;

/// One expected document in the model output: a semantic name plus the
/// tag pair that delimits it in the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDescriptor {
    /// Semantic name, e.g. `"RPP"`.
    pub name: &'static str,
    /// Tag that opens the section.
    pub start_tag: &'static str,
    /// Tag that closes the section.
    pub end_tag: &'static str,
}

impl SectionDescriptor {
    pub const fn new(
        name: &'static str,
        start_tag: &'static str,
        end_tag: &'static str,
    ) -> Self {
        Self {
            name,
            start_tag,
            end_tag,
        }
    }

    /// The label carried by emitted events: the lowercased name, except
    /// `KISI`, which clients know by the field name `kisiKisi`.
    pub fn label(&self) -> String {
        if self.name.eq_ignore_ascii_case("KISI") {
            "kisiKisi".to_string()
        } else {
            self.name.to_ascii_lowercase()
        }
    }
}

/// A completed section: the mapped label plus the trimmed content that sat
/// between the section's tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionEvent {
    /// Semantic label, e.g. `"rpp"` or `"kisiKisi"`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Extracted content, already trimmed of surrounding whitespace.
    pub data: String,
}

impl SectionEvent {
    pub fn new(descriptor: &SectionDescriptor, data: impl Into<String>) -> Self {
        Self {
            event_type: descriptor.label(),
            data: data.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

/// Daily teaching package: lesson plan, worksheet, assessment blueprint,
/// evaluation items, material summary.
pub const DAILY_PACKAGE: &[SectionDescriptor] = &[
    SectionDescriptor::new("RPP", "[RPP_MULAI]", "[RPP_SELESAI]"),
    SectionDescriptor::new("LKPD", "[LKPD_MULAI]", "[LKPD_SELESAI]"),
    SectionDescriptor::new("KISI", "[KISI_MULAI]", "[KISI_SELESAI]"),
    SectionDescriptor::new("SOAL", "[SOAL_MULAI]", "[SOAL_SELESAI]"),
    SectionDescriptor::new("MATERI", "[MATERI_MULAI]", "[MATERI_SELESAI]"),
];

/// Daily teaching package plus video suggestions.
pub const DAILY_PACKAGE_WITH_VIDEO: &[SectionDescriptor] = &[
    SectionDescriptor::new("RPP", "[RPP_MULAI]", "[RPP_SELESAI]"),
    SectionDescriptor::new("LKPD", "[LKPD_MULAI]", "[LKPD_SELESAI]"),
    SectionDescriptor::new("KISI", "[KISI_MULAI]", "[KISI_SELESAI]"),
    SectionDescriptor::new("SOAL", "[SOAL_MULAI]", "[SOAL_SELESAI]"),
    SectionDescriptor::new("MATERI", "[MATERI_MULAI]", "[MATERI_SELESAI]"),
    SectionDescriptor::new("VIDEO", "[VIDEO_MULAI]", "[VIDEO_SELESAI]"),
];

/// Annual planning pair: program tahunan and program semester.
pub const ANNUAL_PLAN: &[SectionDescriptor] = &[
    SectionDescriptor::new("PROTA", "[PROTA_MULAI]", "[PROTA_SELESAI]"),
    SectionDescriptor::new("PROMES", "[PROMES_MULAI]", "[PROMES_SELESAI]"),
];
