//! Output shape for every extractor path: a flat reading-order structure,
//! any tables found, and whatever metadata the source format exposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::DocumentFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Heading,
    Paragraph,
    ListItem,
    Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureElement {
    pub kind: StructureKind,
    pub text: String,
    pub style: Option<String>,
}

impl StructureElement {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self { kind: StructureKind::Paragraph, text: text.into(), style: None }
    }

    pub fn heading(text: impl Into<String>, style: Option<String>) -> Self {
        Self { kind: StructureKind::Heading, text: text.into(), style }
    }

    pub fn list_item(text: impl Into<String>) -> Self {
        Self { kind: StructureKind::ListItem, text: text.into(), style: None }
    }

    pub fn table(text: impl Into<String>) -> Self {
        Self { kind: StructureKind::Table, text: text.into(), style: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub sheet_or_caption: Option<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub page_or_sheet_count: Option<usize>,
    pub format: Option<DocumentFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub full_text: String,
    pub structure: Vec<StructureElement>,
    pub tables: Vec<ExtractedTable>,
    pub metadata: ExtractionMetadata,
}

/// A single document extraction never raises to the caller (spec §4.1
/// failures clause) — the batch coordinator decides whether to retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub success: bool,
    pub document: Option<ExtractedDocument>,
    pub error: Option<String>,
}

impl ExtractionOutcome {
    pub fn ok(document: ExtractedDocument) -> Self {
        Self { success: true, document: Some(document), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, document: None, error: Some(error.into()) }
    }
}
