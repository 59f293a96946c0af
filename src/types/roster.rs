//! Roster import and preview types

use serde::{Deserialize, Serialize};

/// Request to reconcile a raw roster export into the person registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterImportRequest {
    /// Raw delimited text, as exported from the source spreadsheet
    pub content: String,
    /// Role assigned to rows that do not carry a contractor signal
    pub default_role: Option<String>,
}

/// Request to preview a roster export without writing anything
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPreviewRequest {
    pub content: String,
}

/// Tri-state answer that could not be confidently classified, flagged for
/// human follow-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertainField {
    pub email: String,
    pub field: String,
}

/// Aggregate result of one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success: bool,
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    /// Row-level error strings, capped to bound response size
    pub errors: Vec<String>,
    pub uncertain_fields: Vec<UncertainField>,
}

impl ImportReport {
    /// Empty successful report, ready to accumulate counters
    pub fn new() -> Self {
        Self {
            success: true,
            created: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
            uncertain_fields: Vec::new(),
        }
    }

    /// Structural failure: one top-level error, zero counters
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            created: 0,
            updated: 0,
            skipped: 0,
            errors: vec![message.into()],
            uncertain_fields: Vec::new(),
        }
    }
}

impl Default for ImportReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only preview of a roster export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPreview {
    pub headers: Vec<String>,
    pub row_count: u32,
    pub sample_rows: Vec<Vec<String>>,
}
