//! Bulk roster reconciliation engine
//!
//! Ingests a raw delimited-text export of staff records and merges it into
//! the person registry without overwriting previously entered data. Rows are
//! processed strictly in document order, one registry read and at most one
//! write each; a failed row is recorded and skipped, never retried, and
//! never aborts the run.

pub mod headers;
pub mod normalize;
pub mod reconcile;
pub mod tokenizer;

use tracing::{info, warn};

use crate::defaults::{MAX_REPORTED_ERRORS, PREVIEW_SAMPLE_ROWS};
use crate::services::registry::PersonRegistry;
use crate::types::{ImportReport, RosterPreview};

use headers::HeaderMap;
use reconcile::{reconcile_row, RowOutcome};
use tokenizer::split_line;

/// Drives one import pass over a roster document.
pub struct RosterImporter<'a> {
    registry: &'a dyn PersonRegistry,
}

impl<'a> RosterImporter<'a> {
    pub fn new(registry: &'a dyn PersonRegistry) -> Self {
        Self { registry }
    }

    /// Reconcile a whole document into the registry.
    ///
    /// Never returns an error: structural problems come back as a failed
    /// report, row-level problems as capped error strings inside a
    /// successful one.
    pub async fn import(&self, raw_text: &str, default_role: &str) -> ImportReport {
        let lines = data_lines(raw_text);

        if lines.len() < 2 {
            warn!("Roster import rejected: no header and data rows");
            return ImportReport::failed(
                "roster file must contain a header row and at least one data row",
            );
        }

        let header_cells = split_line(lines[0]);
        let map = HeaderMap::resolve(&header_cells);

        let mut report = ImportReport::new();

        for (idx, line) in lines[1..].iter().enumerate() {
            // File position: header is row 1, first data row is row 2
            let row_number = idx + 2;
            let cells = split_line(line);

            match reconcile_row(self.registry, &cells, &map, default_role).await {
                Ok(row) => {
                    match row.outcome {
                        RowOutcome::Created => report.created += 1,
                        RowOutcome::Updated => report.updated += 1,
                        RowOutcome::Skipped => report.skipped += 1,
                    }
                    report.uncertain_fields.extend(row.uncertain);
                }
                Err(e) => {
                    if report.errors.len() < MAX_REPORTED_ERRORS {
                        report.errors.push(format!("Row {}: {}", row_number, e));
                    }
                }
            }
        }

        info!(
            "Roster import: {} created, {} updated, {} skipped, {} uncertain",
            report.created,
            report.updated,
            report.skipped,
            report.uncertain_fields.len()
        );

        report
    }
}

/// Read-only preview: headers, data-row count, and a small sample. No
/// normalization, no registry access.
pub fn preview(raw_text: &str) -> RosterPreview {
    let lines = data_lines(raw_text);

    if lines.is_empty() {
        return RosterPreview {
            headers: Vec::new(),
            row_count: 0,
            sample_rows: Vec::new(),
        };
    }

    let headers = split_line(lines[0]);
    let sample_rows = lines[1..]
        .iter()
        .take(PREVIEW_SAMPLE_ROWS)
        .map(|line| split_line(line))
        .collect();

    RosterPreview {
        headers,
        row_count: (lines.len() - 1) as u32,
        sample_rows,
    }
}

/// Non-empty lines, with a spreadsheet export's leading title row stripped.
fn data_lines(raw_text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = raw_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    if let Some(first) = lines.first() {
        if first.to_lowercase().contains("table") {
            lines.remove(0);
        }
    }

    lines
}
