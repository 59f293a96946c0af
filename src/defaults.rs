//! Shared defaults

/// Role given to imported rows without a contractor signal when the caller
/// does not supply one.
pub const DEFAULT_IMPORT_ROLE: &str = "FACILITATOR";

/// Cap on row-level error strings returned to the caller; full detail stays
/// in the worker logs.
pub const MAX_REPORTED_ERRORS: usize = 20;

/// Data rows included in an import preview.
pub const PREVIEW_SAMPLE_ROWS: usize = 5;
