//! Spreadsheet export.
//!
//! This module provides:
//! - Sheet title sanitization and A1 range helpers
//! - Backoff policy for name-collision retries
//! - The exporter writing a header and data rows to a fresh sheet

mod exporter;
mod naming;
mod retry;

pub use exporter::{SheetExporter, SHEET_HEADERS};
pub use naming::{
    a1_range, sanitize_sheet_name, time_suffix, timestamp_name, DEFAULT_MAX_TITLE_LENGTH,
};
pub use retry::RetryConfig;
