//! Sheet titles and A1 ranges.

use chrono::Local;
use regex::Regex;
use std::sync::LazyLock;

/// Longest title a sheet may carry.
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 100;

/// Characters given up at the end of an overlong title to make room for the
/// time suffix.
const TRUNCATION_RESERVE: usize = 10;

#[allow(clippy::expect_used)]
static ILLEGAL_TITLE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\\*?/\[\]:]").expect("valid title regex"));

/// A title from the current local time, `YYYYMMDD_HHMMSS`.
#[must_use]
pub fn timestamp_name() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// The `_HHMMSS` suffix for the current local time.
#[must_use]
pub fn time_suffix() -> String {
    Local::now().format("_%H%M%S").to_string()
}

/// Makes `name` a legal sheet title.
///
/// Replaces `\ * ? / [ ] :` with `_`. A result longer than `max_len`
/// characters keeps its first `max_len - 10` characters plus [`time_suffix`].
#[must_use]
pub fn sanitize_sheet_name(name: &str, max_len: usize) -> String {
    sanitize_with(name, max_len, time_suffix)
}

/// [`sanitize_sheet_name`] with the suffix source injected.
pub(crate) fn sanitize_with(
    name: &str,
    max_len: usize,
    suffix: impl FnOnce() -> String,
) -> String {
    let cleaned = ILLEGAL_TITLE_CHARS.replace_all(name, "_");
    if cleaned.chars().count() <= max_len {
        return cleaned.into_owned();
    }

    let keep = max_len.saturating_sub(TRUNCATION_RESERVE);
    let mut truncated: String = cleaned.chars().take(keep).collect();
    truncated.push_str(&suffix());

    if truncated.chars().count() > max_len {
        truncated = truncated.chars().take(max_len).collect();
    }
    truncated
}

/// `'<sheet>'!<cells>`, with quotes in the title doubled.
#[must_use]
pub fn a1_range(sheet: &str, cells: &str) -> String {
    format!("'{}'!{cells}", sheet.replace('\'', "''"))
}
