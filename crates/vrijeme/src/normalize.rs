//! Raw feed field normalization.
//!
//! Every data sub-field in the feed is a string that may be the `-`
//! placeholder, carry stray terminal escape sequences, or use a comma as
//! the decimal separator. These helpers turn one such string into a typed
//! value or `None`. A value that cannot be parsed is `None`, never an error.

use regex::Regex;
use std::sync::LazyLock;

/// Upstream marker for "no data".
pub const PLACEHOLDER: &str = "-";

/// ANSI/VT escape sequences: CSI (`ESC [ ... final`), OSC (`ESC ] ... BEL`)
/// and two-byte `ESC x` forms.
static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07]*\x07|\x1b[@-Z\\-_]").unwrap()
});

/// Parse a raw field as a float.
///
/// Escape sequences are removed first, then everything that is not a digit,
/// a sign, `.` or `,`. Commas become decimal points.
pub fn normalize_numeric(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    let stripped = ESCAPE_SEQUENCE.replace_all(raw, "");
    let cleaned: String = stripped
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ','))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() || cleaned == PLACEHOLDER {
        return None;
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            log::debug!("Unparseable numeric field {:?} (cleaned {:?})", raw, cleaned);
            None
        }
    }
}

/// Parse a raw field as a float and round it to the nearest integer.
pub fn normalize_integer(raw: Option<&str>) -> Option<i64> {
    normalize_numeric(raw).map(|value| value.round() as i64)
}

/// Trim a raw text field; empty text and the placeholder are `None`.
pub fn normalize_token(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        None
    } else {
        Some(trimmed.to_string())
    }
}
