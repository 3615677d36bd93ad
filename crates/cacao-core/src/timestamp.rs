//! Timestamp handling: UTC RFC 3339 strings with up to microsecond precision.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Wire format for timestamps. Playbooks use millisecond precision by
    /// convention, signatures may carry microseconds.
    static ref TIMESTAMP_RE: Regex = Regex::new(
        r"^[12]\d{3}-[01]\d-[0-3]\dT[0-2]\d:[0-5]\d:[0-5]\d(\.\d{0,6})?Z$"
    )
    .unwrap();
}

/// Returns true when `s` matches the wire format.
pub fn is_valid(s: &str) -> bool {
    TIMESTAMP_RE.is_match(s)
}

/// Parses a timestamp for ordering comparisons. Returns `None` when the
/// string does not parse as RFC 3339.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc))
}

/// Current UTC time at millisecond precision.
pub fn now_milli() -> String {
    format_trimmed(Utc::now(), 3)
}

/// Current UTC time at microsecond precision.
pub fn now_micro() -> String {
    format_trimmed(Utc::now(), 6)
}

/// Formats with at most `digits` fractional digits, trimming trailing zeros
/// and the decimal point itself when the fraction is zero.
fn format_trimmed(t: DateTime<Utc>, digits: usize) -> String {
    let base = t.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = t.timestamp_subsec_nanos();
    let frac = if digits == 3 { nanos / 1_000_000 } else { nanos / 1_000 };
    let mut frac_str = format!("{frac:0width$}", width = digits);
    while frac_str.ends_with('0') {
        frac_str.pop();
    }
    if frac_str.is_empty() {
        format!("{base}Z")
    } else {
        format!("{base}.{frac_str}Z")
    }
}
