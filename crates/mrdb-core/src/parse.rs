//! Best-effort parsing of loosely formatted scrape values.
//!
//! Scraped review dumps carry dates, ratings, prices and counts as display
//! strings ("June 3, 2024", "4.0 out of 5 stars", "$1,299.99",
//! "2,430 ratings"). Every helper here returns `None` rather than an error
//! for anything it cannot interpret.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid decimal regex"));

/// Parse a timestamp from a JSON value: strings go through
/// [`parse_timestamp`], numbers are unix seconds.
#[must_use]
pub fn parse_timestamp_value(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => parse_timestamp(s),
        serde_json::Value::Number(n) => n.as_f64().and_then(from_unix_seconds),
        _ => None,
    }
}

/// Parse a timestamp string in one of the formats seen in source dumps.
///
/// Accepted, in order: `"%B %d, %Y"` (assumed UTC), RFC 3339, naive ISO
/// date-times and dates (assumed UTC), and unix seconds as a numeric string.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%B %d, %Y") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    if let Ok(secs) = s.parse::<f64>() {
        return from_unix_seconds(secs);
    }

    tracing::debug!(raw = s, "unrecognized timestamp format");
    None
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc();
    let nanos = ((secs - whole) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

fn is_missing(raw: &str) -> bool {
    let t = raw.trim();
    t.is_empty() || t.eq_ignore_ascii_case("n/a") || t.eq_ignore_ascii_case("none")
}

/// Parse a rating such as `"4.0 out of 5 stars"` or `"3"`.
#[must_use]
pub fn parse_rating(raw: &str) -> Option<f64> {
    if is_missing(raw) {
        return None;
    }
    let t = raw.trim();
    DECIMAL_RE
        .captures(t)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .or_else(|| t.parse::<f64>().ok())
}

/// Parse a price such as `"$1,299.99"`, `"€12,99"` or `"£ 20"`.
///
/// A lone comma is treated as the decimal separator; separators followed by
/// exactly three digits are treated as thousands separators.
#[must_use]
pub fn parse_price(raw: &str) -> Option<f64> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£') && !c.is_whitespace())
        .collect();
    if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned = cleaned.replace(',', ".");
    }

    let chars: Vec<char> = cleaned.chars().collect();
    let mut out = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        if (c == ',' || c == '.') && is_thousands_separator(&chars, i) {
            continue;
        }
        if c.is_ascii_digit() || c == '.' {
            out.push(c);
        }
    }

    if out.is_empty() {
        return None;
    }
    out.parse::<f64>().ok()
}

fn is_thousands_separator(chars: &[char], i: usize) -> bool {
    let preceded_by_digit = i > 0 && chars[i - 1].is_ascii_digit();
    let group = chars.get(i + 1..i + 4);
    let three_digits = group.is_some_and(|g| g.iter().all(char::is_ascii_digit));
    let terminated = matches!(chars.get(i + 4), None | Some(',' | '.'));
    preceded_by_digit && three_digits && terminated
}

/// Parse a review count such as `"2,430 ratings"`.
#[must_use]
pub fn parse_review_count(raw: &str) -> Option<i64> {
    if is_missing(raw) {
        return None;
    }
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok()
}
