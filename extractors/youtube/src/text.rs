//! Helpers for the human-readable text nodes that YouTube renders server-side.

use crate::json::JsonExt;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// "1.2M subscribers", "3,4 k", "12K"
static ABBREVIATED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)(?:[.,]([0-9]+))?\s*([KMBkmb])\b")
        .expect("Should be able to parse the abbreviated number regex")
});

// "987", "1,234,567 views", "1 234 567 Aufrufe", "1.234.567"
static GROUPED_INTEGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^0-9]*([0-9]{1,3}(?:[.,\s][0-9]{3})*|[0-9]+)[^0-9]*$")
        .expect("Should be able to parse the grouped integer regex")
});

/// Failure to read a number out of a text node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse a number from {text:?}")]
pub struct NumberParseError {
    pub text: String,
}

/// Reads the display text of a text object.
///
/// Text objects come in two flavours: `{"simpleText": "..."}` and
/// `{"runs": [{"text": "..."}, ...]}`, the latter being concatenated in order.
pub fn text_from_object(object: &Value) -> Option<String> {
    if let Some(simple) = object.str_at("/simpleText") {
        return Some(simple.to_string());
    }

    let runs = object.array_at("/runs")?;
    let mut text = String::new();
    for run in runs {
        text.push_str(run.str_at("/text")?);
    }
    Some(text)
}

/// Parses numbers the way YouTube abbreviates them, e.g. `"1.2M subscribers"` to `1_200_000`.
///
/// Both `.` and `,` are accepted as the decimal separator when a `K`/`M`/`B` suffix follows.
/// Fraction digits beyond the precision of the suffix are dropped. Without a suffix, the
/// text must hold a single integer, optionally grouped by thousands (`"1,234,567 views"`);
/// anything else, such as a decimal with an unknown suffix, is an error.
pub fn parse_abbreviated_number(text: &str) -> Result<u64, NumberParseError> {
    let err = || NumberParseError {
        text: text.to_string(),
    };

    if let Some(captures) = ABBREVIATED_NUMBER.captures(text) {
        let multiplier: u64 = match &captures[3] {
            "K" | "k" => 1_000,
            "M" | "m" => 1_000_000,
            _ => 1_000_000_000,
        };
        let whole: u64 = captures[1].parse().map_err(|_| err())?;
        let mut value = whole.checked_mul(multiplier).ok_or_else(err)?;

        if let Some(fraction) = captures.get(2) {
            // multiplier is 10^precision
            let precision = multiplier.ilog10() as usize;
            let digits = fraction.as_str();
            let digits = &digits[..digits.len().min(precision)];
            let fraction: u64 = digits.parse().map_err(|_| err())?;
            let scaled = fraction * 10u64.pow((precision - digits.len()) as u32);
            value = value.checked_add(scaled).ok_or_else(err)?;
        }
        return Ok(value);
    }

    if !GROUPED_INTEGER.is_match(text) {
        return Err(err());
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().map_err(|_| err())
}

/// Parses a view count text node.
///
/// `"No views"` is reported as zero; text without any digits yields `None`.
pub fn parse_view_count(text: &str) -> Option<u64> {
    if text.trim().eq_ignore_ascii_case("no views") {
        return Some(0);
    }
    parse_abbreviated_number(text).ok()
}

/// Parses `"h:mm:ss"`, `"m:ss"` or `"ss"` into seconds.
pub fn parse_duration(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut seconds = 0u64;
    let mut parts = 0;
    for part in text.split(':') {
        parts += 1;
        if parts > 3 {
            return None;
        }
        let part: u64 = part.trim().parse().ok()?;
        seconds = seconds.checked_mul(60)?.checked_add(part)?;
    }
    Some(seconds)
}
