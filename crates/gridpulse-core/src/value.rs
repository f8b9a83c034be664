//! Decorated-value parsing and the dual-mode sort key.
//!
//! Grid cells routinely carry display decoration: `$1,234.56`, `($456.00)`,
//! `+1.5%`, `1,200,000`. Sorting must order those by parsed magnitude, not
//! lexicographically, while non-numeric cells fall back to case-insensitive
//! text comparison.

use std::cmp::Ordering;

use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Decorated number parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a decorated numeric string into an f64.
///
/// Strips `$`, `,`, `%`, a leading `+`, and surrounding whitespace.
/// A parenthesized value or leading `-` marks the number negative
/// (accounting convention: `($456.00)` == `-456.0`).
///
/// Returns `None` when nothing numeric remains.
pub fn parse_decorated(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Parenthesized values negate; interior '-' (dates, ranges) must still
    // fail the numeric parse, so only decoration characters are removed.
    let cleaned: String = trimmed
        .chars()
        .filter_map(|c| match c {
            '$' | ',' | '%' | '+' | ' ' => None,
            '(' => Some('-'),
            ')' => None,
            other => Some(other),
        })
        .collect();

    cleaned.parse().ok()
}

/// Format a value as a dollar string with thousands separators.
///
/// Negative values render with a leading minus (`-$456.00`), matching the
/// feed's output convention rather than the parenthesized input convention.
pub fn format_dollar(value: f64) -> String {
    let negative = value < 0.0;
    let magnitude = value.abs();
    let whole = magnitude.trunc() as u64;
    let cents = ((magnitude - magnitude.trunc()) * 100.0).round() as u64;

    // Carry when rounding cents up to a whole dollar.
    let (whole, cents) = if cents >= 100 { (whole + 1, 0) } else { (whole, cents) };

    let mut grouped = String::new();
    let digits = whole.to_string();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-${grouped}.{cents:02}")
    } else {
        format!("${grouped}.{cents:02}")
    }
}

/// Format a value as a signed percent string (`+1.5%`, `-0.3%`).
pub fn format_signed_pct(value: f64) -> String {
    format!("{value:+.1}%")
}

// ─────────────────────────────────────────────────────────────────────────────
// SortKey
// ─────────────────────────────────────────────────────────────────────────────

/// Comparison key for one grid cell.
///
/// Numbers always order among themselves by magnitude and sort ahead of
/// text; text compares case-insensitively. This is the single comparator
/// governing mixed numeric/text columns.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Extract a sort key from a JSON cell value.
    pub fn from_value(value: &Value) -> SortKey {
        match value {
            Value::Number(n) => SortKey::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => match parse_decorated(s) {
                Some(n) => SortKey::Number(n),
                None => SortKey::Text(s.to_lowercase()),
            },
            Value::Bool(b) => SortKey::Number(u8::from(*b) as f64),
            Value::Null => SortKey::Text(String::new()),
            other => SortKey::Text(other.to_string().to_lowercase()),
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// Human-readable text for a cell, used for substring search.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_decorated("42"), Some(42.0));
        assert_eq!(parse_decorated("3.14"), Some(3.14));
    }

    #[test]
    fn test_parse_dollar_with_separators() {
        assert_eq!(parse_decorated("$1,234.56"), Some(1234.56));
        assert_eq!(parse_decorated("$1,200,000"), Some(1_200_000.0));
    }

    #[test]
    fn test_parse_parenthesized_negative() {
        assert_eq!(parse_decorated("($456.00)"), Some(-456.0));
        assert_eq!(parse_decorated("-$123.00"), Some(-123.0));
    }

    #[test]
    fn test_parse_signed_percent() {
        assert_eq!(parse_decorated("+1.5%"), Some(1.5));
        assert_eq!(parse_decorated("-0.3%"), Some(-0.3));
    }

    #[test]
    fn test_parse_rejects_text() {
        assert_eq!(parse_decorated("AAPL"), None);
        assert_eq!(parse_decorated(""), None);
        assert_eq!(parse_decorated("  "), None);
    }

    #[test]
    fn test_parse_rejects_interior_dashes() {
        // Dates and ranges must fall back to text comparison.
        assert_eq!(parse_decorated("2024-01-15"), None);
        assert_eq!(parse_decorated("USD/JPY"), None);
    }

    #[test]
    fn test_format_dollar() {
        assert_eq!(format_dollar(1234.56), "$1,234.56");
        assert_eq!(format_dollar(-456.0), "-$456.00");
        assert_eq!(format_dollar(0.0), "$0.00");
        assert_eq!(format_dollar(1_200_000.0), "$1,200,000.00");
    }

    #[test]
    fn test_format_dollar_rounds_cents() {
        // 999.999 rounds up and carries into the whole part.
        assert_eq!(format_dollar(999.999), "$1,000.00");
    }

    #[test]
    fn test_format_signed_pct() {
        assert_eq!(format_signed_pct(1.5), "+1.5%");
        assert_eq!(format_signed_pct(-0.3), "-0.3%");
    }

    #[test]
    fn test_sort_key_numeric_magnitude_order() {
        let a = SortKey::from_value(&json!("$900.00"));
        let b = SortKey::from_value(&json!("$1,100.00"));
        // Lexicographic order would put "$900.00" after "$1,100.00".
        assert!(a < b);
    }

    #[test]
    fn test_sort_key_negative_parenthesized_orders_below_positive() {
        let neg = SortKey::from_value(&json!("($456.00)"));
        let pos = SortKey::from_value(&json!("$123.00"));
        assert!(neg < pos);
    }

    #[test]
    fn test_sort_key_numbers_before_text() {
        let n = SortKey::from_value(&json!("$5.00"));
        let t = SortKey::from_value(&json!("AAPL"));
        assert!(n < t);
    }

    #[test]
    fn test_sort_key_text_case_insensitive() {
        let a = SortKey::from_value(&json!("aapl"));
        let b = SortKey::from_value(&json!("AAPL"));
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_sort_key_raw_json_number() {
        let a = SortKey::from_value(&json!(2));
        let b = SortKey::from_value(&json!(10));
        assert!(a < b);
    }

    #[test]
    fn test_display_text_strings_unquoted() {
        assert_eq!(display_text(&json!("AAPL")), "AAPL");
        assert_eq!(display_text(&json!(190.5)), "190.5");
        assert_eq!(display_text(&json!(null)), "");
    }
}
