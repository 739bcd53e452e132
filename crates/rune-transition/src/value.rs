//! Style values and the comparison rules used when diffing them.
//!
//! Computed styles come back from the environment as strings, while handler
//! authors usually pass numbers for unitless properties (`opacity: 1`). The
//! engine therefore compares values with [`numeric_or_string_equals`], a
//! loose rule where a number and a string are equal when the string reads as
//! that number.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Property name → value map used for inline, computed and target styles.
pub type StyleMap = BTreeMap<String, StyleValue>;

/// A single style value: either a bare number or a CSS string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    /// Numeric view of this value, using the same rules as [`to_number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => to_number(s),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Interpolate towards `to` at factor `t`.
    ///
    /// Lengths interpolate when both ends share a unit (a bare zero adopts the
    /// other end's unit). Anything else holds `self` until `t` reaches 1.
    pub fn interpolate(&self, to: &StyleValue, t: f32) -> StyleValue {
        if t >= 1.0 {
            return to.clone();
        }
        let (Some((from_n, from_unit)), Some((to_n, to_unit))) =
            (split_length(self), split_length(to))
        else {
            return self.clone();
        };

        let unit = match (from_unit.is_empty(), to_unit.is_empty()) {
            (_, _) if from_unit == to_unit => to_unit,
            (true, false) if from_n == 0.0 => to_unit,
            (false, true) if to_n == 0.0 => from_unit,
            _ => return self.clone(),
        };

        let value = from_n + (to_n - from_n) * t as f64;
        if unit.is_empty() && matches!(to, StyleValue::Number(_)) {
            StyleValue::Number(value)
        } else {
            StyleValue::Text(format!("{}{}", format_number(value), unit))
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Loose equality between two style values.
///
/// - number vs number: numeric equality (NaN equals nothing)
/// - string vs string: exact match
/// - number vs string: the string is read as a number first; strings that do
///   not read as a number (`"10px"`, `"auto"`) are never equal to a number
pub fn numeric_or_string_equals(a: &StyleValue, b: &StyleValue) -> bool {
    match (a, b) {
        (StyleValue::Number(x), StyleValue::Number(y)) => x == y,
        (StyleValue::Text(x), StyleValue::Text(y)) => x == y,
        (StyleValue::Number(n), StyleValue::Text(s)) | (StyleValue::Text(s), StyleValue::Number(n)) => {
            to_number(s).is_some_and(|parsed| parsed == *n)
        }
    }
}

/// Collapse a zero pixel length to the number zero.
pub fn normalize_zero_length(value: StyleValue) -> StyleValue {
    match value {
        StyleValue::Text(s) if s == "0px" => StyleValue::Number(0.0),
        other => other,
    }
}

/// Read a string as a number.
///
/// Surrounding whitespace is ignored and an empty string reads as zero. Only
/// plain decimal notation and `Infinity` are accepted.
pub fn to_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// CSS text for a number. `f64`'s `Display` already omits a trailing `.0`
/// and never switches to exponent notation; negative zero prints as `0`.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Split a length into its number and unit (`"10px"` → `(10.0, "px")`).
fn split_length(value: &StyleValue) -> Option<(f64, &str)> {
    match value {
        StyleValue::Number(n) => Some((*n, "")),
        StyleValue::Text(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            let (number, unit) = s.split_at(end);
            if !unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%') {
                return None;
            }
            number.parse::<f64>().ok().map(|n| (n, unit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_equality_across_types() {
        assert!(numeric_or_string_equals(&StyleValue::from("1"), &StyleValue::from(1)));
        assert!(numeric_or_string_equals(&StyleValue::from(0), &StyleValue::from("")));
        assert!(numeric_or_string_equals(&StyleValue::from(" 0.5 "), &StyleValue::from(0.5)));
        assert!(!numeric_or_string_equals(&StyleValue::from("10px"), &StyleValue::from(10)));
        assert!(!numeric_or_string_equals(&StyleValue::from("0px"), &StyleValue::from(0)));
        assert!(!numeric_or_string_equals(&StyleValue::from(f64::NAN), &StyleValue::from(f64::NAN)));
    }

    #[test]
    fn test_normalized_zero_does_not_equal_zero_length_text() {
        // A computed "0px" normalizes to 0, which is not loosely equal to a "0px" target.
        let current = normalize_zero_length("0px".into());
        assert!(!numeric_or_string_equals(&current, &StyleValue::from("0px")));
        assert!(numeric_or_string_equals(&current, &StyleValue::from(0)));
    }

    #[test]
    fn test_loose_equality_strings_are_exact() {
        assert!(numeric_or_string_equals(&StyleValue::from("10px"), &StyleValue::from("10px")));
        assert!(!numeric_or_string_equals(&StyleValue::from("1"), &StyleValue::from("1.0")));
    }

    #[test]
    fn test_to_number_rejects_rust_only_spellings() {
        assert_eq!(to_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(to_number("inf"), None);
        assert_eq!(to_number("NaN"), None);
        assert_eq!(to_number("auto"), None);
        assert_eq!(to_number("  "), Some(0.0));
    }

    #[test]
    fn test_normalize_zero_length() {
        assert_eq!(normalize_zero_length("0px".into()), StyleValue::Number(0.0));
        assert_eq!(normalize_zero_length("0em".into()), StyleValue::from("0em"));
        assert_eq!(normalize_zero_length("12px".into()), StyleValue::from("12px"));
    }

    #[test]
    fn test_display_matches_css_text() {
        assert_eq!(StyleValue::from(1).to_string(), "1");
        assert_eq!(StyleValue::from(-3.0).to_string(), "-3");
        assert_eq!(StyleValue::from(1e19).to_string(), "10000000000000000000");
        assert_eq!(StyleValue::from(-0.0).to_string(), "0");
        assert_eq!(StyleValue::from(0.25).to_string(), "0.25");
        assert_eq!(StyleValue::from("auto").to_string(), "auto");
    }

    #[test]
    fn test_interpolate_lengths() {
        let from = StyleValue::from("0px");
        let to = StyleValue::from("100px");
        assert_eq!(from.interpolate(&to, 0.5), StyleValue::from("50px"));

        let from = StyleValue::Number(0.0);
        assert_eq!(from.interpolate(&to, 0.25), StyleValue::from("25px"));

        let from = StyleValue::Number(0.0);
        let to = StyleValue::Number(1.0);
        assert_eq!(from.interpolate(&to, 0.5), StyleValue::Number(0.5));
    }

    #[test]
    fn test_interpolate_holds_discrete_values() {
        let from = StyleValue::from("auto");
        let to = StyleValue::from("40px");
        assert_eq!(from.interpolate(&to, 0.5), StyleValue::from("auto"));
        assert_eq!(from.interpolate(&to, 1.0), StyleValue::from("40px"));

        let from = StyleValue::from("10em");
        assert_eq!(from.interpolate(&to, 0.5), StyleValue::from("10em"));
    }

    #[test]
    fn test_serde_untagged() {
        let map: StyleMap = serde_json::from_str(r#"{"opacity": 1, "height": "10px"}"#).unwrap();
        assert_eq!(map["opacity"], StyleValue::Number(1.0));
        assert_eq!(map["height"], StyleValue::from("10px"));
    }
}
