//! Text input handling for odds and stake fields
//!
//! Each line keeps a raw text mirror next to its numeric value so partially
//! typed entries ("2.", "0,5") display as typed. Both are produced by
//! [`format_input`] from the same keystroke, and the text is re-derived from
//! the number with [`display_number`] when the field loses focus.

/// Maximum decimals kept while typing
const MAX_DECIMALS: usize = 2;

/// Result of formatting one raw text entry
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedInput {
    pub text: String,
    pub value: f64,
}

/// Format raw text and parse it to a number
///
/// - `,` is accepted as decimal separator and normalised to `.`
/// - anything that is not a digit or the first separator is dropped
/// - at most 2 decimals are kept
/// - with `auto_punctuate`, a digits-only entry of 2+ digits gets a decimal
///   point after the first digit, so typing `205` gives odds `2.05`
///
/// # Examples
/// ```
/// use surebet::core::input::format_input;
/// let f = format_input("2,5", false);
/// assert_eq!(f.text, "2.5");
/// assert!((f.value - 2.5).abs() < 1e-12);
///
/// let f = format_input("205", true);
/// assert_eq!(f.text, "2.05");
/// ```
pub fn format_input(raw: &str, auto_punctuate: bool) -> FormattedInput {
    let mut text = String::with_capacity(raw.len());
    let mut seen_separator = false;
    let mut decimals = 0usize;

    for c in raw.trim().chars() {
        match c {
            '0'..='9' => {
                if seen_separator {
                    if decimals == MAX_DECIMALS {
                        continue;
                    }
                    decimals += 1;
                }
                text.push(c);
            }
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                if text.is_empty() {
                    text.push('0');
                }
                text.push('.');
            }
            _ => {}
        }
    }

    if auto_punctuate && !seen_separator && text.len() >= 2 {
        let (int_part, frac_part) = text.split_at(1);
        let frac: String = frac_part.chars().take(MAX_DECIMALS).collect();
        text = format!("{}.{}", int_part, frac);
    }

    let value = parse_lenient(&text);
    FormattedInput { text, value }
}

/// Parse a number leniently: `,` or `.` separator, surrounding blanks
/// ignored; empty, unparsable or non-finite input yields 0
pub fn parse_lenient(raw: &str) -> f64 {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return 0.0;
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Text mirror for a settled numeric value (empty for 0)
pub fn display_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        String::new()
    } else {
        format!("{:.2}", value)
    }
}
