//! Cell-level parsing.
//!
//! Pure, total functions turning one cell (or a short run of cells) into a
//! [`FieldValue`]. Nothing here panics or errors on bad input: a cell that
//! does not fit its format comes back invalid.
//!
//! | Class | Rule |
//! |-------|------|
//! | number | keep `[0-9.,]` (a leading `-` is dropped), resolve separators |
//! | text | collapse line breaks to one space, trim, empty is `None` |
//! | name | lowercase then capitalize the first letter |
//! | enum | locale table lookup, unknown text is invalid |
//! | lists | `;` for authors, `[.,\s]+` for reference codes, 5-char tokens for LanguaL |
//! | volume/issue | `Vol. N, No M` or `N(M)` |
//! | pages | `N-M` |
//!
//! `-`, `N/A` and `NA` are "no value" sentinels and read as an empty cell.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FieldValue;
use crate::validation::is_valid_reference_code;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());
static REFERENCE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,\s]+").unwrap());
static LANGUAL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z0-9]{5}\b").unwrap());
static VOLUME_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^vol\.?\s*(\d+)\s*,?\s*(?:no|n°|nº|nro|num)\.?\s*(\d+)$").unwrap()
});
static VOLUME_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*\(\s*(\d+)\s*\)$").unwrap());
static PAGE_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s*[-–]\s*(\d+)$").unwrap());

// =============================================================================
// Sentinels
// =============================================================================

/// Trim a cell and blank out "no value" sentinels.
pub fn clean_cell(cell: &str) -> &str {
    let trimmed = cell.trim();
    let sentinel = trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("na")
        || (!trimmed.is_empty() && trimmed.chars().all(|c| matches!(c, '-' | '–' | '—')));
    if sentinel {
        ""
    } else {
        trimmed
    }
}

// =============================================================================
// Numbers
// =============================================================================

/// Parse a number from free-form cell text.
///
/// Only digits, `.` and `,` are kept, so a leading `-` never makes a value
/// negative. Separators: with both `.` and `,` present the last one is the
/// decimal mark; a single separator kind appearing once is the decimal
/// mark; appearing more than once it is a thousands separator.
pub fn parse_number_text(text: &str) -> Option<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    normalize_separators(&kept).parse().ok()
}

fn normalize_separators(text: &str) -> String {
    let dots = text.matches('.').count();
    let commas = text.matches(',').count();

    match (dots, commas) {
        (0, 0) | (1, 0) => text.to_string(),
        (_, 0) => text.replace('.', ""),
        (0, 1) => text.replace(',', "."),
        (0, _) => text.replace(',', ""),
        _ => {
            let last_dot = text.rfind('.');
            let last_comma = text.rfind(',');
            if last_comma > last_dot {
                text.replace('.', "").replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
    }
}

/// Decimal cell. Blank is valid with no value.
pub fn parse_decimal(cell: &str) -> FieldValue<f64> {
    let raw = clean_cell(cell);
    if raw.is_empty() {
        return FieldValue::empty();
    }
    match parse_number_text(raw) {
        Some(n) => FieldValue::valid(Some(n), raw),
        None => FieldValue::invalid(None, raw),
    }
}

/// Whole-number cell (years, volumes, pages, sample sizes).
pub fn parse_integer(cell: &str) -> FieldValue<i64> {
    let raw = clean_cell(cell);
    if raw.is_empty() {
        return FieldValue::empty();
    }
    match parse_number_text(raw) {
        Some(n) if n.fract() == 0.0 => FieldValue::valid(Some(n as i64), raw),
        _ => FieldValue::invalid(None, raw),
    }
}

// =============================================================================
// Text
// =============================================================================

/// Collapse runs of line breaks into one space and trim.
pub fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAKS.replace_all(text, " ").trim().to_string()
}

/// Free-text cell. Always valid; blank is `None`.
pub fn parse_text(cell: &str) -> FieldValue<String> {
    let raw = clean_cell(cell);
    let text = collapse_line_breaks(raw);
    let parsed = if text.is_empty() { None } else { Some(text) };
    FieldValue::valid(parsed, raw)
}

/// Several cells read as one text, one line per non-empty cell.
pub fn parse_lines(cells: &[&str]) -> FieldValue<String> {
    let joined = cells
        .iter()
        .map(|c| clean_cell(c))
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let parsed = if joined.is_empty() { None } else { Some(joined.clone()) };
    FieldValue::valid(parsed, joined)
}

/// Lowercase, then capitalize the first letter (`"SOLANUM tuberosum"` →
/// `"Solanum tuberosum"`).
pub fn capitalize_name(text: &str) -> String {
    let lower = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Locale-table cell. Blank is valid with no value; unknown text is invalid.
pub fn parse_enum<E>(cell: &str, from_text: impl Fn(&str) -> Option<E>) -> FieldValue<E> {
    let raw = clean_cell(cell);
    if raw.is_empty() {
        return FieldValue::empty();
    }
    match from_text(raw) {
        Some(value) => FieldValue::valid(Some(value), raw),
        None => FieldValue::invalid(None, raw),
    }
}

// =============================================================================
// Lists
// =============================================================================

/// Authors are separated by `;`.
pub fn split_authors(cell: &str) -> Vec<String> {
    clean_cell(cell)
        .split(';')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reference codes are separated by runs of `.`, `,` or whitespace.
pub fn split_reference_codes(cell: &str) -> Vec<String> {
    REFERENCE_SEPARATORS
        .split(clean_cell(cell))
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every standalone 5-character alphanumeric token, uppercased.
pub fn extract_langual_codes(cell: &str) -> Vec<String> {
    LANGUAL_TOKEN
        .find_iter(cell)
        .map(|m| m.as_str().to_uppercase())
        .collect()
}

/// Reference code cell: digits only.
pub fn parse_reference_code(text: &str) -> FieldValue<i64> {
    let raw = clean_cell(text);
    if raw.is_empty() {
        return FieldValue::empty();
    }
    if !is_valid_reference_code(raw) {
        return FieldValue::invalid(None, raw);
    }
    match raw.parse::<i64>() {
        Ok(code) => FieldValue::valid(Some(code), raw),
        Err(_) => FieldValue::invalid(None, raw),
    }
}

// =============================================================================
// Structured text
// =============================================================================

/// `"Vol. 12, No 3"` or `"12(3)"` → (volume, issue).
pub fn parse_volume_issue(cell: &str) -> (FieldValue<i64>, FieldValue<i64>) {
    let raw = clean_cell(cell);
    split_pair(raw, &[&*VOLUME_NUMBER, &*VOLUME_PAREN])
}

/// `"120-135"` → (first page, last page).
pub fn parse_page_range(cell: &str) -> (FieldValue<i64>, FieldValue<i64>) {
    let raw = clean_cell(cell);
    split_pair(raw, &[&*PAGE_RANGE])
}

fn split_pair(raw: &str, patterns: &[&Regex]) -> (FieldValue<i64>, FieldValue<i64>) {
    if raw.is_empty() {
        return (FieldValue::empty(), FieldValue::empty());
    }

    let captured = patterns.iter().find_map(|re| {
        let caps = re.captures(raw)?;
        let first = caps.get(1)?.as_str().parse::<i64>().ok()?;
        let second = caps.get(2)?.as_str().parse::<i64>().ok()?;
        Some((first, second))
    });

    match captured {
        Some((first, second)) => (
            FieldValue::valid(Some(first), raw),
            FieldValue::valid(Some(second), raw),
        ),
        None => (FieldValue::invalid(None, raw), FieldValue::invalid(None, raw)),
    }
}
