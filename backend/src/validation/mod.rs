//! Field predicates, sheet shape checks and snapshot document validation.
//!
//! Three layers, from cheapest to most global:
//!
//! - **Predicates** decide whether a parsed value satisfies its field rule.
//!   They are plain functions so each rule can be tested on its own.
//! - **Shape checks** run once per sheet before any record is assembled.
//!   They are the only batch-fatal checks in the pipeline.
//! - **Schema checks** validate the JSON snapshot document a
//!   [`MemoryStore`](crate::cache::MemoryStore) is built from (JSON Schema
//!   Draft 7, embedded at compile time from `schemas/`).
//!
//! # Example
//!
//! ```rust,ignore
//! use foodload::validation::{is_valid_food_code, is_ordered_range};
//!
//! assert!(is_valid_food_code("AB12CD34"));
//! assert!(!is_valid_food_code("AB12"));
//! assert!(is_ordered_range(Some(1.0), Some(2.0)));
//! ```

use serde_json::Value;
use std::ops::Range;

use crate::error::{SheetError, SheetResult};
use crate::parser::Grid;
use crate::transform::layout::{food_col, FOODS_MIN_COLUMNS, REFERENCES_MIN_COLUMNS};

// =============================================================================
// Field predicates
// =============================================================================

/// Food code: exactly 8 ASCII alphanumeric characters.
pub fn is_valid_food_code(code: &str) -> bool {
    code.len() == 8 && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Reference code: a non-empty run of digits.
pub fn is_valid_reference_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit())
}

/// Magnitudes (average, deviation, min, max) cannot be negative.
pub fn is_non_negative(value: &f64) -> bool {
    *value >= 0.0
}

/// Sample sizes count analysed samples.
pub fn is_positive_count(value: &i64) -> bool {
    *value > 0
}

/// `low ≤ high` when both bounds are present.
pub fn is_ordered_range<T: PartialOrd>(low: Option<T>, high: Option<T>) -> bool {
    match (low, high) {
        (Some(low), Some(high)) => low <= high,
        _ => true,
    }
}

// =============================================================================
// Sheet shape
// =============================================================================

/// Check the foods sheet header and return the nutrient column range.
///
/// The header must be present and at least [`FOODS_MIN_COLUMNS`] wide.
/// Nutrient columns run from [`food_col::FIRST_NUTRIENT`] to the last
/// non-blank header cell.
pub fn check_foods_sheet<G: Grid + ?Sized>(grid: &G) -> SheetResult<Range<usize>> {
    let width = check_header(grid, "foods", FOODS_MIN_COLUMNS)?;
    Ok(food_col::FIRST_NUTRIENT..width)
}

/// Check the references sheet header.
pub fn check_references_sheet<G: Grid + ?Sized>(grid: &G) -> SheetResult<()> {
    check_header(grid, "references", REFERENCES_MIN_COLUMNS).map(|_| ())
}

fn check_header<G: Grid + ?Sized>(
    grid: &G,
    sheet: &'static str,
    required: usize,
) -> SheetResult<usize> {
    let width = grid.header_width();
    if grid.row_count() == 0 || width == 0 {
        return Err(SheetError::MissingHeader { sheet });
    }
    if width < required {
        return Err(SheetError::TooFewColumns {
            sheet,
            found: width,
            required,
        });
    }
    Ok(width)
}

// =============================================================================
// JSON Schema
// =============================================================================

/// Validate a JSON value against a JSON schema.
///
/// Returns every violation, not just the first.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn snapshot_schema() -> Value {
    serde_json::from_str(include_str!("../../schemas/lookup-snapshot.json"))
        .expect("Invalid embedded schema")
}

/// Validate a lookup snapshot document.
pub fn validate_snapshot_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&snapshot_schema(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SheetGrid;
    use serde_json::json;

    fn header(width: usize) -> SheetGrid {
        let labels: Vec<String> = (0..width).map(|i| format!("col{}", i)).collect();
        SheetGrid::new(vec![labels])
    }

    #[test]
    fn test_food_code() {
        assert!(is_valid_food_code("AB12CD34"));
        assert!(is_valid_food_code("00000001"));
        assert!(!is_valid_food_code("AB12CD3"));
        assert!(!is_valid_food_code("AB12CD345"));
        assert!(!is_valid_food_code("AB12-D34"));
        assert!(!is_valid_food_code(""));
    }

    #[test]
    fn test_reference_code() {
        assert!(is_valid_reference_code("42"));
        assert!(!is_valid_reference_code("4a"));
        assert!(!is_valid_reference_code(""));
    }

    #[test]
    fn test_magnitudes() {
        assert!(is_non_negative(&0.0));
        assert!(!is_non_negative(&-0.5));
        assert!(is_positive_count(&1));
        assert!(!is_positive_count(&0));
    }

    #[test]
    fn test_ordered_range() {
        assert!(is_ordered_range(Some(1.0), Some(1.0)));
        assert!(!is_ordered_range(Some(3.0), Some(1.0)));
        assert!(is_ordered_range(None, Some(1.0)));
        assert!(is_ordered_range::<i64>(None, None));
    }

    #[test]
    fn test_foods_sheet_nutrient_range() {
        let range = check_foods_sheet(&header(70)).unwrap();
        assert_eq!(range, 19..70);
    }

    #[test]
    fn test_foods_sheet_too_narrow() {
        let err = check_foods_sheet(&header(30)).unwrap_err();
        assert_eq!(
            err,
            SheetError::TooFewColumns {
                sheet: "foods",
                found: 30,
                required: 64
            }
        );
    }

    #[test]
    fn test_missing_header() {
        let empty = SheetGrid::default();
        assert_eq!(
            check_references_sheet(&empty).unwrap_err(),
            SheetError::MissingHeader { sheet: "references" }
        );

        let blank_header = SheetGrid::from_rows(&[vec!["", ""], vec!["1", "Libro"]]);
        assert!(check_references_sheet(&blank_header).is_err());
    }

    #[test]
    fn test_references_sheet() {
        assert!(check_references_sheet(&header(11)).is_ok());
        assert!(check_references_sheet(&header(10)).is_err());
    }

    #[test]
    fn test_valid_snapshot_document() {
        let doc = json!({
            "groups": [{ "code": "A", "id": 1 }],
            "nutrients": [{ "name": "Energía", "id": 208 }],
            "foods": [{ "code": "AB12CD34", "groupId": 1, "typeId": 2 }],
            "references": [{ "code": 12, "title": "Tabla", "type": "BOOK" }]
        });
        assert!(validate_snapshot_document(&doc).is_ok());
    }

    #[test]
    fn test_invalid_snapshot_document() {
        let doc = json!({
            "groups": [{ "code": "A" }],
            "references": [{ "code": "12", "title": "Tabla", "type": "NOVEL" }]
        });
        let errors = validate_snapshot_document(&doc).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
