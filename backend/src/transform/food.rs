//! Food and nutrient measurement assembly.
//!
//! Turns one [`FoodBlock`] into a [`Food`]: every cell is parsed with the
//! functions in [`super::fields`], checked with the predicates in
//! [`crate::validation`] and resolved against [`FoodsData`]. Nothing is
//! compared with stored data here; see [`super::diff`].

use std::ops::Range;

use crate::cache::{FoodsData, LookupTable};
use crate::error::{SheetError, SheetResult};
use crate::models::{DataType, FieldValue, Food, Localized, NutrientMeasurement, RecordStatus};
use crate::parser::Grid;
use crate::validation::{
    is_non_negative, is_ordered_range, is_positive_count, is_valid_food_code,
};

use super::blocks::FoodBlock;
use super::fields::{
    capitalize_name, clean_cell, extract_langual_codes, parse_decimal, parse_enum, parse_integer,
    parse_lines, parse_reference_code, parse_text, split_reference_codes,
};
use super::layout::{food_col, language_row, measurement_row};

/// A nutrient column whose header resolved to a nutrient id.
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientColumn {
    pub index: usize,
    pub nutrient_id: i64,
    pub label: String,
}

/// Resolve the header label of every nutrient column.
///
/// Blank header cells inside the range are skipped; a label that names no
/// known nutrient rejects the sheet.
pub fn resolve_nutrient_columns<G: Grid + ?Sized>(
    grid: &G,
    columns: Range<usize>,
    nutrients: &LookupTable,
) -> SheetResult<Vec<NutrientColumn>> {
    let mut resolved = Vec::with_capacity(columns.len());

    for index in columns {
        let label = grid.cell(0, index);
        if label.is_empty() {
            continue;
        }
        let nutrient_id = nutrients.get(label).ok_or_else(|| SheetError::UnknownNutrient {
            column: index,
            label: label.to_string(),
        })?;
        resolved.push(NutrientColumn {
            index,
            nutrient_id,
            label: label.to_string(),
        });
    }

    Ok(resolved)
}

// =============================================================================
// Food
// =============================================================================

/// Build a food from its block. Flags are left for the diff pass.
pub fn assemble_food<G: Grid + ?Sized>(
    block: &FoodBlock<'_, G>,
    columns: &[NutrientColumn],
    data: &FoodsData,
) -> Food {
    let localized = |col: usize, require_es: bool| {
        let es = parse_text(block.cell(language_row::ES, col));
        Localized::new(
            Some(if require_es { es.require() } else { es }),
            Some(parse_text(block.cell(language_row::EN, col))),
            Some(parse_text(block.cell(language_row::PT, col))),
        )
    };

    let langual_text = block.column(food_col::LANGUAL).join(" ");
    let mut langual_tokens = extract_langual_codes(&langual_text);
    dedup_in_order(&mut langual_tokens);

    Food {
        row: block.start,
        code: food_code(block.code()),
        common_name: localized(food_col::COMMON_NAME, true),
        ingredients: localized(food_col::INGREDIENTS, false),
        scientific_name: Some(resolve_or_new(
            block.cell(0, food_col::SCIENTIFIC_NAME),
            &data.scientific_names,
        )),
        subspecies: Some(resolve_or_new(
            block.cell(0, food_col::SUBSPECIES),
            &data.subspecies,
        )),
        strain: Some(parse_text(block.cell(0, food_col::STRAIN))),
        brand: Some(parse_text(block.cell(0, food_col::BRAND))),
        observation: Some(parse_lines(&block.column(food_col::OBSERVATION))),
        group: resolve_existing(block.cell(0, food_col::GROUP), &data.groups).require(),
        food_type: resolve_existing(block.cell(0, food_col::TYPE), &data.types).require(),
        langual_codes: langual_tokens
            .iter()
            .map(|token| resolve_existing(token, &data.langual_codes))
            .collect(),
        nutrient_measurements: columns
            .iter()
            .filter_map(|column| assemble_measurement(block, column, data))
            .collect(),
        flags: RecordStatus::default(),
    }
}

fn food_code(raw: &str) -> FieldValue<String> {
    if is_valid_food_code(raw) {
        FieldValue::valid(Some(raw.to_uppercase()), raw)
    } else {
        FieldValue::invalid(None, raw)
    }
}

/// Foreign key that must already exist. Blank is valid with no value.
pub fn resolve_existing(cell: &str, table: &LookupTable) -> FieldValue<i64> {
    let raw = clean_cell(cell);
    if raw.is_empty() {
        return FieldValue::empty();
    }
    match table.get(raw) {
        Some(id) => FieldValue::valid(Some(id), raw),
        None => FieldValue::invalid(None, raw),
    }
}

/// Foreign key that may be created: unknown names come back `NEW`.
pub fn resolve_or_new(cell: &str, table: &LookupTable) -> FieldValue<i64> {
    let raw = clean_cell(cell);
    if raw.is_empty() {
        return FieldValue::empty();
    }
    match table.get(&capitalize_name(raw)) {
        Some(id) => FieldValue::valid(Some(id), raw),
        None => FieldValue::valid(None, raw).mark_new(),
    }
}

fn dedup_in_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

// =============================================================================
// Nutrient measurement
// =============================================================================

/// Build the measurement of one nutrient column, or `None` when every
/// cell of the column is empty.
pub fn assemble_measurement<G: Grid + ?Sized>(
    block: &FoodBlock<'_, G>,
    column: &NutrientColumn,
    data: &FoodsData,
) -> Option<NutrientMeasurement> {
    let cells = block.column(column.index);
    if cells.iter().all(|c| clean_cell(c).is_empty()) {
        return None;
    }

    let magnitude = |row: usize| parse_decimal(cells[row]).check(is_non_negative);

    let min = magnitude(measurement_row::MIN);
    let max = magnitude(measurement_row::MAX);
    let ordered = is_ordered_range(min.parsed, max.parsed);

    Some(NutrientMeasurement {
        nutrient_id: column.nutrient_id,
        average: magnitude(measurement_row::AVERAGE).require(),
        deviation: Some(magnitude(measurement_row::DEVIATION)),
        min: Some(min.validate(ordered)),
        max: Some(max.validate(ordered)),
        sample_size: Some(parse_integer(cells[measurement_row::SAMPLE_SIZE]).check(is_positive_count)),
        reference_codes: split_reference_codes(cells[measurement_row::REFERENCE_CODES])
            .iter()
            .map(|code| {
                parse_reference_code(code).check(|code| data.reference_codes.contains(code))
            })
            .collect(),
        data_type: Some(parse_enum(cells[measurement_row::DATA_TYPE], DataType::from_text)),
        flags: RecordStatus::default(),
    })
}
