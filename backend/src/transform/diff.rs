//! Field-by-field comparison with stored records.
//!
//! A record whose identity is not stored is `NEW`: its fields are only
//! audited for validity. A stored record is compared field by field:
//!
//! | Field state | Result | Record |
//! |-------------|--------|--------|
//! | invalid | kept | invalid |
//! | `NEW` (unknown name to create) | kept | updated |
//! | differs from stored | `UPDATED`, stored value in `old` | updated |
//! | equal, optional, left blank | dropped | - |
//! | equal otherwise | kept | - |
//!
//! Link lists (LanguaL codes, reference codes, authors) are additive:
//! elements the stored record does not have are flagged `NEW`. Nothing is
//! ever reported as removed.
//!
//! Every step returns its field together with an [`Outcome`]; callers fold
//! outcomes into the record status.

use crate::cache::{FoodsData, ReferencesData};
use crate::models::{
    FieldValue, Food, FoodSnapshot, Localized, MeasurementSnapshot, NutrientMeasurement,
    RecordStatus, Reference, ReferenceSnapshot,
};

// =============================================================================
// Outcome
// =============================================================================

/// What one diff step contributes to its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub valid: bool,
    pub updated: bool,
}

impl Default for Outcome {
    fn default() -> Self {
        Self::UNCHANGED
    }
}

impl Outcome {
    pub const UNCHANGED: Outcome = Outcome {
        valid: true,
        updated: false,
    };
    pub const INVALID: Outcome = Outcome {
        valid: false,
        updated: false,
    };
    pub const UPDATED: Outcome = Outcome {
        valid: true,
        updated: true,
    };

    /// Combine two outcomes: valid only if both are, updated if either is.
    pub fn merge(self, other: Outcome) -> Outcome {
        Outcome {
            valid: self.valid && other.valid,
            updated: self.updated || other.updated,
        }
    }

    /// Merge a step's outcome and hand back its field.
    pub fn fold<F>(&mut self, (field, outcome): (F, Outcome)) -> F {
        *self = self.merge(outcome);
        field
    }

    fn status(self, new: bool) -> RecordStatus {
        RecordStatus {
            valid: self.valid,
            new,
            updated: self.updated,
        }
    }
}

// =============================================================================
// Field steps
// =============================================================================

/// Compare a required field with its stored value.
pub fn diff_required<T: PartialEq + Clone>(
    field: FieldValue<T>,
    stored: Option<&T>,
) -> (FieldValue<T>, Outcome) {
    if !field.is_valid() {
        return (field, Outcome::INVALID);
    }
    if field.is_new() {
        return (field, Outcome::UPDATED);
    }
    if field.parsed.as_ref() != stored {
        return (field.mark_updated(stored.cloned()), Outcome::UPDATED);
    }
    (field, Outcome::UNCHANGED)
}

/// Compare an optional field with its stored value; equal blank fields are
/// dropped.
pub fn diff_optional<T: PartialEq + Clone>(
    field: Option<FieldValue<T>>,
    stored: Option<&T>,
) -> (Option<FieldValue<T>>, Outcome) {
    let Some(field) = field else {
        return (None, Outcome::UNCHANGED);
    };
    let blank = field.is_blank();
    let (field, outcome) = diff_required(field, stored);
    if blank && outcome == Outcome::UNCHANGED {
        return (None, outcome);
    }
    (Some(field), outcome)
}

/// Flag links the stored record does not have as `NEW`.
pub fn diff_links(links: Vec<FieldValue<i64>>, stored: &[i64]) -> (Vec<FieldValue<i64>>, Outcome) {
    let mut outcome = Outcome::UNCHANGED;
    let links = links
        .into_iter()
        .map(|link| outcome.fold(diff_link(link, stored)))
        .collect();
    (links, outcome)
}

fn diff_link(link: FieldValue<i64>, stored: &[i64]) -> (FieldValue<i64>, Outcome) {
    if !link.is_valid() {
        return (link, Outcome::INVALID);
    }
    if link.is_new() {
        return (link, Outcome::UPDATED);
    }
    match link.parsed {
        Some(id) if !stored.contains(&id) => (link.mark_new(), Outcome::UPDATED),
        _ => (link, Outcome::UNCHANGED),
    }
}

fn diff_localized(
    fields: Localized<FieldValue<String>>,
    stored: &Localized<String>,
    require_es: bool,
) -> (Localized<FieldValue<String>>, Outcome) {
    let mut outcome = Outcome::UNCHANGED;
    let es = if require_es {
        fields
            .es
            .map(|es| outcome.fold(diff_required(es, stored.es.as_ref())))
    } else {
        outcome.fold(diff_optional(fields.es, stored.es.as_ref()))
    };
    let en = outcome.fold(diff_optional(fields.en, stored.en.as_ref()));
    let pt = outcome.fold(diff_optional(fields.pt, stored.pt.as_ref()));
    (Localized::new(es, en, pt), outcome)
}

// =============================================================================
// Validity audit (new records)
// =============================================================================

fn all_valid<'a, T: 'a>(fields: impl IntoIterator<Item = &'a FieldValue<T>>) -> bool {
    fields.into_iter().all(FieldValue::is_valid)
}

fn localized_valid(fields: &Localized<FieldValue<String>>) -> bool {
    all_valid([&fields.es, &fields.en, &fields.pt].into_iter().flatten())
}

fn food_fields_valid(food: &Food) -> bool {
    food.code.is_valid()
        && localized_valid(&food.common_name)
        && localized_valid(&food.ingredients)
        && all_valid([&food.scientific_name, &food.subspecies].into_iter().flatten())
        && all_valid([&food.strain, &food.brand, &food.observation].into_iter().flatten())
        && food.group.is_valid()
        && food.food_type.is_valid()
        && all_valid(&food.langual_codes)
}

fn measurement_valid(m: &NutrientMeasurement) -> bool {
    m.average.is_valid()
        && all_valid([&m.deviation, &m.min, &m.max].into_iter().flatten())
        && all_valid(&m.sample_size)
        && all_valid(&m.reference_codes)
        && all_valid(&m.data_type)
}

fn reference_valid(r: &Reference) -> bool {
    let numbers = [
        &r.year,
        &r.volume,
        &r.issue,
        &r.volume_year,
        &r.page_start,
        &r.page_end,
        &r.journal,
        &r.city,
    ];
    r.code.is_valid()
        && r.title.is_valid()
        && r.reference_type.is_valid()
        && all_valid(&r.authors)
        && all_valid(numbers.into_iter().flatten())
        && all_valid(&r.other)
}

// =============================================================================
// Foods
// =============================================================================

/// Classify a food against the stored foods.
pub fn diff_food(food: Food, data: &FoodsData) -> Food {
    let snapshot = food
        .code()
        .filter(|code| data.is_existing_food(code))
        .and_then(|code| data.snapshot(code));

    match snapshot {
        Some(snapshot) => diff_existing_food(food, snapshot),
        None => audit_new_food(food),
    }
}

fn audit_new_food(mut food: Food) -> Food {
    let mut valid = food_fields_valid(&food);
    for m in &mut food.nutrient_measurements {
        m.flags = RecordStatus {
            valid: measurement_valid(m),
            new: true,
            updated: false,
        };
        valid &= m.flags.valid;
    }
    food.flags = RecordStatus {
        valid,
        new: true,
        updated: false,
    };
    food
}

fn diff_existing_food(food: Food, snapshot: &FoodSnapshot) -> Food {
    let Food {
        row,
        code,
        common_name,
        ingredients,
        scientific_name,
        subspecies,
        strain,
        brand,
        observation,
        group,
        food_type,
        langual_codes,
        nutrient_measurements,
        ..
    } = food;

    let mut outcome = Outcome::UNCHANGED;

    let code = outcome.fold(diff_required(code, Some(&snapshot.code)));
    let common_name = outcome.fold(diff_localized(common_name, &snapshot.common_name, true));
    let ingredients = outcome.fold(diff_localized(ingredients, &snapshot.ingredients, false));
    let scientific_name = outcome.fold(diff_optional(
        scientific_name,
        snapshot.scientific_name_id.as_ref(),
    ));
    let subspecies = outcome.fold(diff_optional(subspecies, snapshot.subspecies_id.as_ref()));
    let strain = outcome.fold(diff_optional(strain, snapshot.strain.as_ref()));
    let brand = outcome.fold(diff_optional(brand, snapshot.brand.as_ref()));
    let observation = outcome.fold(diff_optional(observation, snapshot.observation.as_ref()));
    let group = outcome.fold(diff_required(group, Some(&snapshot.group_id)));
    let food_type = outcome.fold(diff_required(food_type, Some(&snapshot.type_id)));
    let langual_codes = outcome.fold(diff_links(langual_codes, &snapshot.langual_ids));

    let nutrient_measurements = nutrient_measurements
        .into_iter()
        .map(|m| {
            let m = match snapshot.measurement(m.nutrient_id) {
                Some(stored) => diff_measurement(m, stored),
                None => audit_new_measurement(m),
            };
            outcome = outcome.merge(Outcome {
                valid: m.flags.valid,
                updated: m.flags.updated || m.flags.new,
            });
            m
        })
        .collect();

    Food {
        row,
        code,
        common_name,
        ingredients,
        scientific_name,
        subspecies,
        strain,
        brand,
        observation,
        group,
        food_type,
        langual_codes,
        nutrient_measurements,
        flags: outcome.status(false),
    }
}

fn audit_new_measurement(mut m: NutrientMeasurement) -> NutrientMeasurement {
    m.flags = RecordStatus {
        valid: measurement_valid(&m),
        new: true,
        updated: false,
    };
    m
}

/// Compare a measurement with the stored measurement of the same nutrient.
pub fn diff_measurement(m: NutrientMeasurement, stored: &MeasurementSnapshot) -> NutrientMeasurement {
    let mut outcome = Outcome::UNCHANGED;

    let average = outcome.fold(diff_required(m.average, Some(&stored.average)));
    let deviation = outcome.fold(diff_optional(m.deviation, stored.deviation.as_ref()));
    let min = outcome.fold(diff_optional(m.min, stored.min.as_ref()));
    let max = outcome.fold(diff_optional(m.max, stored.max.as_ref()));
    let sample_size = outcome.fold(diff_optional(m.sample_size, stored.sample_size.as_ref()));
    let reference_codes = outcome.fold(diff_links(m.reference_codes, &stored.reference_codes));
    let data_type = outcome.fold(diff_optional(m.data_type, stored.data_type.as_ref()));

    NutrientMeasurement {
        nutrient_id: m.nutrient_id,
        average,
        deviation,
        min,
        max,
        sample_size,
        reference_codes,
        data_type,
        flags: outcome.status(false),
    }
}

// =============================================================================
// References
// =============================================================================

/// Classify a reference against the stored references.
pub fn diff_reference(reference: Reference, data: &ReferencesData) -> Reference {
    let snapshot = reference
        .code()
        .filter(|&code| data.is_existing_reference(code))
        .and_then(|code| data.snapshot(code));

    match snapshot {
        Some(snapshot) => diff_existing_reference(reference, snapshot),
        None => {
            let valid = reference_valid(&reference);
            Reference {
                flags: RecordStatus {
                    valid,
                    new: true,
                    updated: false,
                },
                ..reference
            }
        }
    }
}

fn diff_existing_reference(r: Reference, stored: &ReferenceSnapshot) -> Reference {
    let mut outcome = Outcome::UNCHANGED;

    let code = outcome.fold(diff_required(r.code, Some(&stored.code)));
    let title = outcome.fold(diff_required(r.title, Some(&stored.title)));
    let reference_type = outcome.fold(diff_required(r.reference_type, Some(&stored.reference_type)));
    let authors = outcome.fold(diff_links(r.authors, &stored.author_ids));
    let year = outcome.fold(diff_optional(r.year, stored.year.as_ref()));
    let volume = outcome.fold(diff_optional(r.volume, stored.volume.as_ref()));
    let issue = outcome.fold(diff_optional(r.issue, stored.issue.as_ref()));
    let volume_year = outcome.fold(diff_optional(r.volume_year, stored.volume_year.as_ref()));
    let page_start = outcome.fold(diff_optional(r.page_start, stored.page_start.as_ref()));
    let page_end = outcome.fold(diff_optional(r.page_end, stored.page_end.as_ref()));
    let journal = outcome.fold(diff_optional(r.journal, stored.journal_id.as_ref()));
    let city = outcome.fold(diff_optional(r.city, stored.city_id.as_ref()));
    let other = outcome.fold(diff_optional(r.other, stored.other.as_ref()));

    Reference {
        row: r.row,
        code,
        title,
        reference_type,
        authors,
        year,
        volume,
        issue,
        volume_year,
        page_start,
        page_end,
        journal,
        city,
        other,
        flags: outcome.status(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataType, ReferenceType, UPDATED};
    use crate::parser::SheetGrid;
    use crate::transform::blocks::{food_blocks, reference_rows};
    use crate::transform::fixtures::{foods_data, foods_sheet, references_data, references_sheet};
    use crate::transform::food::{assemble_food, NutrientColumn};
    use crate::transform::reference::assemble_reference;
    use serde_json::Value;

    fn apple_grid(extra: &[(usize, usize, &str)]) -> SheetGrid {
        let mut fill = vec![
            (1, 0, "AB12CD34"),
            (1, 1, "Manzana"),
            (1, 3, "Malus domestica"),
            (1, 8, "A"),
            (1, 9, "T"),
            (1, 10, "A0101"),
            (1, 19, "12.5"),
            (3, 19, "10"),
            (4, 19, "14"),
            (5, 19, "3"),
            (6, 19, "12"),
            (7, 19, "Analítico"),
        ];
        fill.extend_from_slice(extra);
        foods_sheet(8, &fill)
    }

    fn apple_snapshot() -> FoodSnapshot {
        FoodSnapshot {
            code: "AB12CD34".into(),
            common_name: Localized::new(Some("Manzana".into()), None, None),
            scientific_name_id: Some(30),
            group_id: 1,
            type_id: 2,
            langual_ids: vec![5],
            measurements: vec![MeasurementSnapshot {
                nutrient_id: 203,
                average: 12.5,
                min: Some(10.0),
                max: Some(14.0),
                sample_size: Some(3),
                reference_codes: vec![12],
                data_type: Some(DataType::Analytic),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn data_with(snapshot: Option<FoodSnapshot>) -> FoodsData {
        let mut data = foods_data();
        if let Some(snapshot) = snapshot {
            data.food_codes.insert(snapshot.code.clone());
            data.foods.insert(snapshot.code.clone(), snapshot);
        }
        data
    }

    fn check(grid: &SheetGrid, data: &FoodsData) -> Food {
        let columns = vec![NutrientColumn {
            index: 19,
            nutrient_id: 203,
            label: "Proteína".into(),
        }];
        let block = food_blocks(grid).next().unwrap();
        diff_food(assemble_food(&block, &columns, data), data)
    }

    /// Count serialized fields carrying the given flag bit.
    fn count_flag(value: &Value, bit: u64) -> usize {
        match value {
            Value::Object(map) => {
                let own = map.contains_key("raw")
                    && map["flags"].as_u64().is_some_and(|f| f & bit != 0);
                usize::from(own) + map.values().map(|v| count_flag(v, bit)).sum::<usize>()
            }
            Value::Array(items) => items.iter().map(|v| count_flag(v, bit)).sum(),
            _ => 0,
        }
    }

    fn updated_fields(food: &Food) -> usize {
        count_flag(&serde_json::to_value(food).unwrap(), UPDATED as u64)
    }

    #[test]
    fn test_outcome_merge() {
        let merged = Outcome::UNCHANGED.merge(Outcome::UPDATED).merge(Outcome::INVALID);
        assert_eq!(merged, Outcome { valid: false, updated: true });
    }

    #[test]
    fn test_required_field_steps() {
        let (field, outcome) = diff_required(FieldValue::valid(Some(2_i64), "2"), Some(&1));
        assert_eq!(outcome, Outcome::UPDATED);
        assert_eq!(field.old(), Some(&Some(1)));

        let (field, outcome) = diff_required(FieldValue::valid(Some(1_i64), "1"), Some(&1));
        assert_eq!(outcome, Outcome::UNCHANGED);
        assert!(!field.is_updated());

        let (_, outcome) = diff_required(FieldValue::<i64>::invalid(None, "x"), Some(&1));
        assert_eq!(outcome, Outcome::INVALID);
    }

    #[test]
    fn test_optional_field_steps() {
        let (field, outcome) = diff_optional(Some(FieldValue::<f64>::empty()), None);
        assert!(field.is_none());
        assert_eq!(outcome, Outcome::UNCHANGED);

        // blank against a stored value clears it
        let (field, outcome) = diff_optional(Some(FieldValue::<f64>::empty()), Some(&0.4));
        assert_eq!(outcome, Outcome::UPDATED);
        assert_eq!(field.unwrap().old(), Some(&Some(0.4)));

        let (field, _) = diff_optional(Some(FieldValue::valid(Some(0.4), "0.4")), Some(&0.4));
        assert!(field.is_some());
    }

    #[test]
    fn test_new_food_skips_diff() {
        let food = check(&apple_grid(&[]), &data_with(None));

        assert!(food.flags.new);
        assert!(food.flags.valid);
        assert!(!food.flags.updated);
        assert_eq!(updated_fields(&food), 0);

        let m = &food.nutrient_measurements[0];
        assert!(m.flags.new && m.flags.valid);
        assert!(food.brand.is_some());
    }

    #[test]
    fn test_unchanged_food_is_idempotent() {
        let food = check(&apple_grid(&[]), &data_with(Some(apple_snapshot())));

        assert!(!food.flags.new);
        assert!(food.flags.valid);
        assert!(!food.flags.updated);
        assert_eq!(updated_fields(&food), 0);
        assert_eq!(food.flags.bits(), 1);
    }

    #[test]
    fn test_single_field_update() {
        let mut snapshot = apple_snapshot();
        snapshot.group_id = 3;

        let food = check(&apple_grid(&[]), &data_with(Some(snapshot)));

        assert!(food.flags.updated && food.flags.valid);
        assert!(food.group.is_updated());
        assert_eq!(food.group.old(), Some(&Some(3)));
        assert_eq!(updated_fields(&food), 1);
    }

    #[test]
    fn test_rerun_against_accepted_values() {
        let mut snapshot = apple_snapshot();
        snapshot.group_id = 3;
        snapshot.measurements[0].average = 11.0;
        let first = check(&apple_grid(&[]), &data_with(Some(snapshot.clone())));
        assert_eq!(updated_fields(&first), 2);

        snapshot.group_id = first.group.parsed.unwrap();
        snapshot.measurements[0].average = first.nutrient_measurements[0].average.parsed.unwrap();
        let second = check(&apple_grid(&[]), &data_with(Some(snapshot)));
        assert_eq!(updated_fields(&second), 0);
    }

    #[test]
    fn test_blank_unchanged_optional_fields_are_pruned() {
        let food = check(&apple_grid(&[]), &data_with(Some(apple_snapshot())));

        assert!(food.brand.is_none());
        assert!(food.strain.is_none());
        assert!(food.common_name.en.is_none());
        assert!(food.common_name.es.is_some());
        assert!(food.scientific_name.is_some());

        let m = &food.nutrient_measurements[0];
        assert!(m.deviation.is_none());
        assert!(m.min.is_some());

        let json = serde_json::to_value(&food).unwrap();
        assert!(json.get("brand").is_none());
    }

    #[test]
    fn test_new_langual_links() {
        let food = check(
            &apple_grid(&[(1, 10, "A0101 A0102")]),
            &data_with(Some(apple_snapshot())),
        );

        assert!(!food.langual_codes[0].is_new());
        assert!(food.langual_codes[1].is_new());
        assert_eq!(food.langual_codes[1].parsed, Some(6));
        assert!(food.flags.updated);
    }

    #[test]
    fn test_invalid_field_keeps_everything_else() {
        let food = check(
            &apple_grid(&[(1, 9, "Q"), (1, 6, "Marca")]),
            &data_with(Some(apple_snapshot())),
        );

        assert!(!food.flags.valid);
        assert!(!food.food_type.is_valid());
        assert!(food.brand.as_ref().unwrap().is_updated());
        assert!(food.flags.updated);
    }

    #[test]
    fn test_measurement_without_stored_nutrient() {
        let mut snapshot = apple_snapshot();
        snapshot.measurements.clear();

        let food = check(&apple_grid(&[]), &data_with(Some(snapshot)));

        assert!(food.nutrient_measurements[0].flags.new);
        assert!(food.flags.updated);
        assert!(!food.flags.new);
    }

    #[test]
    fn test_measurement_update() {
        let mut snapshot = apple_snapshot();
        snapshot.measurements[0].reference_codes = vec![];
        snapshot.measurements[0].deviation = Some(0.4);

        let food = check(&apple_grid(&[]), &data_with(Some(snapshot)));
        let m = &food.nutrient_measurements[0];

        assert!(m.reference_codes[0].is_new());
        assert_eq!(m.deviation.as_ref().unwrap().old(), Some(&Some(0.4)));
        assert!(m.flags.updated && !m.flags.new);
        assert!(food.flags.updated);
    }

    fn stored_reference() -> ReferenceSnapshot {
        ReferenceSnapshot {
            code: 12,
            title: "Composición de frutas".into(),
            reference_type: ReferenceType::Article,
            author_ids: vec![7],
            year: Some(2019),
            volume: Some(69),
            issue: Some(2),
            volume_year: None,
            page_start: Some(120),
            page_end: Some(135),
            journal_id: Some(9),
            city_id: None,
            other: None,
        }
    }

    fn check_reference(row: [&str; 11], stored: Option<ReferenceSnapshot>) -> Reference {
        let mut data = references_data();
        if let Some(stored) = stored {
            data.reference_codes.insert(stored.code);
            data.references.insert(stored.code, stored);
        }
        let grid = references_sheet(&[row]);
        let row = reference_rows(&grid).next().unwrap();
        diff_reference(assemble_reference(&row, &data), &data)
    }

    const ARTICLE: [&str; 11] = [
        "12",
        "Revista",
        "Pérez J",
        "Composición de frutas",
        "",
        "2019",
        "",
        "Archivos Latinoamericanos de Nutrición",
        "69(2)",
        "",
        "120-135",
    ];

    #[test]
    fn test_unchanged_reference() {
        let reference = check_reference(ARTICLE, Some(stored_reference()));

        assert_eq!(reference.flags.bits(), 1);
        assert!(reference.city.is_none());
        assert!(reference.other.is_none());
        assert!(reference.journal.is_some());
    }

    #[test]
    fn test_reference_updates() {
        let mut row = ARTICLE;
        row[2] = "Pérez J; Autor Nuevo";
        row[5] = "2020";

        let reference = check_reference(row, Some(stored_reference()));

        assert!(reference.flags.updated);
        assert!(reference.authors[1].is_new());
        assert_eq!(reference.year.as_ref().unwrap().old(), Some(&Some(2019)));
        assert!(!reference.title.is_updated());
    }

    #[test]
    fn test_new_reference() {
        let reference = check_reference(ARTICLE, None);

        assert!(reference.flags.new && reference.flags.valid && !reference.flags.updated);
        assert_eq!(reference.flags.bits(), 3);
    }
}
