//! Fixed sheet layouts.
//!
//! ```text
//! Foods sheet (one block = 7 physical rows)
//! ┌──────┬───────────┬─────────────┬─────┬─────┬───────┬─────┬───────┬───────┬──────┬─────────┬──────────┬─────────────┐
//! │ code │ name      │ ingredients │ sci │ sub │strain │brand│ obs   │ group │ type │ LanguaL │ 11..=18  │ 19.. nutr.  │
//! │      │ es/en/pt  │ es/en/pt    │     │     │       │     │ 7 rows│       │      │ 7 rows  │ ignored  │ 7 rows each │
//! └──────┴───────────┴─────────────┴─────┴─────┴───────┴─────┴───────┴───────┴──────┴─────────┴──────────┴─────────────┘
//! ```
//!
//! Nutrient columns read one value per block row: average, deviation,
//! min, max, sample size, reference codes, data type.

/// Physical rows per food block.
pub const FOOD_BLOCK_ROWS: usize = 7;

/// Minimum header width of the foods sheet.
pub const FOODS_MIN_COLUMNS: usize = 64;

/// Minimum header width of the references sheet.
pub const REFERENCES_MIN_COLUMNS: usize = 11;

/// Foods sheet columns.
pub mod food_col {
    pub const CODE: usize = 0;
    pub const COMMON_NAME: usize = 1;
    pub const INGREDIENTS: usize = 2;
    pub const SCIENTIFIC_NAME: usize = 3;
    pub const SUBSPECIES: usize = 4;
    pub const STRAIN: usize = 5;
    pub const BRAND: usize = 6;
    pub const OBSERVATION: usize = 7;
    pub const GROUP: usize = 8;
    pub const TYPE: usize = 9;
    pub const LANGUAL: usize = 10;
    /// Columns 11..=18 are display columns written by the export.
    pub const FIRST_NUTRIENT: usize = 19;
}

/// Block rows holding each language of a localized column.
pub mod language_row {
    pub const ES: usize = 0;
    pub const EN: usize = 1;
    pub const PT: usize = 2;
}

/// Block rows of a nutrient column.
pub mod measurement_row {
    pub const AVERAGE: usize = 0;
    pub const DEVIATION: usize = 1;
    pub const MIN: usize = 2;
    pub const MAX: usize = 3;
    pub const SAMPLE_SIZE: usize = 4;
    pub const REFERENCE_CODES: usize = 5;
    pub const DATA_TYPE: usize = 6;
}

/// References sheet columns.
pub mod reference_col {
    pub const CODE: usize = 0;
    pub const TYPE: usize = 1;
    pub const AUTHORS: usize = 2;
    pub const TITLE: usize = 3;
    pub const CITY: usize = 4;
    pub const YEAR: usize = 5;
    pub const OTHER: usize = 6;
    pub const JOURNAL: usize = 7;
    pub const VOLUME_ISSUE: usize = 8;
    pub const VOLUME_YEAR: usize = 9;
    pub const PAGES: usize = 10;
}
