//! Annotated food records.

use serde::{Deserialize, Serialize};

use super::locale::DataType;
use super::value::{FieldValue, RecordStatus};

/// One value per catalogue language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localized<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub es: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pt: Option<T>,
}

impl<T> Localized<T> {
    pub fn new(es: Option<T>, en: Option<T>, pt: Option<T>) -> Self {
        Self { es, en, pt }
    }
}

/// A food read from one 7-row block of the foods sheet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    /// First physical row of the block (0-based, header is row 0).
    pub row: usize,
    /// Eight alphanumeric characters, uppercased.
    pub code: FieldValue<String>,
    pub common_name: Localized<FieldValue<String>>,
    pub ingredients: Localized<FieldValue<String>>,
    /// Resolved id; `NEW` with no id when the name is not known yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subspecies: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strain: Option<FieldValue<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<FieldValue<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<FieldValue<String>>,
    pub group: FieldValue<i64>,
    #[serde(rename = "type")]
    pub food_type: FieldValue<i64>,
    pub langual_codes: Vec<FieldValue<i64>>,
    pub nutrient_measurements: Vec<NutrientMeasurement>,
    pub flags: RecordStatus,
}

impl Food {
    pub fn code(&self) -> Option<&str> {
        self.code.parsed.as_deref()
    }
}

/// Composition value of one nutrient for one food.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientMeasurement {
    pub nutrient_id: i64,
    pub average: FieldValue<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<FieldValue<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<FieldValue<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<FieldValue<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<FieldValue<i64>>,
    pub reference_codes: Vec<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<FieldValue<DataType>>,
    pub flags: RecordStatus,
}
