//! Read-only copies of stored records, used only for comparison.

use serde::{Deserialize, Serialize};

use super::food::Localized;
use super::locale::{DataType, ReferenceType};

/// A stored food as the diff sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoodSnapshot {
    pub code: String,
    pub common_name: Localized<String>,
    pub ingredients: Localized<String>,
    pub scientific_name_id: Option<i64>,
    pub subspecies_id: Option<i64>,
    pub strain: Option<String>,
    pub brand: Option<String>,
    pub observation: Option<String>,
    pub group_id: i64,
    pub type_id: i64,
    pub langual_ids: Vec<i64>,
    pub measurements: Vec<MeasurementSnapshot>,
}

impl FoodSnapshot {
    pub fn measurement(&self, nutrient_id: i64) -> Option<&MeasurementSnapshot> {
        self.measurements
            .iter()
            .find(|m| m.nutrient_id == nutrient_id)
    }
}

/// A stored nutrient measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementSnapshot {
    pub nutrient_id: i64,
    pub average: f64,
    pub deviation: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sample_size: Option<i64>,
    pub reference_codes: Vec<i64>,
    pub data_type: Option<DataType>,
}

/// A stored reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSnapshot {
    pub code: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub reference_type: ReferenceType,
    #[serde(default)]
    pub author_ids: Vec<i64>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub issue: Option<i64>,
    #[serde(default)]
    pub volume_year: Option<i64>,
    #[serde(default)]
    pub page_start: Option<i64>,
    #[serde(default)]
    pub page_end: Option<i64>,
    #[serde(default)]
    pub journal_id: Option<i64>,
    #[serde(default)]
    pub city_id: Option<i64>,
    #[serde(default)]
    pub other: Option<String>,
}
