//! Annotated bibliographic references.

use serde::Serialize;

use super::locale::ReferenceType;
use super::value::{FieldValue, RecordStatus};

/// A reference read from one row of the references sheet.
///
/// Author, journal and city entries that are not in the database are
/// flagged `NEW` with no id; `raw` holds the name to create.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Physical row (0-based, header is row 0).
    pub row: usize,
    pub code: FieldValue<i64>,
    pub title: FieldValue<String>,
    #[serde(rename = "type")]
    pub reference_type: FieldValue<ReferenceType>,
    pub authors: Vec<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_year: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_start: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_end: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<FieldValue<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<FieldValue<String>>,
    pub flags: RecordStatus,
}

impl Reference {
    pub fn code(&self) -> Option<i64> {
        self.code.parsed
    }
}
