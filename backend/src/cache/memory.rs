//! In-memory lookup store backed by a JSON snapshot document.
//!
//! The document mirrors what a database export would hold:
//!
//! ```json
//! {
//!   "groups": [{ "code": "A", "id": 1 }],
//!   "nutrients": [{ "name": "Energía", "id": 208 }],
//!   "foods": [{ "code": "AB12CD34", "groupId": 1, "typeId": 2, "measurements": [] }],
//!   "references": [{ "code": 12, "title": "Tabla", "type": "BOOK" }]
//! }
//! ```
//!
//! It is checked against `schemas/lookup-snapshot.json` before it is
//! deserialized.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use super::{Domain, LookupStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{FoodSnapshot, ReferenceSnapshot};
use crate::validation::validate_snapshot_document;

/// One `(key, id)` row of a lookup domain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LookupEntry {
    #[serde(alias = "code", alias = "name")]
    pub key: String,
    pub id: i64,
}

/// The whole snapshot document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotDocument {
    pub groups: Vec<LookupEntry>,
    pub types: Vec<LookupEntry>,
    pub scientific_names: Vec<LookupEntry>,
    pub subspecies: Vec<LookupEntry>,
    pub langual_codes: Vec<LookupEntry>,
    pub nutrients: Vec<LookupEntry>,
    pub authors: Vec<LookupEntry>,
    pub cities: Vec<LookupEntry>,
    pub journals: Vec<LookupEntry>,
    pub foods: Vec<FoodSnapshot>,
    pub references: Vec<ReferenceSnapshot>,
}

impl SnapshotDocument {
    fn domain(&self, domain: Domain) -> &[LookupEntry] {
        match domain {
            Domain::Groups => &self.groups,
            Domain::Types => &self.types,
            Domain::ScientificNames => &self.scientific_names,
            Domain::Subspecies => &self.subspecies,
            Domain::LangualCodes => &self.langual_codes,
            Domain::Nutrients => &self.nutrients,
            Domain::Authors => &self.authors,
            Domain::Cities => &self.cities,
            Domain::Journals => &self.journals,
        }
    }
}

/// A [`LookupStore`] over a loaded snapshot document.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: SnapshotDocument,
}

impl MemoryStore {
    pub fn new(document: SnapshotDocument) -> Self {
        Self { document }
    }

    /// Validate and load a parsed JSON document.
    pub fn from_value(value: Value) -> StoreResult<Self> {
        validate_snapshot_document(&value).map_err(|errors| StoreError::InvalidSnapshot { errors })?;
        Ok(Self::new(serde_json::from_value(value)?))
    }

    pub fn from_json_str(content: &str) -> StoreResult<Self> {
        Self::from_value(serde_json::from_str(content)?)
    }

    /// Load a snapshot document from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn document(&self) -> &SnapshotDocument {
        &self.document
    }
}

#[async_trait]
impl LookupStore for MemoryStore {
    async fn entries(&self, domain: Domain) -> StoreResult<Vec<(String, i64)>> {
        Ok(self
            .document
            .domain(domain)
            .iter()
            .map(|e| (e.key.clone(), e.id))
            .collect())
    }

    async fn existing_food_codes(&self, codes: &[String]) -> StoreResult<Vec<String>> {
        let wanted = uppercase_set(codes);
        Ok(self
            .document
            .foods
            .iter()
            .map(|f| f.code.to_uppercase())
            .filter(|code| wanted.contains(code))
            .collect())
    }

    async fn existing_reference_codes(&self, codes: &[i64]) -> StoreResult<Vec<i64>> {
        let wanted: HashSet<i64> = codes.iter().copied().collect();
        Ok(self
            .document
            .references
            .iter()
            .map(|r| r.code)
            .filter(|code| wanted.contains(code))
            .collect())
    }

    async fn food_snapshots(&self, codes: &[String]) -> StoreResult<Vec<FoodSnapshot>> {
        let wanted = uppercase_set(codes);
        Ok(self
            .document
            .foods
            .iter()
            .filter(|f| wanted.contains(&f.code.to_uppercase()))
            .cloned()
            .collect())
    }

    async fn reference_snapshots(&self, codes: &[i64]) -> StoreResult<Vec<ReferenceSnapshot>> {
        let wanted: HashSet<i64> = codes.iter().copied().collect();
        Ok(self
            .document
            .references
            .iter()
            .filter(|r| wanted.contains(&r.code))
            .cloned()
            .collect())
    }
}

fn uppercase_set(codes: &[String]) -> HashSet<String> {
    codes.iter().map(|c| c.to_uppercase()).collect()
}
