//! Lookup caches - bulk-loaded foreign-key domains and stored records.
//!
//! Every foreign key in an upload is resolved against an in-memory table
//! loaded once per batch. [`load_caches`] issues one bulk read per domain
//! through a [`LookupStore`] and returns two immutable bundles:
//!
//! - [`FoodsData`] - everything the food assembler and diff need
//! - [`ReferencesData`] - everything the reference assembler and diff need
//!
//! All reads run concurrently and all must succeed: the first failure aborts
//! the batch, so no record is ever checked against partial caches.

pub mod memory;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::api::logs::{log_info, log_info_indent, log_success};
use crate::error::StoreResult;
use crate::models::{fold_key, FoodSnapshot, ReferenceSnapshot};
use crate::transform::prescan::PreScan;

pub use memory::{LookupEntry, MemoryStore, SnapshotDocument};

// =============================================================================
// Domains
// =============================================================================

/// Foreign-key domains that resolve text to an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Groups,
    Types,
    ScientificNames,
    Subspecies,
    LangualCodes,
    Nutrients,
    Authors,
    Cities,
    Journals,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Groups => "groups",
            Self::Types => "types",
            Self::ScientificNames => "scientific names",
            Self::Subspecies => "subspecies",
            Self::LangualCodes => "LanguaL codes",
            Self::Nutrients => "nutrients",
            Self::Authors => "authors",
            Self::Cities => "cities",
            Self::Journals => "journals",
        }
    }

    /// Code-keyed domains match on the uppercased code; the others on the
    /// folded name.
    pub fn is_coded(&self) -> bool {
        matches!(self, Self::Groups | Self::Types | Self::LangualCodes)
    }

    /// Lookup key for user-entered text.
    pub fn key(&self, text: &str) -> String {
        if self.is_coded() {
            text.trim().to_uppercase()
        } else {
            fold_key(text)
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Storage collaborator
// =============================================================================

/// Bulk reads against the stored data.
///
/// Implementations return keys exactly as stored; normalization happens in
/// [`LookupTable`].
#[async_trait]
pub trait LookupStore: Send + Sync {
    /// Every `(key, id)` pair of a domain.
    async fn entries(&self, domain: Domain) -> StoreResult<Vec<(String, i64)>>;

    /// The subset of `codes` that already exist as foods.
    async fn existing_food_codes(&self, codes: &[String]) -> StoreResult<Vec<String>>;

    /// The subset of `codes` that already exist as references.
    async fn existing_reference_codes(&self, codes: &[i64]) -> StoreResult<Vec<i64>>;

    /// Stored foods for the given codes (missing codes are skipped).
    async fn food_snapshots(&self, codes: &[String]) -> StoreResult<Vec<FoodSnapshot>>;

    /// Stored references for the given codes (missing codes are skipped).
    async fn reference_snapshots(&self, codes: &[i64]) -> StoreResult<Vec<ReferenceSnapshot>>;
}

// =============================================================================
// Lookup tables
// =============================================================================

/// Normalized key → id map for one domain.
#[derive(Debug, Clone)]
pub struct LookupTable {
    domain: Domain,
    ids: HashMap<String, i64>,
}

impl LookupTable {
    pub fn from_entries(domain: Domain, entries: impl IntoIterator<Item = (String, i64)>) -> Self {
        let ids = entries
            .into_iter()
            .map(|(key, id)| (domain.key(&key), id))
            .collect();
        Self { domain, ids }
    }

    /// Id for user-entered text (case and accents ignored).
    pub fn get(&self, text: &str) -> Option<i64> {
        self.ids.get(&self.domain.key(text)).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// Cache bundles
// =============================================================================

/// Caches for the foods sheet.
#[derive(Debug, Clone)]
pub struct FoodsData {
    /// Uploaded food codes that already exist (uppercased).
    pub food_codes: HashSet<String>,
    pub groups: LookupTable,
    pub types: LookupTable,
    pub scientific_names: LookupTable,
    pub subspecies: LookupTable,
    pub langual_codes: LookupTable,
    pub nutrients: LookupTable,
    /// Reference codes a measurement may cite: stored ones plus those
    /// declared on the same upload's references sheet.
    pub reference_codes: HashSet<i64>,
    pub foods: HashMap<String, FoodSnapshot>,
}

impl FoodsData {
    pub fn is_existing_food(&self, code: &str) -> bool {
        self.food_codes.contains(&code.to_uppercase())
    }

    pub fn snapshot(&self, code: &str) -> Option<&FoodSnapshot> {
        self.foods.get(&code.to_uppercase())
    }
}

/// Caches for the references sheet.
#[derive(Debug, Clone)]
pub struct ReferencesData {
    /// Uploaded or cited reference codes that already exist.
    pub reference_codes: HashSet<i64>,
    pub authors: LookupTable,
    pub cities: LookupTable,
    pub journals: LookupTable,
    pub references: HashMap<i64, ReferenceSnapshot>,
}

impl ReferencesData {
    pub fn is_existing_reference(&self, code: i64) -> bool {
        self.reference_codes.contains(&code)
    }

    pub fn snapshot(&self, code: i64) -> Option<&ReferenceSnapshot> {
        self.references.get(&code)
    }
}

// =============================================================================
// Loader
// =============================================================================

/// Load every cache an upload needs, concurrently.
pub async fn load_caches(
    store: &dyn LookupStore,
    scan: &PreScan,
) -> StoreResult<(FoodsData, ReferencesData)> {
    log_info("Loading lookup caches...");

    let food_codes = scan.food_codes();
    let reference_codes = scan.reference_codes();
    let declared: Vec<i64> = scan.declared_references.iter().copied().collect();

    let (
        groups,
        types,
        scientific_names,
        subspecies,
        langual_codes,
        nutrients,
        authors,
        cities,
        journals,
        existing_foods,
        existing_references,
        food_snapshots,
        reference_snapshots,
    ) = futures::try_join!(
        store.entries(Domain::Groups),
        store.entries(Domain::Types),
        store.entries(Domain::ScientificNames),
        store.entries(Domain::Subspecies),
        store.entries(Domain::LangualCodes),
        store.entries(Domain::Nutrients),
        store.entries(Domain::Authors),
        store.entries(Domain::Cities),
        store.entries(Domain::Journals),
        store.existing_food_codes(&food_codes),
        store.existing_reference_codes(&reference_codes),
        store.food_snapshots(&food_codes),
        store.reference_snapshots(&declared),
    )?;

    let existing_references: HashSet<i64> = existing_references.into_iter().collect();
    let citable: HashSet<i64> = existing_references
        .iter()
        .copied()
        .chain(declared.iter().copied())
        .collect();

    let foods_data = FoodsData {
        food_codes: existing_foods.iter().map(|c| c.to_uppercase()).collect(),
        groups: LookupTable::from_entries(Domain::Groups, groups),
        types: LookupTable::from_entries(Domain::Types, types),
        scientific_names: LookupTable::from_entries(Domain::ScientificNames, scientific_names),
        subspecies: LookupTable::from_entries(Domain::Subspecies, subspecies),
        langual_codes: LookupTable::from_entries(Domain::LangualCodes, langual_codes),
        nutrients: LookupTable::from_entries(Domain::Nutrients, nutrients),
        reference_codes: citable,
        foods: food_snapshots
            .into_iter()
            .map(|f| (f.code.to_uppercase(), f))
            .collect(),
    };

    let references_data = ReferencesData {
        reference_codes: existing_references,
        authors: LookupTable::from_entries(Domain::Authors, authors),
        cities: LookupTable::from_entries(Domain::Cities, cities),
        journals: LookupTable::from_entries(Domain::Journals, journals),
        references: reference_snapshots
            .into_iter()
            .map(|r| (r.code, r))
            .collect(),
    };

    log_success(format!(
        "Loaded {} nutrients, {} LanguaL codes, {} existing foods, {} existing references",
        foods_data.nutrients.len(),
        foods_data.langual_codes.len(),
        foods_data.food_codes.len(),
        references_data.reference_codes.len()
    ));
    log_info_indent(
        format!(
            "{} groups, {} types, {} authors, {} cities, {} journals",
            foods_data.groups.len(),
            foods_data.types.len(),
            references_data.authors.len(),
            references_data.cities.len(),
            references_data.journals.len()
        ),
        1,
    );

    Ok((foods_data, references_data))
}
