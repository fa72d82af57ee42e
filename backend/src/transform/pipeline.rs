//! Batch driver: from an uploaded workbook to an annotated change-set.
//!
//! 1. Shape checks on both sheets (the only batch-fatal checks)
//! 2. Pre-scan for food and reference codes
//! 3. Concurrent lookup cache load
//! 4. Nutrient header resolution
//! 5. Food blocks, then reference rows: assemble, then diff
//!
//! # Example
//!
//! ```rust,ignore
//! use foodload::cache::MemoryStore;
//! use foodload::config::BatchOptions;
//! use foodload::transform::pipeline::check_upload;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::from_file("db.json")?;
//!     let result = check_upload(
//!         Path::new("upload.xlsx"),
//!         None,
//!         &store,
//!         &BatchOptions::default(),
//!     ).await?;
//!
//!     println!("{} foods, {} updated", result.stats.foods.total, result.stats.foods.updated);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_error, log_info, log_success, log_warning, log_warning_indent};
use crate::cache::{load_caches, FoodsData, LookupStore, ReferencesData};
use crate::config::BatchOptions;
use crate::error::PipelineResult;
use crate::models::{Food, RecordStatus, Reference};
use crate::parser::workbook::load_upload;
use crate::parser::{Grid, Workbook};
use crate::validation::{check_foods_sheet, check_references_sheet};

use super::blocks::{food_blocks, reference_rows};
use super::diff::{diff_food, diff_reference};
use super::food::{assemble_food, resolve_nutrient_columns, NutrientColumn};
use super::prescan::PreScan;
use super::reference::assemble_reference;

/// How many invalid records are listed in the log.
const INVALID_PREVIEW: usize = 3;

/// Counts for one record kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCounts {
    pub total: usize,
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub invalid: usize,
}

impl RecordCounts {
    fn count(&mut self, status: &RecordStatus) {
        self.total += 1;
        if !status.valid {
            self.invalid += 1;
        }
        if status.new {
            self.new += 1;
        } else if status.updated {
            self.updated += 1;
        } else {
            self.unchanged += 1;
        }
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub foods: RecordCounts,
    pub measurements: RecordCounts,
    pub references: RecordCounts,
    /// Food blocks without a code.
    pub skipped_blocks: usize,
    /// Reference rows without a code.
    pub skipped_rows: usize,
}

impl BatchStats {
    /// True when every record passed validation.
    pub fn all_valid(&self) -> bool {
        self.foods.invalid == 0 && self.measurements.invalid == 0 && self.references.invalid == 0
    }
}

/// Annotated records of one upload.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub foods: Vec<Food>,
    pub references: Vec<Reference>,
    pub stats: BatchStats,
}

/// Read an upload from disk and check it.
pub async fn check_upload(
    foods_path: &Path,
    references_path: Option<&Path>,
    store: &dyn LookupStore,
    options: &BatchOptions,
) -> PipelineResult<BatchResult> {
    log_info("📖 Reading upload...");
    let workbook = load_upload(
        foods_path,
        references_path,
        &options.selection(),
        options.delimiter,
    )?;
    check_workbook(&workbook, store).await
}

/// Check both sheets of a workbook against the stored data.
pub async fn check_workbook(
    workbook: &Workbook,
    store: &dyn LookupStore,
) -> PipelineResult<BatchResult> {
    log_info("📋 Checking sheet layout...");
    let nutrient_range = check_foods_sheet(&workbook.foods).map_err(fatal)?;
    match &workbook.references {
        Some(references) => check_references_sheet(references).map_err(fatal)?,
        None => log_warning("No references sheet; only stored references can be cited"),
    }
    log_success(format!(
        "Foods sheet has {} nutrient columns",
        nutrient_range.len()
    ));

    let references_grid = workbook.references.as_ref().map(|g| g as &dyn Grid);
    let scan = PreScan::scan(&workbook.foods, references_grid, nutrient_range.clone());
    log_success(format!(
        "Found {} food codes, {} reference codes",
        scan.food_codes.len(),
        scan.declared_references.len()
    ));

    let (foods_data, references_data) = load_caches(store, &scan).await.map_err(fatal)?;

    let columns = resolve_nutrient_columns(&workbook.foods, nutrient_range, &foods_data.nutrients)
        .map_err(fatal)?;

    Ok(assemble_batch(workbook, &columns, &foods_data, &references_data))
}

/// Assemble and diff every record once caches are loaded.
pub fn assemble_batch(
    workbook: &Workbook,
    columns: &[NutrientColumn],
    foods_data: &FoodsData,
    references_data: &ReferencesData,
) -> BatchResult {
    let mut stats = BatchStats::default();

    log_info("🔄 Checking foods...");
    let mut foods = Vec::new();
    for block in food_blocks(&workbook.foods) {
        if block.is_spacer() {
            stats.skipped_blocks += 1;
            continue;
        }
        let food = diff_food(assemble_food(&block, columns, foods_data), foods_data);
        stats.foods.count(&food.flags);
        for m in &food.nutrient_measurements {
            stats.measurements.count(&m.flags);
        }
        foods.push(food);
    }
    report("foods", &stats.foods);
    log_invalid(foods.iter().filter(|f| !f.flags.valid).map(|f| {
        format!("row {}: food {}", f.row + 1, f.code.raw)
    }));

    let mut references = Vec::new();
    if let Some(grid) = &workbook.references {
        log_info("🔄 Checking references...");
        for row in reference_rows(grid) {
            if row.is_blank() {
                stats.skipped_rows += 1;
                continue;
            }
            let reference = diff_reference(assemble_reference(&row, references_data), references_data);
            stats.references.count(&reference.flags);
            references.push(reference);
        }
        report("references", &stats.references);
        log_invalid(references.iter().filter(|r| !r.flags.valid).map(|r| {
            format!("row {}: reference {}", r.row + 1, r.code.raw)
        }));
    }

    if stats.all_valid() {
        log_success("All records valid");
    }

    BatchResult {
        foods,
        references,
        stats,
    }
}

/// Log a batch-fatal error on its way out.
fn fatal<E: std::fmt::Display>(err: E) -> E {
    log_error(format!("Batch rejected: {}", err));
    err
}

fn report(kind: &str, counts: &RecordCounts) {
    log_success(format!(
        "{} {}: {} new, {} updated, {} unchanged",
        counts.total, kind, counts.new, counts.updated, counts.unchanged
    ));
    if counts.invalid > 0 {
        log_warning(format!("{} {} have invalid fields", counts.invalid, kind));
    }
}

fn log_invalid(lines: impl Iterator<Item = String>) {
    for line in lines.take(INVALID_PREVIEW) {
        log_warning_indent(line, 1);
    }
}
