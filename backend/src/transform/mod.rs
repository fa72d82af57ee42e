//! Transformation module.
//!
//! This module turns sheet cells into annotated records:
//! - Layout and blocks: where each field lives
//! - Fields: cell text to typed values
//! - Food / Reference: record assembly with foreign-key resolution
//! - Diff: comparison against stored snapshots
//! - Pipeline: the batch driver

pub mod blocks;
pub mod diff;
pub mod fields;
pub mod food;
pub mod layout;
pub mod pipeline;
pub mod prescan;
pub mod reference;

#[cfg(test)]
pub(crate) mod fixtures;

pub use diff::{diff_food, diff_measurement, diff_reference, Outcome};
pub use food::{assemble_food, assemble_measurement, resolve_nutrient_columns, NutrientColumn};
pub use pipeline::{check_upload, check_workbook, BatchResult, BatchStats, RecordCounts};
pub use prescan::PreScan;
pub use reference::assemble_reference;
