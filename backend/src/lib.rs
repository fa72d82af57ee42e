//! # Foodload - food-composition upload checking
//!
//! Foodload reads a two-sheet food-composition upload (foods and
//! bibliographic references), validates every field, resolves names to
//! stored ids and diffs each record against what is already stored.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Upload    │────▶│   Parser    │────▶│  Transform  │────▶│ Change-set  │
//! │ (xlsx/csv)  │     │ (cell grid) │     │ (FK + diff) │     │  (flagged)  │
//! └─────────────┘     └─────────────┘     └──────▲──────┘     └─────────────┘
//!                                               │
//!                                        ┌──────┴──────┐
//!                                        │ Lookup store│
//!                                        └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use foodload::{check_upload, BatchOptions, MemoryStore};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::from_file("db.json").unwrap();
//!     let result = check_upload(Path::new("upload.xlsx"), None, &store, &BatchOptions::default())
//!         .await
//!         .unwrap();
//!     println!("Checked {} foods", result.foods.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Annotated records, field state and stored snapshots
//! - [`parser`] - Workbook and CSV reading into cell grids
//! - [`transform`] - Assembly, FK resolution, diff and the batch driver
//! - [`validation`] - Field predicates, sheet shape and snapshot schema
//! - [`cache`] - Lookup store and per-batch caches
//! - [`config`] - Batch options from the environment
//! - [`api`] - Review payload and progress log

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Caching
pub mod cache;

// Review surface
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, GridError, PipelineError, PipelineResult, SheetError, StoreError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    DataType,
    FieldState,
    FieldValue,
    Food,
    NutrientMeasurement,
    RecordStatus,
    Reference,
    ReferenceType,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    detect_delimiter,
    detect_encoding,
    decode_content,
    parse_csv_file,
    read_workbook,
    Grid,
    SheetGrid,
    Workbook,
};

// =============================================================================
// Re-exports - Lookup store
// =============================================================================

pub use cache::{load_caches, Domain, FoodsData, LookupStore, MemoryStore, ReferencesData};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use config::BatchOptions;
pub use transform::pipeline::{check_upload, check_workbook, BatchResult, BatchStats};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ReviewResponse, ReviewStatus};
