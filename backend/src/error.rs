//! Error types for the Foodload batch pipeline.
//!
//! Only batch-fatal problems are errors. A malformed cell is never an
//! error: it is recorded on the field it belongs to and processing goes on.
//!
//! - [`GridError`] - reading/decoding an uploaded sheet into a grid
//! - [`SheetError`] - sheet shape problems detected before any record is built
//! - [`StoreError`] - lookup store failures and snapshot document problems
//! - [`ConfigError`] - invalid environment configuration
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Grid Errors
// =============================================================================

/// Errors while turning an uploaded file into a grid of cells.
#[derive(Debug, Error)]
pub enum GridError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Delimited text could not be read.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet binary could not be opened or read.
    #[error("Invalid spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),

    /// Requested sheet does not exist in the workbook.
    #[error("Sheet not found: {0}")]
    MissingSheet(String),

    /// File extension is not one of csv/xlsx/xls/ods.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Empty file.
    #[error("File is empty")]
    EmptyFile,
}

// =============================================================================
// Sheet Shape Errors
// =============================================================================

/// Whole-sheet shape problems. Any of these rejects the batch before
/// record assembly starts.
#[derive(Debug, Error, PartialEq)]
pub enum SheetError {
    /// The sheet has no header row.
    #[error("{sheet} sheet has no header row")]
    MissingHeader { sheet: &'static str },

    /// The header row is narrower than the fixed layout.
    #[error("{sheet} sheet has {found} columns, at least {required} are required")]
    TooFewColumns {
        sheet: &'static str,
        found: usize,
        required: usize,
    },

    /// A nutrient column header does not name a known nutrient.
    #[error("Unknown nutrient '{label}' in column {column}")]
    UnknownNutrient { column: usize, label: String },
}

// =============================================================================
// Lookup Store Errors
// =============================================================================

/// Errors from the lookup store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A bulk read failed.
    #[error("Lookup read failed for {domain}: {message}")]
    ReadFailed { domain: String, message: String },

    /// Snapshot document does not match its schema.
    #[error("Invalid snapshot document: {errors:?}")]
    InvalidSnapshot { errors: Vec<String> },

    /// IO error.
    #[error("Snapshot IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Snapshot JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds a value that cannot be used.
    #[error("Invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::check_workbook`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be read into a grid.
    #[error("Input error: {0}")]
    Grid(#[from] GridError),

    /// Sheet shape rejected.
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Lookup caches could not be loaded.
    #[error("Lookup error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for sheet shape checks.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for lookup store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
