//! Domain models for the Foodload pipeline.
//!
//! - [`FieldValue`] - a parsed cell with its validity and diff state
//! - [`Food`] / [`NutrientMeasurement`] - records built from food blocks
//! - [`Reference`] - records built from reference rows
//! - [`FoodSnapshot`] / [`ReferenceSnapshot`] - stored records used for diffing
//! - [`DataType`] / [`ReferenceType`] - locale-variant enumerations

pub mod food;
pub mod locale;
pub mod reference;
pub mod snapshot;
pub mod value;

pub use food::{Food, Localized, NutrientMeasurement};
pub use locale::{fold_key, locale_description, DataType, ReferenceType};
pub use reference::Reference;
pub use snapshot::{FoodSnapshot, MeasurementSnapshot, ReferenceSnapshot};
pub use value::{Change, FieldState, FieldValue, RecordStatus, NEW, UPDATED, VALID};
