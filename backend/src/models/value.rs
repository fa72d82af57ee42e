//! Flagged field values.
//!
//! Every scalar read from a sheet is wrapped in a [`FieldValue`]: the typed
//! value (if the cell parsed), the cell text it came from, and a
//! [`FieldState`] saying whether it passed its rules and how it compares to
//! the stored record.
//!
//! On the wire a field keeps the shape reviewers already consume:
//!
//! ```json
//! { "parsed": 12.5, "raw": "12.5", "flags": 5, "old": 11.0 }
//! ```
//!
//! with `flags` built from [`VALID`], [`NEW`] and [`UPDATED`]. `old` is only
//! present on updated fields.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Parse and validation succeeded.
pub const VALID: u8 = 1;
/// Identity not found in existing data.
pub const NEW: u8 = 2;
/// Value differs from the stored value.
pub const UPDATED: u8 = 4;

// =============================================================================
// Field State
// =============================================================================

/// How a valid field relates to the stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    /// Same as stored, or nothing to compare against.
    Unchanged,
    /// Refers to something that does not exist yet and will be created,
    /// or a link the stored record does not have.
    New,
    /// Differs from the stored value, which is kept in `old`.
    Updated { old: Option<T> },
}

/// Outcome of parsing and validating a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldState<T> {
    /// Format, range or lookup rule failed.
    Invalid,
    Valid(Change<T>),
}

// =============================================================================
// Field Value
// =============================================================================

/// A parsed cell with its validation and diff state.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue<T> {
    /// Typed value; `None` when the cell was blank or did not parse.
    pub parsed: Option<T>,
    /// Cell text after sentinel stripping (`-`, `N/A` become empty).
    pub raw: String,
    pub state: FieldState<T>,
}

impl<T> FieldValue<T> {
    /// A field that passed its format rule.
    pub fn valid(parsed: Option<T>, raw: impl Into<String>) -> Self {
        Self {
            parsed,
            raw: raw.into(),
            state: FieldState::Valid(Change::Unchanged),
        }
    }

    /// A field that failed its format rule.
    pub fn invalid(parsed: Option<T>, raw: impl Into<String>) -> Self {
        Self {
            parsed,
            raw: raw.into(),
            state: FieldState::Invalid,
        }
    }

    /// A blank, valid field.
    pub fn empty() -> Self {
        Self::valid(None, "")
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.state, FieldState::Valid(_))
    }

    pub fn is_new(&self) -> bool {
        matches!(self.state, FieldState::Valid(Change::New))
    }

    pub fn is_updated(&self) -> bool {
        matches!(self.state, FieldState::Valid(Change::Updated { .. }))
    }

    /// True when the user left the cell empty.
    pub fn is_blank(&self) -> bool {
        self.raw.is_empty()
    }

    /// Previous stored value of an updated field.
    pub fn old(&self) -> Option<&Option<T>> {
        match &self.state {
            FieldState::Valid(Change::Updated { old }) => Some(old),
            _ => None,
        }
    }

    /// Wire bitmask for this field.
    pub fn flags(&self) -> u8 {
        match &self.state {
            FieldState::Invalid => 0,
            FieldState::Valid(Change::Unchanged) => VALID,
            FieldState::Valid(Change::New) => VALID | NEW,
            FieldState::Valid(Change::Updated { .. }) => VALID | UPDATED,
        }
    }

    /// Keep the field valid only if `ok` holds.
    pub fn validate(mut self, ok: bool) -> Self {
        if !ok {
            self.state = FieldState::Invalid;
        }
        self
    }

    /// Invalidate a blank field.
    pub fn require(self) -> Self {
        let present = self.parsed.is_some() || (self.is_new() && !self.raw.is_empty());
        self.validate(present)
    }

    /// Apply a predicate to the parsed value. Blank fields pass.
    pub fn check(self, predicate: impl FnOnce(&T) -> bool) -> Self {
        let ok = self.parsed.as_ref().map_or(true, predicate);
        self.validate(ok)
    }

    /// Flag a valid field as new. Invalid fields stay invalid.
    pub fn mark_new(mut self) -> Self {
        if self.is_valid() {
            self.state = FieldState::Valid(Change::New);
        }
        self
    }

    /// Flag a valid field as updated, keeping the stored value.
    pub fn mark_updated(mut self, old: Option<T>) -> Self {
        if self.is_valid() {
            self.state = FieldState::Valid(Change::Updated { old });
        }
        self
    }
}

impl<T: Serialize> Serialize for FieldValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let old = self.old();
        let len = if old.is_some() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("FieldValue", len)?;
        state.serialize_field("parsed", &self.parsed)?;
        state.serialize_field("raw", &self.raw)?;
        state.serialize_field("flags", &self.flags())?;
        if let Some(old) = old {
            state.serialize_field("old", old)?;
        }
        state.end()
    }
}

// =============================================================================
// Record Status
// =============================================================================

/// Aggregate status of a record (food, measurement or reference).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordStatus {
    /// Every field of the record is valid.
    pub valid: bool,
    /// The record's identity is not in the database.
    pub new: bool,
    /// At least one field differs from the stored record.
    pub updated: bool,
}

impl RecordStatus {
    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.valid {
            bits |= VALID;
        }
        if self.new {
            bits |= NEW;
        }
        if self.updated {
            bits |= UPDATED;
        }
        bits
    }
}

impl Serialize for RecordStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}
