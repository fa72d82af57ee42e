//! Batch options.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `FOODLOAD_FOODS_SHEET` | foods sheet name in a workbook | first sheet |
//! | `FOODLOAD_REFERENCES_SHEET` | references sheet name | second sheet |
//! | `FOODLOAD_DELIMITER` | delimiter for text uploads (`;`, `,`, `tab`, `\|`) | detected |
//! | `FOODLOAD_QUIET` | suppress progress output (`1`/`true`) | `false` |
//!
//! The `foodload` binary loads a `.env` file from the working directory
//! at startup; the library only reads the process environment.

use std::env;

use crate::error::ConfigError;
use crate::parser::workbook::SheetSelection;

pub const ENV_FOODS_SHEET: &str = "FOODLOAD_FOODS_SHEET";
pub const ENV_REFERENCES_SHEET: &str = "FOODLOAD_REFERENCES_SHEET";
pub const ENV_DELIMITER: &str = "FOODLOAD_DELIMITER";
pub const ENV_QUIET: &str = "FOODLOAD_QUIET";

/// Options for one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOptions {
    pub foods_sheet: Option<String>,
    pub references_sheet: Option<String>,
    /// Delimiter override for text uploads.
    pub delimiter: Option<char>,
    /// Suppress progress output.
    pub quiet: bool,
}

impl BatchOptions {
    /// Read options from `FOODLOAD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read options through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let delimiter = match non_empty(ENV_DELIMITER) {
            Some(value) => Some(parse_delimiter(&value).ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_DELIMITER.to_string(),
                value: value.clone(),
                message: "expected a single character or 'tab'".to_string(),
            })?),
            None => None,
        };

        let quiet = match non_empty(ENV_QUIET) {
            Some(value) => parse_flag(&value).ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_QUIET.to_string(),
                value: value.clone(),
                message: "expected true/false".to_string(),
            })?,
            None => false,
        };

        Ok(Self {
            foods_sheet: non_empty(ENV_FOODS_SHEET),
            references_sheet: non_empty(ENV_REFERENCES_SHEET),
            delimiter,
            quiet,
        })
    }

    pub fn with_foods_sheet(mut self, name: impl Into<String>) -> Self {
        self.foods_sheet = Some(name.into());
        self
    }

    pub fn with_references_sheet(mut self, name: impl Into<String>) -> Self {
        self.references_sheet = Some(name.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Sheet names to read from a workbook.
    pub fn selection(&self) -> SheetSelection {
        SheetSelection {
            foods: self.foods_sheet.clone(),
            references: self.references_sheet.clone(),
        }
    }
}

/// `;`, `,`, `|`, `\t` or the word `tab`.
pub fn parse_delimiter(value: &str) -> Option<char> {
    match value {
        "tab" | "\\t" => Some('\t'),
        _ => {
            let mut chars = value.trim().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Some(c),
                _ => None,
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
