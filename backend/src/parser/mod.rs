//! Sheet grids with encoding and delimiter auto-detection.
//!
//! The engine only ever asks "what is the text at (row, col)?". [`Grid`] is
//! that capability; [`SheetGrid`] is the owned implementation both input
//! adapters produce:
//!
//! - delimited text ([`parse_csv_bytes`], [`parse_csv_file`])
//! - spreadsheet binaries ([`workbook::read_workbook`])
//!
//! Cells are trimmed; cells past the end of a short row read as empty.

pub mod workbook;

use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use std::path::Path;

use crate::error::{GridError, GridResult};

pub use workbook::{read_workbook, Workbook};

/// Read access to a rectangular grid of text cells.
pub trait Grid {
    /// Number of physical rows, header included.
    fn row_count(&self) -> usize;

    /// Width of the widest row.
    fn column_count(&self) -> usize;

    /// Cell text; empty when out of range.
    fn cell(&self, row: usize, col: usize) -> &str;

    /// Width of the header row, ignoring trailing blank cells.
    fn header_width(&self) -> usize {
        (0..self.column_count())
            .rev()
            .find(|&col| !self.cell(0, col).is_empty())
            .map_or(0, |col| col + 1)
    }
}

/// An owned grid of trimmed cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetGrid {
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| c.trim().to_string()).collect())
            .collect();
        Self { rows }
    }

    /// Build from string slices (handy for tests and small fixtures).
    pub fn from_rows(rows: &[Vec<&str>]) -> Self {
        Self::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl Grid for SheetGrid {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Result of reading delimited text, with what was detected.
#[derive(Debug, Clone)]
pub struct CsvInfo {
    pub grid: SheetGrid,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unrecognised: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read delimited text into a grid. The header row is kept as row 0.
///
/// Quoted cells may span several lines; rows may have different lengths.
pub fn parse_csv_str(content: &str, delimiter: char) -> GridResult<SheetGrid> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(GridError::EmptyFile);
    }

    Ok(SheetGrid::new(rows))
}

/// Read delimited bytes with auto-detection of encoding and delimiter.
pub fn parse_csv_bytes(bytes: &[u8], delimiter: Option<char>) -> GridResult<CsvInfo> {
    if bytes.is_empty() {
        return Err(GridError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let grid = parse_csv_str(&content, delimiter)?;

    Ok(CsvInfo {
        grid,
        encoding,
        delimiter,
    })
}

/// Read a delimited file with auto-detection of encoding and delimiter.
pub fn parse_csv_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> GridResult<CsvInfo> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_csv_bytes(&bytes, delimiter)
}
