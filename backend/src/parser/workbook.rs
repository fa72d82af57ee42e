//! Spreadsheet binaries (`.xlsx`, `.xls`, `.ods`) and upload loading.
//!
//! A [`Workbook`] pairs the foods grid with the (optional) references grid.
//! Spreadsheets carry both sheets; delimited text uploads come as one file
//! per sheet.

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

use super::{parse_csv_file, SheetGrid};
use crate::api::logs::{log_info, log_success};
use crate::error::{GridError, GridResult};

/// Both sheets of one upload.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub foods: SheetGrid,
    pub references: Option<SheetGrid>,
}

/// Which sheets to read from a spreadsheet binary.
#[derive(Debug, Clone, Default)]
pub struct SheetSelection {
    /// Foods sheet name (default: first sheet)
    pub foods: Option<String>,
    /// References sheet name (default: second sheet, if any)
    pub references: Option<String>,
}

/// Read the foods and references sheets of a spreadsheet binary.
pub fn read_workbook<P: AsRef<Path>>(path: P, selection: &SheetSelection) -> GridResult<Workbook> {
    let mut workbook = open_workbook_auto(path.as_ref())?;
    let (foods_name, references_name) = select_sheets(&workbook.sheet_names(), selection)?;

    let foods = range_to_grid(&workbook.worksheet_range(&foods_name)?);
    log_success(format!("Read sheet '{}' ({} rows)", foods_name, foods.rows().len()));

    let references = match references_name {
        Some(name) => {
            let grid = range_to_grid(&workbook.worksheet_range(&name)?);
            log_success(format!("Read sheet '{}' ({} rows)", name, grid.rows().len()));
            Some(grid)
        }
        None => None,
    };

    Ok(Workbook { foods, references })
}

/// Pick the foods and references sheet names.
///
/// Unnamed sheets fall back to position: foods first, references second.
/// A name that is not in the workbook is an error.
fn select_sheets(
    names: &[String],
    selection: &SheetSelection,
) -> GridResult<(String, Option<String>)> {
    let foods = match &selection.foods {
        Some(name) => name.clone(),
        None => names.first().cloned().ok_or(GridError::EmptyFile)?,
    };
    if !names.contains(&foods) {
        return Err(GridError::MissingSheet(foods));
    }

    let references = match &selection.references {
        Some(name) if names.contains(name) => Some(name.clone()),
        Some(name) => return Err(GridError::MissingSheet(name.clone())),
        None => names.get(1).cloned(),
    };

    Ok((foods, references))
}

/// Load an upload from disk, choosing the adapter from the file extension.
///
/// A spreadsheet supplies both sheets; a `.csv` foods file may be paired
/// with a separate references file.
pub fn load_upload(
    foods_path: &Path,
    references_path: Option<&Path>,
    selection: &SheetSelection,
    delimiter: Option<char>,
) -> GridResult<Workbook> {
    let ext = extension(foods_path);
    log_info(format!("Reading {} ({})", foods_path.display(), ext));

    let mut workbook = match ext.as_str() {
        "csv" | "txt" | "tsv" => {
            let info = parse_csv_file(foods_path, delimiter)?;
            log_success(format!(
                "Detected encoding {} and delimiter '{}'",
                info.encoding,
                format_delimiter(info.delimiter)
            ));
            Workbook {
                foods: info.grid,
                references: None,
            }
        }
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(foods_path, selection)?,
        _ => return Err(GridError::UnsupportedFormat(ext)),
    };

    if let Some(path) = references_path {
        let info = parse_csv_file(path, delimiter)?;
        log_success(format!("Read references file {}", path.display()));
        workbook.references = Some(info.grid);
    }

    Ok(workbook)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Convert a worksheet range into a grid, keeping absolute positions.
///
/// calamine ranges start at the first used cell; the leading rows and
/// columns are padded back so (0, 0) is always A1.
fn range_to_grid(range: &Range<Data>) -> SheetGrid {
    let (row0, col0) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row0];
    for row in range.rows() {
        let mut cells = vec![String::new(); col0];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }

    SheetGrid::new(rows)
}

fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_float(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Integral floats render without a trailing `.0` (codes, years, counts).
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Grid;

    #[test]
    fn test_range_offset_is_preserved() {
        let mut range: Range<Data> = Range::new((1, 2), (2, 3));
        range.set_value((1, 2), Data::String("code".into()));
        range.set_value((2, 2), Data::String("AB12CD34".into()));
        range.set_value((2, 3), Data::Float(12.5));

        let grid = range_to_grid(&range);

        assert_eq!(grid.cell(0, 0), "");
        assert_eq!(grid.cell(1, 2), "code");
        assert_eq!(grid.cell(2, 2), "AB12CD34");
        assert_eq!(grid.cell(2, 3), "12.5");
    }

    #[test]
    fn test_integral_floats() {
        assert_eq!(cell_text(&Data::Float(2019.0)), "2019");
        assert_eq!(cell_text(&Data::Float(0.25)), "0.25");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    fn sheets(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_sheets_by_position() {
        let names = sheets(&["Alimentos", "Referencias", "Notas"]);
        let (foods, references) = select_sheets(&names, &SheetSelection::default()).unwrap();
        assert_eq!(foods, "Alimentos");
        assert_eq!(references.as_deref(), Some("Referencias"));

        let (_, references) = select_sheets(&sheets(&["Alimentos"]), &SheetSelection::default()).unwrap();
        assert_eq!(references, None);

        assert!(matches!(
            select_sheets(&[], &SheetSelection::default()),
            Err(GridError::EmptyFile)
        ));
    }

    #[test]
    fn test_sheets_by_name() {
        let names = sheets(&["Notas", "Referencias", "Alimentos"]);
        let selection = SheetSelection {
            foods: Some("Alimentos".into()),
            references: Some("Referencias".into()),
        };
        let (foods, references) = select_sheets(&names, &selection).unwrap();
        assert_eq!(foods, "Alimentos");
        assert_eq!(references.as_deref(), Some("Referencias"));

        // an unnamed references sheet still defaults to the second one
        let selection = SheetSelection {
            foods: Some("Alimentos".into()),
            references: None,
        };
        let (_, references) = select_sheets(&names, &selection).unwrap();
        assert_eq!(references.as_deref(), Some("Referencias"));
    }

    #[test]
    fn test_missing_named_sheet() {
        let names = sheets(&["Alimentos", "Referencias"]);

        let selection = SheetSelection {
            foods: Some("Foods".into()),
            references: None,
        };
        assert!(matches!(
            select_sheets(&names, &selection),
            Err(GridError::MissingSheet(name)) if name == "Foods"
        ));

        let selection = SheetSelection {
            foods: None,
            references: Some("Bibliografía".into()),
        };
        assert!(matches!(
            select_sheets(&names, &selection),
            Err(GridError::MissingSheet(name)) if name == "Bibliografía"
        ));
    }

    #[test]
    fn test_corrupt_spreadsheet() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"code;name\nAB12CD34;Manzana\n").unwrap();

        let result = load_upload(file.path(), None, &SheetSelection::default(), None);
        assert!(matches!(result, Err(GridError::Workbook(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_upload(
            Path::new("upload.pdf"),
            None,
            &SheetSelection::default(),
            None,
        );
        assert!(matches!(result, Err(GridError::UnsupportedFormat(ext)) if ext == "pdf"));
    }

    #[test]
    fn test_csv_pair() {
        use std::io::Write;

        let mut foods = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(foods, "code;name\nAB12CD34;Manzana\n").unwrap();
        let mut refs = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(refs, "code;type\n12;Libro\n").unwrap();

        let workbook = load_upload(
            foods.path(),
            Some(refs.path()),
            &SheetSelection::default(),
            None,
        )
        .unwrap();

        assert_eq!(workbook.foods.cell(1, 1), "Manzana");
        assert_eq!(workbook.references.unwrap().cell(1, 1), "Libro");
    }
}
