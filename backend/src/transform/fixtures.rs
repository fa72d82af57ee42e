//! Shared builders for transform tests.

use std::collections::{HashMap, HashSet};

use crate::cache::{Domain, FoodsData, LookupTable, ReferencesData};
use crate::parser::SheetGrid;

pub fn table(domain: Domain, entries: &[(&str, i64)]) -> LookupTable {
    LookupTable::from_entries(domain, entries.iter().map(|(k, v)| (k.to_string(), *v)))
}

/// Filler nutrient for sheet column `col`, id `1000 + col`.
pub fn nutrient_label(col: usize) -> String {
    format!("Nutriente {}", col)
}

/// Groups A=1, B=3; types T=2; one scientific name; LanguaL A0101=5,
/// A0102=6, B1234=7; nutrients Proteína=203, Energía=208 plus fillers;
/// citable references 12 and 15.
pub fn foods_data() -> FoodsData {
    let mut nutrients = vec![("Proteína".to_string(), 203), ("Energía".to_string(), 208)];
    nutrients.extend((21..64).map(|col| (nutrient_label(col), 1000 + col as i64)));

    FoodsData {
        food_codes: HashSet::new(),
        groups: table(Domain::Groups, &[("A", 1), ("B", 3)]),
        types: table(Domain::Types, &[("T", 2)]),
        scientific_names: table(Domain::ScientificNames, &[("Malus domestica", 30)]),
        subspecies: table(Domain::Subspecies, &[]),
        langual_codes: table(Domain::LangualCodes, &[("A0101", 5), ("A0102", 6), ("B1234", 7)]),
        nutrients: LookupTable::from_entries(Domain::Nutrients, nutrients),
        reference_codes: HashSet::from([12, 15]),
        foods: HashMap::new(),
    }
}

/// Authors 7 and 8, one city, one journal.
pub fn references_data() -> ReferencesData {
    ReferencesData {
        reference_codes: HashSet::new(),
        authors: table(Domain::Authors, &[("Pérez J", 7), ("Silva M", 8)]),
        cities: table(Domain::Cities, &[("Lima", 4)]),
        journals: table(Domain::Journals, &[("Archivos Latinoamericanos de Nutrición", 9)]),
        references: HashMap::new(),
    }
}

/// A 64-column foods sheet with `rows` rows (header included). The header
/// names nutrients in columns 19 (Proteína) and 20 (Energía); columns
/// 21..64 carry filler nutrients known to [`foods_data`].
pub fn foods_sheet(rows: usize, fill: &[(usize, usize, &str)]) -> SheetGrid {
    let mut cells = vec![vec![String::new(); 64]; rows];
    for (col, label) in cells[0].iter_mut().enumerate() {
        *label = format!("col{}", col);
    }
    cells[0][19] = "Proteína".into();
    cells[0][20] = "Energía".into();
    for (col, label) in cells[0].iter_mut().enumerate().skip(21) {
        *label = nutrient_label(col);
    }
    for (row, col, value) in fill {
        cells[*row][*col] = value.to_string();
    }
    SheetGrid::new(cells)
}

/// An 11-column references sheet with the given data rows.
pub fn references_sheet(rows: &[[&str; 11]]) -> SheetGrid {
    let header = [
        "code", "type", "authors", "title", "city", "year", "other", "journal", "volume",
        "volume year", "pages",
    ];
    let mut cells = vec![header.iter().map(|c| c.to_string()).collect::<Vec<_>>()];
    cells.extend(rows.iter().map(|row| row.iter().map(|c| c.to_string()).collect()));
    SheetGrid::new(cells)
}
