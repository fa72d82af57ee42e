//! Cheap first pass over an upload.
//!
//! Collects the identities the lookup loader needs before any record is
//! assembled: food codes, reference codes declared on the references sheet,
//! and reference codes cited from nutrient columns.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::parser::Grid;

use super::blocks::{food_blocks, reference_rows};
use super::fields::split_reference_codes;
use super::layout::measurement_row;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreScan {
    /// Uppercased food codes found in block code cells.
    pub food_codes: BTreeSet<String>,
    /// Codes of the rows on the references sheet.
    pub declared_references: BTreeSet<i64>,
    /// Codes cited in nutrient reference cells.
    pub cited_references: BTreeSet<i64>,
}

impl PreScan {
    /// Scan the foods grid (and the references grid, if any).
    pub fn scan(
        foods: &dyn Grid,
        references: Option<&dyn Grid>,
        nutrient_columns: Range<usize>,
    ) -> Self {
        let mut scan = Self::default();

        for block in food_blocks(foods).filter(|b| !b.is_spacer()) {
            scan.food_codes.insert(block.code().to_uppercase());
            for col in nutrient_columns.clone() {
                let cell = block.cell(measurement_row::REFERENCE_CODES, col);
                scan.cited_references
                    .extend(split_reference_codes(cell).iter().filter_map(|c| c.parse::<i64>().ok()));
            }
        }

        if let Some(grid) = references {
            scan.declared_references.extend(
                reference_rows(grid)
                    .filter(|r| !r.is_blank())
                    .filter_map(|r| r.code().parse::<i64>().ok()),
            );
        }

        scan
    }

    /// Every reference code the upload mentions.
    pub fn reference_codes(&self) -> Vec<i64> {
        self.declared_references
            .union(&self.cited_references)
            .copied()
            .collect()
    }

    pub fn food_codes(&self) -> Vec<String> {
        self.food_codes.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SheetGrid;

    fn foods_grid() -> SheetGrid {
        let mut rows = vec![vec![String::new(); 21]];
        rows[0][0] = "code".into();
        rows[0][19] = "Energía".into();
        rows[0][20] = "Proteína".into();
        for _ in 0..14 {
            rows.push(vec![String::new(); 21]);
        }
        rows[1][0] = "ab12cd34".into();
        rows[6][19] = "12, 15".into();
        rows[6][20] = "15.18".into();
        rows[8][0] = "XY98ZW76".into();
        rows[13][19] = "-".into();
        SheetGrid::new(rows)
    }

    #[test]
    fn test_collects_codes() {
        let refs = SheetGrid::from_rows(&[vec!["code"], vec!["15"], vec![""], vec!["40"]]);
        let scan = PreScan::scan(&foods_grid(), Some(&refs), 19..21);

        assert_eq!(scan.food_codes(), vec!["AB12CD34", "XY98ZW76"]);
        assert_eq!(scan.cited_references, BTreeSet::from([12, 15, 18]));
        assert_eq!(scan.declared_references, BTreeSet::from([15, 40]));
        assert_eq!(scan.reference_codes(), vec![12, 15, 18, 40]);
    }

    #[test]
    fn test_without_references_sheet() {
        let scan = PreScan::scan(&foods_grid(), None, 19..21);
        assert!(scan.declared_references.is_empty());
        assert_eq!(scan.food_codes.len(), 2);
    }
}
