//! Splitting sheets into record-sized views.
//!
//! The foods sheet is consumed 7 rows at a time from row 1; the references
//! sheet one row at a time. Views borrow the grid, so a trailing partial
//! block reads as if padded with empty rows.

use crate::parser::Grid;

use super::fields::clean_cell;
use super::layout::{food_col, reference_col, FOOD_BLOCK_ROWS};

/// One 7-row food block.
pub struct FoodBlock<'a, G: Grid + ?Sized> {
    grid: &'a G,
    /// First physical row.
    pub start: usize,
}

impl<'a, G: Grid + ?Sized> FoodBlock<'a, G> {
    pub fn new(grid: &'a G, start: usize) -> Self {
        Self { grid, start }
    }

    /// Cell at `offset` rows into the block.
    pub fn cell(&self, offset: usize, col: usize) -> &'a str {
        self.grid.cell(self.start + offset, col)
    }

    /// All 7 cells of a column.
    pub fn column(&self, col: usize) -> [&'a str; FOOD_BLOCK_ROWS] {
        std::array::from_fn(|offset| self.cell(offset, col))
    }

    /// Food code cell after sentinel stripping.
    pub fn code(&self) -> &'a str {
        clean_cell(self.cell(0, food_col::CODE))
    }

    /// Blocks without a code are spacers.
    pub fn is_spacer(&self) -> bool {
        self.code().is_empty()
    }
}

/// Every food block of the sheet, spacers included.
pub fn food_blocks<G: Grid + ?Sized>(grid: &G) -> impl Iterator<Item = FoodBlock<'_, G>> {
    (1..grid.row_count())
        .step_by(FOOD_BLOCK_ROWS)
        .map(move |start| FoodBlock::new(grid, start))
}

/// One row of the references sheet.
pub struct ReferenceRow<'a, G: Grid + ?Sized> {
    grid: &'a G,
    pub row: usize,
}

impl<'a, G: Grid + ?Sized> ReferenceRow<'a, G> {
    pub fn cell(&self, col: usize) -> &'a str {
        self.grid.cell(self.row, col)
    }

    pub fn code(&self) -> &'a str {
        clean_cell(self.cell(reference_col::CODE))
    }

    pub fn is_blank(&self) -> bool {
        self.code().is_empty()
    }
}

/// Every data row of the references sheet.
pub fn reference_rows<G: Grid + ?Sized>(grid: &G) -> impl Iterator<Item = ReferenceRow<'_, G>> {
    (1..grid.row_count()).map(move |row| ReferenceRow { grid, row })
}
