//! One data line of an uploaded CSV file

/// Raw cells of a data row plus its spreadsheet row number
///
/// `row` is the number an operator sees in a spreadsheet: the header is
/// row 1, so the first data line is row 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub row: usize,
    pub cells: Vec<String>,
}

impl ImportRow {
    pub fn new(row: usize, cells: Vec<String>) -> Self {
        Self { row, cells }
    }

    /// Cell at `index`, `None` when the row is too short or the cell is blank
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells
            .get(index)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    /// True for a whitespace-only line
    ///
    /// A line of bare delimiters (`,,,,`) has several cells and is a row.
    pub fn is_blank(&self) -> bool {
        match self.cells.as_slice() {
            [] => true,
            [only] => only.trim().is_empty(),
            _ => false,
        }
    }
}
