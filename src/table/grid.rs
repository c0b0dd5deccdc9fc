//! Auto-growing cell grid used to reconstruct HTML tables

/// One position of a reconstructed table
///
/// Owning cells carry the text of a source `<td>`/`<th>`. Positions covered by
/// a span carry no text; their `colspan`/`rowspan` hold the residual span
/// measured from that position to the far edge of the owning region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub colspan: usize,
    pub rowspan: usize,
    /// Display width of `text` in characters
    pub width: usize,
    pub text: String,
    /// Continues the region of the cell to its left
    pub spans_left: bool,
    /// Continues the region of the cell above
    pub spans_up: bool,
}

impl Cell {
    /// Creates an owning cell
    pub fn new(colspan: usize, rowspan: usize, text: String) -> Self {
        Self {
            colspan,
            rowspan,
            width: text.chars().count(),
            text,
            spans_left: false,
            spans_up: false,
        }
    }

    /// Filler for positions no source cell reached
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_owning(&self) -> bool {
        !self.spans_left && !self.spans_up
    }
}

/// Rectangular row-major grid that grows on access
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    cols: usize,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() || self.cols == 0
    }

    /// Returns the cell at `(row, col)`, growing the grid to include it
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        self.grow_to(row, col);
        &mut self.cells[row][col]
    }

    /// Replaces the cell at `(row, col)`, growing the grid to include it
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        *self.cell_mut(row, col) = cell;
    }

    /// Returns the cell at `(row, col)` without growing the grid
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Iterates over the rows of the grid
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    fn grow_to(&mut self, row: usize, col: usize) {
        if col >= self.cols {
            self.cols = col + 1;
            for r in &mut self.cells {
                r.resize_with(self.cols, Cell::blank);
            }
        }

        while row >= self.cells.len() {
            let mut fresh = Vec::with_capacity(self.cols);
            fresh.resize_with(self.cols, Cell::blank);
            self.cells.push(fresh);
        }
    }
}
