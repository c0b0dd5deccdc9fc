//! Table placement and fixed-width rendering
//!
//! Cells are placed row by row into a [`Grid`], honoring `colspan` and
//! `rowspan`, and the grid is rendered as a bordered grid table:
//!
//! ```text
//! +---+---+
//! | X | a |
//! |   +===+
//! |   | b |
//! +---+---+
//! ```
//!
//! Border segments under a vertical span are left blank, so merged regions
//! stay visible as one box.

use crate::table::grid::{Cell, Grid};
use scraper::ElementRef;

/// Upper bound for declared spans
const MAX_SPAN: usize = 1000;

static BLANK: Cell = Cell {
    colspan: 0,
    rowspan: 0,
    width: 0,
    text: String::new(),
    spans_left: false,
    spans_up: false,
};

/// Builds one table's grid from its cells and renders it
#[derive(Debug, Default)]
pub struct TableBuilder {
    grid: Grid,
    row: usize,
    col: usize,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no cell has been placed
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Places a `<td>`/`<th>` whose converted content is `text`
    ///
    /// Returns the padded cell text that was stored in the grid.
    pub fn convert_cell(&mut self, element: &ElementRef<'_>, text: &str) -> String {
        let colspan = span_attr(element, "colspan");
        let rowspan = span_attr(element, "rowspan");
        self.place(colspan, rowspan, text)
    }

    /// Places a cell with explicit spans at the cursor
    pub fn place(&mut self, colspan: usize, rowspan: usize, text: &str) -> String {
        let colspan = colspan.clamp(1, MAX_SPAN);
        let rowspan = rowspan.clamp(1, MAX_SPAN);
        let text = format!(" {} ", text.trim().replace('\n', " "));

        while self.grid.cell_mut(self.row, self.col).spans_up {
            self.col += 1;
        }

        let (row, col) = (self.row, self.col);
        self.grid.set(row, col, Cell::new(colspan, rowspan, text.clone()));

        for dr in 0..rowspan {
            for dc in 0..colspan {
                if dr == 0 && dc == 0 {
                    continue;
                }

                let cell = self.grid.cell_mut(row + dr, col + dc);
                // Already covered by a vertical span from an earlier row
                if cell.spans_up {
                    continue;
                }

                *cell = Cell {
                    colspan: colspan - dc,
                    rowspan: rowspan - dr,
                    width: 0,
                    text: String::new(),
                    spans_left: dc > 0,
                    spans_up: dr > 0,
                };
            }
        }

        self.col += colspan;
        text
    }

    /// Moves the cursor to the start of the next row
    pub fn end_row(&mut self) {
        self.row += 1;
        self.col = 0;
    }

    /// Renders the grid as a bordered fixed-width table
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let rows = self.grid.row_count();

        let mut lines = Vec::with_capacity(rows * 2 + 1);
        lines.push(self.top_border(&widths));

        for row in 0..rows {
            lines.push(self.data_line(row, &widths));
            let rule = if row == 0 && rows > 1 { '=' } else { '-' };
            lines.push(self.bottom_border(row, rule, &widths));
        }

        lines.join("\n")
    }

    fn at(&self, row: usize, col: usize) -> &Cell {
        self.grid.get(row, col).unwrap_or(&BLANK)
    }

    /// Number of columns the region starting at `(row, col)` covers in this row
    fn region_span(&self, row: usize, col: usize) -> usize {
        let limit = self.at(row, col).colspan.max(1);
        let mut span = 1;
        while span < limit
            && col + span < self.grid.col_count()
            && self.at(row, col + span).spans_left
        {
            span += 1;
        }
        span
    }

    pub(crate) fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.grid.col_count()];
        let mut merged = Vec::new();

        for (r, row) in self.grid.rows().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_owning() {
                    continue;
                }
                match self.region_span(r, c) {
                    1 => widths[c] = widths[c].max(cell.width),
                    span => merged.push((c, span, cell.width)),
                }
            }
        }

        // Merged cells that do not fit widen the last column they cover
        for (col, span, needed) in merged {
            let available = region_width(&widths, col, span);
            if needed > available {
                widths[col + span - 1] += needed - available;
            }
        }

        widths
    }

    fn data_line(&self, row: usize, widths: &[usize]) -> String {
        let mut line = String::new();
        let mut col = 0;

        while col < widths.len() {
            let cell = self.at(row, col);

            if cell.spans_left {
                line.push_str(&" ".repeat(widths[col] + 1));
                col += 1;
                continue;
            }

            let span = self.region_span(row, col);
            let width = region_width(widths, col, span);
            let text = if cell.spans_up { "" } else { cell.text.as_str() };

            line.push('|');
            line.push_str(&format!("{:<width$}", text, width = width));
            col += span;
        }

        line.push('|');
        line
    }

    /// True if a region border runs down through column boundary `boundary`
    fn vertical_at(&self, row: usize, boundary: usize) -> bool {
        boundary == 0 || boundary >= self.grid.col_count() || !self.at(row, boundary).spans_left
    }

    fn continues_below(&self, row: usize, col: usize) -> bool {
        row + 1 < self.grid.row_count() && self.at(row + 1, col).spans_up
    }

    fn top_border(&self, widths: &[usize]) -> String {
        let segments = vec![true; widths.len()];
        border(&segments, '-', widths, |j| (false, self.vertical_at(0, j)))
    }

    fn bottom_border(&self, row: usize, rule: char, widths: &[usize]) -> String {
        let segments: Vec<bool> = (0..widths.len())
            .map(|col| !self.continues_below(row, col))
            .collect();
        let last = row + 1 >= self.grid.row_count();

        border(&segments, rule, widths, |j| {
            (
                self.vertical_at(row, j),
                !last && self.vertical_at(row + 1, j),
            )
        })
    }
}

/// Width of a region covering `span` columns, including the seams it absorbs
fn region_width(widths: &[usize], col: usize, span: usize) -> usize {
    widths[col..col + span].iter().sum::<usize>() + span - 1
}

/// Draws one border line
///
/// `segments[c]` is true when column `c` gets a rule; `verticals(j)` reports
/// whether a border arrives at junction `j` from above and from below.
fn border(
    segments: &[bool],
    rule: char,
    widths: &[usize],
    verticals: impl Fn(usize) -> (bool, bool),
) -> String {
    let mut line = String::new();

    for j in 0..=widths.len() {
        let left = j > 0 && segments[j - 1];
        let right = j < widths.len() && segments[j];
        let (up, down) = verticals(j);
        line.push(junction(left || right, up || down, rule));

        if j < widths.len() {
            let fill = if segments[j] { rule } else { ' ' };
            line.extend(std::iter::repeat(fill).take(widths[j]));
        }
    }

    line
}

fn junction(horizontal: bool, vertical: bool, rule: char) -> char {
    match (horizontal, vertical) {
        (true, true) => '+',
        (true, false) => rule,
        (false, true) => '|',
        (false, false) => ' ',
    }
}

/// Reads a span attribute; missing, non-numeric and zero values mean 1
fn span_attr(element: &ElementRef<'_>, name: &str) -> usize {
    element
        .value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::{Html, Selector};

    fn build(rows: &[&[(&str, usize, usize)]]) -> TableBuilder {
        let mut table = TableBuilder::new();
        for row in rows {
            for (text, colspan, rowspan) in row.iter() {
                table.place(*colspan, *rowspan, text);
            }
            table.end_row();
        }
        table
    }

    /// Seam offsets implied by the column widths
    fn seams(widths: &[usize]) -> Vec<usize> {
        let mut offsets = vec![0];
        for w in widths {
            let last = *offsets.last().unwrap();
            offsets.push(last + w + 1);
        }
        offsets
    }

    fn assert_aligned(table: &TableBuilder) {
        let rendered = table.render();
        let seams = seams(&table.column_widths());
        let width = *seams.last().unwrap() + 1;

        for line in rendered.lines() {
            assert_eq!(line.chars().count(), width, "ragged line: {line:?}");
            for (i, ch) in line.chars().enumerate() {
                if ch == '+' || ch == '|' {
                    assert!(seams.contains(&i), "border off-seam at {i} in {line:?}");
                }
            }
        }
    }

    #[test]
    fn test_uniform_table() {
        let table = build(&[&[("A", 1, 1), ("B", 1, 1)], &[("C", 1, 1), ("D", 1, 1)]]);
        let expected = "\
+---+---+
| A | B |
+===+===+
| C | D |
+---+---+";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_single_row_has_no_header_rule() {
        let table = build(&[&[("Only", 1, 1), ("row", 1, 1)]]);
        let expected = "\
+------+-----+
| Only | row |
+------+-----+";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_uniform_matches_naive_grid() {
        let rows: [[&str; 3]; 3] = [
            ["Item", "Specification", "Note"],
            ["Refrigerant", "R-134a", ""],
            ["Oil", "DH-PR", "130 ml"],
        ];
        let spans: Vec<Vec<(&str, usize, usize)>> = rows
            .iter()
            .map(|r| r.iter().map(|t| (*t, 1, 1)).collect())
            .collect();
        let refs: Vec<&[(&str, usize, usize)]> = spans.iter().map(Vec::as_slice).collect();
        let table = build(&refs);

        let widths: Vec<usize> = (0..3)
            .map(|c| rows.iter().map(|r| r[c].len() + 2).max().unwrap())
            .collect();
        let rule = |ch: char| {
            let mut s = String::from("+");
            for w in &widths {
                s.push_str(&ch.to_string().repeat(*w));
                s.push('+');
            }
            s
        };
        let mut naive = vec![rule('-')];
        for (i, r) in rows.iter().enumerate() {
            let mut line = String::new();
            for (c, text) in r.iter().enumerate() {
                line.push_str(&format!("|{:<w$}", format!(" {text} "), w = widths[c]));
            }
            line.push('|');
            naive.push(line);
            naive.push(rule(if i == 0 { '=' } else { '-' }));
        }

        assert_eq!(table.render(), naive.join("\n"));
    }

    #[test]
    fn test_colspan_header() {
        let table = build(&[&[("Head", 2, 1)], &[("a", 1, 1), ("b", 1, 1)]]);
        let expected = "\
+-------+
| Head  |
+===+===+
| a | b |
+---+---+";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_rowspan_leaves_seam_open() {
        let table = build(&[&[("X", 1, 2), ("a", 1, 1)], &[("b", 1, 1)]]);
        let expected = "\
+---+---+
| X | a |
|   +===+
|   | b |
+---+---+";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_block_span() {
        let table = build(&[
            &[("A", 2, 2), ("B", 1, 1)],
            &[("C", 1, 1)],
            &[("D", 1, 1), ("E", 1, 1), ("F", 1, 1)],
        ]);
        let expected = "\
+-------+---+
| A     | B |
|       +===+
|       | C |
+---+---+---+
| D | E | F |
+---+---+---+";
        assert_eq!(table.render(), expected);
        assert_aligned(&table);
    }

    #[test]
    fn test_placement_skips_vertical_spans() {
        let table = build(&[&[("A", 1, 2), ("B", 1, 1)], &[("C", 1, 1)]]);
        let grid = table.grid();

        assert!(grid.get(1, 0).unwrap().spans_up);
        assert_eq!(grid.get(1, 0).unwrap().rowspan, 1);
        assert_eq!(grid.get(1, 1).unwrap().text, " C ");
        assert_eq!(grid.get(0, 0).unwrap().rowspan, 2);
    }

    #[test]
    fn test_residual_spans() {
        let table = build(&[&[("A", 3, 2)]]);
        let grid = table.grid();

        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.col_count(), 3);

        let right = grid.get(0, 2).unwrap();
        assert!(right.spans_left && !right.spans_up);
        assert_eq!((right.colspan, right.rowspan), (1, 2));

        let below = grid.get(1, 0).unwrap();
        assert!(below.spans_up && !below.spans_left);
        assert_eq!((below.colspan, below.rowspan), (3, 1));

        let corner = grid.get(1, 1).unwrap();
        assert!(corner.spans_up && corner.spans_left);
        assert_eq!((corner.colspan, corner.rowspan), (2, 1));
    }

    #[test]
    fn test_wide_merged_cell_widens_last_column() {
        let table = build(&[
            &[("REFRIGERANT SYSTEM", 2, 1)],
            &[("Type", 1, 1), ("R-134a", 1, 1)],
        ]);
        let widths = table.column_widths();
        assert_eq!(widths[0], 6);
        assert_eq!(widths[0] + widths[1] + 1, 20);
        assert_aligned(&table);
    }

    #[test]
    fn test_mixed_spans_align() {
        let table = build(&[
            &[("Item", 1, 1), ("Specification", 3, 1)],
            &[("Refrigerant", 1, 2), ("Type", 2, 1), ("R-134a", 1, 1)],
            &[("Regular amount (approx. quantity)", 1, 1), ("(g {oz})", 1, 1), ("450 {15.9}", 1, 1)],
            &[("BASIC SYSTEM", 4, 1)],
            &[("A/C compressor", 1, 2), ("Lubrication oil", 1, 2), ("Type", 1, 1), ("DH-PR", 1, 1)],
            &[("Sealed volume", 1, 1), ("130 {130, 4.39}", 1, 1)],
        ]);
        assert_aligned(&table);

        let rendered = table.render();
        for text in ["Specification", "Refrigerant", "BASIC SYSTEM", "Sealed volume"] {
            assert_eq!(rendered.matches(text).count(), 1, "{text} rendered once");
        }
    }

    #[test]
    fn test_span_attributes_from_html() {
        let html = Html::parse_fragment(
            r#"<table><tr><td colspan="2" rowspan="abc">wide</td><td colspan="0">x</td></tr></table>"#,
        );
        let selector = Selector::parse("td").unwrap();
        let mut table = TableBuilder::new();
        for td in html.select(&selector) {
            let text: String = td.text().collect();
            table.convert_cell(&td, &text);
        }

        let grid = table.grid();
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.get(0, 0).unwrap().colspan, 2);
        assert!(grid.get(0, 1).unwrap().spans_left);
        assert!(grid.get(0, 2).unwrap().is_owning());
    }

    #[test]
    fn test_cell_text_is_padded_and_flattened() {
        let mut table = TableBuilder::new();
        let text = table.place(1, 1, "  two\nlines  ");
        assert_eq!(text, " two lines ");
    }
}
