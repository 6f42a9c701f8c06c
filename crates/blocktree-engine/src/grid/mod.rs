//! # Merged-Grid Selector
//!
//! Resolves rectangular cell selections inside a table whose cells carry
//! `rowspan`/`colspan` attributes. A span of `1` (or no attribute) is an
//! ordinary cell, `>1` marks the top-left anchor of a merged block and `0`
//! marks a continuation placeholder covered by some anchor to its left
//! and/or above.
//!
//! The selection rectangle grows until every span touching it is fully
//! inside, iterating to a fixed point rather than a fixed number of passes.

mod selection;

pub use selection::{CellRef, SelectionSet};

use crate::error::EditError;
use crate::tree::{Node, Path};

pub const TABLE_KIND: &str = "table";
pub const ROW_KIND: &str = "row";
pub const CELL_KIND: &str = "cell";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Raw `rowspan`/`colspan` of a cell; missing attributes read as `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub rows: usize,
    pub cols: usize,
}

impl Span {
    fn of(cell: &Node) -> Self {
        Self {
            rows: span_attr(cell, "rowspan"),
            cols: span_attr(cell, "colspan"),
        }
    }

    /// Owns its own geometry (both spans at least one).
    pub fn is_anchor(&self) -> bool {
        self.rows >= 1 && self.cols >= 1
    }
}

fn span_attr(cell: &Node, key: &str) -> usize {
    cell.attr(key)
        .and_then(|v| v.as_i64())
        .map(|v| usize::try_from(v).unwrap_or(1))
        .unwrap_or(1)
}

/// Read-only grid view over a `table` element.
#[derive(Debug)]
pub struct TableGrid<'a> {
    path: Path,
    rows: Vec<&'a [Node]>,
}

impl<'a> TableGrid<'a> {
    /// Checks the table → row → cell shape; anything else is `InvalidStructure`.
    pub fn new(table: &'a Node, path: Path) -> Result<Self, EditError> {
        if !table.is_kind(TABLE_KIND) {
            return Err(EditError::invalid(&path, "not a table"));
        }
        let mut rows = Vec::with_capacity(table.children().len());
        for (r, row) in table.children().iter().enumerate() {
            if !row.is_kind(ROW_KIND) {
                return Err(EditError::invalid(&path.child(r), "table child is not a row"));
            }
            if let Some(c) = row.children().iter().position(|cell| !cell.is_kind(CELL_KIND)) {
                return Err(EditError::invalid(
                    &path.child(r).child(c),
                    "row child is not a cell",
                ));
            }
            rows.push(row.children());
        }
        Ok(Self { path, rows })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, at: CellAddress) -> Option<&'a Node> {
        self.rows.get(at.row).and_then(|row| row.get(at.col))
    }

    pub fn span_of(&self, at: CellAddress) -> Option<Span> {
        self.cell(at).map(Span::of)
    }

    pub fn cell_ref(&self, at: CellAddress) -> Option<CellRef<'a>> {
        self.cell(at).map(|node| CellRef {
            address: at,
            path: self.path.child(at.row).child(at.col),
            node,
        })
    }

    /// Resolve a continuation placeholder to the anchor that covers it.
    ///
    /// Walks left while `colspan == 0`, then up while `rowspan == 0`. Anchors
    /// return themselves. Returns `None` only for addresses outside the grid.
    pub fn find_anchor(&self, at: CellAddress) -> Option<CellRef<'a>> {
        let (anchor, _) = self.walk_to_anchor(at)?;
        self.cell_ref(anchor)
    }

    /// The anchor address and the number of steps taken to reach it.
    pub(crate) fn walk_to_anchor(&self, at: CellAddress) -> Option<(CellAddress, usize)> {
        let mut span = self.span_of(at)?;
        let mut at = at;
        let mut steps = 0;

        while span.cols == 0 && at.col > 0 {
            let left = CellAddress::new(at.row, at.col - 1);
            let Some(left_span) = self.span_of(left) else {
                break;
            };
            at = left;
            span = left_span;
            steps += 1;
        }

        while span.rows == 0 && at.row > 0 {
            let up = CellAddress::new(at.row - 1, at.col);
            let Some(up_span) = self.span_of(up) else {
                break;
            };
            at = up;
            span = up_span;
            steps += 1;
        }

        Some((at, steps))
    }

    /// Every cell covered by the rectangle between `start` and `end`,
    /// widened until no span crosses its edge.
    pub fn selected_cells(&self, start: CellAddress, end: CellAddress) -> SelectionSet<'a> {
        let mut rect = Rect::spanning(start, end);
        for endpoint in [start, end] {
            if let Some(span) = self.span_of(endpoint)
                && span.is_anchor()
            {
                rect.include(endpoint, span);
            }
        }

        let mut passes = 0;
        loop {
            passes += 1;
            let mut grown = false;
            for (r, row) in self.rows.iter().enumerate() {
                for c in 0..row.len() {
                    let at = CellAddress::new(r, c);
                    if !rect.contains(at) {
                        continue;
                    }
                    if let Some((anchor, _)) = self.walk_to_anchor(at)
                        && let Some(span) = self.span_of(anchor)
                    {
                        grown |= rect.include(anchor, span);
                    }
                }
            }
            if !grown {
                break;
            }
        }
        log::trace!("selection settled after {passes} passes at {rect:?}");

        let mut cells = Vec::new();
        for (r, row) in self.rows.iter().enumerate() {
            for c in 0..row.len() {
                let at = CellAddress::new(r, c);
                if rect.contains(at)
                    && let Some(cell) = self.cell_ref(at)
                {
                    cells.push(cell);
                }
            }
        }
        SelectionSet::new(cells)
    }

    /// "Select whole row": the row's first cell to its last.
    pub fn select_row(&self, row: usize) -> SelectionSet<'a> {
        match self.rows.get(row) {
            Some(cells) if !cells.is_empty() => self.selected_cells(
                CellAddress::new(row, 0),
                CellAddress::new(row, cells.len() - 1),
            ),
            _ => SelectionSet::default(),
        }
    }

    /// "Select whole column": top cell to bottom cell.
    pub fn select_column(&self, col: usize) -> SelectionSet<'a> {
        if self.rows.is_empty() || col >= self.column_count() {
            return SelectionSet::default();
        }
        self.selected_cells(
            CellAddress::new(0, col),
            CellAddress::new(self.rows.len() - 1, col),
        )
    }

    /// Corner gesture: top-left to bottom-right.
    pub fn select_all(&self) -> SelectionSet<'a> {
        let cols = self.column_count();
        if self.rows.is_empty() || cols == 0 {
            return SelectionSet::default();
        }
        self.selected_cells(
            CellAddress::new(0, 0),
            CellAddress::new(self.rows.len() - 1, cols - 1),
        )
    }
}

/// Inclusive row/column bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    row_min: usize,
    row_max: usize,
    col_min: usize,
    col_max: usize,
}

impl Rect {
    fn spanning(a: CellAddress, b: CellAddress) -> Self {
        Self {
            row_min: a.row.min(b.row),
            row_max: a.row.max(b.row),
            col_min: a.col.min(b.col),
            col_max: a.col.max(b.col),
        }
    }

    fn contains(&self, at: CellAddress) -> bool {
        (self.row_min..=self.row_max).contains(&at.row)
            && (self.col_min..=self.col_max).contains(&at.col)
    }

    /// Grow to cover the span anchored at `anchor`. Returns whether anything changed.
    fn include(&mut self, anchor: CellAddress, span: Span) -> bool {
        let before = *self;
        self.row_min = self.row_min.min(anchor.row);
        self.col_min = self.col_min.min(anchor.col);
        self.row_max = self.row_max.max(anchor.row.saturating_add(span.rows.max(1) - 1));
        self.col_max = self.col_max.max(anchor.col.saturating_add(span.cols.max(1) - 1));
        *self != before
    }
}
