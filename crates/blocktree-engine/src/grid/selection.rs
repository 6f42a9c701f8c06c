use super::CellAddress;
use crate::tree::{Node, Path};

/// A concrete table cell (anchor or placeholder) covered by a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRef<'a> {
    pub address: CellAddress,
    pub path: Path,
    pub node: &'a Node,
}

/// Cells covered by one selection gesture, in row-major order.
///
/// Owned by the caller and rebuilt from scratch for every gesture; never
/// patched incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet<'a> {
    cells: Vec<CellRef<'a>>,
}

impl<'a> SelectionSet<'a> {
    pub(crate) fn new(cells: Vec<CellRef<'a>>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CellRef<'a>> {
        self.cells.iter()
    }

    pub fn contains(&self, at: CellAddress) -> bool {
        self.cells.iter().any(|cell| cell.address == at)
    }

    pub fn paths(&self) -> Vec<Path> {
        self.cells.iter().map(|cell| cell.path.clone()).collect()
    }

    /// Smallest and largest covered addresses, i.e. the settled rectangle.
    pub fn bounds(&self) -> Option<(CellAddress, CellAddress)> {
        let first = self.cells.first()?;
        let mut min = first.address;
        let mut max = first.address;
        for cell in &self.cells {
            min.row = min.row.min(cell.address.row);
            min.col = min.col.min(cell.address.col);
            max.row = max.row.max(cell.address.row);
            max.col = max.col.max(cell.address.col);
        }
        Some((min, max))
    }
}

impl<'a> IntoIterator for SelectionSet<'a> {
    type Item = CellRef<'a>;
    type IntoIter = std::vec::IntoIter<CellRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'s, 'a> IntoIterator for &'s SelectionSet<'a> {
    type Item = &'s CellRef<'a>;
    type IntoIter = std::slice::Iter<'s, CellRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
