use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Location of a node as the sequence of child indices from the root.
///
/// Paths are not identities: any mutation of an ancestor or a preceding
/// sibling invalidates them. The `transform_after_*` helpers carry a path
/// across a single removal or insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    /// The empty path, addressing the root's child list.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Path(indices)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the node within its parent.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Same parent, trailing index replaced.
    pub fn with_last(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last = index;
        }
        Path(indices)
    }

    pub fn next_sibling(&self) -> Option<Path> {
        self.last().map(|i| self.with_last(i + 1))
    }

    pub fn previous_sibling(&self) -> Option<Path> {
        match self.last() {
            Some(i) if i > 0 => Some(self.with_last(i - 1)),
            _ => None,
        }
    }

    /// Both paths are non-root and share a parent.
    pub fn is_sibling_of(&self, other: &Path) -> bool {
        !self.0.is_empty()
            && self.0.len() == other.0.len()
            && self.0[..self.0.len() - 1] == other.0[..other.0.len() - 1]
    }

    /// Strict prefix test.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Where this path points after the node at `removed` is taken out.
    ///
    /// Returns `None` when this path was inside the removed subtree.
    pub fn transform_after_remove(&self, removed: &Path) -> Option<Path> {
        if removed.is_empty() || self.0.starts_with(&removed.0) {
            return None;
        }
        let depth = removed.0.len() - 1;
        let mut indices = self.0.clone();
        if indices.len() > depth
            && indices[..depth] == removed.0[..depth]
            && removed.0[depth] < indices[depth]
        {
            indices[depth] -= 1;
        }
        Some(Path(indices))
    }

    /// Where this path points after a node is inserted at `inserted`.
    pub fn transform_after_insert(&self, inserted: &Path) -> Path {
        let mut indices = self.0.clone();
        if let Some(depth) = inserted.0.len().checked_sub(1)
            && indices.len() > depth
            && indices[..depth] == inserted.0[..depth]
            && inserted.0[depth] <= indices[depth]
        {
            indices[depth] += 1;
        }
        Path(indices)
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Path(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Path(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Parses dot-separated indices, e.g. `"2.0.1"`. The empty string is the root.
impl FromStr for Path {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Path::root());
        }
        s.split('.')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
    }
}
