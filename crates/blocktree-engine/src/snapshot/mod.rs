//! Sources of target trees for reconciliation.

mod markdown;

pub use markdown::{MarkdownSnapshot, parse_markdown};

use crate::tree::{Node, Tree};

/// Anything that can produce a fresh target tree on demand.
pub trait SnapshotProvider {
    fn snapshot(&self) -> anyhow::Result<Vec<Node>>;
}

impl SnapshotProvider for Tree {
    fn snapshot(&self) -> anyhow::Result<Vec<Node>> {
        Ok(self.children().to_vec())
    }
}

impl SnapshotProvider for Vec<Node> {
    fn snapshot(&self) -> anyhow::Result<Vec<Node>> {
        Ok(self.clone())
    }
}
