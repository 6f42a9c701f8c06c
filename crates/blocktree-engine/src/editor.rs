//! The editing surface the host application talks to.
//!
//! Owns the live tree and routes the three structural operations to the
//! engines that implement them.

use blocktree_config::Config;

use crate::drag::{BoundaryHint, DragPlanner, Edge, GeometryProvider, MoveResult, SessionHandle};
use crate::error::EditError;
use crate::grid::{CellAddress, SelectionSet, TableGrid};
use crate::reconcile::{DiffOp, Reconciler};
use crate::snapshot::SnapshotProvider;
use crate::tree::{Node, Path, Tree};

/// How a reconciliation reached the target.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileResult {
    /// Patched in place with these ops.
    Patched { ops: Vec<DiffOp> },
    /// The patch was abandoned and the children swapped wholesale.
    Replaced { cause: EditError },
}

impl ReconcileResult {
    pub fn is_patched(&self) -> bool {
        matches!(self, ReconcileResult::Patched { .. })
    }
}

#[derive(Debug, Default)]
pub struct Editor {
    tree: Tree,
    reconciler: Reconciler,
    planner: DragPlanner,
}

impl Editor {
    pub fn new(tree: Tree, config: &Config) -> Self {
        Self {
            tree,
            reconciler: Reconciler::new(config.reconcile.clone()),
            planner: DragPlanner::new(config.drag.clone()),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn planner(&self) -> &DragPlanner {
        &self.planner
    }

    /// Bring the live tree in line with `snapshot`.
    pub fn reconcile(&mut self, snapshot: Vec<Node>) -> ReconcileResult {
        match self.reconciler.reconcile(&mut self.tree, snapshot) {
            Ok(report) => ReconcileResult::Patched { ops: report.ops },
            Err(fallback) => ReconcileResult::Replaced {
                cause: fallback.cause,
            },
        }
    }

    pub fn reconcile_from(
        &mut self,
        provider: &dyn SnapshotProvider,
    ) -> anyhow::Result<ReconcileResult> {
        let snapshot = provider.snapshot()?;
        Ok(self.reconcile(snapshot))
    }

    pub fn begin_drag(
        &mut self,
        geometry: &dyn GeometryProvider,
        path: &Path,
    ) -> Result<SessionHandle, EditError> {
        self.planner.begin_drag(&self.tree, geometry, path)
    }

    pub fn update_drag(&mut self, handle: SessionHandle, pointer_y: f32) -> Option<BoundaryHint> {
        self.planner.update_drag(handle, pointer_y)
    }

    pub fn hover_boundary(
        &mut self,
        handle: SessionHandle,
        owner: &Path,
        edge: Edge,
    ) -> Option<BoundaryHint> {
        self.planner.hover_boundary(handle, owner, edge)
    }

    pub fn end_drag(&mut self, handle: SessionHandle) -> MoveResult {
        self.planner.end_drag(&mut self.tree, handle)
    }

    pub fn cancel_drag(&mut self, handle: SessionHandle) -> bool {
        self.planner.cancel_drag(handle)
    }

    /// Cells covered by a drag from `start` to `end` in the table at `table_path`.
    pub fn compute_selection(
        &self,
        table_path: &Path,
        start: CellAddress,
        end: CellAddress,
    ) -> Result<SelectionSet<'_>, EditError> {
        let table = self.tree.resolve(table_path)?;
        let grid = TableGrid::new(table, table_path.clone())?;
        Ok(grid.selected_cells(start, end))
    }
}
