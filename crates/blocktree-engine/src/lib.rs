pub mod drag;
pub mod editor;
pub mod error;
pub mod grid;
pub mod reconcile;
pub mod snapshot;
pub mod tree;

// Re-export key types for easier usage
pub use drag::{
    BoundaryHint, DragPlanner, DragSession, DropBoundary, Edge, GeometryProvider, MoveResult,
    Rect, SessionHandle, StackLayout,
};
pub use editor::{Editor, ReconcileResult};
pub use error::EditError;
pub use grid::{CellAddress, CellRef, SelectionSet, Span, TableGrid};
pub use reconcile::{DiffOp, FallbackApplied, ReconcileReport, Reconciler};
pub use snapshot::{MarkdownSnapshot, SnapshotProvider, parse_markdown};
pub use tree::{Attrs, Element, Node, Path, Text, Tree, Value};
