//! # Drag-Reorder Planner
//!
//! Turns a pointer drag over the rendered surface into one structural move.
//!
//! The planner is a small state machine: `Idle` until a gesture starts,
//! `Armed` while the pointer moves, and back to `Idle` once the gesture
//! ends. Committing applies the move atomically: either the whole move
//! lands, or the tree is left exactly as it was. The session is discarded
//! whatever the outcome.

mod boundary;
mod commit;
mod geometry;

pub use boundary::{BoundaryHint, DropBoundary, Edge};
pub use geometry::{GeometryProvider, Rect, StackLayout};

use std::fmt;

use blocktree_config::DragConfig;
use uuid::Uuid;

use crate::error::EditError;
use crate::tree::{Path, Tree};

/// Opaque handle naming one drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(Uuid);

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ephemeral state of one drag gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    handle: SessionHandle,
    dragged_path: Path,
    boundaries: Vec<DropBoundary>,
    hovered: Option<usize>,
}

impl DragSession {
    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    pub fn dragged_path(&self) -> &Path {
        &self.dragged_path
    }

    pub fn boundaries(&self) -> &[DropBoundary] {
        &self.boundaries
    }

    pub fn hovered(&self) -> Option<&DropBoundary> {
        self.hovered.and_then(|i| self.boundaries.get(i))
    }
}

#[derive(Debug, Default)]
enum DragState {
    #[default]
    Idle,
    Armed(DragSession),
}

/// Outcome of ending a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult {
    /// The move landed; `path` is where the moved node now lives.
    Applied { path: Path },
    /// Nothing changed. `error` is `None` when there was simply no target.
    Aborted { error: Option<EditError> },
}

impl MoveResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveResult::Applied { .. })
    }
}

#[derive(Debug, Default)]
pub struct DragPlanner {
    config: DragConfig,
    state: DragState,
}

impl DragPlanner {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, DragState::Armed(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Armed(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Start a gesture for the element at `path`.
    ///
    /// A session with no measurable boundaries is still armed; it just
    /// never finds a target.
    pub fn begin_drag(
        &mut self,
        tree: &Tree,
        geometry: &dyn GeometryProvider,
        path: &Path,
    ) -> Result<SessionHandle, EditError> {
        let dragged = tree.resolve(path)?;
        if let DragState::Armed(previous) = &self.state {
            log::debug!("discarding drag session {} for a new gesture", previous.handle);
        }

        let boundaries = boundary::collect_boundaries(tree, path, dragged, &self.config, geometry);
        if boundaries.is_empty() {
            log::debug!("{}", EditError::GeometryUnavailable);
        }

        let handle = SessionHandle(Uuid::new_v4());
        log::debug!(
            "drag session {handle} armed for {path} with {} boundaries",
            boundaries.len()
        );
        self.state = DragState::Armed(DragSession {
            handle,
            dragged_path: path.clone(),
            boundaries,
            hovered: None,
        });
        Ok(handle)
    }

    /// Track the pointer and return the boundary it is nearest to.
    pub fn update_drag(&mut self, handle: SessionHandle, pointer_y: f32) -> Option<BoundaryHint> {
        let DragState::Armed(session) = &mut self.state else {
            return None;
        };
        if session.handle != handle {
            return None;
        }
        session.hovered =
            boundary::nearest(&session.boundaries, pointer_y, self.config.vertical_offset);
        session
            .hovered()
            .map(|hovered| BoundaryHint::new(hovered, &self.config))
    }

    /// Hover a specific boundary instead of tracking the pointer.
    ///
    /// Used by keyboard-driven moves where the target is already known.
    pub fn hover_boundary(
        &mut self,
        handle: SessionHandle,
        owner: &Path,
        edge: Edge,
    ) -> Option<BoundaryHint> {
        let DragState::Armed(session) = &mut self.state else {
            return None;
        };
        if session.handle != handle {
            return None;
        }
        session.hovered = session
            .boundaries
            .iter()
            .position(|b| &b.owner_path == owner && b.edge == edge);
        session
            .hovered()
            .map(|hovered| BoundaryHint::new(hovered, &self.config))
    }

    /// Finish the gesture, applying the move to the last hovered boundary.
    pub fn end_drag(&mut self, tree: &mut Tree, handle: SessionHandle) -> MoveResult {
        let session = match std::mem::take(&mut self.state) {
            DragState::Armed(session) if session.handle == handle => session,
            other => {
                self.state = other;
                return MoveResult::Aborted {
                    error: Some(EditError::UnknownSession(handle.0)),
                };
            }
        };

        let Some(target) = session.hovered() else {
            log::debug!("drag session {handle} ended without a target");
            return MoveResult::Aborted { error: None };
        };

        match commit::commit(tree, &session.dragged_path, target, &self.config) {
            Ok(path) => {
                log::debug!("moved {} to {path}", session.dragged_path);
                MoveResult::Applied { path }
            }
            Err(error) => {
                log::warn!("drag aborted, tree left unchanged: {error}");
                MoveResult::Aborted { error: Some(error) }
            }
        }
    }

    /// Drop the session without touching the tree. Returns whether it was active.
    pub fn cancel_drag(&mut self, handle: SessionHandle) -> bool {
        match &self.state {
            DragState::Armed(session) if session.handle == handle => {
                self.state = DragState::Idle;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn tree() -> Tree {
        Tree::new(vec![
            Node::element("paragraph", vec![Node::text("X")]),
            Node::element("paragraph", vec![Node::text("Y")]),
        ])
    }

    #[test]
    fn test_state_machine_transitions() {
        let tree = tree();
        let layout = StackLayout::new(&tree, 20.0, 10.0, 200.0);
        let mut planner = DragPlanner::default();
        assert!(!planner.is_armed());

        let handle = planner.begin_drag(&tree, &layout, &Path::from([0])).unwrap();
        assert!(planner.is_armed());
        assert_eq!(planner.session().unwrap().boundaries().len(), 2);

        assert!(planner.cancel_drag(handle));
        assert!(!planner.is_armed());
        assert!(!planner.cancel_drag(handle));
    }

    #[test]
    fn test_begin_drag_stale_path() {
        let tree = tree();
        let layout = StackLayout::new(&tree, 20.0, 10.0, 200.0);
        let mut planner = DragPlanner::default();
        let result = planner.begin_drag(&tree, &layout, &Path::from([9]));
        assert_eq!(result, Err(EditError::StalePath(Path::from([9]))));
        assert!(!planner.is_armed());
    }

    #[test]
    fn test_wrong_handle_keeps_session() {
        let mut tree = tree();
        let layout = StackLayout::new(&tree, 20.0, 10.0, 200.0);
        let mut planner = DragPlanner::default();
        let first = planner.begin_drag(&tree, &layout, &Path::from([0])).unwrap();
        let second = planner.begin_drag(&tree, &layout, &Path::from([1])).unwrap();

        assert!(planner.update_drag(first, 0.0).is_none());
        let result = planner.end_drag(&mut tree, first);

        assert!(matches!(
            result,
            MoveResult::Aborted {
                error: Some(EditError::UnknownSession(_))
            }
        ));
        assert_eq!(planner.session().map(|s| s.handle()), Some(second));
    }

    #[test]
    fn test_hover_boundary_picks_exact_target() {
        let mut tree = tree();
        let layout = StackLayout::new(&tree, 20.0, 10.0, 200.0);
        let mut planner = DragPlanner::default();
        let handle = planner.begin_drag(&tree, &layout, &Path::from([0])).unwrap();

        let hint = planner
            .hover_boundary(handle, &Path::from([1]), Edge::Bottom)
            .unwrap();
        assert_eq!(hint.boundary.y, 42.0);
        assert!(planner.hover_boundary(handle, &Path::from([0]), Edge::Top).is_none());
        assert!(planner.session().unwrap().hovered().is_none());

        planner.hover_boundary(handle, &Path::from([1]), Edge::Bottom);
        let result = planner.end_drag(&mut tree, handle);
        assert_eq!(result, MoveResult::Applied { path: Path::from([1]) });
        assert_eq!(tree.children()[1].plain_text(), "X");
    }

    #[test]
    fn test_no_geometry_degrades_to_noop() {
        let mut tree = tree();
        let before = tree.clone();
        let geometry: std::collections::HashMap<Path, Rect> = Default::default();
        let mut planner = DragPlanner::default();

        let handle = planner.begin_drag(&tree, &geometry, &Path::from([0])).unwrap();
        assert!(planner.update_drag(handle, 10.0).is_none());

        assert_eq!(planner.end_drag(&mut tree, handle), MoveResult::Aborted { error: None });
        assert_eq!(tree, before);
        assert!(!planner.is_armed());
    }
}
