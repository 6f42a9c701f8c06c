use blocktree_config::DragConfig;

use super::geometry::{GeometryProvider, Rect};
use crate::tree::{Node, Path, Tree};

/// Height of the insertion marker drawn at a boundary.
const MARKER_HEIGHT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// Candidate insertion point at the top or bottom edge of an eligible element.
#[derive(Debug, Clone, PartialEq)]
pub struct DropBoundary {
    pub owner_path: Path,
    pub edge: Edge,
    /// Left edge of the owner and the vertical position of this boundary.
    pub x: f32,
    pub y: f32,
    /// Owner's rendered size.
    pub width: f32,
    pub height: f32,
    pub owner_is_list_item: bool,
}

/// What the rendering layer needs to draw the drop marker.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryHint {
    pub boundary: DropBoundary,
    pub marker: Rect,
}

impl BoundaryHint {
    pub(crate) fn new(boundary: &DropBoundary, config: &DragConfig) -> Self {
        let widening = if boundary.owner_is_list_item {
            config.list_item_marker_widening
        } else {
            0.0
        };
        Self {
            marker: Rect::new(
                boundary.x - widening,
                boundary.y,
                boundary.width + widening,
                MARKER_HEIGHT,
            ),
            boundary: boundary.clone(),
        }
    }
}

/// Register `Top`/`Bottom` boundaries for every rendered element that may
/// receive `dragged` (located at `dragged_path`).
pub(crate) fn collect_boundaries(
    tree: &Tree,
    dragged_path: &Path,
    dragged: &Node,
    config: &DragConfig,
    geometry: &dyn GeometryProvider,
) -> Vec<DropBoundary> {
    let dragging_item = dragged.is_kind(&config.list_item_kind);
    let mut boundaries = Vec::new();

    tree.walk(|path, node| {
        let Some(kind) = node.kind() else {
            return;
        };
        let is_item = kind == config.list_item_kind;
        let eligible = config.is_allowed(kind) || (dragging_item && is_item);
        if !eligible || config.is_excluded(kind) {
            return;
        }
        if path == dragged_path || dragged_path.is_ancestor_of(path) {
            return;
        }
        if dragging_item && follows_checkbox(tree, path, node, config) {
            return;
        }
        let Some(rect) = geometry.bounds(path) else {
            return;
        };

        for (edge, y) in [
            (Edge::Top, rect.y),
            (Edge::Bottom, rect.bottom() + config.boundary_margin),
        ] {
            boundaries.push(DropBoundary {
                owner_path: path.clone(),
                edge,
                x: rect.x,
                y,
                width: rect.width,
                height: rect.height,
                owner_is_list_item: is_item,
            });
        }
    });

    boundaries
}

/// The paragraph rendered right after a checklist item's checkbox.
fn follows_checkbox(tree: &Tree, path: &Path, node: &Node, config: &DragConfig) -> bool {
    if !node.is_kind(&config.paragraph_kind) || path.last() != Some(0) {
        return false;
    }
    path.parent()
        .and_then(|parent| tree.get(&parent))
        .is_some_and(|parent| {
            parent.is_kind(&config.list_item_kind) && parent.attr("checked").is_some()
        })
}

/// Pure 1-D nearest neighbour on the vertical axis; the first of equals wins.
pub(crate) fn nearest(
    boundaries: &[DropBoundary],
    pointer_y: f32,
    vertical_offset: f32,
) -> Option<usize> {
    let y = pointer_y - vertical_offset;
    boundaries
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.y - y).abs().total_cmp(&(b.y - y).abs()))
        .map(|(i, _)| i)
}
