use std::collections::HashMap;

use crate::tree::{Node, Path, Tree};

/// Axis-aligned bounding box in surface coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Supplies bounding boxes of rendered elements to the drag planner.
pub trait GeometryProvider {
    /// `None` when the element at `path` is not rendered.
    fn bounds(&self, path: &Path) -> Option<Rect>;
}

impl GeometryProvider for HashMap<Path, Rect> {
    fn bounds(&self, path: &Path) -> Option<Rect> {
        self.get(path).copied()
    }
}

/// Deterministic vertical block layout.
///
/// Leaf blocks (elements without element children) take one line; container
/// blocks are as tall as their children. Each nesting level is indented.
#[derive(Debug, Clone, Default)]
pub struct StackLayout {
    boxes: HashMap<Path, Rect>,
}

impl StackLayout {
    pub fn new(tree: &Tree, line_height: f32, indent: f32, width: f32) -> Self {
        let mut layout = Self::default();
        layout.place(tree.children(), &Path::root(), 0, 0.0, line_height, indent, width);
        layout
    }

    #[allow(clippy::too_many_arguments)]
    fn place(
        &mut self,
        children: &[Node],
        parent: &Path,
        depth: usize,
        mut y: f32,
        line_height: f32,
        indent: f32,
        width: f32,
    ) -> f32 {
        for (i, child) in children.iter().enumerate() {
            if child.is_text() {
                continue;
            }
            let path = parent.child(i);
            let top = y;
            let has_blocks = child.children().iter().any(|c| !c.is_text());
            y = if has_blocks {
                self.place(child.children(), &path, depth + 1, y, line_height, indent, width)
            } else {
                y + line_height
            };
            let x = depth as f32 * indent;
            self.boxes
                .insert(path, Rect::new(x, top, (width - x).max(0.0), y - top));
        }
        y
    }
}

impl GeometryProvider for StackLayout {
    fn bounds(&self, path: &Path) -> Option<Rect> {
        self.boxes.get(path).copied()
    }
}
