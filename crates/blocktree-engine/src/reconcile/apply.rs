use blocktree_config::ReconcileConfig;

use super::DiffOp;
use crate::error::EditError;
use crate::tree::{Node, Path, Tree};

/// Apply `ops` in order, stopping at the first failure.
///
/// The tree may be partially patched when this returns an error; the
/// reconciler is responsible for recovering from that.
pub fn apply(
    tree: &mut Tree,
    ops: &[DiffOp],
    config: &ReconcileConfig,
) -> Result<usize, EditError> {
    for op in ops {
        apply_op(tree, op, config)?;
    }
    Ok(ops.len())
}

fn apply_op(tree: &mut Tree, op: &DiffOp, config: &ReconcileConfig) -> Result<(), EditError> {
    match op {
        DiffOp::Insert { path, node } => insert(tree, path, node.clone(), config),
        DiffOp::Remove { path } => tree.remove(path).map(drop),
        DiffOp::SetProps { path, props } => tree.set_props(path, props.clone()),
        DiffOp::ReplaceText { path, text } => tree.replace_text(path, text),
        DiffOp::Replace { path, node } => tree.replace(path, node.clone()).map(drop),
    }
}

/// Insert with the two list-forming fallbacks:
///
/// - if the container at `path`'s parent does not exist yet, retry one path
///   segment up;
/// - a list item that would land outside any list is appended to the list
///   directly before the insertion point instead of starting a new one.
fn insert(
    tree: &mut Tree,
    path: &Path,
    node: Node,
    config: &ReconcileConfig,
) -> Result<(), EditError> {
    let at = insertion_point(tree, path)?;

    if node.is_kind(&config.list_item_kind)
        && let Some(list_path) = preceding_list(tree, &at, config)
    {
        let len = tree.children_at(&list_path)?.len();
        log::debug!("appending orphaned list item into list at {list_path}");
        return tree.insert(&list_path.child(len), node);
    }

    tree.insert(&at, node)
}

fn insertion_point(tree: &Tree, path: &Path) -> Result<Path, EditError> {
    let parent = path
        .parent()
        .ok_or_else(|| EditError::StalePath(path.clone()))?;
    if parent.is_empty() || tree.get(&parent).is_some() {
        return Ok(path.clone());
    }

    match parent.parent() {
        Some(grandparent) if grandparent.is_empty() || tree.get(&grandparent).is_some() => {
            log::debug!("no container at {parent}, inserting one level up");
            Ok(parent)
        }
        _ => Err(EditError::StalePath(path.clone())),
    }
}

fn preceding_list(tree: &Tree, at: &Path, config: &ReconcileConfig) -> Option<Path> {
    let parent = at.parent()?;
    let inside_list = !parent.is_empty()
        && tree
            .get(&parent)
            .is_some_and(|node| node.is_kind(&config.list_kind));
    if inside_list {
        return None;
    }

    let previous = at.previous_sibling()?;
    tree.get(&previous)
        .filter(|node| node.is_kind(&config.list_kind))
        .map(|_| previous)
}
