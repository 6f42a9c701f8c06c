use blocktree_config::DragConfig;

use super::boundary::{DropBoundary, Edge};
use crate::error::EditError;
use crate::tree::{Attrs, Element, Node, Path, Tree};

/// Move the subtree at `source_path` to `boundary`, all or nothing.
///
/// The move runs against a working copy; the live tree is only replaced
/// once the result passes [`Tree::validate`]. Returns the final path of the
/// moved (or newly wrapped) node.
pub(crate) fn commit(
    tree: &mut Tree,
    source_path: &Path,
    boundary: &DropBoundary,
    config: &DragConfig,
) -> Result<Path, EditError> {
    let mut work = tree.clone();
    let moved_to = move_subtree(&mut work, source_path, boundary, config)?;
    work.validate()?;
    *tree = work;
    Ok(moved_to)
}

fn move_subtree(
    work: &mut Tree,
    source_path: &Path,
    boundary: &DropBoundary,
    config: &DragConfig,
) -> Result<Path, EditError> {
    let target_path = &boundary.owner_path;
    let source = work.resolve(source_path)?;
    let target = work.resolve(target_path)?;

    if source_path == target_path || source_path.is_ancestor_of(target_path) {
        return Err(EditError::invalid(
            target_path,
            "cannot drop an element onto itself",
        ));
    }

    let wrap_in_list =
        source.is_kind(&config.list_item_kind) && !target.is_kind(&config.list_item_kind);

    let insertion = match boundary.edge {
        Edge::Top => target_path.clone(),
        Edge::Bottom => target_path
            .next_sibling()
            .ok_or_else(|| EditError::StalePath(target_path.clone()))?,
    };
    let insertion = adjust_for_source_removal(&insertion, source_path, target_path);

    let former_parent = source_path.parent().filter(|p| !p.is_empty());
    let inherited = if wrap_in_list {
        former_parent
            .as_ref()
            .and_then(|p| work.get(p))
            .filter(|list| list.is_kind(&config.list_kind))
            .map(|list| inherited_attrs(list, config))
            .unwrap_or_default()
    } else {
        Attrs::new()
    };

    let detached = work.detach(source_path)?;
    let node = if wrap_in_list {
        Node::Element(Element {
            kind: config.list_kind.clone(),
            attrs: inherited,
            children: vec![detached],
        })
    } else {
        detached
    };
    work.insert(&insertion, node)?;

    let mut moved_to = insertion.clone();
    if let Some(parent) = former_parent {
        remove_emptied_ancestors(work, parent.transform_after_insert(&insertion), &mut moved_to)?;
    }
    Ok(moved_to)
}

/// Removing the source shifts its later siblings (and anything under them)
/// up by one. When source and target share a parent and the source comes
/// first, the insertion index drops by one; deeper cases use the general
/// path transform.
fn adjust_for_source_removal(insertion: &Path, source: &Path, target: &Path) -> Path {
    if insertion.is_sibling_of(source) {
        match (insertion.last(), source.last(), target.last()) {
            (Some(at), Some(from), Some(owner)) if from < owner => {
                insertion.with_last(at.saturating_sub(1))
            }
            _ => insertion.clone(),
        }
    } else {
        insertion
            .transform_after_remove(source)
            .unwrap_or_else(|| insertion.clone())
    }
}

fn inherited_attrs(list: &Node, config: &DragConfig) -> Attrs {
    list.props()
        .iter()
        .filter(|(key, _)| config.inherited_list_attrs.contains(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Delete `parent` if the move left it childless, repeating upwards.
fn remove_emptied_ancestors(
    work: &mut Tree,
    mut parent: Path,
    moved_to: &mut Path,
) -> Result<(), EditError> {
    loop {
        if !work.resolve(&parent)?.children().is_empty() {
            return Ok(());
        }
        log::debug!("removing emptied container at {parent}");
        work.detach(&parent)?;
        *moved_to = moved_to.transform_after_remove(&parent).ok_or_else(|| {
            EditError::invalid(&parent, "moved node was inside an emptied container")
        })?;
        match parent.parent() {
            Some(grandparent) if !grandparent.is_empty() => parent = grandparent,
            _ => return Ok(()),
        }
    }
}
