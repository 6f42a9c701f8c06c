use std::fmt;

use blocktree_config::ReconcileConfig;

use crate::tree::{Attrs, Node, Path};

/// One atomic edit produced by [`diff`] and consumed immediately by [`super::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum DiffOp {
    Insert { path: Path, node: Node },
    Remove { path: Path },
    SetProps { path: Path, props: Attrs },
    ReplaceText { path: Path, text: String },
    /// Remove and insert fused into one slot swap.
    Replace { path: Path, node: Node },
}

impl DiffOp {
    pub fn path(&self) -> &Path {
        match self {
            DiffOp::Insert { path, .. }
            | DiffOp::Remove { path }
            | DiffOp::SetProps { path, .. }
            | DiffOp::ReplaceText { path, .. }
            | DiffOp::Replace { path, .. } => path,
        }
    }
}

impl fmt::Display for DiffOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffOp::Insert { path, node } => write!(f, "insert {path} {}", label(node)),
            DiffOp::Remove { path } => write!(f, "remove {path}"),
            DiffOp::SetProps { path, props } => {
                write!(f, "set-props {path}")?;
                for (key, value) in props {
                    write!(f, " {key}={value}")?;
                }
                Ok(())
            }
            DiffOp::ReplaceText { path, text } => write!(f, "replace-text {path} {text:?}"),
            DiffOp::Replace { path, node } => write!(f, "replace {path} {}", label(node)),
        }
    }
}

fn label(node: &Node) -> String {
    match node {
        Node::Element(e) => e.kind.clone(),
        Node::Text(t) => format!("text {:?}", t.text),
    }
}

/// Positional, index-aligned diff of two child lists.
///
/// Nodes are paired by index only; there is no identity tracking across
/// siblings. Equal subtrees produce nothing, mismatched kinds and
/// force-replace kinds are swapped wholesale, matching elements are
/// patched and recursed into. Extra live siblings are removed from the
/// end backwards so earlier removal paths stay valid.
pub fn diff(live: &[Node], target: &[Node], config: &ReconcileConfig) -> Vec<DiffOp> {
    let mut ops = Vec::new();
    diff_children(live, target, &Path::root(), config, &mut ops);
    ops
}

fn diff_children(
    live: &[Node],
    target: &[Node],
    parent: &Path,
    config: &ReconcileConfig,
    ops: &mut Vec<DiffOp>,
) {
    for (i, target_node) in target.iter().enumerate() {
        let path = parent.child(i);

        let Some(live_node) = live.get(i) else {
            ops.push(DiffOp::Insert {
                path,
                node: target_node.clone(),
            });
            continue;
        };

        if live_node == target_node {
            continue;
        }

        match (live_node, target_node) {
            (Node::Text(l), Node::Text(t)) => {
                if l.marks != t.marks {
                    ops.push(DiffOp::SetProps {
                        path: path.clone(),
                        props: t.marks.clone(),
                    });
                }
                if l.text != t.text {
                    ops.push(DiffOp::ReplaceText {
                        path,
                        text: t.text.clone(),
                    });
                }
            }
            (Node::Element(l), Node::Element(t))
                if l.kind == t.kind && !config.is_force_replace(&t.kind) =>
            {
                if l.attrs != t.attrs {
                    ops.push(DiffOp::SetProps {
                        path: path.clone(),
                        props: t.attrs.clone(),
                    });
                }
                diff_children(&l.children, &t.children, &path, config, ops);
            }
            // Heterogeneous kinds, or a kind whose internal state can't be patched.
            _ => ops.push(DiffOp::Replace {
                path,
                node: target_node.clone(),
            }),
        }
    }

    for index in (target.len()..live.len()).rev() {
        ops.push(DiffOp::Remove {
            path: parent.child(index),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn para(text: &str) -> Node {
        Node::element("paragraph", vec![Node::text(text)])
    }

    #[test]
    fn test_identical_trees_produce_no_ops() {
        let nodes = vec![para("a"), Node::empty("code")];
        assert!(diff(&nodes, &nodes, &ReconcileConfig::default()).is_empty());
    }

    #[test]
    fn test_text_change_emits_replace_text_only() {
        let ops = diff(&[para("a")], &[para("b")], &ReconcileConfig::default());
        assert_eq!(
            ops,
            vec![DiffOp::ReplaceText {
                path: Path::from([0, 0]),
                text: "b".to_string(),
            }]
        );
    }

    #[test]
    fn test_mark_change_emits_set_props() {
        let live = [para("a")];
        let target = [Node::element(
            "paragraph",
            vec![Node::text("a").with_attr("strong", true)],
        )];

        let ops = diff(&live, &target, &ReconcileConfig::default());

        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].to_string(), "set-props [0, 0] strong=true");
    }

    #[test]
    fn test_kind_mismatch_replaces() {
        let target = [Node::element("heading", vec![Node::text("a")])];
        let ops = diff(&[para("a")], &target, &ReconcileConfig::default());
        assert_eq!(
            ops,
            vec![DiffOp::Replace {
                path: Path::from([0]),
                node: target[0].clone(),
            }]
        );
    }

    #[test]
    fn test_force_replace_kind_is_not_patched() {
        let live = [Node::element("code", vec![Node::text("fn a()")])];
        let target = [Node::element("code", vec![Node::text("fn b()")])];
        let ops = diff(&live, &target, &ReconcileConfig::default());
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], DiffOp::Replace { .. }));
    }

    #[test]
    fn test_trailing_siblings_removed_back_to_front() {
        let live = [para("a"), para("b"), para("c"), para("d")];
        let target = [para("a")];
        let ops = diff(&live, &target, &ReconcileConfig::default());
        let rendered: Vec<String> = ops.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["remove [3]", "remove [2]", "remove [1]"]);
    }

    #[test]
    fn test_missing_nodes_are_inserted_in_order() {
        let ops = diff(
            &[para("a")],
            &[para("a"), para("b"), para("c")],
            &ReconcileConfig::default(),
        );
        let rendered: Vec<String> = ops.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["insert [1] paragraph", "insert [2] paragraph"]);
    }

    #[test]
    fn test_nested_changes_recurse() {
        let live = [Node::element(
            "blockquote",
            vec![para("a"), para("gone")],
        )
        .with_attr("depth", 1)];
        let target = [Node::element("blockquote", vec![para("z")]).with_attr("depth", 2)];

        let ops = diff(&live, &target, &ReconcileConfig::default());
        let rendered: Vec<String> = ops.iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec![
                "set-props [0] depth=2",
                "replace-text [0, 0, 0] \"z\"",
                "remove [0, 1]",
            ]
        );
    }
}
