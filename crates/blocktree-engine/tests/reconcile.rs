use blocktree_engine::{DiffOp, EditError, Node, Path, Reconciler, Tree, parse_markdown};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn para(text: &str) -> Node {
    Node::element("paragraph", vec![Node::text(text)])
}

fn render_ops(ops: &[DiffOp]) -> String {
    ops.iter().map(|op| format!("{op}\n")).collect()
}

#[rstest]
#[case::identical("# A\n\nb\n", "# A\n\nb\n")]
#[case::append_block("one\n", "one\n\ntwo\n\n> three\n")]
#[case::truncate("one\n\ntwo\n\nthree\n", "one\n")]
#[case::kind_change("# Title\n", "Title\n")]
#[case::grow_list("- a\n- b\n", "- a\n- b\n- c\n")]
#[case::list_to_paragraphs("- a\n- b\n", "a\n\nb\n")]
#[case::code_language("```rust\nx\n```\n", "```toml\nx\n```\n")]
#[case::table_cells("| a |\n|---|\n| c |\n", "| a |\n|---|\n| e |\n| f |\n")]
#[case::empty_target("para\n", "")]
#[case::from_empty("", "# Fresh\n\n- [ ] task\n")]
fn reconcile_converges(#[case] live: &str, #[case] target: &str) {
    let reconciler = Reconciler::default();
    let mut tree = Tree::new(parse_markdown(live));
    let expected = reconciler.prepare(parse_markdown(target));

    let first = reconciler.reconcile(&mut tree, parse_markdown(target));
    assert!(first.is_ok(), "fell back to full replacement: {first:?}");
    assert_eq!(tree.children(), expected.as_slice());
    assert!(tree.validate().is_ok());

    let second = reconciler
        .reconcile(&mut tree, parse_markdown(target))
        .expect("second pass patches in place");
    assert!(second.is_noop(), "second pass produced {:?}", second.ops);
}

#[test]
fn reconcile_patches_in_place() {
    let reconciler = Reconciler::default();
    let mut tree = Tree::new(parse_markdown("# Title\n\nfirst\n\nsecond\n\nthird\n"));

    let report = reconciler
        .reconcile(&mut tree, parse_markdown("## Title\n\nfirst *edited*\n\nsecond\n"))
        .unwrap();

    insta::assert_snapshot!("patch_ops", render_ops(&report.ops));
    insta::assert_snapshot!("patch_outline", tree.outline());
}

#[test]
fn reconcile_collapses_empty_blocks() {
    let reconciler = Reconciler::default();
    let mut tree = Tree::new(vec![para("keep")]);

    reconciler
        .reconcile(
            &mut tree,
            vec![
                para("keep"),
                Node::element("paragraph", vec![]),
                Node::element("list", vec![Node::element("list-item", vec![])]),
                Node::element("heading", vec![]),
            ],
        )
        .unwrap();

    assert_eq!(
        tree.children(),
        &[para("keep"), Node::element("heading", vec![Node::text("")])]
    );
}

#[test]
fn stale_op_falls_back_to_full_replacement() {
    let reconciler = Reconciler::default();
    let mut tree = Tree::new(vec![para("a"), para("b")]);
    let target = vec![para("c")];

    let stale = vec![
        DiffOp::ReplaceText {
            path: Path::from([0, 0]),
            text: "c".to_string(),
        },
        DiffOp::Remove {
            path: Path::from([7]),
        },
    ];
    let fallback = reconciler
        .apply_or_replace(&mut tree, stale, target.clone())
        .unwrap_err();

    assert!(matches!(fallback.cause, EditError::StalePath(_)));
    assert_eq!(tree.children(), target.as_slice());
}

#[test]
fn trailing_siblings_removed_back_to_front() {
    let reconciler = Reconciler::default();
    let live = Tree::new(vec![para("0"), para("1"), para("2"), para("3"), para("4")]);

    let ops = reconciler.diff(&live, &[para("0"), para("1")]);

    assert_eq!(
        ops,
        vec![
            DiffOp::Remove { path: Path::from([4]) },
            DiffOp::Remove { path: Path::from([3]) },
            DiffOp::Remove { path: Path::from([2]) },
        ]
    );
}

#[test]
fn orphaned_list_item_joins_preceding_list() {
    let reconciler = Reconciler::default();
    let item = |text: &str| Node::element("list-item", vec![para(text)]);
    let mut tree = Tree::new(vec![Node::element("list", vec![item("a")])]);

    let ops = vec![DiffOp::Insert {
        path: Path::from([1]),
        node: item("b"),
    }];
    let target = vec![Node::element("list", vec![item("a"), item("b")])];

    let report = reconciler
        .apply_or_replace(&mut tree, ops, target.clone())
        .unwrap();

    assert_eq!(report.ops.len(), 1);
    assert_eq!(tree.children(), target.as_slice());
}
