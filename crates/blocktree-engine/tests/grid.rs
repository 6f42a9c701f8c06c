use blocktree_engine::grid::{CELL_KIND, ROW_KIND, TABLE_KIND};
use blocktree_engine::{CellAddress, Node, Path, SelectionSet, TableGrid, parse_markdown};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn cell(label: &str, rowspan: i64, colspan: i64) -> Node {
    Node::element(CELL_KIND, vec![Node::text(label)])
        .with_attr("rowspan", rowspan)
        .with_attr("colspan", colspan)
}

fn table(rows: Vec<Vec<Node>>) -> Node {
    Node::element(
        TABLE_KIND,
        rows.into_iter().map(|cells| Node::element(ROW_KIND, cells)).collect(),
    )
}

fn labels(selection: &SelectionSet<'_>) -> Vec<String> {
    selection.iter().map(|c| c.node.plain_text()).collect()
}

/// ```text
/// +---+---+---+
/// | A     | B |
/// +---+---+   +
/// | C | D |   |
/// +---+---+---+
/// | E         |
/// +---+---+---+
/// ```
fn merged() -> Node {
    table(vec![
        vec![cell("A", 1, 2), cell("a>", 1, 0), cell("B", 2, 1)],
        vec![cell("C", 1, 1), cell("D", 1, 1), cell("B^", 0, 1)],
        vec![cell("E", 1, 3), cell("e>", 1, 0), cell("e>>", 1, 0)],
    ])
}

#[test]
fn colspan_example_selection() {
    let node = table(vec![
        vec![cell("A", 1, 2), cell("_", 1, 0)],
        vec![cell("B", 1, 1), cell("C", 1, 1)],
    ]);
    let grid = TableGrid::new(&node, Path::from([0])).unwrap();

    let all = grid.selected_cells(CellAddress::new(0, 0), CellAddress::new(1, 1));
    assert_eq!(labels(&all), vec!["A", "_", "B", "C"]);

    let placeholder = grid.selected_cells(CellAddress::new(0, 1), CellAddress::new(0, 1));
    assert_eq!(labels(&placeholder), vec!["A", "_"]);

    let anchor = grid.find_anchor(CellAddress::new(0, 1)).unwrap();
    assert_eq!(anchor.address, CellAddress::new(0, 0));
    assert_eq!(anchor.path, Path::from([0, 0, 0]));
}

#[rstest]
#[case::single_anchor((1, 0), (1, 0), vec!["C"])]
#[case::placeholder_pulls_anchor((0, 1), (0, 1), vec!["A", "a>"])]
#[case::rowspan_from_below((1, 2), (1, 2), vec!["B", "B^"])]
#[case::chain_growth((1, 1), (1, 2), vec!["A", "a>", "B", "C", "D", "B^"])]
#[case::full_width_row((2, 1), (2, 1), vec!["E", "e>", "e>>"])]
#[case::corner_to_corner((0, 0), (2, 2), vec!["A", "a>", "B", "C", "D", "B^", "E", "e>", "e>>"])]
fn selection_grows_over_merged_cells(
    #[case] start: (usize, usize),
    #[case] end: (usize, usize),
    #[case] expected: Vec<&str>,
) {
    let node = merged();
    let grid = TableGrid::new(&node, Path::from([3])).unwrap();

    let selection = grid.selected_cells(
        CellAddress::new(start.0, start.1),
        CellAddress::new(end.0, end.1),
    );

    assert_eq!(labels(&selection), expected);
}

#[test]
fn selection_is_superset_of_raw_rectangle_and_stable() {
    let node = merged();
    let grid = TableGrid::new(&node, Path::from([0])).unwrap();

    for r0 in 0..3 {
        for c0 in 0..3 {
            for r1 in 0..3 {
                for c1 in 0..3 {
                    let selection =
                        grid.selected_cells(CellAddress::new(r0, c0), CellAddress::new(r1, c1));

                    for r in r0.min(r1)..=r0.max(r1) {
                        for c in c0.min(c1)..=c0.max(c1) {
                            assert!(selection.contains(CellAddress::new(r, c)));
                        }
                    }

                    // Re-selecting the settled rectangle adds nothing.
                    let (top_left, bottom_right) = selection.bounds().unwrap();
                    let again = grid.selected_cells(top_left, bottom_right);
                    assert_eq!(again.paths(), selection.paths());
                }
            }
        }
    }
}

#[test]
fn find_anchor_resolves_every_placeholder_backwards() {
    let node = merged();
    let grid = TableGrid::new(&node, Path::from([0])).unwrap();

    for r in 0..grid.row_count() {
        for c in 0..grid.column_count() {
            let at = CellAddress::new(r, c);
            let anchor = grid.find_anchor(at).unwrap();
            let span = grid.span_of(anchor.address).unwrap();

            assert!(span.is_anchor(), "{at:?} resolved to placeholder");
            assert!(anchor.address.row <= r && anchor.address.col <= c);
            let steps = (r - anchor.address.row) + (c - anchor.address.col);
            assert!(steps <= grid.row_count() + grid.column_count());
        }
    }
}

#[test]
fn ragged_rows_stop_the_walk() {
    let node = table(vec![
        vec![cell("A", 1, 1)],
        vec![cell("B", 1, 1), cell("?", 0, 1)],
    ]);
    let grid = TableGrid::new(&node, Path::from([0])).unwrap();

    // No cell above (1, 1): the walk stops at the placeholder itself.
    let anchor = grid.find_anchor(CellAddress::new(1, 1)).unwrap();
    assert_eq!(anchor.address, CellAddress::new(1, 1));
    assert!(grid.find_anchor(CellAddress::new(0, 5)).is_none());
}

#[test]
fn gesture_helpers_over_markdown_table() {
    let nodes = parse_markdown("| h1 | h2 |\n|----|----|\n| a  | b  |\n| c  | d  |\n");
    let grid = TableGrid::new(&nodes[0], Path::from([0])).unwrap();

    let trimmed = |s: &SelectionSet<'_>| -> Vec<String> {
        labels(s).iter().map(|l| l.trim().to_string()).collect()
    };

    assert_eq!(trimmed(&grid.select_row(1)), vec!["a", "b"]);
    assert_eq!(trimmed(&grid.select_column(1)), vec!["h2", "b", "d"]);
    assert_eq!(grid.select_all().len(), 6);
    assert!(grid.select_row(9).is_empty());
}
