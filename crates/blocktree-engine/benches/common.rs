// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use blocktree_engine::grid::{CELL_KIND, ROW_KIND, TABLE_KIND};
use blocktree_engine::Node;

#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* content.\n\n- Bullet point\n  - Nested item\n- Another item\n\n| a | b |\n|---|---|\n| c | d |\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

/// Same document with every third paragraph reworded.
#[allow(dead_code)]
pub fn generate_edited_content(size: usize) -> String {
    generate_markdown_content(size)
        .split("Paragraph with")
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                chunk.to_string()
            } else if i % 3 == 0 {
                format!("Edited paragraph with{chunk}")
            } else {
                format!("Paragraph with{chunk}")
            }
        })
        .collect()
}

/// Square table where every other row is one full-width merged cell.
#[allow(dead_code)]
pub fn generate_merged_table(size: usize) -> Node {
    let rows = (0..size)
        .map(|r| {
            let cells = (0..size)
                .map(|c| {
                    let cell = Node::element(CELL_KIND, vec![Node::text(format!("{r},{c}"))]);
                    match (r % 2, c) {
                        (1, 0) => cell.with_attr("colspan", size as i64),
                        (1, _) => cell.with_attr("colspan", 0),
                        _ => cell,
                    }
                })
                .collect();
            Node::element(ROW_KIND, cells)
        })
        .collect();
    Node::element(TABLE_KIND, rows)
}
