use anyhow::{Context, Result, anyhow, bail};
use blocktree_config::Config;
use blocktree_engine::grid::TABLE_KIND;
use blocktree_engine::{
    CellAddress, Edge, Editor, MarkdownSnapshot, MoveResult, Path, ReconcileResult, StackLayout,
    Tree,
};
use std::{env, path::PathBuf, process};

const USAGE: &str = "\
Usage: blocktree-cli [--config PATH] <command>

Commands:
  outline <file.md>
  reconcile <live.md> <target.md>
  select <file.md> <table-index> <row> <col> <row> <col>
  drag <file.md> <from-path> <to-path> <top|bottom>

Paths are dot-separated child indices, e.g. 1.0.2";

/// Layout used to give blocks a position when dragging outside a UI.
const LINE_HEIGHT: f32 = 20.0;
const INDENT: f32 = 16.0;
const WIDTH: f32 = 640.0;

#[derive(Debug, PartialEq)]
enum Command {
    Outline {
        file: PathBuf,
    },
    Reconcile {
        live: PathBuf,
        target: PathBuf,
    },
    Select {
        file: PathBuf,
        table: usize,
        start: CellAddress,
        end: CellAddress,
    },
    Drag {
        file: PathBuf,
        from: Path,
        to: Path,
        edge: Edge,
    },
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config_path: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut args = args.iter().map(String::as_str).peekable();
    let mut config_path = None;
    if args.peek() == Some(&"--config") {
        args.next();
        let raw = args.next().ok_or_else(|| anyhow!("--config needs a path"))?;
        let raw = PathBuf::from(raw);
        config_path = Some(Config::expand_path(&raw).unwrap_or(raw));
    }

    let rest: Vec<&str> = args.collect();
    let command = match rest.as_slice() {
        ["outline", file] => Command::Outline { file: file.into() },
        ["reconcile", live, target] => Command::Reconcile {
            live: live.into(),
            target: target.into(),
        },
        ["select", file, table, r0, c0, r1, c1] => Command::Select {
            file: file.into(),
            table: parse_index(table)?,
            start: CellAddress::new(parse_index(r0)?, parse_index(c0)?),
            end: CellAddress::new(parse_index(r1)?, parse_index(c1)?),
        },
        ["drag", file, from, to, edge] => Command::Drag {
            file: file.into(),
            from: parse_path(from)?,
            to: parse_path(to)?,
            edge: parse_edge(edge)?,
        },
        _ => bail!("unrecognised arguments"),
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

fn parse_index(raw: &str) -> Result<usize> {
    raw.parse()
        .with_context(|| format!("'{raw}' is not a valid index"))
}

fn parse_path(raw: &str) -> Result<Path> {
    let path: Path = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a valid path"))?;
    if path.is_empty() {
        bail!("the document root cannot be dragged or targeted");
    }
    Ok(path)
}

fn parse_edge(raw: &str) -> Result<Edge> {
    match raw {
        "top" => Ok(Edge::Top),
        "bottom" => Ok(Edge::Bottom),
        other => bail!("edge must be 'top' or 'bottom', got '{other}'"),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from_path(path)?
            .with_context(|| format!("config file '{}' does not exist", path.display()))?),
        None => Ok(Config::load()?),
    }
}

fn load_editor(file: &std::path::Path, config: &Config) -> Result<Editor> {
    let mut editor = Editor::new(Tree::default(), config);
    editor.reconcile_from(&MarkdownSnapshot::from_path(file)?)?;
    Ok(editor)
}

/// Path of the `index`-th table in document order.
fn find_table(tree: &Tree, index: usize) -> Option<Path> {
    let mut tables = Vec::new();
    tree.walk(|path, node| {
        if node.is_kind(TABLE_KIND) {
            tables.push(path.clone());
        }
    });
    tables.into_iter().nth(index)
}

fn run(invocation: Invocation) -> Result<()> {
    let config = load_config(invocation.config_path.as_ref())?;

    match invocation.command {
        Command::Outline { file } => {
            let editor = load_editor(&file, &config)?;
            print!("{}", editor.tree().outline());
        }
        Command::Reconcile { live, target } => {
            let mut editor = load_editor(&live, &config)?;
            let snapshot = MarkdownSnapshot::from_path(&target)?;
            match editor.reconcile_from(&snapshot)? {
                ReconcileResult::Patched { ops } => {
                    for op in &ops {
                        println!("{op}");
                    }
                    println!("patched in place with {} ops", ops.len());
                }
                ReconcileResult::Replaced { cause } => {
                    println!("replaced wholesale: {cause}");
                }
            }
            println!();
            print!("{}", editor.tree().outline());
        }
        Command::Select {
            file,
            table,
            start,
            end,
        } => {
            let editor = load_editor(&file, &config)?;
            let table_path = find_table(editor.tree(), table)
                .with_context(|| format!("document has no table #{table}"))?;
            let selection = editor.compute_selection(&table_path, start, end)?;
            for cell in &selection {
                println!(
                    "({}, {}) {} {:?}",
                    cell.address.row,
                    cell.address.col,
                    cell.path,
                    cell.node.plain_text().trim()
                );
            }
            if let Some((top_left, bottom_right)) = selection.bounds() {
                println!(
                    "{} cells from ({}, {}) to ({}, {})",
                    selection.len(),
                    top_left.row,
                    top_left.col,
                    bottom_right.row,
                    bottom_right.col
                );
            }
        }
        Command::Drag {
            file,
            from,
            to,
            edge,
        } => {
            let mut editor = load_editor(&file, &config)?;
            let layout = StackLayout::new(editor.tree(), LINE_HEIGHT, INDENT, WIDTH);
            let handle = editor.begin_drag(&layout, &from)?;
            if editor.hover_boundary(handle, &to, edge).is_none() {
                editor.cancel_drag(handle);
                bail!("{to} offers no drop boundary for {from}");
            }
            match editor.end_drag(handle) {
                MoveResult::Applied { path } => println!("moved {from} to {path}"),
                MoveResult::Aborted { error: Some(error) } => bail!("move aborted: {error}"),
                MoveResult::Aborted { error: None } => println!("nothing to do"),
            }
            println!();
            print!("{}", editor.tree().outline());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    log::debug!("running {:?}", invocation.command);
    run(invocation)
}
