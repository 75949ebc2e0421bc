mod annotate;
mod watch;

use std::time::Duration;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use scenery_db::{Diagnostic, Document, DocumentParse as _, RootDatabase, diagnostics};
use scenery_errors::{Renderer, Severity};
use scenery_query::{Address, address_for_node, node_at_address, node_at_offset};
use scenery_registry::Registry;
use scenery_tree::{NodeId, SceneTree, TextSize};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "scenery", about = "Inspect and annotate scene documents")]
struct Options {
    /// Log more; repeat for trace output.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report syntax problems.
    Check { path: Utf8PathBuf },
    /// Print the node tree.
    Tree { path: Utf8PathBuf },
    /// Describe the node at a byte offset or at a key path.
    Query {
        path: Utf8PathBuf,
        #[arg(long, conflicts_with = "address", required_unless_present = "address")]
        offset: Option<u32>,
        #[arg(long)]
        address: Option<String>,
    },
    /// List the annotations a registry attaches to the document.
    Annotate {
        path: Utf8PathBuf,
        /// JSON registry table; the built-in scene table when omitted.
        #[arg(long)]
        registry: Option<Utf8PathBuf>,
    },
    /// Check the document again each time it is saved.
    Watch {
        path: Utf8PathBuf,
        /// Quiet period before a burst of writes is re-checked.
        #[arg(long, default_value_t = 200)]
        delay_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let options = Options::parse();
    init_logging(options.verbose)?;

    match options.command {
        Command::Check { path } => check(&path),
        Command::Tree { path } => {
            let db = RootDatabase::default();
            let document = db.open(&path, read(&path)?);
            print!("{}", document.tree(&db));
            Ok(())
        }
        Command::Query { path, offset, address } => {
            let db = RootDatabase::default();
            let document = db.open(&path, read(&path)?);
            let tree = document.tree(&db);

            let node = match (offset, address) {
                (Some(offset), _) => node_at_offset(tree, TextSize::new(offset)),
                (None, Some(address)) => node_at_address(tree, &Address::parse(&address)),
                (None, None) => None,
            };
            match node {
                Some(node) => println!("{}", describe(tree, node)),
                None => println!("no node"),
            }
            Ok(())
        }
        Command::Annotate { path, registry } => {
            let registry = match registry {
                Some(registry) => {
                    let table = read(&registry)?;
                    Registry::from_json(&table)
                        .with_context(|| format!("invalid registry `{registry}`"))?
                }
                None => Registry::builtin(),
            };

            let db = RootDatabase::default();
            let document = db.open(&path, read(&path)?);
            annotate::run(document.text(&db), document.tree(&db), &registry);
            Ok(())
        }
        Command::Watch { path, delay_ms } => watch::run(&path, Duration::from_millis(delay_ms)),
    }
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn read(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))
}

fn check(path: &Utf8Path) -> anyhow::Result<()> {
    let db = RootDatabase::default();
    let document = db.open(path, read(path)?);

    let errors = report(&db, document);
    anyhow::ensure!(errors == 0, "`{path}` has {errors} error(s)");
    Ok(())
}

/// Prints the document's diagnostics and returns how many are errors.
fn report(db: &RootDatabase, document: Document) -> usize {
    let renderer = Renderer::styled();
    let path = document.path(db);
    let text = document.text(db);

    let diagnostics: Vec<&Diagnostic> = diagnostics(db, document);
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.render(&renderer, path.as_str(), text));
    }
    diagnostics.iter().filter(|it| it.severity() == Severity::Error).count()
}

fn describe(tree: &SceneTree, node: NodeId) -> String {
    let range = tree.range(node);
    let mut line = format!(
        "{}@{:?} address={}",
        tree.kind(node).name(),
        range,
        address_for_node(tree, node)
    );
    if let Some(key) = tree.mapping_key(node) {
        line.push_str(&format!(" key={key:?}"));
    }
    if let Some(value) = tree.scalar(node) {
        line.push_str(&format!(" value={value:?}"));
    }
    line
}
