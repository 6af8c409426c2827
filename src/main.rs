use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use treeset::{command, Mode, Set};

/// Drive an ordered integer set (BST or AVL tree) with line commands.
///
/// Commands, one per line: `+ <key>` insert, `- <key>` remove, `? <key>` find, `p` print,
/// `v` verify, `h` height. Blank lines and `#` comments are ignored.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// File to read commands from [default: standard input]
    input: Option<PathBuf>,

    /// Keep the tree as a plain binary search tree instead of an AVL tree
    #[arg(long, env = "TREESET_UNBALANCED")]
    unbalanced: bool,

    /// Maximum number of keys the set may hold at once
    #[arg(long, env = "TREESET_CAPACITY")]
    capacity: Option<usize>,

    /// Write a Graphviz rendering of the final tree to this path before teardown (no file is
    /// written without it)
    #[arg(long, env = "TREESET_DOT")]
    dot: Option<PathBuf>,

    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mode = if cli.unbalanced {
        Mode::Unbalanced
    } else {
        Mode::Balanced
    };
    let mut set = match cli.capacity {
        Some(capacity) => Set::with_capacity(mode, capacity),
        None => Set::new(mode),
    };
    debug!(?mode, capacity = ?cli.capacity, "created set");

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let executed = command::run(&mut set, input, &mut out)?;
    out.flush()?;
    info!(executed, len = set.len(), height = set.height(), "done");

    if let Some(path) = &cli.dot {
        set.export_dot(path)?;
    }
    set.teardown();
    Ok(())
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
