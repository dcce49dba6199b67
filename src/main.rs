//! Mancala-Tree: enumerate and inspect Mancala game trees.
//!
//! ## Usage
//!
//! - `mancala-tree generate <L> <T>` - Write every game of an `L`-pit,
//!   `T`-token board to `<L>l<T>t.mantree`
//! - `mancala-tree read <FILE>` - Decode a tree file and check every record
//! - `mancala-tree demo` - Play one random game and print the boards

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{info, warn};

use mancala_tree::board::BoardPrinter;
use mancala_tree::codec::{Framing, RecordWriter, TreeReader, verify};
use mancala_tree::constants::{DEFAULT_LOCATIONS, DEFAULT_TOKENS, WRITE_BUFFER_SIZE};
use mancala_tree::playout::random_game;
use mancala_tree::position::{GameConfig, Player, Position};
use mancala_tree::tree::{TreeStats, enumerate};
use mancala_tree::tree_file::{create_tree_file, parse_path};

/// Mancala-Tree: exhaustive Mancala game trees
#[derive(Parser)]
#[command(name = "mancala-tree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate every game from a fresh board and write the tree file
    Generate {
        /// Playable pits per player (stores excluded)
        locations: usize,
        /// Tokens in each pit at the start
        tokens: usize,
        /// Directory the tree file is written to
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Record layout: "trailing" or "flagged"
        #[arg(long, default_value_t = Framing::Trailing)]
        framing: Framing,
        /// Split the first moves across threads
        #[arg(long)]
        parallel: bool,
        /// Print every state as it is generated
        #[arg(long)]
        print_states: bool,
        /// Skip game and state counting
        #[arg(long)]
        no_metrics: bool,
    },
    /// Decode a tree file and check every record
    Read {
        /// Tree file named <L>l<T>t.mantree
        file: PathBuf,
        /// Record layout the file was written with
        #[arg(long, default_value_t = Framing::Trailing)]
        framing: Framing,
        /// Print every decoded state
        #[arg(long)]
        print_states: bool,
    },
    /// Play one random game and print every board
    Demo {
        #[arg(default_value_t = DEFAULT_LOCATIONS)]
        locations: usize,
        #[arg(default_value_t = DEFAULT_TOKENS)]
        tokens: usize,
        /// Seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Some(Commands::Generate {
            locations,
            tokens,
            dir,
            framing,
            parallel,
            print_states,
            no_metrics,
        }) => generate(
            locations,
            tokens,
            &dir,
            framing,
            parallel,
            print_states,
            !no_metrics,
        ),
        Some(Commands::Read {
            file,
            framing,
            print_states,
        }) => read(&file, framing, print_states),
        Some(Commands::Demo {
            locations,
            tokens,
            seed,
        }) => run_demo(locations, tokens, seed),
        None => run_demo(DEFAULT_LOCATIONS, DEFAULT_TOKENS, None),
    };

    if let Err(e) = result {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .target(env_logger::Target::Stderr)
    .init();
}

fn generate(
    locations: usize,
    tokens: usize,
    dir: &Path,
    framing: Framing,
    parallel: bool,
    print_states: bool,
    collect_metrics: bool,
) -> Result<()> {
    let config = GameConfig::new(locations, tokens).context("invalid board parameters")?;
    let (path, file) = create_tree_file(dir, config)
        .with_context(|| format!("failed to create a tree file in {}", dir.display()))?;
    let mut out = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let initial = Position::new(config);

    info!("writing {config} game tree to {} ({framing} framing)", path.display());
    let started = Instant::now();

    let stats = if parallel {
        if print_states {
            warn!("--print-states is ignored with --parallel");
        }
        generate_parallel(&initial, &mut out, framing, collect_metrics)?
    } else {
        let writer = RecordWriter::new(&mut out, framing);
        if print_states {
            let mut sinks = (writer, BoardPrinter::new(io::stdout().lock()));
            enumerate(&initial, &mut sinks, collect_metrics)?
        } else {
            let mut writer = writer;
            enumerate(&initial, &mut writer, collect_metrics)?
        }
    };

    out.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    info!("done in {:.2?}", started.elapsed());
    if collect_metrics {
        report(&stats);
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn generate_parallel<W: Write>(
    initial: &Position,
    out: &mut W,
    framing: Framing,
    collect_metrics: bool,
) -> Result<TreeStats> {
    Ok(mancala_tree::parallel::enumerate_partitioned(
        initial,
        out,
        framing,
        collect_metrics,
    )?)
}

#[cfg(not(feature = "parallel"))]
fn generate_parallel<W: Write>(
    _initial: &Position,
    _out: &mut W,
    _framing: Framing,
    _collect_metrics: bool,
) -> Result<TreeStats> {
    bail!("built without the `parallel` feature")
}

fn report(stats: &TreeStats) {
    println!("{stats}");
    if stats.dead_ends > 0 {
        warn!("{} non-terminal states had no legal move", stats.dead_ends);
    }
    info!("deepest frame stack: {}", stats.max_depth);
}

fn read(path: &Path, framing: Framing, print_states: bool) -> Result<()> {
    let config = parse_path(path)?;
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = TreeReader::new(BufReader::new(file), config, framing);
    let mut printer = print_states.then(|| BoardPrinter::new(io::stdout().lock()));

    let check = verify(reader, &mut printer)
        .with_context(|| format!("failed to verify {}", path.display()))?;

    println!("{}", check.stats);
    if check.wrong_markers > 0 {
        bail!("{} records with a wrong terminal marker", check.wrong_markers);
    }
    Ok(())
}

fn run_demo(locations: usize, tokens: usize, seed: Option<u64>) -> Result<()> {
    let config = GameConfig::new(locations, tokens).context("invalid board parameters")?;
    let mut rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    println!("Mancala-Tree: random {config} game\n");
    let initial = Position::new(config);
    println!("{initial}");

    let steps = random_game(&initial, &mut rng);
    for step in &steps {
        let mut line = format!("{} sows pit {}", step.mover, step.offset);
        if step.outcome.extra_turn {
            line.push_str(", extra turn");
        }
        if step.outcome.captured > 0 {
            line.push_str(&format!(", captures {}", step.outcome.captured));
        }
        println!("{line}");
        println!("{}", step.position);
    }

    let last = steps.last().map_or(&initial, |s| &s.position);
    println!(
        "Game over after {} moves. Stores: player 0 = {}, player 1 = {}",
        steps.len(),
        last.store(Player::Zero),
        last.store(Player::One)
    );
    Ok(())
}
