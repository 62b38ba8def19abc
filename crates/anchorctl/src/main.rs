//! `anchorctl`: demo and validation driver for `anchor-ring`.
//!
//! # Usage
//!
//! ```text
//! anchorctl example --seed 1984                     # 7 workers, add H, remove C
//! anchorctl balance -a 100 -f 1.1 -k 1000000        # key spread across buckets
//! anchorctl consistency -a 100 -f 2 -m 100 -k 1000  # minimal disruption check
//! anchorctl rate -a 1000 -f 10 -k 100000 -r 10      # lookup throughput
//! anchorctl route -R a,b,c user:1 user:2            # route individual keys
//! ```

mod config;
mod harness;

use std::path::PathBuf;
use std::process::ExitCode;

use anchor_ring::AnchorRing;
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use config::CliConfig;
use harness::RunParams;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "anchorctl",
    version,
    about = "Exercise and validate AnchorHash resource rings"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hash seed (overrides `[ring] seed`).
    #[arg(short, long, global = true, env = "ANCHOR_SEED")]
    seed: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct RunArgs {
    /// Bucket capacity.
    #[arg(short = 'a', long, default_value = "100")]
    capacity: usize,

    /// Capacity divided by working-set size.
    #[arg(short, long, default_value = "1.1")]
    factor: f64,

    /// Number of keys to hash.
    #[arg(short, long, default_value = "1000")]
    keys: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a sentence through seven workers, then add and remove one.
    Example,

    /// Measure how evenly keys spread over the working set.
    Balance {
        #[command(flatten)]
        run: RunArgs,

        /// Build the working set directly instead of removing random
        /// resources from a full ring.
        #[arg(long)]
        no_random_removes: bool,
    },

    /// Check that random adds and removes only move the affected keys.
    Consistency {
        #[command(flatten)]
        run: RunArgs,

        /// Number of random add/remove moves (default: half the working set).
        #[arg(short, long)]
        moves: Option<usize>,
    },

    /// Time key lookups.
    Rate {
        #[command(flatten)]
        run: RunArgs,

        /// Passes over the key set per timed run.
        #[arg(short, long, default_value = "10")]
        repeat: usize,
    },

    /// Route keys through a ring of the given resources.
    Route {
        /// Comma-separated resource names (overrides `[ring] resources`).
        #[arg(short = 'R', long, value_delimiter = ',')]
        resources: Vec<String>,

        /// Bucket capacity (overrides `[ring] capacity`).
        #[arg(short = 'a', long)]
        capacity: Option<usize>,

        /// Keys to route.
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    let seed = config.seed(cli.seed);
    info!(seed, "using seed");

    match cli.command {
        Commands::Example => cmd_example(seed),
        Commands::Balance {
            run,
            no_random_removes,
        } => cmd_balance(run.params(seed), !no_random_removes),
        Commands::Consistency { run, moves } => cmd_consistency(run.params(seed), moves),
        Commands::Rate { run, repeat } => cmd_rate(run.params(seed), repeat),
        Commands::Route {
            resources,
            capacity,
            keys,
        } => cmd_route(&config, resources, capacity, seed, &keys),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl RunArgs {
    fn params(self, seed: u32) -> RunParams {
        RunParams {
            capacity: self.capacity,
            factor: self.factor,
            keys: self.keys,
            seed,
        }
    }
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

fn cmd_example(seed: u32) -> Result<ExitCode> {
    println!("example seed={seed}");
    println!("keys:  {}", harness::EXAMPLE_TEXT.chars().map(String::from).collect::<Vec<_>>().join("|"));
    for step in harness::example(seed)? {
        println!(
            "{:<9} {}  resources={:?} size={} capacity={}",
            step.label,
            step.routes.join("|"),
            step.resources,
            step.size,
            step.capacity,
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_balance(params: RunParams, random_removes: bool) -> Result<ExitCode> {
    let report = harness::balance(params, random_removes)?;
    println!(
        "balance capacity={} working={} keys={} random_removes={random_removes} seed={}",
        report.capacity, report.working, report.total, params.seed
    );
    println!(
        "high={} low={} avg={:.1} load_pct={:.2}",
        report.high, report.low, report.avg, report.load_pct
    );

    if report.misrouted > 0 {
        println!("ERROR: {} keys routed outside the working set", report.misrouted);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_consistency(params: RunParams, moves: Option<usize>) -> Result<ExitCode> {
    let moves = moves.unwrap_or_else(|| {
        let working = (params.capacity as f64 / params.factor).ceil() as usize;
        (working / 2).max(1)
    });
    let report = harness::consistency(params, moves)?;
    println!(
        "consistency capacity={} moves={moves} keys={} seed={}",
        params.capacity, params.keys, params.seed
    );
    println!("adds={} removes={}", report.adds, report.removes);

    if report.violations.is_empty() {
        println!("no violations");
        return Ok(ExitCode::SUCCESS);
    }

    for v in &report.violations {
        let action = if v.added { "add" } else { "remove" };
        println!(
            "ERROR step={} {action} {}: key {} moved {} -> {}",
            v.step, v.resource, v.key, v.before, v.after
        );
    }
    Ok(ExitCode::FAILURE)
}

fn cmd_rate(params: RunParams, repeat: usize) -> Result<ExitCode> {
    let report = harness::rate(params, repeat)?;
    println!(
        "rate capacity={} factor={} keys={} repeat={} seed={}",
        params.capacity, params.factor, report.keys, report.repeat, params.seed
    );
    let lookups = (report.keys * report.repeat) as f64;
    for ms in &report.runs_ms {
        println!(
            "msec={ms:.2} avg_microsec_per_key={:.3}",
            ms * 1_000.0 / lookups
        );
    }
    println!("max rate (keys/sec): {:.0}", report.best_keys_per_sec);
    Ok(ExitCode::SUCCESS)
}

fn cmd_route(
    config: &CliConfig,
    resources: Vec<String>,
    capacity: Option<usize>,
    seed: u32,
    keys: &[String],
) -> Result<ExitCode> {
    let resources = if resources.is_empty() {
        config.ring.resources.clone()
    } else {
        resources
    };
    if resources.is_empty() {
        bail!("no resources given: pass --resources or set [ring] resources");
    }

    let capacity = capacity.or(config.ring.capacity);
    let ring = AnchorRing::new(resources, capacity, seed).context("failed to build ring")?;
    for key in keys {
        let (name, bucket) = ring.get_resource(key);
        println!("{key} -> {name} ({bucket})");
    }
    Ok(ExitCode::SUCCESS)
}
