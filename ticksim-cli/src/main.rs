//! ticksim CLI: run, sweep, and replay commands.
//!
//! Commands:
//! - `run`: one backtest from a TOML config (synthetic ticks) or a tick CSV
//! - `sweep`: the same config across many derived seeds, in parallel
//! - `replay`: print a tick file in replay order
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for engine detail.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ticksim_core::{ExecutionEngine, Ledger, MarketDataReplayer, SimulatedBroker};
use ticksim_runner::{
    derive_seeds, run_seed_sweep, ArtifactWriter, BacktestConfig, BacktestRunner, RunReport,
};

#[derive(Parser)]
#[command(name = "ticksim", about = "ticksim: deterministic tick-level backtest simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one backtest and write its artefacts.
    Run {
        /// TOML config (start, end, bar_interval, seed). Drives synthetic ticks.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tick CSV (timestamp,symbol,price[,size]) to replay instead of synthetic data.
        #[arg(long, conflicts_with = "config")]
        ticks: Option<PathBuf>,

        /// Symbol to simulate (repeatable). Required with --config.
        #[arg(long = "symbol", conflicts_with = "ticks")]
        symbols: Vec<String>,

        /// Override the config seed.
        #[arg(long, conflicts_with = "ticks")]
        seed: Option<u64>,

        /// Output directory for artefacts.
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
    /// Run one config across N seeds derived from a master seed.
    Sweep {
        /// TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Symbol to simulate (repeatable).
        #[arg(long = "symbol", required = true)]
        symbols: Vec<String>,

        /// Number of runs.
        #[arg(long, default_value_t = 8)]
        runs: usize,

        /// Master seed. Defaults to the config seed.
        #[arg(long)]
        master_seed: Option<u64>,

        /// Root directory; each run writes to <out>/seed-<seed>.
        #[arg(long, default_value = "sweeps")]
        out: PathBuf,
    },
    /// Print a tick file in replay order, one JSON event per line.
    Replay {
        /// Tick CSV (timestamp,symbol,price[,size]).
        #[arg(long)]
        ticks: PathBuf,

        /// Stop after this many events.
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            symbols,
            seed,
            out,
        } => run_cmd(config, ticks, symbols, seed, out),
        Commands::Sweep {
            config,
            symbols,
            runs,
            master_seed,
            out,
        } => sweep_cmd(config, symbols, runs, master_seed, out),
        Commands::Replay { ticks, limit } => replay_cmd(ticks, limit),
    }
}

fn run_cmd(
    config_path: Option<PathBuf>,
    ticks: Option<PathBuf>,
    symbols: Vec<String>,
    seed: Option<u64>,
    out: PathBuf,
) -> Result<()> {
    let report = match (config_path, ticks) {
        (Some(path), None) => {
            if symbols.is_empty() {
                bail!("--symbol is required with --config");
            }
            let mut cfg = BacktestConfig::from_file(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            if let Some(seed) = seed {
                cfg = cfg.with_seed(seed);
            }
            BacktestRunner::from_config(&cfg, &symbols, &out)?.run()?
        }
        (None, Some(path)) => {
            let replayer = MarketDataReplayer::from_csv_path(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            let universe = replayer.symbols().clone();
            let broker = SimulatedBroker::new(ExecutionEngine::new(), Ledger::new(), universe);
            let writer = ArtifactWriter::new(&out)?;
            BacktestRunner::new(replayer, broker, writer).run()?
        }
        _ => bail!("exactly one of --config or --ticks is required"),
    };

    print_summary(&report);
    Ok(())
}

fn sweep_cmd(
    config_path: PathBuf,
    symbols: Vec<String>,
    runs: usize,
    master_seed: Option<u64>,
    out: PathBuf,
) -> Result<()> {
    let cfg = BacktestConfig::from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let master = master_seed.unwrap_or(cfg.seed);
    let seeds = derive_seeds(master, runs);

    let results = run_seed_sweep(&cfg, &symbols, &seeds, &out)?;

    println!("{:>20}  {:>14}  {:>14}  {:>6}", "seed", "realised_pnl", "cash", "fills");
    for run in &results {
        println!(
            "{:>20}  {:>14.4}  {:>14.4}  {:>6}",
            run.seed, run.stats.realised_pnl, run.stats.cash, run.stats.fills
        );
    }
    println!("{} runs written under {}", results.len(), out.display());
    Ok(())
}

fn replay_cmd(ticks: PathBuf, limit: Option<usize>) -> Result<()> {
    let replayer = MarketDataReplayer::from_csv_path(&ticks)
        .with_context(|| format!("loading {}", ticks.display()))?;

    let take = limit.unwrap_or(usize::MAX);
    for event in replayer.iter().take(take) {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let s = &report.stats;
    println!("events:       {}", s.events);
    println!("orders:       {}", s.orders);
    println!("fills:        {}", s.fills);
    println!("realised_pnl: {:.4}", s.realised_pnl);
    println!("cash:         {:.4}", s.cash);
    println!("Artifacts saved to: {}", report.artifacts.dir.display());
}
