//! ticksim runner: orchestration around the core simulation.
//!
//! This crate builds on `ticksim-core` to provide:
//! - TOML backtest configuration with content-addressed run ids
//! - Single-run `BacktestRunner` with an optional strategy hook
//! - CSV/JSON artefact writer (orders, fills, stats, manifest)
//! - Parallel seed sweeps, one independent run per seed

pub mod artifacts;
pub mod config;
pub mod runner;
pub mod sweep;

pub use artifacts::{read_manifest, ArtifactPaths, ArtifactWriter, Manifest, SCHEMA_VERSION};
pub use config::{parse_interval, BacktestConfig, ConfigError, RunId};
pub use runner::{BacktestRunner, NullStrategy, RunError, RunReport, RunStats, Strategy};
pub use sweep::{derive_seeds, run_seed_sweep, seed_dir, SweepRun};
