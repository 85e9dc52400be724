//! Seed sweeps: many independent runs of the same config.
//!
//! Each seed gets its own replayer, engine, ledger, broker, and output
//! directory (`root/seed-{seed}`). Runs share nothing, so they execute in
//! parallel on the rayon pool without locking.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use ticksim_core::rng::sub_seed;

use crate::config::BacktestConfig;
use crate::runner::{BacktestRunner, RunError, RunStats};

/// One finished sweep member.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRun {
    pub seed: u64,
    pub dir: PathBuf,
    pub stats: RunStats,
}

/// Derive `n` per-run seeds from `master`.
///
/// Seed `i` depends only on `(master, i)`.
pub fn derive_seeds(master: u64, n: usize) -> Vec<u64> {
    (0..n as u64).map(|i| sub_seed(master, "sweep", i)).collect()
}

/// Output directory for one seed under `root`.
pub fn seed_dir(root: &Path, seed: u64) -> PathBuf {
    root.join(format!("seed-{seed}"))
}

/// Run `base` once per seed, in parallel. Results keep the order of `seeds`.
///
/// Every run is attempted; if any fail, the error of the earliest failing
/// seed in `seeds` is returned. Seeds must be unique, since each one owns
/// its output directory.
pub fn run_seed_sweep<S: AsRef<str> + Sync>(
    base: &BacktestConfig,
    symbols: &[S],
    seeds: &[u64],
    root: impl AsRef<Path>,
) -> Result<Vec<SweepRun>, RunError> {
    let root = root.as_ref();
    let mut seen = BTreeSet::new();
    if let Some(&dup) = seeds.iter().find(|&&seed| !seen.insert(seed)) {
        return Err(RunError::DuplicateSeed(dup));
    }
    log::info!("sweeping {} seeds into {}", seeds.len(), root.display());

    let results: Vec<Result<SweepRun, RunError>> = seeds
        .par_iter()
        .map(|&seed| {
            let dir = seed_dir(root, seed);
            let report = BacktestRunner::from_config(&base.with_seed(seed), symbols, &dir)?.run()?;
            Ok(SweepRun {
                seed,
                dir,
                stats: report.stats,
            })
        })
        .collect();

    // Indexed collect keeps seed order, so this yields the earliest failure.
    results.into_iter().collect()
}
