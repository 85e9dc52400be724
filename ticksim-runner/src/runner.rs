//! Backtest orchestration.
//!
//! `BacktestRunner` owns one replayer, one simulated broker, and one artefact
//! writer. It has no matching or accounting logic of its own: it drains the
//! replayer into the broker in iterator order, gives an optional strategy hook
//! a look after each event, then reports the final stats.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ticksim_core::{
    Broker, BrokerError, ExecutionEngine, Ledger, MarketDataReplayer, MarketEvent, ReplayError,
    SimulatedBroker,
};

use crate::artifacts::{ArtifactPaths, ArtifactWriter, Manifest};
use crate::config::{BacktestConfig, ConfigError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),
    #[error("artefact error: {0:#}")]
    Artifact(anyhow::Error),
    #[error("seed {0} appears more than once in the sweep")]
    DuplicateSeed(u64),
}

/// Decision hook invoked once per event, after the broker has matched it.
///
/// Orders submitted here therefore fill no earlier than the next event for
/// their symbol.
pub trait Strategy {
    fn on_event<B: Broker>(&mut self, event: &MarketEvent, broker: &mut B)
        -> Result<(), BrokerError>;
}

/// Strategy that never trades.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStrategy;

impl Strategy for NullStrategy {
    fn on_event<B: Broker>(&mut self, _: &MarketEvent, _: &mut B) -> Result<(), BrokerError> {
        Ok(())
    }
}

/// Aggregate results of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub realised_pnl: f64,
    pub cash: f64,
    pub events: usize,
    pub fills: usize,
    pub orders: usize,
}

impl RunStats {
    /// Flat name → number view written to `stats.json`.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("realised_pnl".to_string(), self.realised_pnl),
            ("cash".to_string(), self.cash),
            ("events".to_string(), self.events as f64),
            ("fills".to_string(), self.fills as f64),
            ("orders".to_string(), self.orders as f64),
        ])
    }
}

/// Everything a finished run leaves behind.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: RunStats,
    pub artifacts: ArtifactPaths,
    /// Final broker state: order book, fill log, ledger.
    pub broker: SimulatedBroker,
}

pub struct BacktestRunner<S = NullStrategy> {
    replayer: MarketDataReplayer,
    broker: SimulatedBroker,
    writer: ArtifactWriter,
    strategy: S,
    config: Option<BacktestConfig>,
}

impl BacktestRunner<NullStrategy> {
    pub fn new(
        replayer: MarketDataReplayer,
        broker: SimulatedBroker,
        writer: ArtifactWriter,
    ) -> Self {
        Self {
            replayer,
            broker,
            writer,
            strategy: NullStrategy,
            config: None,
        }
    }

    /// Build a fresh synthetic run from config.
    ///
    /// The replay covers UTC midnight of `cfg.start` through UTC midnight of
    /// `cfg.end` inclusive. The engine, ledger, and broker are new for every
    /// call; nothing is shared with other runners.
    pub fn from_config<S: AsRef<str>>(
        cfg: &BacktestConfig,
        symbols: &[S],
        artefact_dir: impl AsRef<Path>,
    ) -> Result<Self, RunError> {
        let replayer = MarketDataReplayer::synthetic(
            cfg.start_time(),
            cfg.end_time(),
            symbols,
            cfg.seed,
            cfg.interval_minutes()?,
        )?;
        let broker = SimulatedBroker::new(
            ExecutionEngine::new(),
            Ledger::new(),
            replayer.symbols().iter().cloned(),
        );
        let writer = ArtifactWriter::new(artefact_dir).map_err(RunError::Artifact)?;

        let mut runner = Self::new(replayer, broker, writer);
        runner.config = Some(cfg.clone());
        Ok(runner)
    }
}

impl<S: Strategy> BacktestRunner<S> {
    pub fn with_strategy<T: Strategy>(self, strategy: T) -> BacktestRunner<T> {
        BacktestRunner {
            replayer: self.replayer,
            broker: self.broker,
            writer: self.writer,
            strategy,
            config: self.config,
        }
    }

    pub fn replayer(&self) -> &MarketDataReplayer {
        &self.replayer
    }

    pub fn broker(&self) -> &SimulatedBroker {
        &self.broker
    }

    /// Mutable broker access before the run starts, e.g. to seed orders.
    pub fn broker_mut(&mut self) -> &mut SimulatedBroker {
        &mut self.broker
    }

    /// Drain the replay, then write orders, fills, stats, and manifest.
    pub fn run(self) -> Result<RunReport, RunError> {
        let Self {
            replayer,
            mut broker,
            writer,
            mut strategy,
            config,
        } = self;

        let run_id = config.as_ref().map(BacktestConfig::run_id);
        log::info!(
            "run {} started: {} events, {} symbols",
            run_id.as_deref().unwrap_or("<adhoc>"),
            replayer.len(),
            broker.universe().len()
        );

        for event in &replayer {
            broker.on_market_event(event);
            strategy.on_event(event, &mut broker)?;
        }

        let stats = RunStats {
            realised_pnl: broker.ledger().realised_pnl(),
            cash: broker.get_account().cash,
            events: replayer.len(),
            fills: broker.fills().len(),
            orders: broker.order_book().len(),
        };
        log::info!(
            "run finished: realised_pnl={} cash={} fills={} orders={}",
            stats.realised_pnl,
            stats.cash,
            stats.fills,
            stats.orders
        );

        let manifest = Manifest::new(config.as_ref(), broker.universe().iter().cloned().collect());
        writer
            .write_orders(broker.order_book())
            .and_then(|_| writer.write_fills(broker.fills()))
            .and_then(|_| writer.write_stats(&stats.to_map()))
            .and_then(|_| writer.write_manifest(&manifest))
            .map_err(RunError::Artifact)?;
        log::info!("artefacts written to {}", writer.dir().display());

        Ok(RunReport {
            stats,
            artifacts: writer.paths().clone(),
            broker,
        })
    }
}
