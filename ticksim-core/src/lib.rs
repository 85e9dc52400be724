//! ticksim core: deterministic backtest simulation.
//!
//! This crate contains the in-process simulation engine:
//! - Domain types (market events, orders, fills, FIFO lots, positions)
//! - Multi-symbol replayer with a total (timestamp, symbol) event order
//! - Execution engine matching market and limit orders one event at a time
//! - FIFO cost-basis ledger (cash, lots, realised P&L)
//! - Broker capability trait and the simulated broker binding engine + ledger
//!
//! Everything here is single-threaded and owned per run. Parallel sweeps build
//! one engine/ledger/broker triple per run instead of sharing state.

pub mod broker;
pub mod data;
pub mod domain;
pub mod engine;
pub mod ledger;
pub mod rng;

pub use broker::{Account, Broker, BrokerError, OrderFilter, SimulatedBroker};
pub use data::{MarketDataReplayer, ReplayError};
pub use domain::{
    Fill, MarketEvent, Order, OrderId, OrderSide, OrderStatus, OrderType, Position, PositionLot,
};
pub use engine::{ExecutionEngine, ExecutionError};
pub use ledger::Ledger;
