//! Market data sources: explicit, CSV-loaded, or seeded synthetic ticks.

pub mod replayer;

pub use replayer::{MarketDataReplayer, ReplayError, SYNTHETIC_BASE_PRICE};
