//! Multi-symbol market data replayer.
//!
//! Merges per-symbol tick streams into one globally ordered sequence:
//! ascending timestamp, ties broken by ascending symbol name. Events sharing
//! both keep their input order. The sequence is materialised once at
//! construction; `iter()` borrows it, so a replayer can be walked any number
//! of times and always yields the same events in the same order.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{MarketEvent, DEFAULT_EVENT_SIZE};
use crate::rng::tick_rng;

/// Starting price of every synthetic symbol.
pub const SYNTHETIC_BASE_PRICE: f64 = 100.0;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("tick interval must be at least one minute")]
    ZeroInterval,

    #[error("failed to read ticks: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open tick file: {0}")]
    Io(#[from] std::io::Error),

    #[error("tick row {row}: {field} must be a finite, non-negative number")]
    InvalidTick { row: usize, field: &'static str },
}

/// A single, finite, restartable stream of market events.
#[derive(Debug, Clone, Default)]
pub struct MarketDataReplayer {
    events: Vec<MarketEvent>,
    symbols: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct TickRow {
    timestamp: DateTime<Utc>,
    symbol: String,
    price: f64,
    size: Option<f64>,
}

impl MarketDataReplayer {
    /// Build from an explicit event list, in any order.
    pub fn from_events(events: Vec<MarketEvent>) -> Self {
        let symbols = events.iter().map(|e| e.symbol.clone()).collect();
        Self::ordered(events, symbols)
    }

    /// Generate a seeded random walk for each symbol.
    ///
    /// Every symbol starts at [`SYNTHETIC_BASE_PRICE`]. At each tick from
    /// `start` through `end` inclusive, each symbol (in the caller's order)
    /// moves by a uniform draw in `[-0.5, 0.5)` and emits one event of size 1.
    /// `start > end` produces an empty stream.
    pub fn synthetic<S: AsRef<str>>(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        symbols: &[S],
        seed: u64,
        interval_minutes: u32,
    ) -> Result<Self, ReplayError> {
        if interval_minutes == 0 {
            return Err(ReplayError::ZeroInterval);
        }

        // Draw order follows the caller's symbol order; duplicates are dropped.
        let mut universe: Vec<String> = Vec::with_capacity(symbols.len());
        for s in symbols {
            let s = s.as_ref();
            if !universe.iter().any(|u| u == s) {
                universe.push(s.to_string());
            }
        }

        let step = Duration::minutes(i64::from(interval_minutes));
        let mut rng = tick_rng(seed);
        let mut prices = vec![SYNTHETIC_BASE_PRICE; universe.len()];
        let mut events = Vec::new();

        let mut ts = start;
        while ts <= end {
            for (symbol, price) in universe.iter().zip(prices.iter_mut()) {
                *price += rng.gen_range(-0.5..0.5);
                events.push(MarketEvent::new(ts, symbol.clone(), *price));
            }
            ts += step;
        }

        log::debug!(
            "generated {} synthetic ticks for {} symbols (seed {seed}, {interval_minutes}m)",
            events.len(),
            universe.len()
        );

        Ok(Self::ordered(events, universe.into_iter().collect()))
    }

    /// Load ticks from CSV with a `timestamp,symbol,price[,size]` header.
    ///
    /// Timestamps are RFC 3339. A missing or empty `size` defaults to 1.
    /// Rows with a NaN or infinite price, or a size that is not a finite
    /// non-negative number, fail with [`ReplayError::InvalidTick`]; `row`
    /// counts data rows from 1.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ReplayError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut events = Vec::new();
        for (i, row) in rdr.deserialize::<TickRow>().enumerate() {
            let row = row?;
            let invalid = |field| ReplayError::InvalidTick { row: i + 1, field };
            if !row.price.is_finite() {
                return Err(invalid("price"));
            }
            let size = row.size.unwrap_or(DEFAULT_EVENT_SIZE);
            if !size.is_finite() || size < 0.0 {
                return Err(invalid("size"));
            }
            events.push(MarketEvent {
                timestamp: row.timestamp,
                symbol: row.symbol,
                price: row.price,
                size,
            });
        }
        Ok(Self::from_events(events))
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    fn ordered(mut events: Vec<MarketEvent>, symbols: BTreeSet<String>) -> Self {
        // Stable: equal (timestamp, symbol) pairs keep input order.
        events.sort_by(|a, b| a.replay_cmp(b));
        Self { events, symbols }
    }

    /// Walk the ordered stream. Restartable: each call starts from the top.
    pub fn iter(&self) -> std::slice::Iter<'_, MarketEvent> {
        self.events.iter()
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Replay universe: every symbol the stream was built for.
    pub fn symbols(&self) -> &BTreeSet<String> {
        &self.symbols
    }
}

impl<'a> IntoIterator for &'a MarketDataReplayer {
    type Item = &'a MarketEvent;
    type IntoIter = std::slice::Iter<'a, MarketEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, h, m, 0).unwrap()
    }

    #[test]
    fn explicit_events_are_sorted_by_time_then_symbol() {
        let replayer = MarketDataReplayer::from_events(vec![
            MarketEvent::new(at(10, 1), "AAA", 3.0),
            MarketEvent::new(at(10, 0), "ZZZ", 2.0),
            MarketEvent::new(at(10, 0), "AAA", 1.0),
        ]);
        let order: Vec<(u32, &str)> = replayer
            .iter()
            .map(|e| (chrono::Timelike::minute(&e.timestamp), e.symbol.as_str()))
            .collect();
        assert_eq!(order, vec![(0, "AAA"), (0, "ZZZ"), (1, "AAA")]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let replayer = MarketDataReplayer::from_events(vec![
            MarketEvent::new(at(10, 0), "AAA", 1.0),
            MarketEvent::new(at(10, 0), "AAA", 2.0),
        ]);
        let prices: Vec<f64> = replayer.iter().map(|e| e.price).collect();
        assert_eq!(prices, vec![1.0, 2.0]);
    }

    #[test]
    fn iteration_is_restartable() {
        let replayer =
            MarketDataReplayer::synthetic(at(9, 0), at(10, 0), &["B", "A"], 1, 15).unwrap();
        let first: Vec<MarketEvent> = replayer.iter().cloned().collect();
        let second: Vec<MarketEvent> = (&replayer).into_iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5 * 2);
    }

    #[test]
    fn synthetic_is_deterministic_per_seed() {
        let a = MarketDataReplayer::synthetic(at(9, 0), at(12, 0), &["X", "Y"], 42, 5).unwrap();
        let b = MarketDataReplayer::synthetic(at(9, 0), at(12, 0), &["X", "Y"], 42, 5).unwrap();
        let c = MarketDataReplayer::synthetic(at(9, 0), at(12, 0), &["X", "Y"], 43, 5).unwrap();
        assert_eq!(a.events(), b.events());
        assert_ne!(a.events(), c.events());
    }

    #[test]
    fn synthetic_steps_stay_within_half_a_point() {
        let replayer = MarketDataReplayer::synthetic(at(0, 0), at(23, 0), &["X"], 9, 60).unwrap();
        let mut prev = SYNTHETIC_BASE_PRICE;
        for ev in &replayer {
            let step = ev.price - prev;
            assert!(step.abs() <= 0.5, "step {step} out of range");
            assert_eq!(ev.size, 1.0);
            prev = ev.price;
        }
    }

    #[test]
    fn reversed_range_is_empty_not_an_error() {
        let replayer = MarketDataReplayer::synthetic(at(12, 0), at(9, 0), &["X"], 1, 5).unwrap();
        assert!(replayer.is_empty());
        assert!(replayer.symbols().contains("X"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = MarketDataReplayer::synthetic(at(9, 0), at(10, 0), &["X"], 1, 0).unwrap_err();
        assert!(matches!(err, ReplayError::ZeroInterval));
    }

    #[test]
    fn duplicate_symbols_generate_once() {
        let replayer =
            MarketDataReplayer::synthetic(at(9, 0), at(9, 0), &["X", "X"], 1, 5).unwrap();
        assert_eq!(replayer.len(), 1);
    }

    #[test]
    fn csv_ticks_load_and_default_size() {
        let data = "timestamp,symbol,price,size\n\
                    2024-01-02T10:01:00Z,BBB,20.5,\n\
                    2024-01-02T10:00:00Z,AAA,10.0,300\n";
        let replayer = MarketDataReplayer::from_csv_reader(data.as_bytes()).unwrap();
        let events = replayer.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].symbol, "AAA");
        assert_eq!(events[0].size, 300.0);
        assert_eq!(events[1].size, DEFAULT_EVENT_SIZE);
        assert_eq!(replayer.symbols().len(), 2);
    }

    #[test]
    fn csv_without_size_column_loads() {
        let data = "timestamp,symbol,price\n2024-01-02T10:00:00Z,AAA,10.0\n";
        let replayer = MarketDataReplayer::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(replayer.events()[0].size, DEFAULT_EVENT_SIZE);
    }

    #[test]
    fn nan_size_is_rejected() {
        let data = "timestamp,symbol,price,size\n\
                    2024-01-02T10:00:00Z,AAA,99.0,10\n\
                    2024-01-02T10:01:00Z,AAA,99.0,NaN\n";
        let err = MarketDataReplayer::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidTick { row: 2, field: "size" }));
    }

    #[test]
    fn infinite_price_is_rejected() {
        let data = "timestamp,symbol,price\n2024-01-02T10:00:00Z,AAA,inf\n";
        let err = MarketDataReplayer::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidTick { row: 1, field: "price" }));
    }

    #[test]
    fn negative_size_is_rejected() {
        let data = "timestamp,symbol,price,size\n2024-01-02T10:00:00Z,AAA,10.0,-5\n";
        let err = MarketDataReplayer::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidTick { row: 1, field: "size" }));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn malformed_csv_is_an_error() {
        let data = "timestamp,symbol,price\nnot-a-time,AAA,10.0\n";
        assert!(MarketDataReplayer::from_csv_reader(data.as_bytes()).is_err());
    }
}
