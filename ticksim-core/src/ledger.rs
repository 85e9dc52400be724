//! FIFO cost-basis ledger.
//!
//! Converts a stream of signed fills into per-symbol lot queues, a cash
//! balance, and realised P&L. Positive fill quantity is a buy, negative a
//! sell. Sells consume the oldest lots first.
//!
//! Invariants:
//! - per symbol, remaining lot quantity == bought − sold-and-matched
//! - `realised_pnl` only moves on sells
//! - `cash == initial_cash − Σ buy notional + Σ sell notional`

use std::collections::BTreeMap;

use crate::domain::{Fill, Position, PositionLot};

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    positions: BTreeMap<String, Position>,
    realised_pnl: f64,
    cash: f64,
    initial_cash: f64,
    unmatched_sell_qty: f64,
}

impl Ledger {
    /// Empty ledger with zero cash.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cash(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            ..Self::default()
        }
    }

    /// Apply one signed fill.
    pub fn apply_fill(&mut self, fill: &Fill) {
        if fill.is_buy() {
            self.apply_buy(fill);
        } else if fill.is_sell() {
            self.apply_sell(fill);
        }
    }

    fn apply_buy(&mut self, fill: &Fill) {
        self.positions
            .entry(fill.symbol.clone())
            .or_insert_with(|| Position::new(fill.symbol.clone()))
            .lots
            .push_back(PositionLot::new(fill.qty, fill.price));
        self.cash -= fill.notional();
    }

    fn apply_sell(&mut self, fill: &Fill) {
        let mut qty_to_close = fill.qty.abs();

        if let Some(position) = self.positions.get_mut(&fill.symbol) {
            while qty_to_close > 0.0 {
                let Some(lot) = position.lots.front_mut() else {
                    break;
                };
                let take = lot.qty.min(qty_to_close);
                self.realised_pnl += take * (fill.price - lot.price);
                lot.qty -= take;
                qty_to_close -= take;
                if lot.qty <= 0.0 {
                    position.lots.pop_front();
                }
            }
        }

        if qty_to_close > 0.0 {
            // No short inventory is modelled; the excess is dropped.
            self.unmatched_sell_qty += qty_to_close;
            log::debug!(
                "sell of {} {} exceeded holdings by {qty_to_close}",
                fill.qty.abs(),
                fill.symbol
            );
        }

        self.cash += fill.notional();
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn realised_pnl(&self) -> f64 {
        self.realised_pnl
    }

    /// Total sell quantity that found no lot to close against.
    pub fn unmatched_sell_qty(&self) -> f64 {
        self.unmatched_sell_qty
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// All tracked positions, sorted by symbol. May include flat ones.
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }
}
