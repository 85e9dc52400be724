use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One FIFO unit of inventory: a quantity acquired at one price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionLot {
    pub qty: f64,
    pub price: f64,
}

impl PositionLot {
    pub fn new(qty: f64, price: f64) -> Self {
        Self { qty, price }
    }
}

/// Inventory for one symbol, oldest lot at the front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub lots: VecDeque<PositionLot>,
}

impl Position {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            lots: VecDeque::new(),
        }
    }

    /// Total quantity held across all lots.
    pub fn quantity(&self) -> f64 {
        self.lots.iter().map(|l| l.qty).sum()
    }

    /// Sum of `qty * price` over remaining lots.
    pub fn cost_basis(&self) -> f64 {
        self.lots.iter().map(|l| l.qty * l.price).sum()
    }

    /// Volume-weighted entry price of remaining lots, `None` when flat.
    pub fn average_price(&self) -> Option<f64> {
        let qty = self.quantity();
        if qty > 0.0 {
            Some(self.cost_basis() / qty)
        } else {
            None
        }
    }

    pub fn is_flat(&self) -> bool {
        self.lots.is_empty()
    }
}
