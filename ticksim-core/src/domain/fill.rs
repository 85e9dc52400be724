use crate::domain::ids::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fill record.
///
/// The engine emits `qty` as an unsigned increment. The broker re-signs it
/// from the originating order's side before it reaches the ledger and the
/// fill log: positive for buys, negative for sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub symbol: String,
    pub qty: f64,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl Fill {
    pub fn is_buy(&self) -> bool {
        self.qty > 0.0
    }

    pub fn is_sell(&self) -> bool {
        self.qty < 0.0
    }

    /// Absolute traded value of this fill.
    pub fn notional(&self) -> f64 {
        self.qty.abs() * self.price
    }
}
