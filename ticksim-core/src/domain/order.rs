//! Order types and lifecycle states.

use super::ids::OrderId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for buys, -1 for sells. Used to sign fill quantities for the ledger.
    pub fn sign(self) -> f64 {
        match self {
            OrderSide::Buy => 1.0,
            OrderSide::Sell => -1.0,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// What kind of order and its price parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderType {
    /// Fills its whole remaining quantity at the next event's price.
    Market,
    /// Fills at the event price when it is at or better than `limit_price`.
    Limit { limit_price: f64 },
}

impl OrderType {
    pub fn name(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit { .. } => "limit",
        }
    }
}

/// Order lifecycle states. `Filled` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Open)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "open"),
            OrderStatus::Filled => write!(f, "filled"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A single order.
///
/// `qty` is an unsigned magnitude; direction lives in `side`. `filled_qty`
/// only grows, and never beyond `qty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub qty: f64,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub filled_qty: f64,
    pub status: OrderStatus,
}

impl Order {
    pub fn market(
        id: impl Into<OrderId>,
        symbol: impl Into<String>,
        side: OrderSide,
        qty: f64,
    ) -> Self {
        Self::new(id.into(), symbol.into(), side, OrderType::Market, qty)
    }

    pub fn limit(
        id: impl Into<OrderId>,
        symbol: impl Into<String>,
        side: OrderSide,
        qty: f64,
        limit_price: f64,
    ) -> Self {
        Self::new(
            id.into(),
            symbol.into(),
            side,
            OrderType::Limit { limit_price },
            qty,
        )
    }

    fn new(id: OrderId, symbol: String, side: OrderSide, order_type: OrderType, qty: f64) -> Self {
        Self {
            id,
            symbol,
            qty,
            side,
            order_type,
            filled_qty: 0.0,
            status: OrderStatus::Open,
        }
    }

    pub fn remaining_qty(&self) -> f64 {
        self.qty - self.filled_qty
    }

    pub fn limit_price(&self) -> Option<f64> {
        match self.order_type {
            OrderType::Limit { limit_price } => Some(limit_price),
            OrderType::Market => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// Whether a trade at `price` satisfies this order's price condition.
    pub fn crosses(&self, price: f64) -> bool {
        match (self.order_type, self.side) {
            (OrderType::Market, _) => true,
            (OrderType::Limit { limit_price }, OrderSide::Buy) => price <= limit_price,
            (OrderType::Limit { limit_price }, OrderSide::Sell) => price >= limit_price,
        }
    }
}
