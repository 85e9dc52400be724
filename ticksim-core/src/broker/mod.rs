//! Broker capability surface.
//!
//! Strategy drivers talk to a [`Broker`] and never to the engine or ledger
//! directly. [`SimulatedBroker`] is the backtest implementation; a live
//! adapter would be a second implementor of the same trait, chosen where the
//! run is constructed. Callers stay generic over `B: Broker`.

pub mod simulated;

pub use simulated::SimulatedBroker;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Order, OrderId, OrderStatus, Position};
use crate::engine::ExecutionError;

/// Errors surfaced by broker operations.
///
/// All of these are caller mistakes caught at submission or lookup time; the
/// simulation path itself never fails.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("symbol '{0}' is not in the replay universe")]
    UnknownSymbol(String),

    #[error("order {0} has already been submitted")]
    DuplicateOrder(OrderId),

    #[error("order {id}: quantity must be a positive finite number, got {qty}")]
    InvalidQuantity { id: OrderId, qty: f64 },

    #[error("order {id}: limit price must be a positive finite number, got {price}")]
    InvalidLimitPrice { id: OrderId, price: f64 },

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Which orders `list_orders` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderFilter {
    Open,
    Closed,
    #[default]
    All,
}

impl OrderFilter {
    pub fn matches(self, status: OrderStatus) -> bool {
        match self {
            OrderFilter::Open => !status.is_terminal(),
            OrderFilter::Closed => status.is_terminal(),
            OrderFilter::All => true,
        }
    }
}

/// Account snapshot. Only cash is modelled; no margin or buying power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub cash: f64,
}

/// Operations a strategy driver may perform against a broker.
pub trait Broker {
    /// Validate and accept an order. Returns the order as recorded.
    fn submit_order(&mut self, order: Order) -> Result<Order, BrokerError>;

    /// Cancel an open order. Unknown or terminal ids are a no-op returning `None`.
    fn cancel_order(&mut self, order_id: &OrderId) -> Option<Order>;

    fn get_order(&self, order_id: &OrderId) -> Result<Order, BrokerError>;

    /// Orders matching `filter`, in submission order.
    fn list_orders(&self, filter: OrderFilter) -> Vec<Order>;

    /// Current position for `symbol`; flat if nothing has been bought yet.
    fn get_position(&self, symbol: &str) -> Result<Position, BrokerError>;

    /// Non-flat positions sorted by symbol.
    fn list_positions(&self) -> Vec<Position>;

    fn get_account(&self) -> Account;
}
