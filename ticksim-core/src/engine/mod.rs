//! Order matching: open-order registry and the per-event execution engine.

pub mod execution;
pub mod open_orders;

pub use execution::ExecutionEngine;
pub use open_orders::OpenOrders;

use crate::domain::OrderId;
use thiserror::Error;

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("order {0} is already open")]
    DuplicateOrder(OrderId),
}
