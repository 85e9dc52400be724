//! Execution engine: matches open orders against one market event at a time.
//!
//! Per-order state machine: submitted → resting (zero or more partial fills)
//! → filled | cancelled. Terminal orders leave the open set immediately and
//! are never revisited.
//!
//! Matching rules:
//! - Market orders fill their whole remaining quantity at the event price.
//!   The event's size does not constrain them.
//! - Limit orders fill `min(remaining, event.size)` when the event price is at
//!   or through the limit. Partial fills accumulate across events.
//! - Every qualifying order is matched against the event's full nominal size;
//!   competing orders on one tick do not deplete a shared pool.

use crate::domain::{Fill, MarketEvent, Order, OrderId, OrderStatus, OrderType};

use super::open_orders::OpenOrders;
use super::ExecutionError;

/// Holds open orders and turns market events into fills.
///
/// One engine belongs to exactly one run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionEngine {
    open: OpenOrders,
}

impl ExecutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an order. It becomes eligible from the next processed event.
    pub fn submit(&mut self, order: Order) -> Result<(), ExecutionError> {
        log::debug!(
            "submit {} {} {} x{} ({})",
            order.id,
            order.side,
            order.symbol,
            order.qty,
            order.order_type.name()
        );
        self.open.insert(order)
    }

    /// Remove an open order. Unknown or already-terminal ids are a no-op.
    pub fn cancel(&mut self, order_id: &OrderId) -> Option<Order> {
        let mut order = self.open.remove(order_id)?;
        order.status = OrderStatus::Cancelled;
        log::debug!("cancel {order_id} (filled {}/{})", order.filled_qty, order.qty);
        Some(order)
    }

    /// Match every open order on `event.symbol`, in submission order.
    ///
    /// Returned fills carry unsigned quantities in that same order.
    pub fn process_event(&mut self, event: &MarketEvent) -> Vec<Fill> {
        let mut fills = Vec::new();
        let mut completed = Vec::new();

        for (seq, order) in self.open.for_symbol_mut(&event.symbol) {
            let Some(qty) = match_order(order, event) else {
                continue;
            };
            log::trace!(
                "fill {} {} x{} @ {} ({}/{})",
                order.id,
                order.symbol,
                qty,
                event.price,
                order.filled_qty,
                order.qty
            );
            fills.push(Fill {
                order_id: order.id.clone(),
                symbol: order.symbol.clone(),
                qty,
                price: event.price,
                timestamp: event.timestamp,
            });
            if order.status == OrderStatus::Filled {
                completed.push(seq);
            }
        }

        self.open.remove_seqs(&completed);
        fills
    }

    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.open.get(order_id)
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.open.contains(order_id)
    }

    /// Open orders in submission order.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.open.iter()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

/// Apply one event to one order, returning the executed increment.
fn match_order(order: &mut Order, event: &MarketEvent) -> Option<f64> {
    if !order.crosses(event.price) {
        return None;
    }

    let remaining = order.remaining_qty();
    let qty = match order.order_type {
        OrderType::Market => remaining,
        // `f64::min` would ignore a NaN size and fill the whole remainder.
        OrderType::Limit { .. } if event.size.is_nan() => return None,
        OrderType::Limit { .. } => remaining.min(event.size),
    };
    if qty.is_nan() || qty <= 0.0 {
        return None;
    }

    if qty >= remaining {
        // Set exactly so float accumulation cannot leave a sliver open.
        order.filled_qty = order.qty;
        order.status = OrderStatus::Filled;
    } else {
        order.filled_qty += qty;
    }
    Some(qty)
}
