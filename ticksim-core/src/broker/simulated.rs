//! Simulated broker: binds one execution engine and one ledger.
//!
//! This is the only place a fill's sign is decided: the engine emits unsigned
//! increments, and the broker signs each from the originating order's side
//! before the ledger sees it.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{Fill, MarketEvent, Order, OrderId, OrderStatus, OrderType, Position};
use crate::engine::ExecutionEngine;
use crate::ledger::Ledger;

use super::{Account, Broker, BrokerError, OrderFilter};

#[derive(Debug, Clone)]
pub struct SimulatedBroker {
    engine: ExecutionEngine,
    ledger: Ledger,
    universe: BTreeSet<String>,
    /// Every order ever accepted, in submission order, with its latest state.
    book: Vec<Order>,
    /// Order id -> position in `book`, for all accepted orders.
    book_index: HashMap<OrderId, usize>,
    /// Order id -> position in `book`, for non-terminal orders only.
    open_index: HashMap<OrderId, usize>,
    /// Append-only log of signed fills.
    fills: Vec<Fill>,
}

impl SimulatedBroker {
    /// Wire an engine and a ledger together for one run.
    ///
    /// `universe` is the set of symbols the replay will emit events for;
    /// orders on any other symbol are rejected at submission.
    pub fn new(
        engine: ExecutionEngine,
        ledger: Ledger,
        universe: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut broker = Self {
            engine,
            ledger,
            universe: universe.into_iter().map(Into::into).collect(),
            book: Vec::new(),
            book_index: HashMap::new(),
            open_index: HashMap::new(),
            fills: Vec::new(),
        };
        // Adopt anything already resting in the engine so every fill can be signed.
        let resting: Vec<Order> = broker.engine.open_orders().cloned().collect();
        for order in resting {
            broker.record(order);
        }
        broker
    }

    fn record(&mut self, order: Order) {
        let idx = self.book.len();
        self.book_index.insert(order.id.clone(), idx);
        if order.is_open() {
            self.open_index.insert(order.id.clone(), idx);
        }
        self.book.push(order);
    }

    fn validate(&self, order: &Order) -> Result<(), BrokerError> {
        if !self.universe.contains(&order.symbol) {
            return Err(BrokerError::UnknownSymbol(order.symbol.clone()));
        }
        if !order.qty.is_finite() || order.qty <= 0.0 {
            return Err(BrokerError::InvalidQuantity {
                id: order.id.clone(),
                qty: order.qty,
            });
        }
        if let OrderType::Limit { limit_price } = order.order_type {
            if !limit_price.is_finite() || limit_price <= 0.0 {
                return Err(BrokerError::InvalidLimitPrice {
                    id: order.id.clone(),
                    price: limit_price,
                });
            }
        }
        if self.book_index.contains_key(&order.id) {
            return Err(BrokerError::DuplicateOrder(order.id.clone()));
        }
        Ok(())
    }

    /// Feed one event through the engine and book the resulting fills.
    ///
    /// Returns the signed fills produced by this event, in engine order.
    pub fn on_market_event(&mut self, event: &MarketEvent) -> Vec<Fill> {
        let raw = self.engine.process_event(event);
        let mut signed = Vec::with_capacity(raw.len());

        for mut fill in raw {
            let Some(&idx) = self.open_index.get(&fill.order_id) else {
                log::warn!("dropping fill for untracked order {}", fill.order_id);
                continue;
            };
            let order = &mut self.book[idx];
            fill.qty *= order.side.sign();

            match self.engine.get(&order.id) {
                Some(resting) => order.filled_qty = resting.filled_qty,
                None => {
                    order.filled_qty = order.qty;
                    order.status = OrderStatus::Filled;
                    self.open_index.remove(&fill.order_id);
                }
            }

            self.ledger.apply_fill(&fill);
            self.fills.push(fill.clone());
            signed.push(fill);
        }

        signed
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Every accepted order in submission order, including terminal ones.
    pub fn order_book(&self) -> &[Order] {
        &self.book
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    pub fn universe(&self) -> &BTreeSet<String> {
        &self.universe
    }
}

impl Broker for SimulatedBroker {
    fn submit_order(&mut self, mut order: Order) -> Result<Order, BrokerError> {
        self.validate(&order)?;
        order.filled_qty = 0.0;
        order.status = OrderStatus::Open;
        self.engine.submit(order.clone())?;
        self.record(order.clone());
        Ok(order)
    }

    fn cancel_order(&mut self, order_id: &OrderId) -> Option<Order> {
        let cancelled = self.engine.cancel(order_id)?;
        let idx = self.open_index.remove(order_id)?;
        let order = &mut self.book[idx];
        order.filled_qty = cancelled.filled_qty;
        order.status = OrderStatus::Cancelled;
        Some(order.clone())
    }

    fn get_order(&self, order_id: &OrderId) -> Result<Order, BrokerError> {
        self.book_index
            .get(order_id)
            .map(|&idx| self.book[idx].clone())
            .ok_or_else(|| BrokerError::OrderNotFound(order_id.clone()))
    }

    fn list_orders(&self, filter: OrderFilter) -> Vec<Order> {
        self.book
            .iter()
            .filter(|o| filter.matches(o.status))
            .cloned()
            .collect()
    }

    fn get_position(&self, symbol: &str) -> Result<Position, BrokerError> {
        if !self.universe.contains(symbol) {
            return Err(BrokerError::UnknownSymbol(symbol.to_string()));
        }
        Ok(self
            .ledger
            .position(symbol)
            .cloned()
            .unwrap_or_else(|| Position::new(symbol)))
    }

    fn list_positions(&self) -> Vec<Position> {
        self.ledger
            .positions()
            .filter(|p| !p.is_flat())
            .cloned()
            .collect()
    }

    fn get_account(&self) -> Account {
        Account {
            cash: self.ledger.cash(),
        }
    }
}
