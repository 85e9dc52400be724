//! Open-order registry.
//!
//! Holds every order that has been submitted and has not yet reached a
//! terminal state. Orders are keyed by a monotonically increasing submission
//! sequence so iteration always follows submission order, independent of
//! how order ids hash.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{Order, OrderId};

use super::ExecutionError;

#[derive(Debug, Clone, Default)]
pub struct OpenOrders {
    /// Submission sequence -> order.
    orders: BTreeMap<u64, Order>,
    /// Order id -> submission sequence.
    index: HashMap<OrderId, u64>,
    next_seq: u64,
}

impl OpenOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an order at the back of the submission queue.
    pub fn insert(&mut self, order: Order) -> Result<(), ExecutionError> {
        if self.index.contains_key(&order.id) {
            return Err(ExecutionError::DuplicateOrder(order.id));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(order.id.clone(), seq);
        self.orders.insert(seq, order);
        Ok(())
    }

    pub fn remove(&mut self, id: &OrderId) -> Option<Order> {
        let seq = self.index.remove(id)?;
        self.orders.remove(&seq)
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.index.get(id).and_then(|seq| self.orders.get(seq))
    }

    pub fn contains(&self, id: &OrderId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Open orders in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Mutable access to the open orders of one symbol, in submission order.
    pub(crate) fn for_symbol_mut<'a>(
        &'a mut self,
        symbol: &'a str,
    ) -> impl Iterator<Item = (u64, &'a mut Order)> + 'a {
        self.orders
            .iter_mut()
            .filter(move |(_, order)| order.symbol == symbol)
            .map(|(seq, order)| (*seq, order))
    }

    /// Drop orders by submission sequence.
    pub(crate) fn remove_seqs(&mut self, seqs: &[u64]) {
        for seq in seqs {
            if let Some(order) = self.orders.remove(seq) {
                self.index.remove(&order.id);
            }
        }
    }
}
