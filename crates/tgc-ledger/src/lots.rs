//! FIFO lot queue.
//!
//! Open BUY lots in creation order. Only the matching engine mutates it.
//! Every lot held has `remaining_quantity > QUANTITY_EPSILON`, except when a
//! caller pushes a non-positive quantity (debug builds assert on that).

use std::collections::VecDeque;
use std::fmt;

use crate::{types::Lot, QUANTITY_EPSILON};

/// Returned by [`LotQueue::peek_front_and_consume`] when no lots remain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyQueue;

impl fmt::Display for EmptyQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("lot queue is empty")
    }
}

impl std::error::Error for EmptyQueue {}

/// Result of consuming from the front lot.
///
/// `quantity` is less than requested when the front lot was exhausted; the
/// caller re-requests the shortfall from the next lot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Consumed {
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LotQueue {
    lots: VecDeque<Lot>,
}

impl LotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new lot at the tail.
    pub fn push_lot(&mut self, quantity: f64, price: f64) {
        self.lots.push_back(Lot::new(quantity, price));
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Lots oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }

    /// Consume up to `requested` from the front lot.
    ///
    /// Split-or-exhaust:
    /// - front lot covers the request (within epsilon): shrink it, drop it if
    ///   the remainder is at or below epsilon, return the full request
    /// - otherwise: drop the front lot and return its whole remaining quantity
    pub fn peek_front_and_consume(&mut self, requested: f64) -> Result<Consumed, EmptyQueue> {
        let front = self.lots.front_mut().ok_or(EmptyQueue)?;
        let unit_price = front.unit_price;

        if front.remaining_quantity >= requested - QUANTITY_EPSILON {
            front.remaining_quantity -= requested;
            if front.remaining_quantity <= QUANTITY_EPSILON {
                self.lots.pop_front();
            }
            return Ok(Consumed {
                quantity: requested,
                unit_price,
            });
        }

        let quantity = front.remaining_quantity;
        self.lots.pop_front();
        Ok(Consumed {
            quantity,
            unit_price,
        })
    }
}

impl fmt::Display for LotQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, lot) in self.lots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{lot}")?;
        }
        f.write_str("]")
    }
}
