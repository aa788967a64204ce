//! Matching engine: applies one trade at a time to the lot queue.
//!
//! # Per-trade protocol
//! 1. ordering check (`trade_id` must not decrease)
//! 2. fee accrual (always, even for an unknown side)
//! 3. side dispatch: BUY opens a lot, SELL runs the FIFO match loop
//!
//! Any [`MatchError`] aborts the stream. The engine then stays `Aborted`:
//! further `apply` calls return the same error and change nothing.
//!
//! # Determinism
//! Two engines fed the same trades produce identical totals and failures.

use serde::Serialize;
use std::fmt;

use crate::{
    lots::LotQueue,
    stream::StreamFailure,
    types::{Lot, Side, Totals, Trade},
    QUANTITY_EPSILON,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Data-quality failures in the trade stream. All are fatal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum MatchError {
    /// `offending_id` is lower than the previously accepted id.
    OutOfOrderTrade { last_id: u64, offending_id: u64 },
    /// A SELL could not be matched against recorded BUYs; carries the unmatched quantity.
    InsufficientHistory { requested_quantity: f64 },
    /// The side was neither BUY nor SELL.
    UnknownSide { value: String },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrderTrade {
                last_id,
                offending_id,
            } => write!(
                f,
                "trades out of order: trade id {offending_id} follows trade id {last_id}"
            ),
            Self::InsufficientHistory { requested_quantity } => write!(
                f,
                "not enough buy history to calculate the gain from the current sale of quantity {requested_quantity}"
            ),
            Self::UnknownSide { value } => write!(
                f,
                "trade side was neither BUY nor SELL but was {value:?}"
            ),
        }
    }
}

impl std::error::Error for MatchError {}

// ---------------------------------------------------------------------------
// State + snapshot
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EngineState {
    AwaitingTrade,
    Aborted,
}

/// Point-in-time read-only view for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub state: EngineState,
    /// Open lots, oldest first.
    pub lots: Vec<Lot>,
    pub gain: f64,
    pub fees: f64,
    pub last_trade_id: Option<u64>,
    pub trades_applied: usize,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct MatchingEngine {
    lots: LotQueue,
    totals: Totals,
    /// `None` until the first trade is accepted.
    last_trade_id: Option<u64>,
    trades_applied: usize,
    failure: Option<MatchError>,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            lots: LotQueue::new(),
            totals: Totals::default(),
            last_trade_id: None,
            trades_applied: 0,
            failure: None,
        }
    }

    /// Apply one trade.
    ///
    /// # Errors
    /// Returns [`MatchError`] on the first invalid trade. Accumulators keep
    /// whatever was applied before the failure point (including this trade's
    /// fee for `UnknownSide`, and any SELL fragments already matched for
    /// `InsufficientHistory`).
    pub fn apply(&mut self, trade: &Trade) -> Result<(), MatchError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        match self.apply_inner(trade) {
            Ok(()) => {
                self.trades_applied += 1;
                Ok(())
            }
            Err(err) => {
                tracing::debug!(
                    trade_id = trade.trade_id,
                    error = %err,
                    gain = self.totals.gain,
                    fees = self.totals.fees,
                    "trade stream aborted"
                );
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    fn apply_inner(&mut self, trade: &Trade) -> Result<(), MatchError> {
        if let Some(last_id) = self.last_trade_id {
            if trade.trade_id < last_id {
                return Err(MatchError::OutOfOrderTrade {
                    last_id,
                    offending_id: trade.trade_id,
                });
            }
        }
        self.last_trade_id = Some(trade.trade_id);

        // fee first: a malformed side still contributes its fee
        self.totals.fees += trade.fee;

        match &trade.side {
            Side::Buy => {
                self.lots.push_lot(trade.quantity, trade.price);
                Ok(())
            }
            Side::Sell => self.match_sale(trade.quantity, trade.price),
            Side::Other(value) => Err(MatchError::UnknownSide {
                value: value.clone(),
            }),
        }
    }

    /// FIFO match loop for a SELL of `quantity` at `sale_price`.
    fn match_sale(&mut self, mut quantity: f64, sale_price: f64) -> Result<(), MatchError> {
        while quantity > QUANTITY_EPSILON {
            let consumed = self
                .lots
                .peek_front_and_consume(quantity)
                .map_err(|_| MatchError::InsufficientHistory {
                    requested_quantity: quantity,
                })?;
            self.totals.gain += (sale_price - consumed.unit_price) * consumed.quantity;
            quantity -= consumed.quantity;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    pub fn state(&self) -> EngineState {
        if self.failure.is_some() {
            EngineState::Aborted
        } else {
            EngineState::AwaitingTrade
        }
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn lots(&self) -> &LotQueue {
        &self.lots
    }

    pub fn last_trade_id(&self) -> Option<u64> {
        self.last_trade_id
    }

    pub fn trades_applied(&self) -> usize {
        self.trades_applied
    }

    /// The failure that aborted this engine, if any.
    pub fn failure(&self) -> Option<&MatchError> {
        self.failure.as_ref()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state(),
            lots: self.lots.iter().copied().collect(),
            gain: self.totals.gain,
            fees: self.totals.fees,
            last_trade_id: self.last_trade_id,
            trades_applied: self.trades_applied,
        }
    }

    /// End of stream. Consumes the engine, so a completed stream cannot be fed again.
    ///
    /// # Errors
    /// Returns the abort failure with the partial (untrusted) totals.
    pub fn finish(self) -> Result<Totals, StreamFailure> {
        match self.failure {
            None => Ok(self.totals),
            Some(error) => Err(StreamFailure {
                error,
                partial: self.totals,
                trades_applied: self.trades_applied,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
