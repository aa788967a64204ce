//! Whole-stream helpers: a left fold of trades through a fresh engine.

use serde::Serialize;
use std::fmt;

use crate::{
    engine::{EngineSnapshot, MatchError, MatchingEngine},
    types::{Totals, Trade},
};

/// A trade stream that aborted.
///
/// `partial` holds the accumulators at the moment of failure. They are for
/// diagnostics only and must never be reported as a final gain.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StreamFailure {
    pub error: MatchError,
    pub partial: Totals,
    /// Trades accepted before the failing one.
    pub trades_applied: usize,
}

impl fmt::Display for StreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (after {} accepted trades)",
            self.error, self.trades_applied
        )
    }
}

// Display already includes `error`, so no `source()` to avoid printing it twice.
impl std::error::Error for StreamFailure {}

/// Run `trades` through a fresh engine, stopping at the first failure.
pub fn run_stream<I>(trades: I) -> Result<Totals, StreamFailure>
where
    I: IntoIterator<Item = Trade>,
{
    run_stream_observed(trades, |_, _| {})
}

/// Like [`run_stream`], calling `observer` after every accepted trade.
///
/// The observer only sees read-only snapshots; it cannot change results.
/// Trades after the first failure are never pulled from the iterator.
pub fn run_stream_observed<I, F>(trades: I, mut observer: F) -> Result<Totals, StreamFailure>
where
    I: IntoIterator<Item = Trade>,
    F: FnMut(&Trade, &EngineSnapshot),
{
    let mut engine = MatchingEngine::new();
    for trade in trades {
        if engine.apply(&trade).is_err() {
            break;
        }
        observer(&trade, &engine.snapshot());
    }
    engine.finish()
}
