//! tgc-ledger
//!
//! FIFO lot matching for a single-asset trade stream.
//! - BUY trades open lots at the tail of a FIFO queue
//! - SELL trades consume lots oldest-first and realize gain
//! - fees accrue on every trade, before side validation
//! - first invalid trade aborts the stream (no retry)
//! - Pure deterministic logic (no IO, no time)

mod engine;
mod lots;
mod stream;
mod types;

pub use engine::{EngineSnapshot, EngineState, MatchError, MatchingEngine};
pub use lots::{Consumed, EmptyQueue, LotQueue};
pub use stream::{run_stream, run_stream_observed, StreamFailure};
pub use types::{Lot, Side, Totals, Trade};

/// Remaining quantities at or below this are treated as zero.
pub const QUANTITY_EPSILON: f64 = 1.0e-14;
