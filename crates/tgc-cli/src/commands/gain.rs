//! `tgc gain`: stream a trades CSV through the FIFO matching engine.
//!
//! Reading is lazy. The first engine failure stops the stream, so rows after
//! a bad record are never parsed.

use anyhow::{Context, Result};
use serde::Serialize;
use std::process::ExitCode;

use tgc_config::Settings;
use tgc_ingest::{IngestError, TradeReader};
use tgc_ledger::{run_stream_observed, EngineSnapshot, StreamFailure, Totals, Trade};

/// Result of one stream: either final totals or an abort with partial totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GainOutcome {
    Completed { totals: Totals, trades: usize },
    Aborted(StreamFailure),
}

/// Execute `tgc gain`.
///
/// An engine abort is already fully reported by the rendered outcome, so it
/// maps to a failure exit code rather than an `Err`.
pub fn run(settings: &Settings, json: bool) -> Result<ExitCode> {
    let outcome = stream_file(settings)?;

    if json {
        println!("{}", render_json(&outcome, settings.decimals)?);
    } else {
        match &outcome {
            GainOutcome::Completed { .. } => print!("{}", render_text(&outcome, settings.decimals)),
            GainOutcome::Aborted(_) => eprint!("{}", render_text(&outcome, settings.decimals)),
        }
    }

    Ok(match outcome {
        GainOutcome::Completed { .. } => ExitCode::SUCCESS,
        GainOutcome::Aborted(_) => ExitCode::FAILURE,
    })
}

/// Feed every row of `settings.input_path` to a fresh engine.
///
/// IO and parse errors are returned as `Err`; data-quality failures detected
/// by the engine come back as `Ok(GainOutcome::Aborted)`.
pub fn stream_file(settings: &Settings) -> Result<GainOutcome> {
    let reader = TradeReader::from_path(&settings.input_path, settings.columns.clone())
        .with_context(|| format!("cannot read trades from {}", settings.input_path))?;

    tracing::debug!(path = %settings.input_path, "streaming trades");

    // the first bad row ends the stream and is reported instead of any totals
    let mut bad_row: Option<IngestError> = None;
    let trades = reader.map_while(|rec| match rec {
        Ok(trade) => Some(trade),
        Err(e) => {
            bad_row = Some(e);
            None
        }
    });

    let mut accepted = 0usize;
    let result = run_stream_observed(trades, |trade, snap| {
        accepted = snap.trades_applied;
        if settings.debug {
            log_progress(trade, snap);
        }
    });

    if let Some(e) = bad_row {
        let context = format!("bad trade record in {}", settings.input_path);
        return Err(anyhow::Error::new(e).context(context));
    }

    Ok(match result {
        Ok(totals) => GainOutcome::Completed {
            totals,
            trades: accepted,
        },
        Err(failure) => GainOutcome::Aborted(failure),
    })
}

fn log_progress(trade: &Trade, snap: &EngineSnapshot) {
    let lots: Vec<String> = snap.lots.iter().map(ToString::to_string).collect();
    tracing::debug!(
        trade_id = trade.trade_id,
        side = %trade.side,
        quantity = trade.quantity,
        price = trade.price,
        "current trade"
    );
    tracing::debug!(
        lots = %format!("[{}]", lots.join(", ")),
        gain = snap.gain,
        "past buys for calculating gain"
    );
}

pub fn render_text(outcome: &GainOutcome, decimals: u32) -> String {
    let d = decimals as usize;
    match outcome {
        GainOutcome::Completed { totals, .. } => {
            let t = totals.rounded(decimals);
            format!("Gain: {:.d$}\nFees: {:.d$}\n", t.gain, t.fees)
        }
        GainOutcome::Aborted(failure) => {
            let t = failure.partial.rounded(decimals);
            format!(
                "Gain calculation aborted: {}\n\
                 Partial totals at failure (not a valid result): gain={:.d$} fees={:.d$} after {} trades\n",
                failure.error, t.gain, t.fees, failure.trades_applied
            )
        }
    }
}

pub fn render_json(outcome: &GainOutcome, decimals: u32) -> Result<String> {
    let rounded = match outcome {
        GainOutcome::Completed { totals, trades } => GainOutcome::Completed {
            totals: totals.rounded(decimals),
            trades: *trades,
        },
        GainOutcome::Aborted(failure) => GainOutcome::Aborted(StreamFailure {
            partial: failure.partial.rounded(decimals),
            ..failure.clone()
        }),
    };
    serde_json::to_string(&rounded).context("serialize gain outcome failed")
}
