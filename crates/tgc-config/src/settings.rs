//! Typed settings read from a [`LayeredConfig`].

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;

use tgc_ingest::ColumnMap;

use crate::LayeredConfig;

pub const DEFAULT_INPUT_PATH: &str = "trades.csv";
pub const DEFAULT_DECIMALS: u32 = 2;
pub const MAX_DECIMALS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub input_path: String,
    pub columns: ColumnMap,
    /// Display rounding only; arithmetic is never rounded.
    pub decimals: u32,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_path: DEFAULT_INPUT_PATH.to_string(),
            columns: ColumnMap::default(),
            decimals: DEFAULT_DECIMALS,
            debug: false,
        }
    }
}

impl Settings {
    /// Read known keys, falling back to defaults for absent ones.
    /// A present key with the wrong type is an error.
    pub fn from_layers(cfg: &LayeredConfig) -> Result<Self> {
        let mut s = Settings::default();

        if let Some(p) = opt_str(cfg, "input.path")? {
            s.input_path = p;
        }

        let cols = &mut s.columns;
        for (key, slot) in [
            ("input.columns.trade_id", &mut cols.trade_id),
            ("input.columns.side", &mut cols.side),
            ("input.columns.quantity", &mut cols.quantity),
            ("input.columns.price", &mut cols.price),
            ("input.columns.fee", &mut cols.fee),
        ] {
            if let Some(name) = opt_str(cfg, key)? {
                *slot = name;
            }
        }

        if let Some(d) = cfg.get("report.decimals") {
            let d = d
                .as_u64()
                .filter(|d| *d <= MAX_DECIMALS as u64)
                .ok_or_else(|| {
                    anyhow::anyhow!("report.decimals must be an integer in 0..={MAX_DECIMALS}")
                })?;
            s.decimals = d as u32;
        }

        if let Some(b) = cfg.get("report.debug") {
            s.debug = b
                .as_bool()
                .ok_or_else(|| anyhow::anyhow!("report.debug must be a boolean"))?;
        }

        Ok(s)
    }
}

fn opt_str(cfg: &LayeredConfig, key: &str) -> Result<Option<String>> {
    match cfg.get(key) {
        None => Ok(None),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.clone())),
        Some(_) => bail!("{key} must be a non-empty string"),
    }
}
