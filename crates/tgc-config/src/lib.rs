//! tgc-config
//!
//! Optional YAML config for `tgc gain`. Files are layered in the order given:
//! a later file overrides the scalars it names and leaves the rest alone.
//!
//! Recognised keys (dotted paths):
//! - `input.path`
//! - `input.columns.{trade_id,side,quantity,price,fee}`
//! - `report.decimals`, `report.debug`
//!
//! Anything else is reported by [`LayeredConfig::unknown_keys`] so a typo
//! like `report.decimal` does not silently fall back to a default.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

mod settings;

pub use settings::{Settings, DEFAULT_DECIMALS, DEFAULT_INPUT_PATH, MAX_DECIMALS};

/// Every key [`Settings::from_layers`] reads.
pub const KNOWN_KEYS: &[&str] = &[
    "input.path",
    "input.columns.trade_id",
    "input.columns.side",
    "input.columns.quantity",
    "input.columns.price",
    "input.columns.fee",
    "report.decimals",
    "report.debug",
];

/// Config files merged into one tree.
#[derive(Debug, Clone, Default)]
pub struct LayeredConfig {
    root: Map<String, Value>,
    /// File names in merge order; empty when defaults only.
    sources: Vec<String>,
}

impl LayeredConfig {
    /// Read and layer `paths`, first file lowest priority.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut cfg = Self::default();
        for path in paths {
            let path = path.as_ref();
            let raw = fs::read_to_string(path)
                .with_context(|| format!("cannot read config file {}", path.display()))?;
            cfg.push_layer(&raw)
                .with_context(|| format!("bad config file {}", path.display()))?;
            cfg.sources.push(path.display().to_string());
        }
        Ok(cfg)
    }

    /// Layer in-memory YAML documents, first document lowest priority.
    pub fn from_documents(docs: &[&str]) -> Result<Self> {
        let mut cfg = Self::default();
        for doc in docs {
            cfg.push_layer(doc)?;
        }
        Ok(cfg)
    }

    fn push_layer(&mut self, yaml: &str) -> Result<()> {
        let parsed: Value = serde_yaml::from_str(yaml).context("invalid yaml")?;
        match parsed {
            // blank file
            Value::Null => Ok(()),
            Value::Object(layer) => {
                overlay(&mut self.root, layer);
                Ok(())
            }
            _ => bail!("config must be a mapping at the top level"),
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Value at a dotted path such as `report.decimals`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = self.root.get(parts.next()?)?;
        parts.try_fold(first, |v, part| v.get(part))
    }

    /// Dotted paths of scalars (or lists) that no setting reads, sorted.
    pub fn unknown_keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        walk_unknown(&self.root, "", &mut out);
        out.sort();
        out
    }
}

/// Merge `layer` into `base`; nested mappings merge, anything else replaces.
fn overlay(base: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, incoming) in layer {
        match (base.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => overlay(existing, nested),
            (_, incoming) => {
                base.insert(key, incoming);
            }
        }
    }
}

fn walk_unknown(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if KNOWN_KEYS.contains(&path.as_str()) {
            continue;
        }
        match value {
            Value::Object(nested) if !nested.is_empty() => walk_unknown(nested, &path, out),
            _ => out.push(path),
        }
    }
}
