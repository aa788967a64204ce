//! Command handler modules for tgc.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod gain;

use anyhow::{bail, Result};
use tgc_config::{LayeredConfig, Settings, MAX_DECIMALS};

/// Settings after config layering and flag overrides.
#[derive(Debug)]
pub struct Resolved {
    pub settings: Settings,
    /// Config files read, in merge order.
    pub config_files: Vec<String>,
    pub unknown_keys: Vec<String>,
}

impl Resolved {
    /// Call once tracing is initialized.
    pub fn log_config(&self) {
        for file in &self.config_files {
            tracing::debug!(file = %file, "config layer loaded");
        }
        for key in &self.unknown_keys {
            tracing::warn!(key = %key, "unknown config key ignored");
        }
    }
}

/// Layer config files, then apply CLI flags on top (flags win).
pub fn resolve_settings(
    config_paths: &[String],
    filename: Option<String>,
    debug: bool,
    decimals: Option<u32>,
) -> Result<Resolved> {
    let layers = LayeredConfig::from_files(config_paths)?;
    let mut settings = Settings::from_layers(&layers)?;

    if let Some(f) = filename {
        settings.input_path = f;
    }
    if debug {
        settings.debug = true;
    }
    if let Some(d) = decimals {
        if d > MAX_DECIMALS {
            bail!("invalid --decimals {}. expected 0..={}", d, MAX_DECIMALS);
        }
        settings.decimals = d;
    }

    Ok(Resolved {
        settings,
        config_files: layers.sources().to_vec(),
        unknown_keys: layers.unknown_keys(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_or_flags() {
        let r = resolve_settings(&[], None, false, None).unwrap();
        assert_eq!(r.settings, Settings::default());
        assert!(r.config_files.is_empty());
        assert!(r.unknown_keys.is_empty());
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("tgc.yaml");
        std::fs::write(
            &cfg,
            "input:\n  path: from-config.csv\nreport:\n  decimals: 5\n  debug: false\nextra: 1\n",
        )
        .unwrap();

        let r = resolve_settings(
            &[cfg.display().to_string()],
            Some("from-flag.csv".to_string()),
            true,
            Some(3),
        )
        .unwrap();

        assert_eq!(r.settings.input_path, "from-flag.csv");
        assert_eq!(r.settings.decimals, 3);
        assert!(r.settings.debug);
        assert_eq!(r.config_files.len(), 1);
        assert_eq!(r.unknown_keys, vec!["extra".to_string()]);
    }

    #[test]
    fn decimals_flag_is_bounded() {
        assert!(resolve_settings(&[], None, false, Some(MAX_DECIMALS + 1)).is_err());
    }
}
