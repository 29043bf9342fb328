//! Optional TOML configuration
//!
//! Everything has a sensible compiled-in default; a config file only
//! needs the keys it wants to change.
//!
//! ```toml
//! [pricing]
//! retries = 3
//! retry_delay_secs = 3
//! cache_ttl_minutes = 5
//!
//! [tickers]
//! "My Custom Fund" = "MCF.AX"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub pricing: PricingConfig,
    /// Market-name → Yahoo ticker overrides, merged over the builtin map
    pub tickers: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Total lookup attempts per symbol
    pub retries: u32,
    /// Fixed delay between attempts; no exponential backoff
    pub retry_delay_secs: u64,
    pub cache_ttl_minutes: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_secs: 3,
            cache_ttl_minutes: 5,
        }
    }
}

impl Config {
    /// Load config from a TOML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_a_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.pricing.retries, 3);
        assert_eq!(config.pricing.retry_delay_secs, 3);
        assert_eq!(config.pricing.cache_ttl_minutes, 5);
        assert!(config.tickers.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pricing]\nretries = 5\n\n[tickers]\n\"My Fund\" = \"MF.AX\"").unwrap();
        file.flush().unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.pricing.retries, 5);
        assert_eq!(config.pricing.retry_delay_secs, 3);
        assert_eq!(config.tickers.get("My Fund"), Some(&"MF.AX".to_string()));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [").unwrap();
        file.flush().unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }
}
