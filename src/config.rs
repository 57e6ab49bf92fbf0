//! Decoder configuration

use eyre::{eyre, Result};
use std::env;

use crate::report::OutputFormat;
use crate::types::Network;

/// Decoder configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Reject addresses from any other network when set
    pub expected_network: Option<Network>,
    /// How decoded bytes are printed
    pub output_format: OutputFormat,
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        Self::from_env()
    }

    /// Read `FIL_NETWORK` and `FIL_OUTPUT_FORMAT` without touching `.env`
    pub fn from_env() -> Result<Self> {
        let expected_network = match env::var("FIL_NETWORK") {
            Ok(v) if !v.trim().is_empty() => Some(
                Network::resolve(&v).map_err(|e| eyre!("Invalid FIL_NETWORK: {}", e))?,
            ),
            _ => None,
        };

        let output_format = match env::var("FIL_OUTPUT_FORMAT") {
            Ok(v) if !v.trim().is_empty() => v
                .parse::<OutputFormat>()
                .map_err(|e| eyre!("Invalid FIL_OUTPUT_FORMAT: {}", e))?,
            _ => OutputFormat::default(),
        };

        Ok(Self {
            expected_network,
            output_format,
        })
    }

    /// Apply command-line overrides on top of environment values
    pub fn with_overrides(
        mut self,
        network: Option<Network>,
        format: Option<OutputFormat>,
    ) -> Self {
        if network.is_some() {
            self.expected_network = network;
        }
        if let Some(format) = format {
            self.output_format = format;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var("FIL_NETWORK");
        env::remove_var("FIL_OUTPUT_FORMAT");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output_format, OutputFormat::Hex);
        assert_eq!(config.expected_network, None);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("FIL_NETWORK", "devnet");
        env::set_var("FIL_OUTPUT_FORMAT", "json");

        let config = Config::from_env().unwrap();
        assert_eq!(config.expected_network, Some(Network::Testnet));
        assert_eq!(config.output_format, OutputFormat::Json);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env() {
        clear_env();
        env::set_var("FIL_NETWORK", "dogecoin");
        assert!(Config::from_env().is_err());

        clear_env();
        env::set_var("FIL_OUTPUT_FORMAT", "xml");
        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_overrides() {
        let config = Config {
            expected_network: Some(Network::Testnet),
            output_format: OutputFormat::Hex,
        };

        let unchanged = config.clone().with_overrides(None, None);
        assert_eq!(unchanged, config);

        let overridden = config.with_overrides(Some(Network::Mainnet), Some(OutputFormat::Bytes));
        assert_eq!(overridden.expected_network, Some(Network::Mainnet));
        assert_eq!(overridden.output_format, OutputFormat::Bytes);
    }
}
