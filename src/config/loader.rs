//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Handles loading `config.toml`, layering `TOKENIZE_*` environment
//! overrides on top, validating all parameters, and providing clear
//! error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::AppConfig;
use crate::domain::network::{self, ChainEndpoint};
use crate::domain::units::is_valid_address;

/// Default config file looked up when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Load, override and validate configuration.
///
/// An explicit `path` must exist. Without one, `config.toml` is used if
/// present and defaults otherwise.
///
/// # Errors
/// Returns detailed error if:
/// - An explicit file doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
  let mut config = match path {
    Some(p) => read_file(Path::new(p))?,
    None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
      read_file(Path::new(DEFAULT_CONFIG_PATH))?
    }
    None => {
      debug!("No config file found, using defaults");
      AppConfig::default()
    }
  };

  apply_env_overrides(&mut config, |key| std::env::var(key).ok());
  validate_config(&config)?;

  info!(
    network = %config.network.default,
    data_dir = %config.app.data_dir,
    token = config.network.token_address.as_deref().unwrap_or("-"),
    "Configuration loaded successfully"
  );

  Ok(config)
}

fn read_file(path: &Path) -> Result<AppConfig> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  toml::from_str(&content)
    .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Apply `TOKENIZE_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
  F: Fn(&str) -> Option<String>,
{
  let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

  if let Some(v) = non_empty("TOKENIZE_DEFAULT_NETWORK") {
    config.network.default = v;
  }
  if let Some(v) = non_empty("TOKENIZE_TOKEN_ADDRESS") {
    config.network.token_address = Some(v);
  }
  if let Some(v) = non_empty("TOKENIZE_DATA_DIR") {
    config.app.data_dir = v;
  }
  for (var, key) in [
    ("TOKENIZE_RPC_MUMBAI", network::POLYGON_MUMBAI.key),
    ("TOKENIZE_RPC_BSC_TESTNET", network::BSC_TESTNET.key),
  ] {
    if let Some(url) = non_empty(var) {
      config.network.rpc_overrides.insert(key.to_string(), url);
    }
  }
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    network::by_key(&config.network.default).is_some(),
    "Unknown default network '{}' (expected one of: {})",
    config.network.default,
    network::SUPPORTED_CHAINS
      .iter()
      .map(|c| c.key)
      .collect::<Vec<_>>()
      .join(", ")
  );

  for key in config.network.rpc_overrides.keys() {
    anyhow::ensure!(
      network::by_key(key).is_some(),
      "RPC override for unknown network '{key}'"
    );
  }

  if let Some(addr) = &config.network.token_address {
    anyhow::ensure!(
      is_valid_address(addr.trim()),
      "Token address '{addr}' is not a valid 0x address"
    );
  }

  anyhow::ensure!(
    !config.app.data_dir.trim().is_empty(),
    "data_dir must not be empty"
  );

  anyhow::ensure!(
    config.receipts.poll_interval_ms > 0,
    "receipts.poll_interval_ms must be positive"
  );
  anyhow::ensure!(
    config.receipts.max_attempts > 0,
    "receipts.max_attempts must be positive"
  );

  anyhow::ensure!(
    config.marketplace.initial_cash >= Decimal::ZERO,
    "marketplace.initial_cash must not be negative, got {}",
    config.marketplace.initial_cash
  );

  Ok(())
}

impl AppConfig {
  /// Resolve the endpoint for `key`, or for the configured default.
  /// Unknown keys fall back to Mumbai.
  pub fn endpoint(&self, key: Option<&str>) -> ChainEndpoint {
    let chain = network::default_chain(Some(key.unwrap_or(&self.network.default)));
    let rpc = self.network.rpc_overrides.get(chain.key).map(String::as_str);
    ChainEndpoint::resolve(chain, rpc)
  }
}
