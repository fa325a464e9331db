//! Configuration Module - TOML-based Desk Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides. Every section is optional and
//! defaulted, so the desk runs with no config file at all.

pub mod loader;

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::ledger::DEFAULT_INITIAL_CASH;

/// Top-level desk configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Identity, logging and storage location.
  #[serde(default)]
  pub app: AppSection,
  /// Network selection and token contract.
  #[serde(default)]
  pub network: NetworkConfig,
  /// Transaction receipt polling budget.
  #[serde(default)]
  pub receipts: ReceiptConfig,
  /// Simulated marketplace settings.
  #[serde(default)]
  pub marketplace: MarketplaceConfig,
}

/// Application identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable desk name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Emit JSON log lines instead of human-readable ones.
  #[serde(default)]
  pub json_logs: bool,
  /// Directory holding the persisted store records.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      json_logs: false,
      data_dir: default_data_dir(),
    }
  }
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  /// Default chain key (`mumbai` or `bsc-testnet`).
  #[serde(default = "default_network")]
  pub default: String,
  /// Deployed token contract address.
  #[serde(default)]
  pub token_address: Option<String>,
  /// Per-chain RPC URL overrides, keyed by chain key.
  #[serde(default)]
  pub rpc_overrides: HashMap<String, String>,
}

impl Default for NetworkConfig {
  fn default() -> Self {
    Self {
      default: default_network(),
      token_address: None,
      rpc_overrides: HashMap::new(),
    }
  }
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReceiptConfig {
  /// Delay between receipt polls (milliseconds).
  #[serde(default = "default_poll_interval")]
  pub poll_interval_ms: u64,
  /// Polls before giving up.
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,
}

impl Default for ReceiptConfig {
  fn default() -> Self {
    Self {
      poll_interval_ms: default_poll_interval(),
      max_attempts: default_max_attempts(),
    }
  }
}

/// Marketplace configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
  /// Listing fixture path.
  #[serde(default = "default_listings_path")]
  pub listings_path: String,
  /// Starting (and reset) cash balance.
  #[serde(default = "default_initial_cash")]
  pub initial_cash: Decimal,
}

impl Default for MarketplaceConfig {
  fn default() -> Self {
    Self {
      listings_path: default_listings_path(),
      initial_cash: default_initial_cash(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "tokenize-desk".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_data_dir() -> String {
  "data/state".to_string()
}

fn default_network() -> String {
  "mumbai".to_string()
}

fn default_poll_interval() -> u64 {
  2_000
}

fn default_max_attempts() -> u32 {
  60
}

fn default_listings_path() -> String {
  "data/listings.json".to_string()
}

fn default_initial_cash() -> Decimal {
  DEFAULT_INITIAL_CASH
}
