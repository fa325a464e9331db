//! Repository Port - State Persistence Interface
//!
//! Named JSON records in a local key-value store. Each record holds one
//! complete store snapshot and is replaced wholesale on every save; a
//! missing record means "start from defaults".

use anyhow::Context;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// Record holding the portfolio ledger.
pub const PORTFOLIO_RECORD: &str = "portfolio-store";

/// Record holding admin settings and the audit log.
pub const ADMIN_RECORD: &str = "admin-store";

/// Trait for state persistence providers.
#[async_trait]
pub trait StateRepository: Send + Sync + 'static {
  /// Load the raw JSON for `name`, or `None` if never saved.
  async fn load(&self, name: &str) -> anyhow::Result<Option<String>>;

  /// Replace the record `name` with `json`.
  async fn save(&self, name: &str, json: &str) -> anyhow::Result<()>;

  /// Delete the record `name`. Missing records are not an error.
  async fn clear(&self, name: &str) -> anyhow::Result<()>;

  /// Check if the repository is healthy (directory present, writable).
  async fn is_healthy(&self) -> bool;
}

/// Load and deserialize a record.
pub async fn load_record<T, R>(repo: &R, name: &str) -> anyhow::Result<Option<T>>
where
  T: DeserializeOwned,
  R: StateRepository + ?Sized,
{
  let Some(json) = repo.load(name).await? else {
    return Ok(None);
  };
  let value = serde_json::from_str(&json)
    .with_context(|| format!("Corrupt record '{name}'"))?;
  Ok(Some(value))
}

/// Serialize and save a record.
pub async fn save_record<T, R>(repo: &R, name: &str, value: &T) -> anyhow::Result<()>
where
  T: Serialize + Sync,
  R: StateRepository + ?Sized,
{
  let json = serde_json::to_string_pretty(value)
    .with_context(|| format!("Failed to serialize record '{name}'"))?;
  repo.save(name, &json).await
}
