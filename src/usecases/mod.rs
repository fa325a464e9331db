//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! desk's workflows. Each store action mutates a copy of the state,
//! persists it, and only then replaces the live state, so a failed
//! save leaves the session untouched.
//!
//! Use cases:
//! - `Marketplace`: Simulated trading, portfolio valuation, analytics
//! - `AdminConsole`: Capability-gated platform settings and audit log
//! - `TokenPanel`: Validated ERC-20 writes with status tracking

pub mod admin_console;
pub mod marketplace;
pub mod token_panel;

use thiserror::Error;

use crate::domain::admin::AdminError;
use crate::domain::ledger::LedgerError;

/// Failures from the persisted store use cases.
#[derive(Debug, Error)]
pub enum DeskError {
  #[error(transparent)]
  Ledger(#[from] LedgerError),

  #[error(transparent)]
  Admin(#[from] AdminError),

  #[error("Unknown token symbol '{0}'")]
  UnknownSymbol(String),

  #[error(transparent)]
  Persistence(#[from] anyhow::Error),
}

pub use admin_console::AdminConsole;
pub use marketplace::Marketplace;
pub use token_panel::TokenPanel;
