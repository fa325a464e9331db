//! Token Contract Port - ERC-20 Interaction Interface
//!
//! Defines the trait for reading and writing the owner-gated
//! OpenZeppelin ERC-20 token deployed on the supported testnets.
//! Writes return the transaction hash immediately; confirmation is a
//! separate receipt poll.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::errors::{ProviderFailure, WRONG_NETWORK};
use crate::domain::network::network_label;
use crate::domain::units::ValidationError;

/// Token metadata read from the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
  /// Contract address.
  pub address: Address,
  /// ERC-20 name.
  pub name: String,
  /// ERC-20 symbol.
  pub symbol: String,
  /// ERC-20 decimals.
  pub decimals: u8,
  /// Total supply in raw units.
  pub total_supply: U256,
  /// Current owner (only account allowed to mint).
  pub owner: Address,
}

impl TokenInfo {
  /// Compares parsed addresses, so the hex case of either side does not matter.
  pub fn is_owner(&self, account: Address) -> bool {
    self.owner == account
  }
}

/// Holder balance in raw and human units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
  /// Balance in raw units.
  pub raw: U256,
  /// Decimal string (`1.5`, `0.0`).
  pub formatted: String,
  /// Decimals used for formatting.
  pub decimals: u8,
}

/// Mined transaction outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
  /// Transaction hash.
  pub tx_hash: TxHash,
  /// Block the transaction was included in.
  pub block_number: Option<u64>,
  /// Execution status.
  pub success: bool,
}

/// Chain interaction failures, surfaced unchanged to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
  /// JSON-RPC error object returned by the node or wallet.
  #[error("rpc error {code}: {message}")]
  Rpc { code: i64, message: String },

  /// HTTP transport failure reaching the node.
  #[error("network request failed: {0}")]
  Transport(String),

  /// Connected endpoint reports a different chain than selected.
  #[error("chain id mismatch: expected {expected}, got {actual}")]
  WrongNetwork { expected: u64, actual: u64 },

  #[error("no signer configured")]
  NotConnected,

  #[error("invalid address: {0}")]
  InvalidAddress(String),

  /// No bytecode at the configured token address.
  #[error("no code at {0}")]
  NoCode(Address),

  /// Call or transaction reverted.
  #[error("execution reverted: {}", reason.as_deref().unwrap_or("unknown reason"))]
  Reverted { reason: Option<String> },

  /// Receipt not available within the poll budget.
  #[error("transaction {tx_hash} not confirmed after {attempts} attempts")]
  ReceiptTimeout { tx_hash: TxHash, attempts: u32 },

  #[error("failed to decode contract response: {0}")]
  Decode(String),

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),
}

impl ChainError {
  /// Chain the node actually reported, when the failure is a mismatch.
  pub const fn reported_chain_id(&self) -> Option<u64> {
    match self {
      Self::WrongNetwork { actual, .. } => Some(*actual),
      _ => None,
    }
  }

  /// Raw failure shape consumed by the error classifier.
  pub fn to_failure(&self) -> ProviderFailure {
    let failure = ProviderFailure::new(self.to_string());
    match self {
      Self::Rpc { code, .. } => failure.with_code(*code),
      Self::InvalidAddress(_) => failure.with_symbol("INVALID_ADDRESS"),
      Self::NoCode(_) => failure.with_symbol("CONTRACT_NOT_DEPLOYED"),
      Self::Reverted { reason } => {
        let failure = failure.with_symbol("CALL_EXCEPTION");
        match reason {
          Some(r) => failure.with_reason(r.clone()),
          None => failure,
        }
      }
      Self::WrongNetwork { expected, .. } => failure
        .with_symbol(WRONG_NETWORK)
        .with_reason(network_label(*expected)),
      Self::Transport(_)
      | Self::NotConnected
      | Self::ReceiptTimeout { .. }
      | Self::Decode(_)
      | Self::Validation(_) => failure,
    }
  }
}

/// Trait for ERC-20 token interactions via alloy-rs.
///
/// Implementations are bound to one contract on one chain. Write
/// methods require a signer and fail with [`ChainError::NotConnected`]
/// otherwise.
#[async_trait]
pub trait TokenContract: Send + Sync + 'static {
  /// Token contract address.
  fn address(&self) -> Address;

  /// Chain the contract is bound to.
  fn chain_id(&self) -> u64;

  /// Signing account, if writes are possible.
  fn signer(&self) -> Option<Address>;

  /// Read name, symbol, decimals, total supply and owner.
  async fn token_info(&self) -> Result<TokenInfo, ChainError>;

  /// Read the balance of `holder`.
  async fn balance_of(&self, holder: Address) -> Result<TokenBalance, ChainError>;

  /// Mint `amount` to `to` (owner only).
  async fn mint(&self, to: Address, amount: U256) -> Result<TxHash, ChainError>;

  /// Burn `amount` from the signer.
  async fn burn(&self, amount: U256) -> Result<TxHash, ChainError>;

  /// Transfer `amount` from the signer to `to`.
  async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash, ChainError>;

  /// Transfer `amounts[i]` to `recipients[i]` in one transaction.
  async fn batch_transfer(
    &self,
    recipients: Vec<Address>,
    amounts: Vec<U256>,
  ) -> Result<TxHash, ChainError>;

  /// Poll for the receipt of `tx_hash` until mined or the budget runs out.
  async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainError>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::errors::FailureCode;

  #[test]
  fn test_rpc_error_keeps_code() {
    let failure = ChainError::Rpc {
      code: 4001,
      message: "User rejected".into(),
    }
    .to_failure();
    assert_eq!(failure.code, Some(FailureCode::Numeric(4001)));
    assert!(failure.message.contains("User rejected"));
  }

  #[test]
  fn test_owner_match_ignores_hex_case() {
    let owner: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
    let info = TokenInfo {
      address: Address::ZERO,
      name: "Desk Token".into(),
      symbol: "DESK".into(),
      decimals: 18,
      total_supply: U256::ZERO,
      owner,
    };
    let lower: Address = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap();
    assert!(info.is_owner(lower));
    assert!(!info.is_owner(Address::ZERO));
  }

  #[test]
  fn test_revert_carries_reason() {
    let failure = ChainError::Reverted {
      reason: Some("OwnableUnauthorizedAccount".into()),
    }
    .to_failure();
    assert_eq!(failure.code, Some(FailureCode::Symbolic("CALL_EXCEPTION".into())));
    assert_eq!(failure.reason.as_deref(), Some("OwnableUnauthorizedAccount"));
    assert!(failure.message.contains("OwnableUnauthorizedAccount"));
  }

  #[test]
  fn test_chain_mismatch_classifies_as_wrong_network() {
    use crate::domain::errors::{ClientContext, ErrorAction, classify};

    for actual in [1, 97] {
      let err = ChainError::WrongNetwork {
        expected: 80_001,
        actual,
      };
      let ctx = ClientContext {
        connected: true,
        chain_id: err.reported_chain_id(),
      };
      let classified = classify(&err.to_failure(), &ctx);
      assert_eq!(classified.title, "Wrong Network");
      assert!(classified.message.starts_with("Please switch to Polygon Mumbai."));
      assert_eq!(classified.action, Some(ErrorAction::SwitchNetwork));
    }
    assert_eq!(ChainError::NotConnected.reported_chain_id(), None);
  }

  #[test]
  fn test_no_code_symbol() {
    let failure = ChainError::NoCode(Address::ZERO).to_failure();
    assert_eq!(
      failure.code,
      Some(FailureCode::Symbolic("CONTRACT_NOT_DEPLOYED".into()))
    );
  }
}
