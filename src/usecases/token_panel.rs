//! Token Panel - Validated ERC-20 Writes with Status Tracking
//!
//! Drives mint / burn / transfer / batch-transfer against the
//! `TokenContract` port:
//! - Pre-flight validation (wallet, network, amount, address)
//! - Owner gate for minting
//! - Local balance checks before burning or transferring
//! - `Idle -> Pending -> Success | Error` status with the tx hash
//! - Failure classification into user-facing notifications

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::domain::errors::{ClientContext, Notification, TxOperation, classify, panel_message};
use crate::domain::network::{is_supported, wallet_network_name};
use crate::domain::units::{format_units, is_valid_address, parse_units};
use crate::ports::token_contract::{ChainError, TokenBalance, TokenContract, TokenInfo};

/// Transaction lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxState {
  #[default]
  Idle,
  Pending,
  Success,
  Error,
}

/// Status line shown for the most recent panel operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TxStatus {
  /// Operation the status belongs to (`None` while idle).
  pub operation: Option<TxOperation>,
  pub state: TxState,
  pub message: String,
  /// Submitted transaction, once known.
  pub tx_hash: Option<TxHash>,
}

impl TxStatus {
  fn new(operation: TxOperation, state: TxState, message: impl Into<String>) -> Self {
    Self {
      operation: Some(operation),
      state,
      message: message.into(),
      tx_hash: None,
    }
  }

  fn with_hash(mut self, tx_hash: TxHash) -> Self {
    self.tx_hash = Some(tx_hash);
    self
  }
}

/// Inputs checked by [`validate_transaction`]. Unset fields are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxValidation<'a> {
  pub amount: Option<&'a str>,
  pub address: Option<&'a str>,
  pub balance: Option<Decimal>,
  pub max_amount: Option<Decimal>,
}

/// Pre-flight check. Returns the first user-facing problem, if any.
pub fn validate_transaction(ctx: &ClientContext, input: &TxValidation<'_>) -> Option<String> {
  if !ctx.connected {
    return Some("Please connect your wallet first.".to_string());
  }

  if let Some(chain_id) = ctx.chain_id.filter(|id| !is_supported(*id)) {
    return Some(format!(
      "Please switch to a supported network. Current: {}",
      wallet_network_name(chain_id).unwrap_or("Unknown")
    ));
  }

  if let Some(amount) = input.amount.filter(|a| !a.trim().is_empty()) {
    let Some(value) = Decimal::from_str(amount.trim())
      .ok()
      .filter(|v| *v > Decimal::ZERO)
    else {
      return Some("Please enter a valid amount.".to_string());
    };

    if input.balance.is_some_and(|b| value > b) {
      return Some("Insufficient balance for this transaction.".to_string());
    }
    if let Some(max) = input.max_amount.filter(|m| value > *m) {
      return Some(format!("Amount cannot exceed {}.", max.normalize()));
    }
  }

  if let Some(address) = input.address.filter(|a| !a.is_empty()) {
    if !is_valid_address(address) {
      return Some("Please enter a valid Ethereum address.".to_string());
    }
  }

  None
}

/// Token panel bound to one contract.
pub struct TokenPanel<C: TokenContract + ?Sized> {
  /// Contract port.
  contract: Arc<C>,
  /// Cached token metadata (owner, decimals).
  info: Option<TokenInfo>,
  /// Cached signer balance.
  balance: Option<TokenBalance>,
  /// Most recent operation status.
  status: TxStatus,
  /// Most recent classified failure.
  notification: Option<Notification>,
}

impl<C: TokenContract + ?Sized> TokenPanel<C> {
  pub fn new(contract: Arc<C>) -> Self {
    Self {
      contract,
      info: None,
      balance: None,
      status: TxStatus::default(),
      notification: None,
    }
  }

  /// Wallet context derived from the contract binding.
  pub fn context(&self) -> ClientContext {
    ClientContext {
      connected: self.contract.signer().is_some(),
      chain_id: Some(self.contract.chain_id()),
    }
  }

  pub const fn status(&self) -> &TxStatus {
    &self.status
  }

  pub const fn info(&self) -> Option<&TokenInfo> {
    self.info.as_ref()
  }

  pub const fn balance(&self) -> Option<&TokenBalance> {
    self.balance.as_ref()
  }

  pub const fn notification(&self) -> Option<&Notification> {
    self.notification.as_ref()
  }

  /// Whether the signer owns the token contract.
  pub fn is_owner(&self) -> bool {
    match (&self.info, self.contract.signer()) {
      (Some(info), Some(signer)) => info.is_owner(signer),
      _ => false,
    }
  }

  /// Back to `Idle`.
  pub fn reset_status(&mut self) {
    self.status = TxStatus::default();
    self.notification = None;
  }

  /// Load token metadata and, with a signer, its balance.
  ///
  /// # Errors
  /// Any chain read failure; the failure is also classified into
  /// [`Self::notification`].
  #[instrument(skip(self))]
  pub async fn refresh(&mut self) -> Result<&TokenInfo, ChainError> {
    let info = match self.contract.token_info().await {
      Ok(info) => info,
      Err(e) => return Err(self.record_failure(e)),
    };

    self.balance = match self.contract.signer() {
      Some(signer) => match self.contract.balance_of(signer).await {
        Ok(balance) => Some(balance),
        Err(e) => {
          warn!(error = %e, "Failed to load balance");
          None
        }
      },
      None => None,
    };

    info!(
      symbol = %info.symbol,
      decimals = info.decimals,
      owner = %info.owner,
      "Token info refreshed"
    );
    Ok(self.info.insert(info))
  }

  /// Mint whole tokens to `to`. Owner only.
  #[instrument(skip(self))]
  pub async fn mint(&mut self, to: &str, amount: &str) -> &TxStatus {
    let op = TxOperation::Mint;
    if let Some(msg) = self.preflight(amount, None) {
      return self.fail(op, msg);
    }
    if !self.is_owner() {
      return self.fail(op, "Only the token owner can mint");
    }
    let Some(to) = parse_address(to) else {
      return self.fail(op, "Invalid address format");
    };
    let raw = match parse_units(amount, 0) {
      Ok(raw) => raw,
      Err(_) => return self.fail(op, "Please enter a valid amount."),
    };

    let contract = Arc::clone(&self.contract);
    self
      .execute(op, amount, async move { contract.mint(to, raw).await })
      .await
  }

  /// Burn `amount` (human units) from the signer.
  #[instrument(skip(self))]
  pub async fn burn(&mut self, amount: &str) -> &TxStatus {
    let op = TxOperation::Burn;
    let raw = match self.checked_amount(op, amount) {
      Ok(raw) => raw,
      Err(msg) => return self.fail(op, msg),
    };

    let contract = Arc::clone(&self.contract);
    self
      .execute(op, amount, async move { contract.burn(raw).await })
      .await
  }

  /// Transfer `amount` (human units) from the signer to `to`.
  #[instrument(skip(self))]
  pub async fn transfer(&mut self, to: &str, amount: &str) -> &TxStatus {
    let op = TxOperation::Transfer;
    let Some(to) = parse_address(to) else {
      return self.fail(op, "Invalid recipient address format");
    };
    let raw = match self.checked_amount(op, amount) {
      Ok(raw) => raw,
      Err(msg) => return self.fail(op, msg),
    };

    let contract = Arc::clone(&self.contract);
    self
      .execute(op, amount, async move { contract.transfer(to, raw).await })
      .await
  }

  /// Transfer to several recipients in one transaction.
  #[instrument(skip(self, payouts), fields(count = payouts.len()))]
  pub async fn batch_transfer(&mut self, payouts: &[(&str, &str)]) -> &TxStatus {
    let op = TxOperation::BatchTransfer;
    if payouts.is_empty() {
      return self.fail(op, "Please enter a valid amount.");
    }
    if let Some(msg) = self.preflight("", None) {
      return self.fail(op, msg);
    }

    let decimals = self.decimals();
    let mut recipients = Vec::with_capacity(payouts.len());
    let mut amounts = Vec::with_capacity(payouts.len());
    let mut total = U256::ZERO;
    for (to, amount) in payouts {
      let Some(to) = parse_address(to) else {
        return self.fail(op, "Invalid recipient address format");
      };
      let raw = match positive_units(amount, decimals) {
        Some(raw) => raw,
        None => return self.fail(op, "Please enter a valid amount."),
      };
      total = total.saturating_add(raw);
      recipients.push(to);
      amounts.push(raw);
    }
    if self.balance.as_ref().is_some_and(|b| total > b.raw) {
      return self.fail(op, "Insufficient balance to transfer");
    }

    let total_label = format_units(total, decimals);
    let contract = Arc::clone(&self.contract);
    self
      .execute(op, &total_label, async move {
        contract.batch_transfer(recipients, amounts).await
      })
      .await
  }

  fn decimals(&self) -> u8 {
    self
      .info
      .as_ref()
      .map_or(18, |i| i.decimals)
  }

  fn preflight(&self, amount: &str, balance: Option<Decimal>) -> Option<String> {
    validate_transaction(
      &self.context(),
      &TxValidation {
        amount: Some(amount),
        balance,
        ..TxValidation::default()
      },
    )
  }

  /// Pre-flight plus balance check for burn and transfer.
  fn checked_amount(&self, op: TxOperation, amount: &str) -> Result<U256, String> {
    if let Some(msg) = self.preflight(amount, None) {
      return Err(msg);
    }
    let raw =
      positive_units(amount, self.decimals()).ok_or_else(|| "Please enter a valid amount.".to_string())?;

    let Some(balance) = &self.balance else {
      return Err(format!("Insufficient balance to {op}"));
    };
    if raw > balance.raw {
      return Err(format!("Insufficient balance to {op}"));
    }
    Ok(raw)
  }

  async fn execute<F>(&mut self, op: TxOperation, amount: &str, submit: F) -> &TxStatus
  where
    F: std::future::Future<Output = Result<TxHash, ChainError>>,
  {
    self.notification = None;
    self.status = TxStatus::new(op, TxState::Pending, pending_message(op));

    let tx_hash = match submit.await {
      Ok(hash) => hash,
      Err(e) => {
        let failure = e.to_failure();
        self.record_failure(e);
        return self.fail(op, panel_message(op, &failure));
      }
    };

    self.status = TxStatus::new(op, TxState::Pending, "Waiting for confirmation...").with_hash(tx_hash);

    match self.contract.wait_for_receipt(tx_hash).await {
      Ok(receipt) if receipt.success => {
        info!(%tx_hash, operation = %op, block = ?receipt.block_number, "Transaction confirmed");
        self.status = TxStatus::new(
          op,
          TxState::Success,
          format!("Successfully {} {amount} tokens", op.past_tense()),
        )
        .with_hash(tx_hash);
        if let Some(signer) = self.contract.signer() {
          if let Ok(balance) = self.contract.balance_of(signer).await {
            self.balance = Some(balance);
          }
        }
      }
      Ok(_) => {
        let e = ChainError::Reverted { reason: None };
        let failure = e.to_failure();
        self.record_failure(e);
        self.status =
          TxStatus::new(op, TxState::Error, panel_message(op, &failure)).with_hash(tx_hash);
      }
      Err(e) => {
        let failure = e.to_failure();
        self.record_failure(e);
        self.status =
          TxStatus::new(op, TxState::Error, panel_message(op, &failure)).with_hash(tx_hash);
      }
    }
    &self.status
  }

  fn fail(&mut self, op: TxOperation, message: impl Into<String>) -> &TxStatus {
    let message = message.into();
    warn!(operation = %op, %message, "Token operation failed");
    self.status = TxStatus::new(op, TxState::Error, message);
    &self.status
  }

  fn record_failure(&mut self, err: ChainError) -> ChainError {
    let classified = classify(&err.to_failure(), &self.context());
    warn!(kind = ?classified.kind, title = %classified.title, error = %err, "Chain call failed");
    self.notification = Some(Notification::new(classified));
    err
  }
}

fn pending_message(op: TxOperation) -> &'static str {
  match op {
    TxOperation::Mint => "Minting tokens...",
    TxOperation::Burn => "Burning tokens...",
    TxOperation::Transfer | TxOperation::BatchTransfer => "Transferring tokens...",
  }
}

fn parse_address(text: &str) -> Option<Address> {
  let text = text.trim();
  if !is_valid_address(text) {
    return None;
  }
  text.parse().ok()
}

fn positive_units(amount: &str, decimals: u8) -> Option<U256> {
  parse_units(amount, decimals).ok().filter(|raw| !raw.is_zero())
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;

  const ADDR: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

  fn connected(chain_id: u64) -> ClientContext {
    ClientContext {
      connected: true,
      chain_id: Some(chain_id),
    }
  }

  #[test]
  fn test_validate_requires_wallet() {
    let msg = validate_transaction(&ClientContext::default(), &TxValidation::default());
    assert_eq!(msg.as_deref(), Some("Please connect your wallet first."));
  }

  #[test]
  fn test_validate_network() {
    let msg = validate_transaction(&connected(1), &TxValidation::default());
    assert_eq!(
      msg.as_deref(),
      Some("Please switch to a supported network. Current: Ethereum Mainnet")
    );
    let msg = validate_transaction(&connected(999), &TxValidation::default());
    assert_eq!(
      msg.as_deref(),
      Some("Please switch to a supported network. Current: Unknown")
    );
  }

  #[test]
  fn test_validate_amounts() {
    let ctx = connected(80_001);
    let check = |amount: &str, balance, max| {
      validate_transaction(
        &ctx,
        &TxValidation {
          amount: Some(amount),
          balance,
          max_amount: max,
          ..TxValidation::default()
        },
      )
    };

    assert_eq!(check("abc", None, None).as_deref(), Some("Please enter a valid amount."));
    assert_eq!(check("0", None, None).as_deref(), Some("Please enter a valid amount."));
    assert_eq!(
      check("5", Some(dec!(4)), None).as_deref(),
      Some("Insufficient balance for this transaction.")
    );
    assert_eq!(
      check("5", None, Some(dec!(3))).as_deref(),
      Some("Amount cannot exceed 3.")
    );
    assert_eq!(check("2.5", Some(dec!(4)), Some(dec!(3))), None);
  }

  #[test]
  fn test_validate_address() {
    let ctx = connected(97);
    let bad = TxValidation {
      address: Some("0x123"),
      ..TxValidation::default()
    };
    assert_eq!(
      validate_transaction(&ctx, &bad).as_deref(),
      Some("Please enter a valid Ethereum address.")
    );
    let good = TxValidation {
      address: Some(ADDR),
      ..TxValidation::default()
    };
    assert_eq!(validate_transaction(&ctx, &good), None);
  }

  #[test]
  fn test_status_default_idle() {
    let status = TxStatus::default();
    assert_eq!(status.state, TxState::Idle);
    assert!(status.operation.is_none());
  }
}
