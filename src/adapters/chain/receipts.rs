//! Receipt Poller - Transaction Confirmation
//!
//! Polls `eth_getTransactionReceipt` at a fixed interval until the
//! transaction is mined or the attempt budget is exhausted. The
//! transaction itself is never resubmitted.

use std::time::Duration;

use alloy::primitives::TxHash;
use alloy::providers::Provider;
use alloy::transports::http::Http;
use alloy::transports::http::reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::provider::map_transport_error;
use crate::config::ReceiptConfig;
use crate::ports::token_contract::{ChainError, TxReceipt};

/// Fixed-interval receipt poller.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPoller {
    interval: Duration,
    max_attempts: u32,
}

impl ReceiptPoller {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub const fn from_config(config: &ReceiptConfig) -> Self {
        Self::new(
            Duration::from_millis(config.poll_interval_ms),
            config.max_attempts,
        )
    }

    /// Wait for `tx_hash` to be mined.
    ///
    /// A mined-but-reverted transaction is returned with
    /// `success == false`; callers decide how to report it.
    #[instrument(skip(self, provider))]
    pub async fn wait(
        &self,
        provider: &(dyn Provider<Http<Client>> + Send + Sync),
        tx_hash: TxHash,
    ) -> Result<TxReceipt, ChainError> {
        for attempt in 1..=self.max_attempts {
            let receipt = provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(map_transport_error)?;

            if let Some(receipt) = receipt {
                let success = receipt.status();
                info!(
                    %tx_hash,
                    block = receipt.block_number,
                    success,
                    attempt,
                    "Transaction mined"
                );
                return Ok(TxReceipt {
                    tx_hash,
                    block_number: receipt.block_number,
                    success,
                });
            }

            debug!(%tx_hash, attempt, "Receipt not yet available");
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        warn!(%tx_hash, attempts = self.max_attempts, "Receipt poll budget exhausted");
        Err(ChainError::ReceiptTimeout {
            tx_hash,
            attempts: self.max_attempts,
        })
    }
}

impl Default for ReceiptPoller {
    fn default() -> Self {
        Self::from_config(&ReceiptConfig::default())
    }
}
