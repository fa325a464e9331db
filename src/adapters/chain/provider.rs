//! Chain RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the HTTP connection to one supported testnet. Validates
//! that the endpoint serves the selected chain at connect time and
//! exposes a shared, type-erased provider for the contract adapters.
//!
//! With a signer the provider is built with the recommended fillers
//! (nonce, gas, chain id) and an `EthereumWallet`, so writes are
//! signed locally and sent as raw transactions.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::{Client, Url};
use alloy::transports::http::Http;
use alloy::transports::{RpcError, TransportError};
use tracing::{info, instrument};

use super::erc20::revert_reason;
use crate::domain::network::ChainEndpoint;
use crate::ports::token_contract::ChainError;

/// Type-erased alloy HTTP provider.
pub type SharedProvider = Arc<dyn Provider<Http<Client>> + Send + Sync>;

/// Connected RPC provider for one chain.
pub struct ChainProvider {
    /// The alloy HTTP provider (type-erased).
    provider: SharedProvider,
    /// Endpoint the provider is bound to.
    endpoint: ChainEndpoint,
    /// Signing account, when a private key was supplied.
    signer: Option<Address>,
}

impl ChainProvider {
    /// Connect to the endpoint and validate its chain ID.
    ///
    /// # Errors
    /// [`ChainError::Transport`] for a malformed URL or unreachable node,
    /// [`ChainError::WrongNetwork`] when the node reports another chain.
    #[instrument(skip_all, fields(chain = endpoint.chain.key))]
    pub async fn connect(
        endpoint: &ChainEndpoint,
        signer: Option<PrivateKeySigner>,
    ) -> Result<Self, ChainError> {
        let url: Url = endpoint
            .rpc_url
            .parse()
            .map_err(|e| ChainError::Transport(format!("invalid RPC URL {}: {e}", endpoint.rpc_url)))?;

        let signer_address = signer.as_ref().map(PrivateKeySigner::address);
        let provider: SharedProvider = match signer {
            Some(signer) => Arc::new(
                ProviderBuilder::new()
                    .with_recommended_fillers()
                    .wallet(EthereumWallet::from(signer))
                    .on_http(url),
            ),
            None => Arc::new(ProviderBuilder::new().on_http(url)),
        };

        let chain_id = provider.get_chain_id().await.map_err(map_transport_error)?;
        if chain_id != endpoint.chain.id {
            return Err(ChainError::WrongNetwork {
                expected: endpoint.chain.id,
                actual: chain_id,
            });
        }

        info!(
            chain_id,
            name = endpoint.chain.name,
            signer = ?signer_address,
            "Connected to chain RPC"
        );

        Ok(Self {
            provider,
            endpoint: endpoint.clone(),
            signer: signer_address,
        })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> SharedProvider {
        Arc::clone(&self.provider)
    }

    pub const fn chain_id(&self) -> u64 {
        self.endpoint.chain.id
    }

    pub const fn signer(&self) -> Option<Address> {
        self.signer
    }
}

/// Maps an alloy transport error to a [`ChainError`], decoding revert
/// data when the node returned any.
pub(crate) fn map_transport_error(err: TransportError) -> ChainError {
    match err {
        RpcError::ErrorResp(payload) => {
            let message = payload.message.to_string();
            let revert_data = payload
                .data
                .as_ref()
                .and_then(|raw| serde_json::from_str::<Bytes>(raw.get()).ok());

            if payload.code == 3 || message.contains("execution reverted") {
                let reason = revert_data
                    .as_ref()
                    .and_then(|data| revert_reason(data))
                    .map(str::to_string)
                    .or_else(|| {
                        message
                            .strip_prefix("execution reverted: ")
                            .map(str::to_string)
                    });
                return ChainError::Reverted { reason };
            }

            ChainError::Rpc {
                code: payload.code,
                message,
            }
        }
        RpcError::Transport(kind) => ChainError::Transport(kind.to_string()),
        RpcError::DeserError { err, .. } => ChainError::Decode(err.to_string()),
        other => ChainError::Transport(other.to_string()),
    }
}
