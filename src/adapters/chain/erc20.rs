//! ERC-20 Token Client - Owner-gated OpenZeppelin Token
//!
//! Implements the `TokenContract` port with calldata built from `sol!`
//! bindings. Reads go through `eth_call`; writes are signed by the
//! provider's wallet and return the hash without waiting.
//!
//! Contract surface:
//! - `name()`, `symbol()`, `decimals()`, `totalSupply()`, `owner()`
//! - `balanceOf(address)`
//! - `mint(address,uint256)` (owner only), `burn(uint256)`
//! - `transfer(address,uint256)`, `batchTransfer(address[],uint256[])`

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::{SolCall, SolError};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::provider::{ChainProvider, SharedProvider, map_transport_error};
use super::receipts::ReceiptPoller;
use crate::domain::units::format_units;
use crate::ports::token_contract::{ChainError, TokenBalance, TokenContract, TokenInfo, TxReceipt};

sol! {
    interface IDeskToken {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function owner() external view returns (address);
        function balanceOf(address account) external view returns (uint256);

        function mint(address to, uint256 amount) external;
        function burn(uint256 amount) external;
        function transfer(address to, uint256 amount) external returns (bool);
        function batchTransfer(address[] recipients, uint256[] amounts) external;

        error OwnableUnauthorizedAccount(address account);
        error ERC20InsufficientBalance(address sender, uint256 balance, uint256 needed);
        error ERC20InvalidReceiver(address receiver);
    }
}

/// Names a known custom error from raw revert data.
pub fn revert_reason(data: &[u8]) -> Option<&'static str> {
    let selector = data.get(..4)?;
    if selector == IDeskToken::OwnableUnauthorizedAccount::SELECTOR {
        Some("OwnableUnauthorizedAccount")
    } else if selector == IDeskToken::ERC20InsufficientBalance::SELECTOR {
        Some("ERC20InsufficientBalance")
    } else if selector == IDeskToken::ERC20InvalidReceiver::SELECTOR {
        Some("ERC20InvalidReceiver")
    } else {
        None
    }
}

/// ERC-20 client bound to one contract on one chain.
pub struct Erc20Client {
    /// Shared alloy provider.
    provider: SharedProvider,
    /// Token contract address.
    address: Address,
    /// Chain the provider was validated against.
    chain_id: u64,
    /// Signing account for writes.
    signer: Option<Address>,
    /// Receipt poll budget.
    poller: ReceiptPoller,
}

impl Erc20Client {
    pub fn new(chain: &ChainProvider, address: Address, poller: ReceiptPoller) -> Self {
        Self {
            provider: chain.inner(),
            address,
            chain_id: chain.chain_id(),
            signer: chain.signer(),
            poller,
        }
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return, ChainError> {
        let tx = TransactionRequest::default()
            .to(self.address)
            .input(Bytes::from(call.abi_encode()).into());

        let output = self
            .provider
            .call(&tx)
            .await
            .map_err(map_transport_error)?;

        C::abi_decode_returns(&output, true).map_err(|e| ChainError::Decode(e.to_string()))
    }

    async fn send<C: SolCall>(&self, call: C) -> Result<TxHash, ChainError> {
        let from = self.signer.ok_or(ChainError::NotConnected)?;
        let tx = TransactionRequest::default()
            .from(from)
            .to(self.address)
            .input(Bytes::from(call.abi_encode()).into());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(map_transport_error)?;

        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, function = C::SIGNATURE, "Transaction submitted");
        Ok(tx_hash)
    }
}

#[async_trait]
impl TokenContract for Erc20Client {
    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn signer(&self) -> Option<Address> {
        self.signer
    }

    #[instrument(skip(self), fields(token = %self.address))]
    async fn token_info(&self) -> Result<TokenInfo, ChainError> {
        let name = self.call(IDeskToken::nameCall {}).await?._0;
        let symbol = self.call(IDeskToken::symbolCall {}).await?._0;
        let decimals = self.call(IDeskToken::decimalsCall {}).await?._0;
        let total_supply = self.call(IDeskToken::totalSupplyCall {}).await?._0;
        let owner = self.call(IDeskToken::ownerCall {}).await?._0;

        debug!(%name, %symbol, decimals, %total_supply, %owner, "Token info loaded");
        Ok(TokenInfo {
            address: self.address,
            name,
            symbol,
            decimals,
            total_supply,
            owner,
        })
    }

    #[instrument(skip(self), fields(token = %self.address))]
    async fn balance_of(&self, holder: Address) -> Result<TokenBalance, ChainError> {
        let decimals = self.call(IDeskToken::decimalsCall {}).await?._0;
        let raw = self
            .call(IDeskToken::balanceOfCall { account: holder })
            .await?
            ._0;

        Ok(TokenBalance {
            raw,
            formatted: format_units(raw, decimals),
            decimals,
        })
    }

    #[instrument(skip(self))]
    async fn mint(&self, to: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.send(IDeskToken::mintCall { to, amount }).await
    }

    #[instrument(skip(self))]
    async fn burn(&self, amount: U256) -> Result<TxHash, ChainError> {
        self.send(IDeskToken::burnCall { amount }).await
    }

    #[instrument(skip(self))]
    async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.send(IDeskToken::transferCall { to, amount }).await
    }

    #[instrument(skip(self, recipients, amounts), fields(count = recipients.len()))]
    async fn batch_transfer(
        &self,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<TxHash, ChainError> {
        self.send(IDeskToken::batchTransferCall {
            recipients,
            amounts,
        })
        .await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainError> {
        self.poller.wait(self.provider.as_ref(), tx_hash).await
    }
}
