//! Chain Adapters - Testnet Token Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management with chain-id validation and local signing
//! - ERC-20 reads and owner-gated writes through `sol!` bindings
//! - Receipt polling with a fixed attempt budget
//! - Deployment check of the configured token address

pub mod erc20;
pub mod provider;
pub mod receipts;
pub mod validator;

pub use erc20::Erc20Client;
pub use provider::ChainProvider;
pub use receipts::ReceiptPoller;
pub use validator::ContractValidator;
