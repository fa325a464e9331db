//! Supported chain registry.
//!
//! Static table of the testnets the token contract is deployed to, plus
//! pure lookups for names, explorer links and faucets.

use serde::Serialize;

/// A supported chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chain {
    /// EIP-155 chain id.
    pub id: u64,
    /// Human-readable network name.
    pub name: &'static str,
    /// Stable lookup key used in configuration.
    pub key: &'static str,
    /// Native currency symbol.
    pub currency: &'static str,
    /// Public RPC endpoint.
    pub rpc_url: &'static str,
    /// Block explorer base URL (no trailing slash).
    pub explorer_url: &'static str,
    /// Testnet faucet.
    pub faucet_url: &'static str,
    pub testnet: bool,
}

pub const POLYGON_MUMBAI: Chain = Chain {
    id: 80_001,
    name: "Polygon Mumbai",
    key: "mumbai",
    currency: "MATIC",
    rpc_url: "https://rpc-mumbai.maticvigil.com",
    explorer_url: "https://mumbai.polygonscan.com",
    faucet_url: "https://faucet.polygon.technology/",
    testnet: true,
};

pub const BSC_TESTNET: Chain = Chain {
    id: 97,
    name: "BNB Smart Chain Testnet",
    key: "bsc-testnet",
    currency: "tBNB",
    rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
    explorer_url: "https://testnet.bscscan.com",
    faucet_url: "https://testnet.binance.org/faucet-smart",
    testnet: true,
};

/// All supported chains, default first.
pub const SUPPORTED_CHAINS: [Chain; 2] = [POLYGON_MUMBAI, BSC_TESTNET];

/// Short names for networks a wallet may report, supported or not.
const WALLET_NETWORK_NAMES: [(u64, &str); 5] = [
    (1, "Ethereum Mainnet"),
    (5, "Goerli Testnet"),
    (80_001, "Polygon Mumbai Testnet"),
    (97, "BSC Testnet"),
    (11_155_111, "Sepolia Testnet"),
];

pub fn by_id(chain_id: u64) -> Option<&'static Chain> {
    SUPPORTED_CHAINS.iter().find(|c| c.id == chain_id)
}

pub fn by_key(key: &str) -> Option<&'static Chain> {
    let key = key.trim();
    SUPPORTED_CHAINS
        .iter()
        .find(|c| c.key.eq_ignore_ascii_case(key))
}

pub fn is_supported(chain_id: u64) -> bool {
    by_id(chain_id).is_some()
}

/// Chain for `key`, falling back to Mumbai for unknown or missing keys.
pub fn default_chain(key: Option<&str>) -> &'static Chain {
    key.and_then(by_key).unwrap_or(&SUPPORTED_CHAINS[0])
}

/// Name of a supported chain, or `Unknown Chain (id)`.
pub fn chain_name(chain_id: u64) -> String {
    by_id(chain_id).map_or_else(|| format!("Unknown Chain ({chain_id})"), |c| c.name.to_string())
}

/// Wallet-facing network name, covering common unsupported networks.
pub fn wallet_network_name(chain_id: u64) -> Option<&'static str> {
    WALLET_NETWORK_NAMES
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
}

/// Registry name for supported chains, wallet name for other known
/// networks, else `Unknown Chain (id)`.
pub fn network_label(chain_id: u64) -> String {
    by_id(chain_id)
        .map(|c| c.name)
        .or_else(|| wallet_network_name(chain_id))
        .map_or_else(|| format!("Unknown Chain ({chain_id})"), str::to_string)
}

pub fn explorer_url(chain_id: u64) -> Option<&'static str> {
    by_id(chain_id).map(|c| c.explorer_url)
}

pub fn faucet_url(chain_id: u64) -> Option<&'static str> {
    by_id(chain_id).map(|c| c.faucet_url)
}

/// `{explorer}/tx/{hash}`, or `None` for unsupported chains.
pub fn tx_url(chain_id: u64, tx_hash: &str) -> Option<String> {
    explorer_url(chain_id).map(|base| format!("{base}/tx/{tx_hash}"))
}

/// `{explorer}/address/{address}`, or `None` for unsupported chains.
pub fn address_url(chain_id: u64, address: &str) -> Option<String> {
    explorer_url(chain_id).map(|base| format!("{base}/address/{address}"))
}

/// A chain paired with the RPC URL actually used after overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEndpoint {
    pub chain: Chain,
    pub rpc_url: String,
}

impl ChainEndpoint {
    /// Resolves the endpoint, preferring a non-empty `rpc_override`.
    pub fn resolve(chain: &Chain, rpc_override: Option<&str>) -> Self {
        let rpc_url = rpc_override
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(chain.rpc_url)
            .to_string();
        Self {
            chain: *chain,
            rpc_url,
        }
    }
}
