//! Contract Validator - Deployment Check Before Use
//!
//! Confirms that the configured token address holds contract code on
//! the connected chain (not an EOA or a typo) before the token panel
//! issues any call against it.

use alloy::primitives::Address;
use tracing::{info, instrument, warn};

use super::provider::{SharedProvider, map_transport_error};
use crate::domain::units::validate_address;
use crate::ports::token_contract::ChainError;

/// Validates contract addresses against on-chain state.
pub struct ContractValidator {
    /// Alloy provider for on-chain queries.
    provider: SharedProvider,
}

impl ContractValidator {
    /// Create a new validator with the given provider.
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    /// Parse `address` and ensure code is deployed there.
    ///
    /// # Errors
    /// [`ChainError::Validation`] for a malformed address,
    /// [`ChainError::NoCode`] when nothing is deployed.
    #[instrument(skip(self))]
    pub async fn ensure_deployed(&self, address: &str) -> Result<Address, ChainError> {
        let parsed: Address = validate_address(address)?
            .parse()
            .map_err(|_| ChainError::InvalidAddress(address.to_string()))?;

        let code = self
            .provider
            .get_code_at(parsed)
            .await
            .map_err(map_transport_error)?;

        if code.is_empty() {
            warn!(address = %parsed, "Contract has no code, possible misconfiguration");
            return Err(ChainError::NoCode(parsed));
        }

        info!(address = %parsed, bytes = code.len(), "Contract validated: code exists on-chain");
        Ok(parsed)
    }
}
