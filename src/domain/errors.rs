//! Provider failure classification.
//!
//! Maps raw wallet/RPC/contract failures to a closed set of user-facing
//! [`AppError`]s. Rules are evaluated in a fixed order and the first
//! match wins; message checks are case-insensitive substring matches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::network::{is_supported, wallet_network_name};

/// How long a notification without an action stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(6);

/// Symbolic code for a node that serves a different chain than selected.
/// The failure's `reason` names the expected network.
pub const WRONG_NETWORK: &str = "WRONG_NETWORK";

/// Provider error code: JSON-RPC numeric or library symbolic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailureCode {
    Numeric(i64),
    Symbolic(String),
}

impl FailureCode {
    fn is(&self, numeric: i64) -> bool {
        matches!(self, Self::Numeric(n) if *n == numeric)
    }

    fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self, Self::Symbolic(s) if s == symbol)
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Symbolic(s) => write!(f, "{s}"),
        }
    }
}

/// A failure as reported by the wallet, RPC node or contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<FailureCode>,
    pub message: String,
    /// Revert reason, or the expected network for a chain mismatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProviderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            reason: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(FailureCode::Numeric(code));
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.code = Some(FailureCode::Symbolic(symbol.into()));
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn code_is(&self, numeric: i64) -> bool {
        self.code.as_ref().is_some_and(|c| c.is(numeric))
    }

    fn symbol_is(&self, symbol: &str) -> bool {
        self.code.as_ref().is_some_and(|c| c.is_symbol(symbol))
    }

    fn mentions(&self, needle: &str) -> bool {
        self.message.to_lowercase().contains(needle)
    }
}

/// Wallet state at the time of the failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub connected: bool,
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Wallet,
    Network,
    Transaction,
    Contract,
    Validation,
    Unknown,
}

/// Follow-up the user can take to resolve an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorAction {
    ConnectWallet,
    SwitchNetwork,
}

impl ErrorAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConnectWallet => "Connect Wallet",
            Self::SwitchNetwork => "Switch Network",
        }
    }
}

/// Classified, user-facing error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<FailureCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ErrorAction>,
}

impl AppError {
    fn new(kind: ErrorKind, title: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
            code: None,
            details: None,
            action: None,
        }
    }

    fn code(mut self, code: Option<FailureCode>) -> Self {
        self.code = code;
        self
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Classifies `failure` given the wallet `ctx`.
pub fn classify(failure: &ProviderFailure, ctx: &ClientContext) -> AppError {
    let code = failure.code.clone();

    if failure.code_is(4001) || failure.mentions("rejected") {
        return AppError::new(
            ErrorKind::Wallet,
            "Transaction Rejected",
            "You rejected the transaction in your wallet.",
        )
        .code(code);
    }

    if failure.code_is(-32002) || failure.mentions("already pending") {
        return AppError::new(
            ErrorKind::Wallet,
            "Pending Request",
            "You have a pending request in your wallet. Please check your wallet and try again.",
        )
        .code(code);
    }

    if !ctx.connected {
        let mut err = AppError::new(
            ErrorKind::Wallet,
            "Wallet Not Connected",
            "Please connect your wallet to continue.",
        );
        err.action = Some(ErrorAction::ConnectWallet);
        return err;
    }

    if failure.code_is(-32603) || failure.mentions("network") {
        return AppError::new(
            ErrorKind::Network,
            "Network Error",
            "There was a problem connecting to the blockchain network. Please check your connection and try again.",
        )
        .code(code);
    }

    let mismatch = failure.symbol_is(WRONG_NETWORK);
    let foreign = ctx.chain_id.filter(|id| !is_supported(*id));
    if mismatch || foreign.is_some() {
        let current = ctx
            .chain_id
            .and_then(wallet_network_name)
            .unwrap_or("Unknown Network");
        let message = match failure.reason.as_deref().filter(|_| mismatch) {
            Some(expected) => format!("Please switch to {expected}. You're currently on {current}."),
            None => format!(
                "Please switch to Mumbai Testnet or BSC Testnet. You're currently on {current}."
            ),
        };
        let code = match ctx.chain_id {
            Some(id) => Some(FailureCode::Numeric(i64::try_from(id).unwrap_or(i64::MAX))),
            None => code,
        };
        let mut err = AppError::new(ErrorKind::Network, "Wrong Network", message).code(code);
        err.action = Some(ErrorAction::SwitchNetwork);
        return err;
    }

    if failure.symbol_is("INSUFFICIENT_FUNDS") || failure.mentions("insufficient funds") {
        return AppError::new(
            ErrorKind::Transaction,
            "Insufficient Funds",
            "You don't have enough funds to complete this transaction. Please check your balance.",
        )
        .code(code);
    }

    if failure.symbol_is("UNPREDICTABLE_GAS_LIMIT") || failure.mentions("gas") {
        return AppError::new(
            ErrorKind::Transaction,
            "Gas Estimation Failed",
            "Unable to estimate gas for this transaction. The transaction may fail or the contract may not exist.",
        )
        .code(code);
    }

    if failure.symbol_is("CALL_EXCEPTION") || failure.mentions("reverted") {
        let mut err = AppError::new(
            ErrorKind::Transaction,
            "Transaction Failed",
            "The transaction was reverted by the smart contract. Please check your parameters and try again.",
        )
        .code(code);
        err.details = Some(
            failure
                .reason
                .clone()
                .unwrap_or_else(|| failure.message.clone()),
        );
        return err;
    }

    if failure.symbol_is("INVALID_ADDRESS") || failure.mentions("invalid address") {
        return AppError::new(
            ErrorKind::Contract,
            "Invalid Contract Address",
            "The contract address provided is not valid. Please check and try again.",
        )
        .code(code);
    }

    if failure.symbol_is("CONTRACT_NOT_DEPLOYED") || failure.mentions("no code") {
        return AppError::new(
            ErrorKind::Contract,
            "Contract Not Found",
            "No contract found at this address. Please verify the address and network.",
        )
        .code(code);
    }

    if failure.mentions("validation") {
        return AppError::new(ErrorKind::Validation, "Validation Error", failure.message.clone())
            .code(code);
    }

    let message = if failure.message.is_empty() {
        "An unexpected error occurred. Please try again.".to_string()
    } else {
        failure.message.clone()
    };
    let mut err = AppError::new(ErrorKind::Unknown, "Unexpected Error", message).code(code);
    err.details = serde_json::to_string_pretty(failure).ok();
    err
}

/// A classified error queued for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub error: AppError,
}

impl Notification {
    pub const fn new(error: AppError) -> Self {
        Self { error }
    }

    /// Auto-dismiss delay; errors carrying an action stay until handled.
    pub fn auto_dismiss_after(&self) -> Option<Duration> {
        if self.error.action.is_some() {
            None
        } else {
            Some(NOTIFICATION_TTL)
        }
    }
}

/// Token panel write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxOperation {
    Mint,
    Burn,
    Transfer,
    BatchTransfer,
}

impl TxOperation {
    /// Message used when a failure carries no text of its own.
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::Mint => "Mint failed",
            Self::Burn => "Burn failed",
            Self::Transfer => "Transfer failed",
            Self::BatchTransfer => "Batch transfer failed",
        }
    }

    /// Past-tense verb for success messages.
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Mint => "minted",
            Self::Burn => "burned",
            Self::Transfer | Self::BatchTransfer => "transferred",
        }
    }
}

impl std::fmt::Display for TxOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mint => write!(f, "mint"),
            Self::Burn => write!(f, "burn"),
            Self::Transfer => write!(f, "transfer"),
            Self::BatchTransfer => write!(f, "batch-transfer"),
        }
    }
}

/// Short status-line message for a failed panel write.
pub fn panel_message(op: TxOperation, failure: &ProviderFailure) -> String {
    let msg = &failure.message;
    if msg.contains("user rejected") || failure.code_is(4001) {
        return "Transaction rejected by user".to_string();
    }
    if op == TxOperation::Mint && msg.contains("OwnableUnauthorizedAccount") {
        return "Only the token owner can mint".to_string();
    }
    if op != TxOperation::Mint && msg.contains("ERC20InsufficientBalance") {
        return "Insufficient balance".to_string();
    }
    if matches!(op, TxOperation::Transfer | TxOperation::BatchTransfer)
        && msg.contains("ERC20InvalidReceiver")
    {
        return "Invalid recipient address".to_string();
    }
    if msg.is_empty() {
        op.fallback_message().to_string()
    } else {
        msg.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ON_MUMBAI: ClientContext = ClientContext {
        connected: true,
        chain_id: Some(80_001),
    };

    fn title(failure: &ProviderFailure, ctx: &ClientContext) -> String {
        classify(failure, ctx).title
    }

    #[test]
    fn test_rejected_by_code_and_message() {
        let by_code = classify(&ProviderFailure::new("denied").with_code(4001), &ON_MUMBAI);
        assert_eq!(by_code.kind, ErrorKind::Wallet);
        assert_eq!(by_code.title, "Transaction Rejected");
        assert_eq!(by_code.message, "You rejected the transaction in your wallet.");
        assert_eq!(by_code.code, Some(FailureCode::Numeric(4001)));

        let by_msg = ProviderFailure::new("User rejected the request.");
        assert_eq!(title(&by_msg, &ON_MUMBAI), "Transaction Rejected");
    }

    #[test]
    fn test_rejection_wins_even_when_disconnected() {
        let ctx = ClientContext::default();
        assert_eq!(
            title(&ProviderFailure::new("x").with_code(4001), &ctx),
            "Transaction Rejected"
        );
        assert_eq!(
            title(&ProviderFailure::new("x").with_code(-32002), &ctx),
            "Pending Request"
        );
    }

    #[test]
    fn test_not_connected_has_action() {
        let err = classify(&ProviderFailure::new("insufficient funds"), &ClientContext::default());
        assert_eq!(err.title, "Wallet Not Connected");
        assert_eq!(err.action, Some(ErrorAction::ConnectWallet));
        assert_eq!(err.action.unwrap().label(), "Connect Wallet");
    }

    #[test]
    fn test_network_error_precedes_wrong_network() {
        let ctx = ClientContext {
            connected: true,
            chain_id: Some(1),
        };
        let err = classify(&ProviderFailure::new("boom").with_code(-32603), &ctx);
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.title, "Network Error");
    }

    #[test]
    fn test_wrong_network_names_current() {
        let ctx = ClientContext {
            connected: true,
            chain_id: Some(1),
        };
        let err = classify(&ProviderFailure::new("insufficient funds"), &ctx);
        assert_eq!(err.title, "Wrong Network");
        assert_eq!(
            err.message,
            "Please switch to Mumbai Testnet or BSC Testnet. You're currently on Ethereum Mainnet."
        );
        assert_eq!(err.code, Some(FailureCode::Numeric(1)));
        assert_eq!(err.action, Some(ErrorAction::SwitchNetwork));

        let unknown = ClientContext {
            connected: true,
            chain_id: Some(424_242),
        };
        assert!(classify(&ProviderFailure::new("x"), &unknown)
            .message
            .ends_with("Unknown Network."));
    }

    #[test]
    fn test_chain_mismatch_names_expected_network() {
        let failure = ProviderFailure::new("chain id mismatch: expected 80001, got 97")
            .with_symbol(WRONG_NETWORK)
            .with_reason("Polygon Mumbai Testnet");
        let ctx = ClientContext {
            connected: true,
            chain_id: Some(97),
        };
        let err = classify(&failure, &ctx);
        assert_eq!(err.title, "Wrong Network");
        assert_eq!(
            err.message,
            "Please switch to Polygon Mumbai Testnet. You're currently on BSC Testnet."
        );
        assert_eq!(err.code, Some(FailureCode::Numeric(97)));
        assert_eq!(err.action, Some(ErrorAction::SwitchNetwork));
    }

    #[test]
    fn test_transaction_rules() {
        assert_eq!(
            title(&ProviderFailure::new("x").with_symbol("INSUFFICIENT_FUNDS"), &ON_MUMBAI),
            "Insufficient Funds"
        );
        assert_eq!(
            title(&ProviderFailure::new("intrinsic gas too low"), &ON_MUMBAI),
            "Gas Estimation Failed"
        );

        let reverted = classify(
            &ProviderFailure::new("execution reverted").with_reason("ERC20InsufficientBalance"),
            &ON_MUMBAI,
        );
        assert_eq!(reverted.title, "Transaction Failed");
        assert_eq!(reverted.details.as_deref(), Some("ERC20InsufficientBalance"));

        let no_reason = classify(&ProviderFailure::new("execution reverted"), &ON_MUMBAI);
        assert_eq!(no_reason.details.as_deref(), Some("execution reverted"));
    }

    #[test]
    fn test_contract_and_validation_rules() {
        assert_eq!(
            title(&ProviderFailure::new("invalid address"), &ON_MUMBAI),
            "Invalid Contract Address"
        );
        assert_eq!(
            title(&ProviderFailure::new("x").with_symbol("CONTRACT_NOT_DEPLOYED"), &ON_MUMBAI),
            "Contract Not Found"
        );
        let v = classify(&ProviderFailure::new("validation: amount"), &ON_MUMBAI);
        assert_eq!(v.kind, ErrorKind::Validation);
        assert_eq!(v.message, "validation: amount");
    }

    #[test]
    fn test_unknown_fallback() {
        let err = classify(&ProviderFailure::new(""), &ON_MUMBAI);
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.title, "Unexpected Error");
        assert_eq!(err.message, "An unexpected error occurred. Please try again.");
        assert!(err.details.is_some());

        let with_msg = classify(&ProviderFailure::new("weird"), &ON_MUMBAI);
        assert_eq!(with_msg.message, "weird");
    }

    #[test]
    fn test_notification_dismissal() {
        let plain = Notification::new(classify(&ProviderFailure::new("weird"), &ON_MUMBAI));
        assert_eq!(plain.auto_dismiss_after(), Some(Duration::from_secs(6)));

        let sticky = Notification::new(classify(&ProviderFailure::new("x"), &ClientContext::default()));
        assert_eq!(sticky.auto_dismiss_after(), None);
    }

    #[test]
    fn test_panel_messages() {
        let rejected = ProviderFailure::new("MetaMask: user rejected transaction");
        assert_eq!(panel_message(TxOperation::Burn, &rejected), "Transaction rejected by user");

        let not_owner = ProviderFailure::new("reverted: OwnableUnauthorizedAccount(0x..)");
        assert_eq!(panel_message(TxOperation::Mint, &not_owner), "Only the token owner can mint");

        let low = ProviderFailure::new("ERC20InsufficientBalance(..)");
        assert_eq!(panel_message(TxOperation::Transfer, &low), "Insufficient balance");

        let receiver = ProviderFailure::new("ERC20InvalidReceiver(0x0)");
        assert_eq!(panel_message(TxOperation::Transfer, &receiver), "Invalid recipient address");

        assert_eq!(panel_message(TxOperation::Mint, &ProviderFailure::new("")), "Mint failed");
        assert_eq!(panel_message(TxOperation::Burn, &ProviderFailure::new("odd")), "odd");
    }
}
