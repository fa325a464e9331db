//! Domain layer - Core business logic and models.
//!
//! Pure state machines for the tokenization desk: the portfolio ledger,
//! admin settings with their audit trail, the chain registry, marketplace
//! listings, and failure classification. No I/O happens here (hexagonal
//! architecture inner ring); every type is serializable and testable in
//! isolation.

pub mod admin;
pub mod audit;
pub mod errors;
pub mod ledger;
pub mod listing;
pub mod network;
pub mod trade;
pub mod units;

// Re-export core types for convenience
pub use admin::{AdminError, AdminSettings, Capability, Role};
pub use audit::{AuditEntry, AuditLog};
pub use errors::{
    AppError, ClientContext, ErrorAction, ErrorKind, FailureCode, Notification, ProviderFailure,
    TxOperation, classify, panel_message,
};
pub use ledger::{AllocationSlice, LedgerError, PortfolioLedger};
pub use listing::{MarketStats, TokenListing};
pub use network::{Chain, ChainEndpoint};
pub use trade::{Symbol, TradeEvent, TradeSide};
pub use units::{ValidationError, format_units, parse_units, validate_address};
