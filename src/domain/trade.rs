//! Marketplace trade types.
//!
//! Defines the immutable trade event recorded by the portfolio ledger
//! for every simulated buy or sell. Events are appended newest-first
//! and never edited after creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token symbol as listed on the marketplace (e.g. `DMT`).
pub type Symbol = String;

/// Trade side for a simulated marketplace order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl TradeSide {
    /// Past-tense verb used in user-facing confirmations.
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Buy => "bought",
            Self::Sell => "sold",
        }
    }
}

/// A completed simulated trade.
///
/// `notional` is always `amount * price` at the moment of execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Unique trade identifier.
    pub id: Uuid,
    /// Buy or sell.
    pub side: TradeSide,
    /// Token symbol traded.
    pub symbol: Symbol,
    /// Token display name at the time of the trade.
    pub token_name: String,
    /// Quantity of tokens.
    pub amount: Decimal,
    /// Quote currency per token.
    pub price: Decimal,
    /// `amount * price`.
    pub notional: Decimal,
    /// Execution time.
    pub timestamp: DateTime<Utc>,
}

impl TradeEvent {
    /// Creates a new trade stamped with a fresh id and the current time.
    ///
    /// `notional` is `amount * price`, computed by the caller with
    /// overflow checking.
    pub fn new(
        side: TradeSide,
        symbol: impl Into<Symbol>,
        token_name: impl Into<String>,
        amount: Decimal,
        price: Decimal,
        notional: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            side,
            symbol: symbol.into(),
            token_name: token_name.into(),
            amount,
            price,
            notional,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_event_notional() {
        let trade = TradeEvent::new(TradeSide::Buy, "DMT", "DemoToken", dec!(100), dec!(0.05), dec!(5.00));
        assert_eq!(trade.notional, dec!(5.00));
        assert_eq!(trade.symbol, "DMT");
        assert_eq!(trade.token_name, "DemoToken");
    }

    #[test]
    fn test_trade_ids_unique() {
        let a = TradeEvent::new(TradeSide::Sell, "DMT", "DemoToken", dec!(1), dec!(1), dec!(1));
        let b = TradeEvent::new(TradeSide::Sell, "DMT", "DemoToken", dec!(1), dec!(1), dec!(1));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_trade_side_display() {
        assert_eq!(format!("{}", TradeSide::Buy), "BUY");
        assert_eq!(format!("{}", TradeSide::Sell), "SELL");
    }

    #[test]
    fn test_trade_side_serializes_lowercase() {
        let json = serde_json::to_string(&TradeSide::Sell).unwrap();
        assert_eq!(json, "\"sell\"");
    }
}
