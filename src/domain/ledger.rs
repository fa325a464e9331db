//! Portfolio ledger.
//!
//! Simulated cash and token balances driven by marketplace buys and
//! sells. Every mutating action validates its preconditions first and
//! only then applies the change, so a failed call leaves the ledger
//! exactly as it was.
//!
//! Invariants:
//! - held quantities are never negative
//! - cash is never negative
//! - a buy moves `notional` from cash into holdings, a sell moves it back
//! - trade history holds at most [`MAX_TRADE_HISTORY`] events, newest first

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::trade::{Symbol, TradeEvent, TradeSide};

/// Maximum number of trade events retained.
pub const MAX_TRADE_HISTORY: usize = 100;

/// Simulated cash every fresh portfolio starts with.
pub const DEFAULT_INITIAL_CASH: Decimal = dec!(10000);

/// Symbol of the synthetic cash slice in allocation breakdowns.
pub const CASH_SYMBOL: &str = "USD";

/// Precondition failures raised by ledger actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient USD balance")]
    InsufficientFunds {
        /// Cash the trade would cost.
        needed: Decimal,
        /// Cash currently available.
        available: Decimal,
    },

    #[error("Insufficient {symbol} balance")]
    InsufficientBalance {
        symbol: Symbol,
        /// Quantity requested.
        requested: Decimal,
        /// Quantity currently held.
        held: Decimal,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount too large: {0}")]
    Overflow(String),
}

/// One row of a portfolio allocation breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationSlice {
    /// Token symbol, or [`CASH_SYMBOL`] for cash.
    pub symbol: Symbol,
    /// Value in quote currency.
    pub value: Decimal,
    /// Share of total portfolio value, 0..=100.
    pub percentage: Decimal,
}

/// Cash, token balances and trade history for one simulated trader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioLedger {
    /// Held quantity per symbol.
    balances: BTreeMap<Symbol, Decimal>,
    /// Trade history, newest first.
    trade_history: Vec<TradeEvent>,
    /// Available cash.
    cash: Decimal,
    /// Cash restored by [`PortfolioLedger::reset`].
    #[serde(default = "default_initial_cash")]
    initial_cash: Decimal,
}

fn default_initial_cash() -> Decimal {
    DEFAULT_INITIAL_CASH
}

impl Default for PortfolioLedger {
    fn default() -> Self {
        Self::with_initial_cash(DEFAULT_INITIAL_CASH)
    }
}

impl PortfolioLedger {
    /// Creates an empty ledger holding `initial_cash`.
    pub fn with_initial_cash(initial_cash: Decimal) -> Self {
        Self {
            balances: BTreeMap::new(),
            trade_history: Vec::new(),
            cash: initial_cash,
            initial_cash,
        }
    }

    /// Buys `amount` of `symbol` at `price`, paying from cash.
    ///
    /// # Errors
    /// - [`LedgerError::InvalidAmount`] for a non-positive amount or negative price
    /// - [`LedgerError::InsufficientFunds`] if `amount * price` exceeds cash
    /// - [`LedgerError::Overflow`] if the notional or new balance is unrepresentable
    pub fn buy(
        &mut self,
        symbol: &str,
        token_name: &str,
        amount: Decimal,
        price: Decimal,
    ) -> Result<TradeEvent, LedgerError> {
        validate_trade_inputs(amount, price)?;

        let notional = checked_notional(amount, price)?;
        if notional > self.cash {
            return Err(LedgerError::InsufficientFunds {
                needed: notional,
                available: self.cash,
            });
        }
        let held = self.balance(symbol).checked_add(amount).ok_or_else(|| {
            LedgerError::Overflow(format!("{symbol} balance would exceed {}", Decimal::MAX))
        })?;

        let trade = TradeEvent::new(TradeSide::Buy, symbol, token_name, amount, price, notional);

        self.balances.insert(symbol.to_string(), held);
        self.cash -= notional;
        self.record(trade.clone());

        Ok(trade)
    }

    /// Sells `amount` of `symbol` at `price`, crediting cash.
    ///
    /// # Errors
    /// - [`LedgerError::InvalidAmount`] for a non-positive amount or negative price
    /// - [`LedgerError::InsufficientBalance`] if `amount` exceeds the held quantity
    /// - [`LedgerError::Overflow`] if the proceeds or new cash are unrepresentable
    pub fn sell(
        &mut self,
        symbol: &str,
        token_name: &str,
        amount: Decimal,
        price: Decimal,
    ) -> Result<TradeEvent, LedgerError> {
        validate_trade_inputs(amount, price)?;

        let held = self.balance(symbol);
        if amount > held {
            return Err(LedgerError::InsufficientBalance {
                symbol: symbol.to_string(),
                requested: amount,
                held,
            });
        }

        let notional = checked_notional(amount, price)?;
        let cash = self.cash.checked_add(notional).ok_or_else(|| {
            LedgerError::Overflow(format!("cash would exceed {}", Decimal::MAX))
        })?;

        let trade = TradeEvent::new(TradeSide::Sell, symbol, token_name, amount, price, notional);

        self.balances
            .insert(symbol.to_string(), (held - amount).max(Decimal::ZERO));
        self.cash = cash;
        self.record(trade.clone());

        Ok(trade)
    }

    /// Current held quantity of `symbol`, zero if never traded.
    pub fn balance(&self, symbol: &str) -> Decimal {
        self.balances.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// Available cash.
    pub const fn cash(&self) -> Decimal {
        self.cash
    }

    /// Cash a reset restores.
    pub const fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    /// All held balances keyed by symbol.
    pub const fn balances(&self) -> &BTreeMap<Symbol, Decimal> {
        &self.balances
    }

    /// Trade history, newest first.
    pub fn trade_history(&self) -> &[TradeEvent] {
        &self.trade_history
    }

    /// Trades for one symbol, newest first.
    pub fn trades_for(&self, symbol: &str) -> Vec<&TradeEvent> {
        self.trade_history
            .iter()
            .filter(|t| t.symbol == symbol)
            .collect()
    }

    /// Cash plus every holding valued at `prices`.
    ///
    /// Symbols missing from `prices` are valued at zero.
    pub fn total_value(&self, prices: &HashMap<Symbol, Decimal>) -> Decimal {
        self.balances
            .iter()
            .fold(self.cash, |total, (symbol, balance)| {
                total.saturating_add(balance.saturating_mul(price_of(prices, symbol)))
            })
    }

    /// Allocation of total value across cash and holdings.
    ///
    /// Sorted by value descending. Cash appears as [`CASH_SYMBOL`] when
    /// positive; tokens appear only when their value is positive. Empty
    /// when the total value is zero.
    pub fn allocation(&self, prices: &HashMap<Symbol, Decimal>) -> Vec<AllocationSlice> {
        let total = self.total_value(prices);
        if total.is_zero() {
            return Vec::new();
        }

        let mut slices = Vec::with_capacity(self.balances.len() + 1);

        if self.cash > Decimal::ZERO {
            slices.push(AllocationSlice {
                symbol: CASH_SYMBOL.to_string(),
                value: self.cash,
                percentage: self.cash / total * Decimal::ONE_HUNDRED,
            });
        }

        for (symbol, balance) in &self.balances {
            if *balance <= Decimal::ZERO {
                continue;
            }
            let value = balance.saturating_mul(price_of(prices, symbol));
            if value > Decimal::ZERO {
                slices.push(AllocationSlice {
                    symbol: symbol.clone(),
                    value,
                    percentage: value / total * Decimal::ONE_HUNDRED,
                });
            }
        }

        slices.sort_by(|a, b| b.value.cmp(&a.value));
        slices
    }

    /// Credits simulated cash.
    ///
    /// # Errors
    /// [`LedgerError::InvalidAmount`] when `amount` is not positive,
    /// [`LedgerError::Overflow`] when the new balance is unrepresentable.
    pub fn add_funds(&mut self, amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "funding amount must be positive, got {amount}"
            )));
        }
        self.cash = self.cash.checked_add(amount).ok_or_else(|| {
            LedgerError::Overflow(format!("cash would exceed {}", Decimal::MAX))
        })?;
        Ok(self.cash)
    }

    /// Restores initial cash and clears balances and history.
    pub fn reset(&mut self) {
        self.balances.clear();
        self.trade_history.clear();
        self.cash = self.initial_cash;
    }

    fn record(&mut self, trade: TradeEvent) {
        self.trade_history.insert(0, trade);
        self.trade_history.truncate(MAX_TRADE_HISTORY);
    }
}

fn price_of(prices: &HashMap<Symbol, Decimal>, symbol: &str) -> Decimal {
    prices.get(symbol).copied().unwrap_or(Decimal::ZERO)
}

fn checked_notional(amount: Decimal, price: Decimal) -> Result<Decimal, LedgerError> {
    amount
        .checked_mul(price)
        .ok_or_else(|| LedgerError::Overflow(format!("{amount} x {price}")))
}

fn validate_trade_inputs(amount: Decimal, price: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "trade amount must be positive, got {amount}"
        )));
    }
    if price < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "price must not be negative, got {price}"
        )));
    }
    Ok(())
}
