//! Marketplace - Simulated Trading and Portfolio Analytics
//!
//! Executes buys and sells against listing prices, persists the
//! portfolio ledger after every change, and derives valuation,
//! allocation and market statistics from the current listings.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::DeskError;
use crate::domain::ledger::{AllocationSlice, PortfolioLedger};
use crate::domain::listing::{self, MarketStats, TokenListing, format_usd};
use crate::domain::trade::{Symbol, TradeEvent, TradeSide};
use crate::ports::repository::{PORTFOLIO_RECORD, StateRepository, load_record, save_record};

/// Completed trade plus its confirmation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOutcome {
  /// Recorded ledger event.
  pub event: TradeEvent,
  /// `Successfully bought 100 DMT for $5.00`.
  pub message: String,
}

/// Point-in-time portfolio valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioSummary {
  /// Quote currency balance.
  pub cash: Decimal,
  /// Cash plus marked-to-market holdings.
  pub total_value: Decimal,
  /// Allocation slices, largest first.
  pub allocation: Vec<AllocationSlice>,
  /// Symbols with a positive balance.
  pub active_holdings: usize,
  /// Trades in history.
  pub trade_count: usize,
}

/// Simulated marketplace bound to a state repository.
pub struct Marketplace<R: StateRepository + ?Sized> {
  /// Persistence port.
  repo: Arc<R>,
  /// Live ledger state.
  ledger: PortfolioLedger,
  /// Read-only listings.
  listings: Vec<TokenListing>,
  /// Symbol -> price, derived from listings.
  prices: HashMap<Symbol, Decimal>,
}

impl<R: StateRepository + ?Sized> Marketplace<R> {
  /// Restore the persisted ledger, or start fresh with `initial_cash`.
  ///
  /// # Errors
  /// Repository read failure or a corrupt record.
  #[instrument(skip(repo, listings))]
  pub async fn open(
    repo: Arc<R>,
    listings: Vec<TokenListing>,
    initial_cash: Decimal,
  ) -> Result<Self, DeskError> {
    let restored: Option<PortfolioLedger> = load_record(repo.as_ref(), PORTFOLIO_RECORD).await?;
    let ledger = match restored {
      Some(ledger) => {
        info!(cash = %ledger.cash(), trades = ledger.trade_history().len(), "Portfolio restored");
        ledger
      }
      None => PortfolioLedger::with_initial_cash(initial_cash),
    };
    let prices = listing::price_map(&listings);

    Ok(Self {
      repo,
      ledger,
      listings,
      prices,
    })
  }

  pub const fn ledger(&self) -> &PortfolioLedger {
    &self.ledger
  }

  pub fn listings(&self) -> &[TokenListing] {
    &self.listings
  }

  pub const fn prices(&self) -> &HashMap<Symbol, Decimal> {
    &self.prices
  }

  /// Listings matching `query` by name or symbol.
  pub fn search(&self, query: &str) -> Vec<&TokenListing> {
    listing::search(&self.listings, query)
  }

  /// Price history for `symbol`, oldest first.
  pub fn trend(&self, symbol: &str) -> Option<&[Decimal]> {
    listing::find(&self.listings, symbol).map(|l| l.trend.as_slice())
  }

  /// Aggregate stats across all listings.
  pub fn stats(&self) -> Option<MarketStats> {
    MarketStats::compute(&self.listings)
  }

  pub fn summary(&self) -> PortfolioSummary {
    PortfolioSummary {
      cash: self.ledger.cash(),
      total_value: self.ledger.total_value(&self.prices),
      allocation: self.ledger.allocation(&self.prices),
      active_holdings: self
        .ledger
        .balances()
        .values()
        .filter(|q| **q > Decimal::ZERO)
        .count(),
      trade_count: self.ledger.trade_history().len(),
    }
  }

  /// Buy or sell `amount` of `symbol` at its listing price.
  ///
  /// # Errors
  /// Unknown symbol, ledger precondition failure, or persistence
  /// failure. State is unchanged on every error.
  #[instrument(skip(self))]
  pub async fn trade(
    &mut self,
    symbol: &str,
    side: TradeSide,
    amount: Decimal,
  ) -> Result<TradeOutcome, DeskError> {
    let listing = listing::find(&self.listings, symbol)
      .ok_or_else(|| DeskError::UnknownSymbol(symbol.to_string()))?;

    let mut next = self.ledger.clone();
    let event = match side {
      TradeSide::Buy => next.buy(&listing.symbol, &listing.name, amount, listing.price),
      TradeSide::Sell => next.sell(&listing.symbol, &listing.name, amount, listing.price),
    }
    .inspect_err(|e| warn!(symbol = %listing.symbol, error = %e, "Trade rejected"))?;

    self.commit(next).await?;

    let message = format!(
      "Successfully {} {} {} for ${}",
      side.past_tense(),
      event.amount.normalize(),
      event.symbol,
      format_usd(event.notional)
    );
    info!(
      symbol = %event.symbol,
      amount = %event.amount,
      price = %event.price,
      notional = %event.notional,
      "Trade executed"
    );
    Ok(TradeOutcome { event, message })
  }

  /// Credit cash; returns the new balance.
  ///
  /// # Errors
  /// Non-positive amount or persistence failure.
  pub async fn add_funds(&mut self, amount: Decimal) -> Result<Decimal, DeskError> {
    let mut next = self.ledger.clone();
    let cash = next.add_funds(amount)?;
    self.commit(next).await?;
    info!(%amount, %cash, "Funds added");
    Ok(cash)
  }

  /// Restore initial cash and clear holdings and history.
  ///
  /// # Errors
  /// Persistence failure.
  pub async fn reset(&mut self) -> Result<(), DeskError> {
    let mut next = self.ledger.clone();
    next.reset();
    self.commit(next).await?;
    info!(cash = %self.ledger.cash(), "Portfolio reset");
    Ok(())
  }

  async fn commit(&mut self, next: PortfolioLedger) -> Result<(), DeskError> {
    save_record(self.repo.as_ref(), PORTFOLIO_RECORD, &next).await?;
    self.ledger = next;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;
  use crate::adapters::fixtures::bundled_listings;
  use crate::adapters::persistence::MemoryStore;
  use crate::domain::ledger::LedgerError;

  async fn market() -> Marketplace<MemoryStore> {
    Marketplace::open(
      Arc::new(MemoryStore::new()),
      bundled_listings().unwrap(),
      dec!(10000),
    )
    .await
    .unwrap()
  }

  #[tokio::test]
  async fn test_buy_message_and_cash() {
    let mut m = market().await;
    let outcome = m.trade("DMT", TradeSide::Buy, dec!(100)).await.unwrap();
    assert_eq!(outcome.message, "Successfully bought 100 DMT for $5.00");
    assert_eq!(m.ledger().cash(), dec!(9995));
  }

  #[tokio::test]
  async fn test_symbol_lookup_case_insensitive() {
    let mut m = market().await;
    let outcome = m.trade("dmt", TradeSide::Buy, dec!(1)).await.unwrap();
    assert_eq!(outcome.event.symbol, "DMT");
  }

  #[tokio::test]
  async fn test_unknown_symbol() {
    let mut m = market().await;
    let err = m.trade("NOPE", TradeSide::Buy, dec!(1)).await.unwrap_err();
    assert!(matches!(err, DeskError::UnknownSymbol(_)));
  }

  #[tokio::test]
  async fn test_sell_without_balance_keeps_state() {
    let mut m = market().await;
    let err = m.trade("DMT", TradeSide::Sell, dec!(10)).await.unwrap_err();
    assert!(matches!(
      err,
      DeskError::Ledger(LedgerError::InsufficientBalance { .. })
    ));
    assert_eq!(m.ledger().cash(), dec!(10000));
    assert!(m.ledger().trade_history().is_empty());
  }

  #[tokio::test]
  async fn test_persisted_across_reopen() {
    let repo = Arc::new(MemoryStore::new());
    let listings = bundled_listings().unwrap();
    {
      let mut m = Marketplace::open(Arc::clone(&repo), listings.clone(), dec!(10000))
        .await
        .unwrap();
      m.trade("DMT", TradeSide::Buy, dec!(100)).await.unwrap();
    }
    let m = Marketplace::open(repo, listings, dec!(10000)).await.unwrap();
    assert_eq!(m.ledger().balance("DMT"), dec!(100));
    assert_eq!(m.ledger().trade_history().len(), 1);
  }

  #[tokio::test]
  async fn test_summary_and_reset() {
    let mut m = market().await;
    m.trade("DMT", TradeSide::Buy, dec!(100)).await.unwrap();
    let summary = m.summary();
    assert_eq!(summary.total_value, dec!(10000));
    assert_eq!(summary.active_holdings, 1);
    assert_eq!(summary.allocation[0].symbol, "USD");

    m.add_funds(dec!(500)).await.unwrap();
    assert_eq!(m.ledger().cash(), dec!(10495));

    m.reset().await.unwrap();
    assert_eq!(m.ledger().cash(), dec!(10000));
    assert!(m.ledger().balances().is_empty());
  }

  #[tokio::test]
  async fn test_analytics_helpers() {
    let m = market().await;
    assert!(m.stats().is_some());
    assert_eq!(m.search("gold").len(), 1);
    assert!(m.trend("DMT").is_some_and(|t| !t.is_empty()));
    assert!(m.trend("NOPE").is_none());
  }
}
