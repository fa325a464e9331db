//! Marketplace listings and market statistics.
//!
//! Listings are read-only fixture data. Prices drive the simulated
//! ledger; the remaining fields feed the analytics summary.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::trade::Symbol;

/// A token offered on the simulated marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListing {
    pub id: String,
    pub symbol: Symbol,
    pub name: String,
    /// Contract address (display only).
    pub address: String,
    /// Quote currency per token.
    pub price: Decimal,
    /// 24h price change, percent.
    #[serde(rename = "change24h")]
    pub change_24h: Decimal,
    #[serde(rename = "volume24h")]
    pub volume_24h: Decimal,
    pub market_cap: Decimal,
    /// Recent price points, oldest first.
    #[serde(default)]
    pub trend: Vec<Decimal>,
    #[serde(default)]
    pub description: String,
    /// Total supply as displayed (free text in the fixture).
    #[serde(default)]
    pub total_supply: String,
}

/// Symbol -> price map used for portfolio valuation.
pub fn price_map(listings: &[TokenListing]) -> HashMap<Symbol, Decimal> {
    listings
        .iter()
        .map(|l| (l.symbol.clone(), l.price))
        .collect()
}

/// Case-insensitive substring match on name or symbol. An empty query
/// returns every listing.
pub fn search<'a>(listings: &'a [TokenListing], query: &str) -> Vec<&'a TokenListing> {
    let query = query.trim().to_lowercase();
    listings
        .iter()
        .filter(|l| {
            query.is_empty()
                || l.name.to_lowercase().contains(&query)
                || l.symbol.to_lowercase().contains(&query)
        })
        .collect()
}

/// Finds a listing by symbol (case-insensitive).
pub fn find<'a>(listings: &'a [TokenListing], symbol: &str) -> Option<&'a TokenListing> {
    listings
        .iter()
        .find(|l| l.symbol.eq_ignore_ascii_case(symbol.trim()))
}

/// Summary across all listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketStats {
    /// Symbol with the highest 24h change.
    pub best_performer: Symbol,
    pub best_change: Decimal,
    /// Symbol with the lowest 24h change.
    pub worst_performer: Symbol,
    pub worst_change: Decimal,
    /// Symbol with the highest 24h volume.
    pub most_traded: Symbol,
    pub most_traded_volume: Decimal,
    pub total_market_cap: Decimal,
    pub token_count: usize,
}

impl MarketStats {
    /// Computes stats; `None` when there are no listings. Ties keep the
    /// earliest listing.
    pub fn compute(listings: &[TokenListing]) -> Option<Self> {
        let first = listings.first()?;
        let mut best = first;
        let mut worst = first;
        let mut busiest = first;
        for l in &listings[1..] {
            if l.change_24h > best.change_24h {
                best = l;
            }
            if l.change_24h < worst.change_24h {
                worst = l;
            }
            if l.volume_24h > busiest.volume_24h {
                busiest = l;
            }
        }

        Some(Self {
            best_performer: best.symbol.clone(),
            best_change: best.change_24h,
            worst_performer: worst.symbol.clone(),
            worst_change: worst.change_24h,
            most_traded: busiest.symbol.clone(),
            most_traded_volume: busiest.volume_24h,
            total_market_cap: listings.iter().map(|l| l.market_cap).sum(),
            token_count: listings.len(),
        })
    }
}

/// `$0.0500` below one, `$12.50` otherwise.
pub fn format_price(price: Decimal) -> String {
    let dp = if price < Decimal::ONE { 4 } else { 2 };
    let rounded = price.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.prec$}", prec = dp as usize)
}

/// Signed one-decimal percentage (`+1.2%`, `-3.4%`).
pub fn format_change(change: Decimal) -> String {
    let rounded = change.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded >= Decimal::ZERO { "+" } else { "" };
    format!("{sign}{rounded:.1}%")
}

/// Money amount with two decimals (`5.00`).
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
