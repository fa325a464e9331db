//! Listing fixture loader.
//!
//! Reads the marketplace listings JSON. When the configured file is
//! absent the copy bundled at build time is used instead.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::domain::listing::TokenListing;

/// Listings shipped with the binary.
const BUNDLED_LISTINGS: &str = include_str!("../../data/listings.json");

/// Parse and validate a listings document.
///
/// # Errors
/// Malformed JSON, duplicate symbols, or negative prices.
pub fn parse_listings(json: &str) -> Result<Vec<TokenListing>> {
    let listings: Vec<TokenListing> =
        serde_json::from_str(json).context("Failed to parse listings JSON")?;

    let mut seen = HashSet::new();
    for listing in &listings {
        anyhow::ensure!(
            seen.insert(listing.symbol.to_ascii_uppercase()),
            "Duplicate listing symbol '{}'",
            listing.symbol
        );
        anyhow::ensure!(
            !listing.price.is_sign_negative(),
            "Listing '{}' has negative price {}",
            listing.symbol,
            listing.price
        );
    }
    Ok(listings)
}

/// Bundled listings.
///
/// # Errors
/// Only if the bundled document is malformed.
pub fn bundled_listings() -> Result<Vec<TokenListing>> {
    parse_listings(BUNDLED_LISTINGS)
}

/// Load listings from `path`, falling back to the bundled set.
#[instrument]
pub async fn load_listings(path: &str) -> Result<Vec<TokenListing>> {
    let path = Path::new(path);
    let listings = if fs::try_exists(path).await.unwrap_or(false) {
        let json = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read listings file {}", path.display()))?;
        parse_listings(&json)?
    } else {
        debug!(path = %path.display(), "Listings file not found, using bundled set");
        bundled_listings()?
    };

    info!(count = listings.len(), "Listings loaded");
    Ok(listings)
}
