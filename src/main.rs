//! Tokenize Desk — Entry Point
//!
//! Command-line front end over the desk's stores and token panel.
//!
//! Wiring sequence:
//! 1. Parse CLI arguments
//! 2. Load config.toml (optional) + TOKENIZE_* env overrides + validate
//! 3. Init tracing (human or JSON, filter from RUST_LOG)
//! 4. Open the JSON record store in the data directory
//! 5. Dispatch the command to Marketplace, AdminConsole or TokenPanel
//! 6. Print the result; exit non-zero on failure

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use tokenize_desk::adapters::chain::{ChainProvider, ContractValidator, Erc20Client, ReceiptPoller};
use tokenize_desk::adapters::fixtures::load_listings;
use tokenize_desk::adapters::persistence::JsonFileStore;
use tokenize_desk::config::{AppConfig, loader};
use tokenize_desk::domain::admin::Role;
use tokenize_desk::domain::errors::{Notification, classify};
use tokenize_desk::domain::listing::{format_change, format_price, format_usd};
use tokenize_desk::domain::network::{self, SUPPORTED_CHAINS};
use tokenize_desk::domain::trade::TradeSide;
use tokenize_desk::ports::token_contract::TokenContract;
use tokenize_desk::usecases::token_panel::{TxState, TxStatus};
use tokenize_desk::usecases::{AdminConsole, Marketplace, TokenPanel};

#[derive(Parser, Debug)]
#[command(name = "tokenize-desk", version)]
#[command(about = "ERC-20 tokenization desk: simulated marketplace, admin console and token panel")]
struct Cli {
  /// Path to config.toml (defaults to ./config.toml when present)
  #[arg(long, global = true)]
  config: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show cash, total value, allocation and recent trades
  Portfolio {
    /// Number of recent trades to show
    #[arg(long, default_value = "10")]
    trades: usize,
    /// Only show trades for this symbol
    #[arg(long)]
    symbol: Option<String>,
  },
  /// List marketplace tokens
  Listings {
    /// Filter by name or symbol
    #[arg(long)]
    search: Option<String>,
  },
  /// Market statistics and price trend
  Stats {
    /// Show the price trend for this symbol
    #[arg(long)]
    trend: Option<String>,
  },
  /// Buy tokens at the listing price
  Buy { symbol: String, amount: Decimal },
  /// Sell tokens at the listing price
  Sell { symbol: String, amount: Decimal },
  /// Credit simulated cash
  AddFunds { amount: Decimal },
  /// Restore initial cash and clear holdings
  Reset,
  /// Admin settings and audit log
  Admin {
    #[command(subcommand)]
    action: AdminCommand,
  },
  /// Supported networks and explorer links
  Networks,
  /// Interact with the deployed ERC-20 token
  Token {
    /// Network key (mumbai, bsc-testnet); defaults to the configured network
    #[arg(long)]
    network: Option<String>,
    /// Token contract address (overrides config)
    #[arg(long)]
    address: Option<String>,
    /// Signer private key for writes
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,
    #[command(subcommand)]
    action: TokenCommand,
  },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
  /// Show current settings
  Show,
  /// Switch session role (user, admin)
  Role { role: Role },
  /// Set platform fee percent (0-10)
  Fee { percent: Decimal },
  /// Enable or disable KYC
  Kyc {
    #[arg(value_parser = parse_switch, action = clap::ArgAction::Set)]
    enabled: bool,
  },
  /// Set the maximum token supply
  MaxSupply { supply: u64 },
  /// Add an address to the blacklist
  BlacklistAdd { address: String },
  /// Remove an address from the blacklist
  BlacklistRemove { address: String },
  /// Show the audit log
  Audit {
    #[arg(long, default_value = "20")]
    limit: usize,
  },
  /// Clear the audit log
  ClearAudit,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
  /// Token metadata
  Info,
  /// Balance of an address (defaults to the signer)
  Balance { address: Option<String> },
  /// Mint whole tokens (owner only)
  Mint { to: String, amount: String },
  /// Burn tokens from the signer
  Burn { amount: String },
  /// Transfer tokens from the signer
  Transfer { to: String, amount: String },
  /// Transfer to many recipients (`ADDRESS=AMOUNT` pairs)
  BatchTransfer {
    #[arg(required = true)]
    payouts: Vec<String>,
  },
}

fn parse_switch(s: &str) -> Result<bool, String> {
  match s.to_ascii_lowercase().as_str() {
    "on" | "true" | "enable" | "enabled" => Ok(true),
    "off" | "false" | "disable" | "disabled" => Ok(false),
    other => Err(format!("expected on/off, got '{other}'")),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  // ── Configuration ───────────────────────────────────────
  let config = loader::load_config(cli.config.as_deref()).context("Failed to load configuration")?;

  // ── Logging ─────────────────────────────────────────────
  init_tracing(&config);
  info!(
    name = %config.app.name,
    version = env!("CARGO_PKG_VERSION"),
    network = %config.network.default,
    "Starting tokenize desk"
  );

  match cli.command {
    Command::Networks => print_networks(&config),
    Command::Admin { action } => run_admin(&config, action).await?,
    Command::Token {
      network,
      address,
      private_key,
      action,
    } => run_token(&config, network.as_deref(), address, private_key, action).await?,
    market_command => run_market(&config, market_command).await?,
  }

  Ok(())
}

fn init_tracing(config: &AppConfig) {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr);

  if config.app.json_logs {
    builder.json().init();
  } else {
    builder.init();
  }
}

async fn open_store(config: &AppConfig) -> Result<Arc<JsonFileStore>> {
  let store = JsonFileStore::new(&config.app.data_dir)
    .await
    .context("Failed to open state store")?;
  Ok(Arc::new(store))
}

async fn run_market(config: &AppConfig, command: Command) -> Result<()> {
  let store = open_store(config).await?;
  let listings = load_listings(&config.marketplace.listings_path).await?;
  let mut market = Marketplace::open(store, listings, config.marketplace.initial_cash).await?;

  match command {
    Command::Portfolio { trades, symbol } => {
      let summary = market.summary();
      println!("Cash:           ${}", format_usd(summary.cash));
      println!("Total value:    ${}", format_usd(summary.total_value));
      println!("Active holdings: {}", summary.active_holdings);
      println!("Total trades:    {}", summary.trade_count);
      println!();
      println!("Allocation:");
      if summary.allocation.is_empty() {
        println!("  (empty)");
      }
      for slice in &summary.allocation {
        println!(
          "  {:<6} ${:>14}  {:>6}%",
          slice.symbol,
          format_usd(slice.value),
          slice.percentage.round_dp(2)
        );
      }
      println!();
      println!("Recent trades:");
      let history: Vec<_> = match &symbol {
        Some(s) => market.ledger().trades_for(&s.to_ascii_uppercase()),
        None => market.ledger().trade_history().iter().collect(),
      };
      for trade in history.into_iter().take(trades) {
        println!(
          "  {} {:<4} {:>12} {:<6} @ {}  = ${}",
          trade.timestamp.format("%Y-%m-%d %H:%M:%S"),
          trade.side,
          trade.amount.normalize(),
          trade.symbol,
          format_price(trade.price),
          format_usd(trade.notional)
        );
      }
    }
    Command::Listings { search } => {
      let listings = market.search(search.as_deref().unwrap_or(""));
      for l in listings {
        println!(
          "{:<6} {:<24} {:>10} {:>7}  vol ${:<12} cap ${}",
          l.symbol,
          l.name,
          format_price(l.price),
          format_change(l.change_24h),
          l.volume_24h.normalize(),
          l.market_cap.normalize()
        );
      }
    }
    Command::Stats { trend } => {
      if let Some(stats) = market.stats() {
        println!("Best performing:  {} ({})", stats.best_performer, format_change(stats.best_change));
        println!("Worst performing: {} ({})", stats.worst_performer, format_change(stats.worst_change));
        println!("Most traded:      {} (${})", stats.most_traded, stats.most_traded_volume.normalize());
        println!("Total market cap: ${} across {} tokens", stats.total_market_cap.normalize(), stats.token_count);
      } else {
        println!("No listings");
      }
      if let Some(symbol) = trend {
        let points = market
          .trend(&symbol)
          .with_context(|| format!("Unknown token symbol '{symbol}'"))?;
        let line: Vec<String> = points.iter().map(|p| format_price(*p)).collect();
        println!("{symbol} trend: {}", line.join(" -> "));
      }
    }
    Command::Buy { symbol, amount } => {
      let outcome = market.trade(&symbol, TradeSide::Buy, amount).await?;
      println!("{}", outcome.message);
    }
    Command::Sell { symbol, amount } => {
      let outcome = market.trade(&symbol, TradeSide::Sell, amount).await?;
      println!("{}", outcome.message);
    }
    Command::AddFunds { amount } => {
      let cash = market.add_funds(amount).await?;
      println!("Cash balance: ${}", format_usd(cash));
    }
    Command::Reset => {
      market.reset().await?;
      println!("Portfolio reset to ${}", format_usd(market.ledger().cash()));
    }
    Command::Networks | Command::Admin { .. } | Command::Token { .. } => {}
  }
  Ok(())
}

async fn run_admin(config: &AppConfig, action: AdminCommand) -> Result<()> {
  let store = open_store(config).await?;
  let mut console = AdminConsole::open(store).await?;

  match action {
    AdminCommand::Show => {}
    AdminCommand::Role { role } => console.set_role(role).await?,
    AdminCommand::Fee { percent } => console.set_fee(percent).await?,
    AdminCommand::Kyc { enabled } => console.set_kyc_enabled(enabled).await?,
    AdminCommand::MaxSupply { supply } => console.set_max_supply(supply).await?,
    AdminCommand::BlacklistAdd { address } => {
      if !console.blacklist_add(&address).await? {
        println!("{address} is already blacklisted");
      }
    }
    AdminCommand::BlacklistRemove { address } => {
      if !console.blacklist_remove(&address).await? {
        println!("{address} was not blacklisted");
      }
    }
    AdminCommand::ClearAudit => console.clear_audit_log().await?,
    AdminCommand::Audit { limit } => {
      for entry in console.settings().audit_log().entries().iter().take(limit) {
        println!(
          "{}  {:<32} {:<7} {}",
          entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
          entry.action,
          entry.actor,
          entry.details
        );
      }
      return Ok(());
    }
  }

  let s = console.settings();
  println!("Role:             {}", s.role());
  println!("Platform fee:     {}%", s.platform_fee().normalize());
  println!("KYC required:     {}", if s.kyc_enabled() { "yes" } else { "no" });
  println!(
    "Max token supply: {}",
    tokenize_desk::domain::admin::group_thousands(s.max_token_supply())
  );
  println!("Blacklist:        {} address(es)", s.blacklist().len());
  for addr in s.blacklist() {
    println!("  {addr}");
  }
  println!("Audit entries:    {}", s.audit_log().len());
  Ok(())
}

fn print_networks(config: &AppConfig) {
  let default = config.endpoint(None);
  for chain in &SUPPORTED_CHAINS {
    let endpoint = config.endpoint(Some(chain.key));
    let marker = if chain.id == default.chain.id { "*" } else { " " };
    println!("{marker} {:<24} id {:<6} {:<5} {}", chain.name, chain.id, chain.currency, endpoint.rpc_url);
    println!("    explorer: {}", chain.explorer_url);
    println!("    faucet:   {}", chain.faucet_url);
  }
}

async fn run_token(
  config: &AppConfig,
  network_key: Option<&str>,
  address: Option<String>,
  private_key: Option<String>,
  action: TokenCommand,
) -> Result<()> {
  let endpoint = config.endpoint(network_key);
  let token_address = address
    .or_else(|| config.network.token_address.clone())
    .context("No token address configured (set TOKENIZE_TOKEN_ADDRESS or --address)")?;

  let signer = private_key
    .filter(|k| !k.trim().is_empty())
    .map(|k| k.trim().parse::<PrivateKeySigner>())
    .transpose()
    .context("Invalid PRIVATE_KEY")?;

  let chain = match ChainProvider::connect(&endpoint, signer).await {
    Ok(chain) => chain,
    Err(e) => return Err(report_chain_error(&e, true, e.reported_chain_id())),
  };

  let token = match ContractValidator::new(chain.inner())
    .ensure_deployed(&token_address)
    .await
  {
    Ok(token) => token,
    Err(e) => return Err(report_chain_error(&e, chain.signer().is_some(), Some(chain.chain_id()))),
  };

  let client = Arc::new(Erc20Client::new(
    &chain,
    token,
    ReceiptPoller::from_config(&config.receipts),
  ));
  let mut panel = TokenPanel::new(Arc::clone(&client));
  if let Err(e) = panel.refresh().await {
    return Err(report_chain_error(&e, chain.signer().is_some(), Some(chain.chain_id())));
  }

  match action {
    TokenCommand::Info => {
      if let Some(info) = panel.info() {
        println!("Name:         {}", info.name);
        println!("Symbol:       {}", info.symbol);
        println!("Decimals:     {}", info.decimals);
        println!(
          "Total supply: {}",
          tokenize_desk::domain::units::format_units(info.total_supply, info.decimals)
        );
        println!("Owner:        {}", info.owner);
        println!("Network:      {}", network::chain_name(chain.chain_id()));
        if let Some(url) = network::address_url(chain.chain_id(), &info.address.to_string()) {
          println!("Explorer:     {url}");
        }
        if panel.is_owner() {
          println!("You are the token owner");
        }
      }
    }
    TokenCommand::Balance { address } => {
      let holder: Address = match address {
        Some(a) => a.trim().parse().context("Invalid address")?,
        None => chain.signer().context("No address given and no signer configured")?,
      };
      let balance = client.balance_of(holder).await?;
      let symbol = panel.info().map_or("", |i| i.symbol.as_str());
      println!("{holder}: {} {symbol}", balance.formatted);
    }
    TokenCommand::Mint { to, amount } => {
      panel.mint(&to, &amount).await;
    }
    TokenCommand::Burn { amount } => {
      panel.burn(&amount).await;
    }
    TokenCommand::Transfer { to, amount } => {
      panel.transfer(&to, &amount).await;
    }
    TokenCommand::BatchTransfer { payouts } => {
      let pairs = payouts
        .iter()
        .map(|p| {
          p.split_once('=')
            .with_context(|| format!("Expected ADDRESS=AMOUNT, got '{p}'"))
        })
        .collect::<Result<Vec<_>>>()?;
      panel.batch_transfer(&pairs).await;
    }
  }

  let status = panel.status();
  if status.operation.is_none() {
    return Ok(());
  }
  for line in status_report(status, panel.notification(), chain.chain_id()) {
    println!("{line}");
  }
  anyhow::ensure!(status.state == TxState::Success, "{}", status.message);
  Ok(())
}

/// Status line, explorer link and any classified failure for a write.
fn status_report(status: &TxStatus, notification: Option<&Notification>, chain_id: u64) -> Vec<String> {
  let mut lines = vec![status.message.clone()];
  if let Some(hash) = status.tx_hash {
    match network::tx_url(chain_id, &hash.to_string()) {
      Some(url) => lines.push(format!("  {url}")),
      None => lines.push(format!("  tx {hash}")),
    }
  }
  if let Some(notification) = notification {
    let err = &notification.error;
    lines.push(format!("{}: {}", err.title, err.message));
    if let Some(details) = &err.details {
      lines.push(format!("  {details}"));
    }
    if let Some(action) = err.action {
      lines.push(format!("  -> {}", action.label()));
    }
  }
  lines
}

fn report_chain_error(
  err: &tokenize_desk::ports::token_contract::ChainError,
  connected: bool,
  chain_id: Option<u64>,
) -> anyhow::Error {
  let ctx = tokenize_desk::domain::errors::ClientContext { connected, chain_id };
  let classified = classify(&err.to_failure(), &ctx);
  eprintln!("{}: {}", classified.title, classified.message);
  if let Some(details) = &classified.details {
    eprintln!("  {details}");
  }
  anyhow::anyhow!("{err}")
}

#[cfg(test)]
mod tests {
  use alloy::primitives::TxHash;
  use tokenize_desk::domain::errors::{ClientContext, ProviderFailure, TxOperation};

  use super::*;

  #[test]
  fn test_failed_write_reports_notification() {
    let status = TxStatus {
      operation: Some(TxOperation::Transfer),
      state: TxState::Error,
      message: "Transaction rejected by user".to_string(),
      tx_hash: None,
    };
    let ctx = ClientContext {
      connected: true,
      chain_id: Some(1),
    };
    let note = Notification::new(classify(&ProviderFailure::new("boom"), &ctx));

    let lines = status_report(&status, Some(&note), 1);
    assert_eq!(lines[0], "Transaction rejected by user");
    assert!(lines[1].starts_with("Wrong Network: "));
    assert_eq!(lines.last().map(String::as_str), Some("  -> Switch Network"));
  }

  #[test]
  fn test_successful_write_links_explorer() {
    let status = TxStatus {
      operation: Some(TxOperation::Mint),
      state: TxState::Success,
      message: "Successfully minted 5 tokens".to_string(),
      tx_hash: Some(TxHash::repeat_byte(0xab)),
    };
    let lines = status_report(&status, None, 80_001);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("/tx/0xabab"));
  }
}
