//! Property-Based Tests — Ledger and Validation Invariants
//!
//! Uses `proptest` to check that the portfolio ledger and the unit and
//! settings validators hold their invariants across random inputs.

use std::collections::HashMap;

use alloy::primitives::U256;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tokenize_desk::domain::admin::{AdminSettings, MAX_PLATFORM_FEE, Role};
use tokenize_desk::domain::ledger::PortfolioLedger;
use tokenize_desk::domain::units::{format_units, parse_units};

const SYMBOLS: [(&str, Decimal); 3] = [
    ("DMT", dec!(0.05)),
    ("RET", dec!(12.5)),
    ("GLD", dec!(1.85)),
];

#[derive(Debug, Clone)]
enum Op {
    Buy(usize, Decimal),
    Sell(usize, Decimal),
    Fund(Decimal),
}

fn amount() -> impl Strategy<Value = Decimal> + Clone {
    // -5.00 ..= 5000.00 in cents, so invalid amounts show up too.
    (-500i64..500_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Everyday amounts mixed with ones large enough to overflow.
fn wide_amount() -> impl Strategy<Value = Decimal> + Clone {
    prop_oneof![
        8 => amount(),
        1 => Just(Decimal::MAX),
        1 => (1u64..u64::MAX, 0u32..8).prop_map(|(m, e)| {
            Decimal::from(m) * Decimal::from(10u64.pow(e))
        }),
    ]
}

fn op_from(amounts: impl Strategy<Value = Decimal> + Clone) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..SYMBOLS.len(), amounts.clone()).prop_map(|(i, a)| Op::Buy(i, a)),
        (0..SYMBOLS.len(), amounts.clone()).prop_map(|(i, a)| Op::Sell(i, a)),
        amounts.prop_map(Op::Fund),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    op_from(wide_amount())
}

fn small_op() -> impl Strategy<Value = Op> {
    op_from(amount())
}

fn prices() -> HashMap<String, Decimal> {
    SYMBOLS.iter().map(|(s, p)| ((*s).to_string(), *p)).collect()
}

fn apply(ledger: &mut PortfolioLedger, op: &Op) -> bool {
    match op {
        Op::Buy(i, a) => ledger.buy(SYMBOLS[*i].0, SYMBOLS[*i].0, *a, SYMBOLS[*i].1).is_ok(),
        Op::Sell(i, a) => ledger.sell(SYMBOLS[*i].0, SYMBOLS[*i].0, *a, SYMBOLS[*i].1).is_ok(),
        Op::Fund(a) => ledger.add_funds(*a).is_ok(),
    }
}

// ── Portfolio Ledger Properties ─────────────────────────────

proptest! {
    /// Cash and every balance stay non-negative whatever the sequence.
    #[test]
    fn ledger_never_goes_negative(ops in prop::collection::vec(op(), 1..60)) {
        let mut ledger = PortfolioLedger::with_initial_cash(dec!(10000));
        for op in &ops {
            apply(&mut ledger, op);
            prop_assert!(ledger.cash() >= Decimal::ZERO, "cash went negative: {}", ledger.cash());
            for (symbol, qty) in ledger.balances() {
                prop_assert!(*qty >= Decimal::ZERO, "{symbol} balance went negative: {qty}");
            }
        }
    }

    /// A rejected operation leaves the ledger exactly as it was.
    #[test]
    fn rejected_ops_leave_state_unchanged(ops in prop::collection::vec(op(), 1..60)) {
        let mut ledger = PortfolioLedger::with_initial_cash(dec!(1000));
        for op in &ops {
            let before = ledger.clone();
            if !apply(&mut ledger, op) {
                prop_assert_eq!(&ledger, &before);
            }
        }
    }

    /// Trading at fixed prices moves value between cash and holdings
    /// without creating or destroying any.
    #[test]
    fn trades_conserve_value(ops in prop::collection::vec(small_op(), 1..60)) {
        let prices = prices();
        let mut ledger = PortfolioLedger::with_initial_cash(dec!(10000));
        let mut funded = dec!(10000);
        for op in &ops {
            if apply(&mut ledger, op) {
                if let Op::Fund(a) = op {
                    funded += *a;
                }
            }
            prop_assert_eq!(ledger.total_value(&prices), funded);
        }
    }

    /// Allocation percentages sum to 100 whenever there is value.
    #[test]
    fn allocation_sums_to_hundred(ops in prop::collection::vec(small_op(), 1..40)) {
        let prices = prices();
        let mut ledger = PortfolioLedger::with_initial_cash(dec!(10000));
        for op in &ops {
            apply(&mut ledger, op);
        }
        let total: Decimal = ledger.allocation(&prices).iter().map(|s| s.percentage).sum();
        prop_assert!((total - dec!(100)).abs() < dec!(0.0001), "allocation summed to {total}");
    }
}

// ── Unit Conversion Properties ──────────────────────────────

proptest! {
    /// Formatting then parsing a raw amount returns the same amount.
    #[test]
    fn format_parse_identity(raw in any::<u128>(), decimals in 0u8..=30) {
        let value = U256::from(raw);
        let text = format_units(value, decimals);
        prop_assert_eq!(parse_units(&text, decimals).unwrap(), value);
    }

    /// More fractional digits than the token supports is always rejected.
    #[test]
    fn excess_precision_rejected(whole in 0u64..1_000_000, decimals in 0u8..8) {
        let text = format!("{whole}.{}", "1".repeat(usize::from(decimals) + 1));
        prop_assert!(parse_units(&text, decimals).is_err());
    }
}

// ── Admin Settings Properties ───────────────────────────────

proptest! {
    /// Only fees within 0..=MAX_PLATFORM_FEE are ever accepted.
    #[test]
    fn fee_stays_in_range(cents in -2_000i64..3_000) {
        let fee = Decimal::new(cents, 2);
        let mut settings = AdminSettings::default();
        settings.set_role(Role::Admin);
        let accepted = settings.set_fee(fee).is_ok();
        prop_assert_eq!(accepted, fee >= Decimal::ZERO && fee <= MAX_PLATFORM_FEE);
        prop_assert!(settings.platform_fee() >= Decimal::ZERO);
        prop_assert!(settings.platform_fee() <= MAX_PLATFORM_FEE);
    }

    /// A plain user never changes anything but the role.
    #[test]
    fn user_cannot_change_settings(cents in 0i64..1_000, supply in 1u64..100_000_000) {
        let mut settings = AdminSettings::default();
        let before = settings.clone();
        prop_assert!(settings.set_fee(Decimal::new(cents, 2)).is_err());
        prop_assert!(settings.set_max_supply(supply).is_err());
        prop_assert!(settings.set_kyc_enabled(true).is_err());
        prop_assert_eq!(settings, before);
    }
}
