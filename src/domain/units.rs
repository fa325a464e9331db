//! Address and token-unit helpers.
//!
//! `format_units` / `parse_units` convert between raw integer token
//! amounts and their human decimal form. Formatting always keeps at
//! least one fractional digit (`1000000000000000000` at 18 decimals
//! renders as `1.0`).

use alloy::primitives::U256;
use thiserror::Error;

/// Upper bound on ERC-20 `decimals` that still fits a U256 scale factor.
pub const MAX_DECIMALS: u8 = 77;

/// Unit conversion and address validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("amount '{value}' has more than {decimals} fractional digits")]
    TooManyDecimals { value: String, decimals: u8 },

    #[error("unsupported decimals {0}")]
    UnsupportedDecimals(u8),
}

/// Whether `address` is `0x` followed by exactly 40 hex characters.
/// No checksum verification.
pub fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Validates an address, returning it trimmed.
///
/// # Errors
/// [`ValidationError::InvalidAddress`] when the format check fails.
pub fn validate_address(address: &str) -> Result<&str, ValidationError> {
    let trimmed = address.trim();
    if is_valid_address(trimmed) {
        Ok(trimmed)
    } else {
        Err(ValidationError::InvalidAddress(address.to_string()))
    }
}

fn scale(decimals: u8) -> Result<U256, ValidationError> {
    if decimals > MAX_DECIMALS {
        return Err(ValidationError::UnsupportedDecimals(decimals));
    }
    Ok(U256::from(10u8).pow(U256::from(decimals)))
}

/// Renders `raw` as a decimal string scaled down by `decimals`.
pub fn format_units(raw: U256, decimals: u8) -> String {
    let Ok(base) = scale(decimals) else {
        return raw.to_string();
    };
    let whole = raw / base;
    let frac = raw % base;

    if decimals == 0 {
        return format!("{whole}.0");
    }

    let padded = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let trimmed = padded.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Parses a human decimal amount into raw units scaled up by `decimals`.
///
/// # Errors
/// Rejects empty input, signs, non-digit characters, more fractional
/// digits than `decimals`, and values overflowing U256.
pub fn parse_units(text: &str, decimals: u8) -> Result<U256, ValidationError> {
    let text = text.trim();
    let invalid = || ValidationError::InvalidAmount(text.to_string());

    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(ValidationError::TooManyDecimals {
            value: text.to_string(),
            decimals,
        });
    }

    let base = scale(decimals)?;
    let whole_raw = if whole.is_empty() {
        U256::ZERO
    } else {
        whole.parse::<U256>().map_err(|_| invalid())?
    };
    let frac_raw = if frac.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{frac:0<width$}", width = decimals as usize);
        padded.parse::<U256>().map_err(|_| invalid())?
    };

    whole_raw
        .checked_mul(base)
        .and_then(|v| v.checked_add(frac_raw))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18))
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_valid_address("5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_valid_address("0x5FbDB2315678afecb367f032d93F642f64180aa"));
        assert!(!is_valid_address("0xZZbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_valid_address("0X5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(validate_address(" 0x5FbDB2315678afecb367f032d93F642f64180aa3 ").is_ok());
    }

    #[test]
    fn test_format_units_ethers_style() {
        assert_eq!(format_units(eth(1), 18), "1.0");
        assert_eq!(format_units(eth(3) / U256::from(2), 18), "1.5");
        assert_eq!(format_units(U256::from(1), 18), "0.000000000000000001");
        assert_eq!(format_units(U256::ZERO, 18), "0.0");
        assert_eq!(format_units(U256::from(42), 0), "42.0");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1", 18).unwrap(), eth(1));
        assert_eq!(parse_units("1.5", 18).unwrap(), eth(3) / U256::from(2));
        assert_eq!(parse_units(".5", 1).unwrap(), U256::from(5));
        assert_eq!(parse_units("100", 0).unwrap(), U256::from(100));
        assert_eq!(parse_units("2.000", 0).unwrap(), U256::from(2));
    }

    #[test]
    fn test_parse_units_rejects() {
        assert!(parse_units("", 18).is_err());
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("1e3", 18).is_err());
        assert!(parse_units("abc", 18).is_err());
        assert!(matches!(
            parse_units("1.25", 1),
            Err(ValidationError::TooManyDecimals { .. })
        ));
    }

    #[test]
    fn test_parse_format_agree() {
        let raw = parse_units("1234.5678", 18).unwrap();
        assert_eq!(format_units(raw, 18), "1234.5678");
    }
}
