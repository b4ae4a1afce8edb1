//! Decimal unit conversions
//!
//! Balances are integers in base units. These helpers convert human-readable
//! decimal strings ("1.5") to base units for a given number of decimals and
//! back.

use crate::error::{Result, TokenError};

/// Decimals of the native currency and of the default token
pub const DEFAULT_DECIMALS: u8 = 18;

/// One whole native coin in base units (10^18)
pub const ETHER: u128 = 1_000_000_000_000_000_000;

/// Parse a decimal string into base units
pub fn parse_units(value: &str, decimals: u8) -> Result<u128> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TokenError::InvalidAmount("empty amount".to_string()));
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };

    if fraction.len() > decimals as usize {
        return Err(TokenError::InvalidAmount(format!(
            "{} has more than {} decimal places",
            value, decimals
        )));
    }

    let digits_ok = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits_ok(whole) || !digits_ok(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return Err(TokenError::InvalidAmount(value.to_string()));
    }

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or(TokenError::Overflow)?;

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .map_err(|_| TokenError::InvalidAmount(value.to_string()))?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| TokenError::InvalidAmount(value.to_string()))?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or(TokenError::Overflow)
}

/// Parse an amount of native currency ("1", "0.002")
pub fn parse_ether(value: &str) -> Result<u128> {
    parse_units(value, DEFAULT_DECIMALS)
}

/// Render base units as a decimal string with trailing zeros trimmed
pub fn format_units(amount: u128, decimals: u8) -> String {
    // Above 38 decimals every u128 amount is a pure fraction
    let Some(scale) = 10u128.checked_pow(decimals as u32) else {
        let fraction = format!("{:0>width$}", amount, width = decimals as usize);
        let fraction = fraction.trim_end_matches('0');
        return if fraction.is_empty() {
            "0".to_string()
        } else {
            format!("0.{}", fraction)
        };
    };
    let whole = amount / scale;
    let fraction = amount % scale;

    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

pub fn format_ether(amount: u128) -> String {
    format_units(amount, DEFAULT_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ether() {
        assert_eq!(parse_ether("1").unwrap(), ETHER);
        assert_eq!(parse_ether("100").unwrap(), 100 * ETHER);
        assert_eq!(parse_ether("0.002").unwrap(), 2 * ETHER / 1000);
        assert_eq!(parse_ether(".5").unwrap(), ETHER / 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_ether("").is_err());
        assert!(parse_ether("1.2.3").is_err());
        assert!(parse_ether("-1").is_err());
        assert!(parse_ether("abc").is_err());
        assert!(parse_units("0.001", 2).is_err());
    }

    #[test]
    fn test_parse_overflow() {
        let huge = "1".repeat(25);
        assert!(matches!(parse_ether(&huge), Err(TokenError::Overflow)));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_ether(100 * ETHER), "100");
        assert_eq!(format_ether(ETHER / 2), "0.5");
        assert_eq!(format_ether(2 * ETHER / 1000), "0.002");
        assert_eq!(format_units(12345, 2), "123.45");
        assert_eq!(format_units(7, 0), "7");
    }

    #[test]
    fn test_format_units_beyond_u128_scale() {
        assert_eq!(format_units(0, 39), "0");
        assert_eq!(format_units(5, 40), format!("0.{}5", "0".repeat(39)));
        assert_eq!(format_units(u128::MAX, 255).len(), 2 + 255);
    }
}
