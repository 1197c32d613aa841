use ethers::{
    types::U256,
    utils::{format_units, parse_units},
};
use thiserror::Error;

use crate::constants::TOKEN_DECIMALS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("invalid amount {0:?}: expected a non-negative decimal number")]
    Malformed(String),
    #[error("amount {0:?} has more than 18 fractional digits")]
    TooPrecise(String),
    #[error("amount {0:?} does not fit in 256 bits")]
    Overflow(String),
}

/// A user-entered amount, kept both as the display value that is logged and
/// as the 18-decimal base units that are sent on-chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount {
    pub display: f64,
    pub base_units: U256,
}

impl Amount {
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let normalized = normalize(input)?;

        let base_units: U256 = parse_units(normalized.as_str(), TOKEN_DECIMALS)
            .map_err(|_| AmountError::Overflow(input.to_string()))?
            .into();
        let display = normalized
            .parse::<f64>()
            .map_err(|_| AmountError::Malformed(input.to_string()))?;

        Ok(Self { display, base_units })
    }
}

/// Scale a display string to base units.
pub fn to_base_units(input: &str) -> Result<U256, AmountError> {
    Amount::parse(input).map(|amount| amount.base_units)
}

/// Parse the display value only, with the same validation as [`Amount::parse`].
pub fn parse_display(input: &str) -> Result<f64, AmountError> {
    let normalized = normalize(input)?;
    normalized
        .parse::<f64>()
        .map_err(|_| AmountError::Malformed(input.to_string()))
}

/// Render base units as a decimal string without trailing zeros.
pub fn format_base_units(amount: U256) -> String {
    let formatted = match format_units(amount, TOKEN_DECIMALS) {
        Ok(formatted) => formatted,
        Err(_) => return amount.to_string(),
    };
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize(input: &str) -> Result<String, AmountError> {
    let trimmed = input.trim();
    let malformed = || AmountError::Malformed(input.to_string());

    if trimmed.is_empty() || trimmed == "." {
        return Err(malformed());
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(malformed());
    }
    if fraction.len() > TOKEN_DECIMALS as usize {
        return Err(AmountError::TooPrecise(input.to_string()));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    if fraction.is_empty() {
        Ok(whole.to_string())
    } else {
        Ok(format!("{whole}.{fraction}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scales_to_18_decimals() {
        let amount = Amount::parse("1.5").unwrap();
        assert_eq!(amount.display, 1.5);
        assert_eq!(amount.base_units, U256::from(15) * U256::exp10(17));

        let amount = Amount::parse("100").unwrap();
        assert_eq!(amount.base_units, U256::exp10(20));
    }

    #[test]
    fn test_parse_accepts_loose_decimal_forms() {
        assert_eq!(to_base_units(".5").unwrap(), U256::from(5) * U256::exp10(17));
        assert_eq!(to_base_units("2.").unwrap(), U256::from(2) * U256::exp10(18));
        assert_eq!(to_base_units(" 0 ").unwrap(), U256::zero());
        assert_eq!(to_base_units("0.000000000000000001").unwrap(), U256::one());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", ".", "abc", "-1", "1.2.3", "1e18", "1_000", "0x10"] {
            assert!(
                matches!(Amount::parse(input), Err(AmountError::Malformed(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        let input = "0.0000000000000000001";
        assert_eq!(
            Amount::parse(input),
            Err(AmountError::TooPrecise(input.to_string()))
        );
    }

    #[test]
    fn test_format_trims_trailing_zeros() {
        assert_eq!(format_base_units(U256::from(15) * U256::exp10(17)), "1.5");
        assert_eq!(format_base_units(U256::from(3) * U256::exp10(18)), "3");
        assert_eq!(format_base_units(U256::zero()), "0");
    }
}
