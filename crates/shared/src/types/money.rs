//! Money parsing and formatting.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts travel over the wire as decimal strings and are held as
//! `rust_decimal::Decimal` with at most two fractional digits.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::error::AppError;

/// Maximum number of fractional digits accepted for a monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Errors raised while parsing a monetary amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The string is not a decimal number.
    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),

    /// The amount carries more fractional digits than the ledger stores.
    #[error("Amount {0} has more than 2 decimal places")]
    TooPrecise(String),
}

impl From<MoneyError> for AppError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Parses a monetary amount from its string form.
///
/// Trailing zeros beyond the second decimal are accepted (`"10.500"`), any
/// other extra precision is rejected rather than rounded.
///
/// # Errors
///
/// Returns `MoneyError` if the string is not a decimal or is too precise.
pub fn parse_money(input: &str) -> Result<Decimal, MoneyError> {
    let trimmed = input.trim();
    let value =
        Decimal::from_str(trimmed).map_err(|_| MoneyError::InvalidFormat(trimmed.to_string()))?;
    let normalized = value.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(MoneyError::TooPrecise(trimmed.to_string()));
    }
    Ok(normalized)
}

/// Formats an amount with exactly two decimal places.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(MONEY_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("100", dec!(100))]
    #[case("100.5", dec!(100.5))]
    #[case(" 42.10 ", dec!(42.1))]
    #[case("10.500", dec!(10.5))]
    #[case("-3.25", dec!(-3.25))]
    fn test_parse_money_accepts(#[case] input: &str, #[case] expected: Decimal) {
        assert_eq!(parse_money(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_money_rejects_garbage() {
        assert_eq!(
            parse_money("12abc"),
            Err(MoneyError::InvalidFormat("12abc".to_string()))
        );
    }

    #[test]
    fn test_parse_money_rejects_sub_cent() {
        assert_eq!(
            parse_money("0.001"),
            Err(MoneyError::TooPrecise("0.001".to_string()))
        );
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(600)), "600.00");
        assert_eq!(format_money(dec!(0.5)), "0.50");
        assert_eq!(format_money(dec!(-12.345)), "-12.34");
    }

    #[test]
    fn test_money_error_is_validation() {
        let err: AppError = MoneyError::InvalidFormat("x".into()).into();
        assert_eq!(err.status_code(), 400);
    }
}
