use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use std::str::FromStr;

use crate::error::LedgerError;

/// Decimal exponent of the native asset (wei -> ETH), also used when a token
/// does not report its own.
pub const NATIVE_DECIMALS: u32 = 18;

/// Parse a smallest-unit amount. Only plain non-negative integer strings are accepted.
pub fn parse_raw_amount(raw: &str) -> Result<BigDecimal, LedgerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::InvalidAmount(raw.to_string()));
    }
    BigDecimal::from_str(trimmed).map_err(|_| LedgerError::InvalidAmount(raw.to_string()))
}

/// Parse a token's decimal exponent as reported by the explorer.
pub fn parse_decimals(raw: &str) -> Result<u32, LedgerError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| LedgerError::InvalidAmount(format!("decimals '{}'", raw)))
}

/// `amount / 10^decimals` as a display value. Precision past ~15 significant
/// digits is lost.
pub fn scale_down(amount: &BigDecimal, decimals: u32) -> f64 {
    let (digits, scale) = amount.as_bigint_and_exponent();
    BigDecimal::new(digits, scale + i64::from(decimals))
        .to_f64()
        .unwrap_or(0.0)
}

pub fn normalize(raw: &str, decimals: u32) -> Result<f64, LedgerError> {
    let amount = parse_raw_amount(raw)?;
    Ok(scale_down(&amount, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_ether() {
        assert_eq!(normalize("1000000000000000000", 18).unwrap(), 1.0);
    }

    #[test]
    fn test_fractional_balance() {
        assert_eq!(normalize("2500000000000000000", 18).unwrap(), 2.5);
        assert_eq!(normalize("1500000", 6).unwrap(), 1.5);
        assert_eq!(normalize("1", 18).unwrap(), 1e-18);
    }

    #[test]
    fn test_zero_and_no_decimals() {
        assert_eq!(normalize("0", 18).unwrap(), 0.0);
        assert_eq!(normalize("42", 0).unwrap(), 42.0);
    }

    #[test]
    fn test_amount_beyond_u128() {
        let raw = "1000000000000000000000000000000000000000000";
        assert_eq!(normalize(raw, 18).unwrap(), 1e24);
    }

    #[test]
    fn test_rejects_non_integer_amounts() {
        for raw in ["", "  ", "-1", "1.5", "0x10", "12abc", "1e18"] {
            assert!(
                matches!(normalize(raw, 18), Err(LedgerError::InvalidAmount(_))),
                "expected InvalidAmount for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_parse_decimals() {
        assert_eq!(parse_decimals("6").unwrap(), 6);
        assert_eq!(parse_decimals(" 18 ").unwrap(), 18);
        assert!(matches!(parse_decimals(""), Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(parse_decimals("-2"), Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn test_scale_down_negative() {
        let amount = BigDecimal::from(-2_500_000i64);
        assert_eq!(scale_down(&amount, 6), -2.5);
    }
}
