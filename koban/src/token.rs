//! Token-amount scaling and ERC-20 transfer payload construction.
//!
//! The wallet API reports balances as hex strings in base units and
//! accepts transfer calldata as `0x`-prefixed hex. This module converts
//! between human amounts and base units, and encodes the standard
//! `transfer(address,uint256)` call.

use alloy::primitives::{Address, U256, hex};
use alloy::sol_types::SolCall;

use crate::error::Error;

/// Decimal count of the USDC token family.
pub const USDC_DECIMALS: u32 = 6;

/// Decimal count of native EVM tokens (wei per ether).
pub const NATIVE_DECIMALS: u32 = 18;

/// Minimal ERC-20 ABI fragment for transfer payloads.
mod abi {
    alloy::sol! {
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Scale a human token amount to base units.
///
/// Exact for scale-aligned inputs (`100.0` at 6 decimals is exactly
/// `100_000_000`); sub-unit float noise is rounded away. Amounts beyond
/// f64 integer precision lose digits, which is acceptable for the test
/// and treasury amounts this client moves.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `amount` is negative, non-finite,
/// or overflows 128 bits after scaling.
pub fn to_base_units(amount: f64, decimals: u32) -> Result<u128, Error> {
    if !amount.is_finite() {
        return Err(Error::validation(format!(
            "token amount must be finite, got {amount}"
        )));
    }
    if amount < 0.0 {
        return Err(Error::validation(format!(
            "token amount must be non-negative, got {amount}"
        )));
    }

    let scaled = (amount * 10f64.powi(decimals as i32)).round();
    if !scaled.is_finite() || scaled > u128::MAX as f64 {
        return Err(Error::validation(format!(
            "token amount {amount} overflows at {decimals} decimals"
        )));
    }

    Ok(scaled as u128)
}

/// Scale base units back to a human token amount.
#[must_use]
pub fn from_base_units(units: u128, decimals: u32) -> f64 {
    units as f64 / 10f64.powi(decimals as i32)
}

/// Decode a balance value as reported by the wallet API.
///
/// Balances arrive as hex strings, with or without a `0x` prefix.
///
/// # Errors
///
/// Returns [`Error::PostCondition`] when the value is empty or not
/// valid hex; the surrounding response was otherwise successful.
pub fn parse_hex_balance(value: &str) -> Result<u128, Error> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() {
        return Err(Error::post_condition(format!(
            "empty token balance value '{value}'"
        )));
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| Error::post_condition(format!("malformed token balance '{value}': {e}")))
}

/// Encode `transfer(to, amount)` calldata as `0x`-prefixed hex.
///
/// `amount` is in base units. The selector comes from the canonical
/// ERC-20 signature.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `to` is not a valid EVM address.
pub fn encode_transfer(to: &str, amount: u128) -> Result<String, Error> {
    let to: Address = to
        .parse()
        .map_err(|e| Error::validation(format!("invalid recipient address '{to}': {e}")))?;
    let calldata = abi::transferCall {
        to,
        amount: U256::from(amount),
    }
    .abi_encode();
    Ok(format!("0x{}", hex::encode(calldata)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod scaling {
        use super::*;

        #[test]
        fn round_trips_scale_aligned_amounts() {
            let units = to_base_units(100.0, USDC_DECIMALS).unwrap();
            assert_eq!(units, 100_000_000);
            assert_eq!(from_base_units(units, USDC_DECIMALS), 100.0);
        }

        #[test]
        fn fractional_amounts() {
            assert_eq!(to_base_units(1.5, USDC_DECIMALS).unwrap(), 1_500_000);
            assert_eq!(to_base_units(0.1, USDC_DECIMALS).unwrap(), 100_000);
        }

        #[test]
        fn native_decimals() {
            assert_eq!(
                to_base_units(1.0, NATIVE_DECIMALS).unwrap(),
                1_000_000_000_000_000_000
            );
        }

        #[test]
        fn zero_is_zero() {
            assert_eq!(to_base_units(0.0, USDC_DECIMALS).unwrap(), 0);
        }

        #[test]
        fn negative_amount_is_validation_error() {
            let err = to_base_units(-1.0, USDC_DECIMALS).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        #[test]
        fn non_finite_amount_is_validation_error() {
            assert!(to_base_units(f64::NAN, USDC_DECIMALS).is_err());
            assert!(to_base_units(f64::INFINITY, USDC_DECIMALS).is_err());
        }

        #[test]
        fn overflowing_amount_is_validation_error() {
            let err = to_base_units(1e39, 0).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
    }

    mod balance {
        use super::*;

        #[test]
        fn parses_prefixed_hex() {
            assert_eq!(parse_hex_balance("0x5f5e100").unwrap(), 100_000_000);
        }

        #[test]
        fn parses_bare_hex() {
            assert_eq!(parse_hex_balance("5f5e100").unwrap(), 100_000_000);
        }

        #[test]
        fn parses_zero() {
            assert_eq!(parse_hex_balance("0x0").unwrap(), 0);
        }

        #[test]
        fn empty_value_is_error() {
            assert!(parse_hex_balance("").is_err());
            assert!(parse_hex_balance("0x").is_err());
        }

        #[test]
        fn non_hex_value_is_error() {
            let err = parse_hex_balance("0xnotahexvalue").unwrap_err();
            assert!(matches!(err, Error::PostCondition(_)));
        }
    }

    mod calldata {
        use super::*;

        const RECIPIENT: &str = "0x036CbD53842c5426634e7929541eC2318f3dCF7e";

        #[test]
        fn uses_canonical_transfer_selector() {
            let data = encode_transfer(RECIPIENT, 50_000_000).unwrap();
            assert!(data.starts_with("0xa9059cbb"));
        }

        #[test]
        fn encodes_two_abi_words() {
            let data = encode_transfer(RECIPIENT, 1).unwrap();
            // selector + two 32-byte words, hex-encoded with a 0x prefix
            assert_eq!(data.len(), 2 + 8 + 64 + 64);
        }

        #[test]
        fn embeds_recipient_and_amount() {
            let data = encode_transfer(RECIPIENT, 50_000_000).unwrap();
            let lower = data.to_ascii_lowercase();
            assert!(lower.contains("036cbd53842c5426634e7929541ec2318f3dcf7e"));
            assert!(lower.ends_with(&format!("{:064x}", 50_000_000u128)));
        }

        #[test]
        fn invalid_recipient_is_validation_error() {
            let err = encode_transfer("not-an-address", 1).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
    }
}
