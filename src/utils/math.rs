//! Checked arithmetic and price normalization.
//!
//! This module provides safe arithmetic operations with overflow protection
//! and the fixed-point conversions between token amounts, oracle prices and
//! USD values. All division truncates toward zero.

use crate::error::{Error, Result};
use crate::utils::constants::{USD_SCALE, USD_SCALE_DECIMALS};

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe u64 addition with overflow check
pub fn safe_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe u64 subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or(Error::Overflow {
        operation: format!("{} - {}", a, b),
    })
}

/// Safe u128 addition with overflow check
pub fn safe_add_u128(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe u128 multiplication then division, truncating toward zero
pub fn safe_mul_div_u128(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return Err(Error::InvalidParameter {
            name: "divisor".into(),
            reason: "division by zero".into(),
        });
    }
    let product = a.checked_mul(b).ok_or(Error::Overflow {
        operation: format!("{} * {}", a, b),
    })?;
    Ok(product / c)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Normalize an oracle price reported with `decimals` fractional digits to
/// the internal 10^18 scale.
pub fn normalize_price(price: u64, decimals: u8) -> Result<u128> {
    let decimals = decimals as u32;
    if decimals <= USD_SCALE_DECIMALS {
        let factor = 10u128.pow(USD_SCALE_DECIMALS - decimals);
        (price as u128).checked_mul(factor).ok_or(Error::Overflow {
            operation: format!("normalize_price({}, {})", price, decimals),
        })
    } else {
        // More precision than the internal scale: truncate the excess digits.
        let divisor = 10u128.pow(decimals - USD_SCALE_DECIMALS);
        Ok(price as u128 / divisor)
    }
}

/// USD value of `amount` token base units at a normalized price.
///
/// `amount * normalized_price / 10^18`, truncating toward zero.
pub fn value_from_amount(amount: u64, normalized_price: u128) -> Result<u128> {
    safe_mul_div_u128(amount as u128, normalized_price, USD_SCALE)
}

/// Token base units worth `usd_value` at a normalized price.
///
/// `usd_value * 10^18 / normalized_price`, truncating toward zero.
pub fn amount_from_value(usd_value: u128, normalized_price: u128) -> Result<u64> {
    if normalized_price == 0 {
        return Err(Error::InvalidParameter {
            name: "normalized_price".into(),
            reason: "cannot be zero".into(),
        });
    }
    let amount = safe_mul_div_u128(usd_value, USD_SCALE, normalized_price)?;
    if amount > u64::MAX as u128 {
        return Err(Error::Overflow {
            operation: format!("amount_from_value({})", usd_value),
        });
    }
    Ok(amount as u64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNED DELTA APPLICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Apply a signed delta to an unsigned base, returning the signed result.
///
/// The result may be negative; deciding what a negative post-state means is
/// the caller's job. Fails only when the base or the sum exceeds i128 range.
pub fn apply_delta(base: u128, delta: i128) -> Result<i128> {
    let base = i128::try_from(base).map_err(|_| Error::Overflow {
        operation: format!("apply_delta base {}", base),
    })?;
    base.checked_add(delta).ok_or(Error::Overflow {
        operation: format!("{} + {}", base, delta),
    })
}
