//! Input validation helpers.
//!
//! Free-function validators used at operation entry points, before any state
//! is read.

use crate::error::{Error, Result};
use crate::utils::constants::MAX_KIND_SYMBOL_LEN;

/// Reject zero amounts
pub fn ensure_nonzero(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    Ok(())
}

/// Validate a collateral kind symbol: non-empty, bounded, ASCII alphanumeric
/// plus `-` and `_`.
pub fn validate_kind_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(Error::InvalidParameter {
            name: "symbol".into(),
            reason: "cannot be empty".into(),
        });
    }
    if symbol.len() > MAX_KIND_SYMBOL_LEN {
        return Err(Error::InvalidParameter {
            name: "symbol".into(),
            reason: format!("longer than {} bytes", MAX_KIND_SYMBOL_LEN),
        });
    }
    if !symbol
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(Error::InvalidParameter {
            name: "symbol".into(),
            reason: "must be ASCII alphanumeric, '-' or '_'".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_nonzero() {
        assert!(ensure_nonzero(1).is_ok());
        assert_eq!(ensure_nonzero(0), Err(Error::ZeroAmount));
    }

    #[test]
    fn test_kind_symbol() {
        assert!(validate_kind_symbol("WETH").is_ok());
        assert!(validate_kind_symbol("wrapped-btc_2").is_ok());
        assert!(validate_kind_symbol("").is_err());
        assert!(validate_kind_symbol("has space").is_err());
        assert!(validate_kind_symbol("waaaaaaaaaaaaaaaaytoolong").is_err());
    }
}
