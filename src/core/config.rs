//! Engine configuration and parameters.

use serde::{Deserialize, Serialize};

use crate::utils::constants::{MAX_PRICE_STALENESS_SECS, STATEMENT_BYTES, USD_SCALE, USD_SCALE_DECIMALS};

/// Engine parameters, fixed at construction.
///
/// Solvency thresholds deliberately do not appear here: the threshold lives
/// in the proving circuit, and the engine only checks that a proof matches
/// the statement it derives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Engine version
    pub version: String,

    /// Maximum acceptable price-observation age in seconds
    pub max_price_staleness_secs: u64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            max_price_staleness_secs: MAX_PRICE_STALENESS_SECS,
        }
    }
}

impl EngineParams {
    /// Create with a custom staleness bound (for testing)
    pub fn with_staleness(mut self, secs: u64) -> Self {
        self.max_price_staleness_secs = secs;
        self
    }

    /// Fractional digits of the internal normalized price scale
    pub fn usd_scale_decimals(&self) -> u32 {
        USD_SCALE_DECIMALS
    }

    /// Internal normalized price scale
    pub fn usd_scale(&self) -> u128 {
        USD_SCALE
    }

    /// Canonical public-statement length in bytes
    pub fn statement_bytes(&self) -> usize {
        STATEMENT_BYTES
    }

    /// Validate parameters are consistent
    pub fn validate(&self) -> bool {
        self.max_price_staleness_secs > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = EngineParams::default();
        assert!(params.validate());
        assert_eq!(params.max_price_staleness_secs, MAX_PRICE_STALENESS_SECS);
        assert_eq!(params.statement_bytes(), 32);
    }

    #[test]
    fn test_zero_staleness_invalid() {
        let params = EngineParams::default().with_staleness(0);
        assert!(!params.validate());
    }
}
