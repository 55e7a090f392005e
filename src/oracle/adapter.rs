//! USD conversion through the external price source.
//!
//! The adapter is the only component that touches raw oracle observations.
//! It validates each observation (positive price, within the staleness
//! bound), normalizes it to the internal 10^18 scale, and converts token
//! amounts to USD values with truncating integer arithmetic.

use std::sync::Arc;

use crate::core::registry::{CollateralKind, CollateralRegistry};
use crate::core::units::{TokenAmount, UsdValue};
use crate::error::{Error, Result};
use crate::oracle::source::PriceSource;
use crate::utils::constants::MAX_PRICE_DECIMALS;
use crate::utils::math::{amount_from_value, normalize_price, value_from_amount};

/// Price oracle adapter for the registered collateral kinds.
pub struct OracleAdapter<S: PriceSource> {
    registry: Arc<CollateralRegistry>,
    source: S,
    max_age_secs: u64,
}

impl<S: PriceSource> OracleAdapter<S> {
    /// Create an adapter over a registry and an external price source
    pub fn new(registry: Arc<CollateralRegistry>, source: S, max_age_secs: u64) -> Self {
        Self {
            registry,
            source,
            max_age_secs,
        }
    }

    /// The registry this adapter prices against
    pub fn registry(&self) -> &CollateralRegistry {
        &self.registry
    }

    /// Staleness bound in seconds
    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    /// USD value of `amount` base units of `kind`, truncating toward zero.
    pub fn value_in_usd(
        &self,
        kind: &CollateralKind,
        amount: TokenAmount,
        now: u64,
    ) -> Result<UsdValue> {
        let price = self.normalized_price(kind, now)?;
        let value = value_from_amount(amount.units(), price)?;
        Ok(UsdValue::from_raw(value))
    }

    /// Token base units of `kind` worth `usd_value`, truncating toward zero.
    ///
    /// Display/estimation use only; transition operations never consult it.
    pub fn amount_from_usd(
        &self,
        kind: &CollateralKind,
        usd_value: UsdValue,
        now: u64,
    ) -> Result<TokenAmount> {
        let price = self.normalized_price(kind, now)?;
        let amount = amount_from_value(usd_value.raw(), price)?;
        Ok(TokenAmount::from_units(amount))
    }

    /// Fetch, validate and normalize the current price for a kind.
    fn normalized_price(&self, kind: &CollateralKind, now: u64) -> Result<u128> {
        let binding = self.registry.binding(kind)?;
        let point = self.source.latest(binding)?;

        if point.price == 0 || !point.is_fresh(now, self.max_age_secs) {
            let age = point.age(now);
            tracing::warn!(
                kind = %kind,
                feed = %binding.feed,
                age_secs = age,
                price = point.price,
                "rejecting unusable price observation"
            );
            return Err(Error::StalePrice {
                age_secs: age,
                max_age_secs: self.max_age_secs,
            });
        }

        if point.decimals > MAX_PRICE_DECIMALS {
            return Err(Error::SourceUnavailable(format!(
                "feed {} reports unsupported decimals {}",
                binding.feed, point.decimals
            )));
        }

        normalize_price(point.price, point.decimals)
    }
}
