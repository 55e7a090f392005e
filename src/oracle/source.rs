//! Price source capability.
//!
//! The engine consumes prices through the [`PriceSource`] trait; production
//! deployments inject an adapter to their feed infrastructure, tests inject
//! [`FixedPriceSource`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::registry::OracleBinding;
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// A single price observation.
///
/// Ephemeral: fetched per query, used for one conversion, discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Price with `decimals` fractional digits (e.g. 200000 with 2 = $2,000.00)
    pub price: u64,
    /// Fractional digits of `price`
    pub decimals: u8,
    /// Unix timestamp of the observation
    pub observed_at: u64,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(price: u64, decimals: u8, observed_at: u64) -> Self {
        Self {
            price,
            decimals,
            observed_at,
        }
    }

    /// Age of the observation in seconds
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.observed_at)
    }

    /// Check if the observation is within the staleness bound
    pub fn is_fresh(&self, now: u64, max_age_secs: u64) -> bool {
        self.age(now) <= max_age_secs
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE SOURCE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// External price source capability.
///
/// A synchronous, read-only query with no side effects on the engine; it may
/// be invoked speculatively.
pub trait PriceSource: Send + Sync {
    /// Latest observation for a feed
    fn latest(&self, binding: &OracleBinding) -> Result<PricePoint>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED PRICE SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Deterministic in-memory price source for tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct FixedPriceSource {
    points: HashMap<String, PricePoint>,
}

impl FixedPriceSource {
    /// Create an empty source (every query fails `SourceUnavailable`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the observation returned for a feed
    pub fn set(&mut self, feed: impl Into<String>, point: PricePoint) {
        self.points.insert(feed.into(), point);
    }

    /// Remove a feed, making its queries fail `SourceUnavailable`
    pub fn unset(&mut self, feed: &str) {
        self.points.remove(feed);
    }
}

impl PriceSource for FixedPriceSource {
    fn latest(&self, binding: &OracleBinding) -> Result<PricePoint> {
        self.points
            .get(&binding.feed)
            .copied()
            .ok_or_else(|| Error::SourceUnavailable(binding.feed.clone()))
    }
}
