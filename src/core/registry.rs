//! Collateral kind registry.
//!
//! The registry is the engine-initialization-time list of accepted collateral
//! kinds and their oracle bindings. It is immutable after construction and
//! iterates in insertion order, which makes every total-value fold over an
//! account deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::validation::validate_kind_symbol;

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL KIND
// ═══════════════════════════════════════════════════════════════════════════════

/// Identifier of an accepted collateral kind (a short ASCII symbol)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollateralKind(String);

impl CollateralKind {
    /// Create a kind from its symbol, validating the symbol shape
    pub fn new(symbol: impl Into<String>) -> Result<Self> {
        let symbol = symbol.into();
        validate_kind_symbol(&symbol)?;
        Ok(Self(symbol))
    }

    /// The symbol string
    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollateralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE BINDING
// ═══════════════════════════════════════════════════════════════════════════════

/// Binding of a collateral kind to the price feed that quotes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleBinding {
    /// Feed identifier understood by the external price source
    pub feed: String,
}

impl OracleBinding {
    /// Create a binding for a feed identifier
    pub fn new(feed: impl Into<String>) -> Self {
        Self { feed: feed.into() }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// The fixed list of accepted collateral kinds.
///
/// Kinds are held in insertion order; `kinds()` always yields the same
/// sequence, so folds over it are reproducible. The list is small and fixed,
/// so lookups scan it directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollateralRegistry {
    entries: Vec<(CollateralKind, OracleBinding)>,
}

impl CollateralRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collateral kind with its oracle binding.
    ///
    /// Construction-time only; the engine takes ownership of the registry
    /// and exposes no mutable access afterwards.
    pub fn register(&mut self, kind: CollateralKind, binding: OracleBinding) -> Result<()> {
        if self.is_allowed(&kind) {
            return Err(Error::DuplicateKind(kind.symbol().to_string()));
        }
        self.entries.push((kind, binding));
        Ok(())
    }

    /// Whether the kind is accepted
    pub fn is_allowed(&self, kind: &CollateralKind) -> bool {
        self.entries.iter().any(|(k, _)| k == kind)
    }

    /// Oracle binding for a kind
    pub fn binding(&self, kind: &CollateralKind) -> Result<&OracleBinding> {
        self.entries
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, b)| b)
            .ok_or_else(|| Error::UnknownCollateralKind(kind.symbol().to_string()))
    }

    /// Registered kinds, in insertion order
    pub fn kinds(&self) -> impl Iterator<Item = &CollateralKind> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(s: &str) -> CollateralKind {
        CollateralKind::new(s).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CollateralRegistry::new();
        registry
            .register(kind("WETH"), OracleBinding::new("ETH-USD"))
            .unwrap();
        registry
            .register(kind("WBTC"), OracleBinding::new("BTC-USD"))
            .unwrap();

        assert!(registry.is_allowed(&kind("WETH")));
        assert!(!registry.is_allowed(&kind("DOGE")));
        assert_eq!(registry.binding(&kind("WBTC")).unwrap().feed, "BTC-USD");
        assert_eq!(
            registry.binding(&kind("DOGE")),
            Err(Error::UnknownCollateralKind("DOGE".into()))
        );
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut registry = CollateralRegistry::new();
        registry
            .register(kind("WETH"), OracleBinding::new("ETH-USD"))
            .unwrap();
        let result = registry.register(kind("WETH"), OracleBinding::new("ETH-USD-2"));
        assert_eq!(result, Err(Error::DuplicateKind("WETH".into())));
    }

    #[test]
    fn test_iteration_order_is_insertion_order() {
        let mut registry = CollateralRegistry::new();
        for symbol in ["C3", "A1", "B2"] {
            registry
                .register(kind(symbol), OracleBinding::new(symbol))
                .unwrap();
        }
        let order: Vec<_> = registry.kinds().map(|k| k.symbol().to_string()).collect();
        assert_eq!(order, vec!["C3", "A1", "B2"]);
    }

    #[test]
    fn test_invalid_symbol_rejected() {
        assert!(CollateralKind::new("bad symbol").is_err());
        assert!(CollateralKind::new("").is_err());
    }
}
