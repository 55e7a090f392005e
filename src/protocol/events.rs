//! Engine events for state change notifications.
//!
//! Every committed transition appends its ledger effects to the event log,
//! giving embedders an audit trail they can drain and ship elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::registry::CollateralKind;
use crate::core::units::{DebtAmount, TokenAmount, UsdValue};
use crate::error::{Error, Result};
use crate::utils::crypto::PublicKey;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// All engine event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Collateral entered the vault and was credited to an account
    CollateralDeposited {
        /// Account owner
        owner: PublicKey,
        /// Collateral kind
        kind: CollateralKind,
        /// Token amount deposited
        amount: TokenAmount,
        /// USD value at the operation's price
        value_usd: UsdValue,
        /// Engine timestamp of the operation
        at: u64,
    },
    /// Collateral was debited from an account and released from the vault
    CollateralRedeemed {
        /// Account owner
        owner: PublicKey,
        /// Collateral kind
        kind: CollateralKind,
        /// Token amount redeemed
        amount: TokenAmount,
        /// USD value at the operation's price
        value_usd: UsdValue,
        /// Engine timestamp of the operation
        at: u64,
    },
    /// Synthetic debt was issued
    DebtMinted {
        /// Account owner
        owner: PublicKey,
        /// Debt units minted
        amount: DebtAmount,
        /// Engine timestamp of the operation
        at: u64,
    },
    /// Synthetic debt was retired
    DebtBurned {
        /// Account owner
        owner: PublicKey,
        /// Debt units burned
        amount: DebtAmount,
        /// Engine timestamp of the operation
        at: u64,
    },
}

/// An event with the wall-clock instant it was recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// The event
    pub event: EngineEvent,
    /// Wall-clock time the log recorded it
    pub recorded_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only log of committed transition effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<RecordedEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&mut self, event: EngineEvent) {
        self.events.push(RecordedEvent {
            event,
            recorded_at: Utc::now(),
        });
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over recorded events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &RecordedEvent> {
        self.events.iter()
    }

    /// Remove and return all recorded events, oldest first
    pub fn drain(&mut self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.events)
    }

    /// Export the log as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.events).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::KeyPair;

    #[test]
    fn test_record_and_drain() {
        let mut log = EventLog::new();
        let owner = *KeyPair::generate().public_key();

        log.record(EngineEvent::DebtMinted {
            owner,
            amount: DebtAmount::from_units(1000),
            at: 50,
        });
        log.record(EngineEvent::DebtBurned {
            owner,
            amount: DebtAmount::from_units(400),
            at: 60,
        });

        assert_eq!(log.len(), 2);
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());

        match &drained[0].event {
            EngineEvent::DebtMinted { amount, .. } => {
                assert_eq!(*amount, DebtAmount::from_units(1000))
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_json_export() {
        let mut log = EventLog::new();
        log.record(EngineEvent::DebtMinted {
            owner: *KeyPair::generate().public_key(),
            amount: DebtAmount::from_units(7),
            at: 1,
        });

        let json = log.to_json().unwrap();
        assert!(json.contains("DebtMinted"));
    }
}
