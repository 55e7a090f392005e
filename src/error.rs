//! Error types for the provault engine.
//!
//! This module defines all error types used throughout the engine,
//! providing clear and actionable error messages. Every error aborts the
//! operation that raised it with zero persisted side effects.

use thiserror::Error;

/// Result type alias for provault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure class of an error, used by callers to pick a retry strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Rejected before any state read; safe to retry with corrected input
    Input,
    /// Rejected after reading state but before any mutation; refresh and retry
    State,
    /// An external dependency failed; surfaced verbatim, caller decides
    External,
    /// The proof was not accepted; a fresh proof for current state is needed
    Security,
    /// Nested invocation detected; indicates a caller bug or malicious reentry
    Concurrency,
    /// Internal fault that should not occur in production
    Internal,
}

/// Main error type for the provault engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Amount is zero
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Collateral kind is not registered
    #[error("Unknown collateral kind: {0}")]
    UnknownCollateralKind(String),

    /// Collateral kind was registered twice
    #[error("Duplicate collateral kind: {0}")]
    DuplicateKind(String),

    /// Invalid input parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // State Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Not enough debt to burn the requested amount
    #[error("Insufficient debt: required {required}, available {available}")]
    InsufficientDebt {
        /// Debt units the operation needs
        required: u64,
        /// Debt units the account holds
        available: u64,
    },

    /// Not enough collateral to cover the requested movement
    #[error("Insufficient collateral: required {required}, available {available}")]
    InsufficientCollateral {
        /// Amount the operation needs
        required: u128,
        /// Amount the account holds
        available: u128,
    },

    /// The post-operation state would contain a negative balance
    #[error("Resulting state would be negative: debt {expected_debt}, collateral {expected_collateral_usd}")]
    NegativeResultingState {
        /// Signed post-operation debt
        expected_debt: i128,
        /// Signed post-operation collateral value in USD
        expected_collateral_usd: i128,
    },

    // ═══════════════════════════════════════════════════════════════════
    // External Dependency Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Price observation is older than the staleness bound, or non-positive
    #[error("Price is stale: observed {age_secs}s ago, max allowed {max_age_secs}s")]
    StalePrice {
        /// Seconds since the observation
        age_secs: u64,
        /// Maximum allowed age in seconds
        max_age_secs: u64,
    },

    /// The external price source could not produce an observation
    #[error("Price source unavailable: {0}")]
    SourceUnavailable(String),

    /// The external asset-transfer capability reported failure
    #[error("Asset transfer failed during {operation}: {reason}")]
    AssetTransferFailed {
        /// Transfer step that failed
        operation: String,
        /// Reason reported by the capability
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Security Errors
    // ═══════════════════════════════════════════════════════════════════

    /// The verifier did not accept the proof for the derived statement
    #[error("Proof rejected")]
    ProofRejected,

    // ═══════════════════════════════════════════════════════════════════
    // Concurrency Errors
    // ═══════════════════════════════════════════════════════════════════

    /// A transition re-entered the engine while another was in progress
    #[error("Reentrant call rejected")]
    ReentrantCall,

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Lock acquisition failed (poisoned)
    #[error("Failed to acquire lock")]
    Lock,

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Failure class of this error (drives caller retry policy)
    pub fn class(&self) -> FailureClass {
        match self {
            Error::ZeroAmount
            | Error::UnknownCollateralKind(_)
            | Error::DuplicateKind(_)
            | Error::InvalidParameter { .. } => FailureClass::Input,

            Error::InsufficientDebt { .. }
            | Error::InsufficientCollateral { .. }
            | Error::NegativeResultingState { .. } => FailureClass::State,

            Error::StalePrice { .. }
            | Error::SourceUnavailable(_)
            | Error::AssetTransferFailed { .. } => FailureClass::External,

            Error::ProofRejected => FailureClass::Security,

            Error::ReentrantCall => FailureClass::Concurrency,

            Error::Overflow { .. }
            | Error::Lock
            | Error::Serialization(_)
            | Error::Deserialization(_) => FailureClass::Internal,
        }
    }

    /// Returns true if retrying with the same inputs can ever succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self.class(), FailureClass::State | FailureClass::External)
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(self.class(), FailureClass::Internal)
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Input errors: 1xxx
            Error::ZeroAmount => 1001,
            Error::UnknownCollateralKind(_) => 1002,
            Error::DuplicateKind(_) => 1003,
            Error::InvalidParameter { .. } => 1004,

            // State errors: 2xxx
            Error::InsufficientDebt { .. } => 2001,
            Error::InsufficientCollateral { .. } => 2002,
            Error::NegativeResultingState { .. } => 2003,

            // External errors: 3xxx
            Error::StalePrice { .. } => 3001,
            Error::SourceUnavailable(_) => 3002,
            Error::AssetTransferFailed { .. } => 3003,

            // Security errors: 4xxx
            Error::ProofRejected => 4001,

            // Concurrency errors: 5xxx
            Error::ReentrantCall => 5001,

            // Internal errors: 9xxx
            Error::Overflow { .. } => 9001,
            Error::Lock => 9002,
            Error::Serialization(_) => 9003,
            Error::Deserialization(_) => 9004,
        }
    }
}
