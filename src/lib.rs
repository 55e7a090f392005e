//! # Provault Engine
//!
//! A proof-gated collateral and debt ledger for a USD-pegged synthetic
//! asset. Every balance-changing operation is gated on a cryptographic proof
//! that the account's post-operation state satisfies the solvency invariant;
//! the engine never recomputes that invariant itself, but it independently
//! derives the two numbers the proof must be about from live state, so a
//! proof over fabricated numbers can never pass.
//!
//! ## Architecture
//!
//! - **Core**: amount newtypes, collateral registry, account ledger, config
//! - **Oracle**: price source capability and the USD conversion adapter
//! - **Gate**: public statements, canonical encoding, proof verification
//! - **Custody**: the external asset-transfer capability
//! - **Protocol**: the four transition operations and the audit log
//!
//! ## Example
//!
//! ```rust,ignore
//! use provault::prelude::*;
//!
//! let engine = LedgerEngine::new(registry, source, verifier, custodian, params)?;
//!
//! // Deposit 10 WETH and mint 1,000 synthetic units against it
//! let receipt = engine.deposit_and_mint(&owner, &weth, deposit, mint, &proof, now)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod custody;
pub mod error;
pub mod gate;
pub mod oracle;
pub mod protocol;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        config::EngineParams,
        ledger::{Account, AccountLedger},
        registry::{CollateralKind, CollateralRegistry, OracleBinding},
        units::{DebtAmount, TokenAmount, UsdValue},
    };
    pub use crate::custody::{AssetTransfer, MemoryCustodian};
    pub use crate::error::{Error, FailureClass, Result};
    pub use crate::gate::{DigestVerifier, Proof, ProofGate, PublicStatement, StatementVerifier};
    pub use crate::oracle::{FixedPriceSource, OracleAdapter, PricePoint, PriceSource};
    pub use crate::protocol::{
        AccountInfo, EngineEvent, LedgerEngine, TransitionKind,
    };
    pub use crate::utils::crypto::{Hash, KeyPair, PublicKey};
}

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const ENGINE_NAME: &str = "provault";
