//! The four transition operations and their orchestration.

pub mod engine;
pub mod events;
pub mod operations;

pub use engine::LedgerEngine;
pub use events::{EngineEvent, EventLog};
pub use operations::{
    AccountInfo, BurnOnlyReceipt, DepositAndMintReceipt, RedeemAndBurnReceipt, RedeemOnlyReceipt,
    TransitionKind,
};
