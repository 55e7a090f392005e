//! Transition receipts and query views.
//!
//! Each of the four transitions returns a typed receipt describing exactly
//! what was committed. Receipts are produced only after a full commit; a
//! rejected attempt returns an error and no receipt.

use serde::{Deserialize, Serialize};

use crate::core::registry::CollateralKind;
use crate::core::units::{DebtAmount, TokenAmount, UsdValue};
use crate::utils::crypto::PublicKey;

/// The four transition shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Deposit collateral and mint debt
    DepositAndMint,
    /// Redeem collateral and burn debt
    RedeemAndBurn,
    /// Redeem collateral only
    RedeemOnly,
    /// Burn debt only
    BurnOnly,
}

impl TransitionKind {
    /// Operation name for logs and events
    pub fn name(&self) -> &'static str {
        match self {
            TransitionKind::DepositAndMint => "DepositAndMint",
            TransitionKind::RedeemAndBurn => "RedeemAndBurn",
            TransitionKind::RedeemOnly => "RedeemOnly",
            TransitionKind::BurnOnly => "BurnOnly",
        }
    }
}

/// Receipt of a committed deposit-and-mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAndMintReceipt {
    /// Account owner
    pub owner: PublicKey,
    /// Collateral kind deposited
    pub kind: CollateralKind,
    /// Token amount deposited
    pub deposited: TokenAmount,
    /// USD value of the deposit at the operation's price
    pub deposited_usd: UsdValue,
    /// Debt units minted
    pub minted: DebtAmount,
    /// Post-operation debt
    pub new_debt: DebtAmount,
    /// Post-operation collateral value
    pub new_collateral_usd: UsdValue,
}

/// Receipt of a committed redeem-and-burn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemAndBurnReceipt {
    /// Account owner
    pub owner: PublicKey,
    /// Collateral kind redeemed
    pub kind: CollateralKind,
    /// Token amount redeemed
    pub redeemed: TokenAmount,
    /// USD value of the redemption at the operation's price
    pub redeemed_usd: UsdValue,
    /// Debt units burned
    pub burned: DebtAmount,
    /// Post-operation debt
    pub new_debt: DebtAmount,
    /// Post-operation collateral value
    pub new_collateral_usd: UsdValue,
}

/// Receipt of a committed redeem-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemOnlyReceipt {
    /// Account owner
    pub owner: PublicKey,
    /// Collateral kind redeemed
    pub kind: CollateralKind,
    /// Token amount redeemed
    pub redeemed: TokenAmount,
    /// USD value of the redemption at the operation's price
    pub redeemed_usd: UsdValue,
    /// Post-operation collateral value
    pub new_collateral_usd: UsdValue,
}

/// Receipt of a committed burn-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnOnlyReceipt {
    /// Account owner
    pub owner: PublicKey,
    /// Debt units burned
    pub burned: DebtAmount,
    /// Post-operation debt
    pub new_debt: DebtAmount,
}

/// Read-only snapshot of an account's position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account owner
    pub owner: PublicKey,
    /// Issued debt
    pub debt: DebtAmount,
    /// Total collateral value at current prices
    pub collateral_usd: UsdValue,
}
