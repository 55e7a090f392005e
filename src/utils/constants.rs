//! Engine constants and magic numbers.
//!
//! All engine-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE NORMALIZATION CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fractional digits of the internal normalized price scale
pub const USD_SCALE_DECIMALS: u32 = 18;

/// Internal normalized price scale (10^18)
pub const USD_SCALE: u128 = 1_000_000_000_000_000_000;

/// Maximum oracle-reported decimals the adapter will normalize
pub const MAX_PRICE_DECIMALS: u8 = 18;

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum price staleness in seconds (1 hour)
pub const MAX_PRICE_STALENESS_SECS: u64 = 3600;

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC STATEMENT ENCODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Width of one statement element: a 128-bit big-endian unsigned integer
pub const STATEMENT_WORD_BYTES: usize = 16;

/// Total canonical statement length: debt word followed by collateral word
pub const STATEMENT_BYTES: usize = 2 * STATEMENT_WORD_BYTES;

// ═══════════════════════════════════════════════════════════════════════════════
// CRYPTOGRAPHIC CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of a public key in bytes (compressed secp256k1)
pub const PUBKEY_LENGTH: usize = 33;

/// Length of a hash in bytes (SHA256)
pub const HASH_LENGTH: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length of a collateral kind symbol
pub const MAX_KIND_SYMBOL_LEN: usize = 16;
