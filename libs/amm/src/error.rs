//! AMM Error Types
//!
//! Every failure of the registry, the pair engine and the router is a named,
//! synchronous error. A failed call leaves all state exactly as it was.

use thiserror::Error;
use types::{Address, ValidationError, U256};

/// Failures raised by the token custody layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance of {token:#x} for {owner:#x}: has {balance}, needs {needed}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        balance: U256,
        needed: U256,
    },

    #[error("Insufficient allowance of {token:#x} from {owner:#x} to {spender:#x}: has {allowance}, needs {needed}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        allowance: U256,
        needed: U256,
    },

    #[error("Total supply of {token:#x} would overflow")]
    SupplyOverflow { token: Address },
}

impl LedgerError {
    /// Short canonical revert code
    pub fn reason(&self) -> &'static str {
        match self {
            LedgerError::InsufficientBalance { .. } => "TRANSFER_AMOUNT_EXCEEDS_BALANCE",
            LedgerError::InsufficientAllowance { .. } => "INSUFFICIENT_ALLOWANCE",
            LedgerError::SupplyOverflow { .. } => "SUPPLY_OVERFLOW",
        }
    }
}

/// Unified error type for registry, pair and router operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    // Registry
    #[error("Identical token addresses")]
    IdenticalTokens,

    #[error("Zero address used as a token")]
    ZeroAddress,

    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Pair already exists for {token0:#x}/{token1:#x} at {pair:#x}")]
    PairExists {
        token0: Address,
        token1: Address,
        pair: Address,
    },

    #[error("Caller {caller:#x} is not the fee administrator")]
    Forbidden { caller: Address },

    // Pair engine
    #[error("Insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    #[error("Insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    #[error("Insufficient output amount")]
    InsufficientOutputAmount,

    #[error("Insufficient input amount")]
    InsufficientInputAmount,

    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Invalid recipient {to:#x}: recipient cannot be one of the pair tokens")]
    InvalidRecipient { to: Address },

    #[error("Constant-product invariant violated")]
    K,

    #[error("Arithmetic overflow")]
    Overflow,

    // Router
    #[error("Deadline {deadline} expired at {now}")]
    Expired { deadline: u64, now: u64 },

    #[error("Insufficient amount")]
    InsufficientAmount,

    #[error("Insufficient A amount: {amount} below minimum {min}")]
    InsufficientAAmount { amount: U256, min: U256 },

    #[error("Insufficient B amount: {amount} below minimum {min}")]
    InsufficientBAmount { amount: U256, min: U256 },

    #[error("Excessive input amount: {required} above maximum {max}")]
    ExcessiveInputAmount { required: U256, max: U256 },

    #[error("Invalid path: {len} tokens, need at least 2")]
    InvalidPath { len: usize },

    #[error("No pair for {token_a:#x}/{token_b:#x}")]
    PairNotFound { token_a: Address, token_b: Address },

    // Custody
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl AmmError {
    /// Short canonical revert code for compatibility with existing tooling
    pub fn reason(&self) -> &'static str {
        match self {
            AmmError::IdenticalTokens => "IDENTICAL_ADDRESSES",
            AmmError::ZeroAddress => "ZERO_ADDRESS",
            AmmError::InvalidAddress { .. } => "INVALID_ADDRESS",
            AmmError::PairExists { .. } => "PAIR_EXISTS",
            AmmError::Forbidden { .. } => "FORBIDDEN",
            AmmError::InsufficientLiquidityMinted => "INSUFFICIENT_LIQUIDITY_MINTED",
            AmmError::InsufficientLiquidityBurned => "INSUFFICIENT_LIQUIDITY_BURNED",
            AmmError::InsufficientOutputAmount => "INSUFFICIENT_OUTPUT_AMOUNT",
            AmmError::InsufficientInputAmount => "INSUFFICIENT_INPUT_AMOUNT",
            AmmError::InsufficientLiquidity => "INSUFFICIENT_LIQUIDITY",
            AmmError::InvalidRecipient { .. } => "INVALID_TO",
            AmmError::K => "K",
            AmmError::Overflow => "OVERFLOW",
            AmmError::Expired { .. } => "EXPIRED",
            AmmError::InsufficientAmount => "INSUFFICIENT_AMOUNT",
            AmmError::InsufficientAAmount { .. } => "INSUFFICIENT_A_AMOUNT",
            AmmError::InsufficientBAmount { .. } => "INSUFFICIENT_B_AMOUNT",
            AmmError::ExcessiveInputAmount { .. } => "EXCESSIVE_INPUT_AMOUNT",
            AmmError::InvalidPath { .. } => "INVALID_PATH",
            AmmError::PairNotFound { .. } => "PAIR_NOT_FOUND",
            AmmError::Ledger(inner) => inner.reason(),
        }
    }
}

impl From<ValidationError> for AmmError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IdenticalTokens(_) => AmmError::IdenticalTokens,
            ValidationError::ZeroAddress => AmmError::ZeroAddress,
            ValidationError::InvalidAddress { input, reason } => {
                AmmError::InvalidAddress { input, reason }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AmmError>;
