//! # Token Identifiers and Canonical Pairs
//!
//! Tokens, pairs and accounts are all identified by 20-byte addresses. A pair
//! of tokens is unordered from the caller's point of view but always stored in
//! canonical form, `token0 < token1`, so that `(A, B)` and `(B, A)` resolve to
//! the same pair everywhere in the engine.
//!
//! ```rust
//! use types::{Address, TokenPair};
//!
//! let a = Address::from_low_u64_be(0xB);
//! let b = Address::from_low_u64_be(0xA);
//!
//! let pair = TokenPair::new(a, b).unwrap();
//! assert_eq!(pair.token0(), b);
//! assert_eq!(pair, TokenPair::new(b, a).unwrap());
//! ```

use crate::common::errors::ValidationError;
use ethereum_types::Address;
use serde::{Deserialize, Serialize};

/// Parse a `0x`-prefixed (or bare) 40 character hex string into an address
pub fn parse_address(input: &str) -> Result<Address, ValidationError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != 40 {
        return Err(ValidationError::InvalidAddress {
            input: input.to_string(),
            reason: format!("expected 40 hex digits, found {}", digits.len()),
        });
    }

    let bytes = hex::decode(digits).map_err(|e| ValidationError::InvalidAddress {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    Ok(Address::from_slice(&bytes))
}

/// Check whether a string is a well-formed address
pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_ok()
}

/// Order two token addresses canonically
///
/// Rejects identical tokens first, then the zero address. Since the zero
/// address sorts lowest, only `token0` needs checking.
pub fn sort_tokens(
    token_a: Address,
    token_b: Address,
) -> Result<(Address, Address), ValidationError> {
    if token_a == token_b {
        return Err(ValidationError::IdenticalTokens(token_a));
    }
    let (token0, token1) = if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    if token0.is_zero() {
        return Err(ValidationError::ZeroAddress);
    }
    Ok((token0, token1))
}

/// Canonical, validated token pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenPair {
    token0: Address,
    token1: Address,
}

impl TokenPair {
    /// Build a canonical pair from two tokens in any order
    pub fn new(token_a: Address, token_b: Address) -> Result<Self, ValidationError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        Ok(Self { token0, token1 })
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }
}

/// Caller identity and clock reading for one externally submitted call
///
/// The environment that sequences calls supplies both values; the engine
/// never reads a wall clock itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub sender: Address,
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(sender: Address, timestamp: u64) -> Self {
        Self { sender, timestamp }
    }

    /// Same instant, issued by a different caller (a router calling a pair)
    pub fn with_sender(&self, sender: Address) -> Self {
        Self {
            sender,
            timestamp: self.timestamp,
        }
    }

    /// Timestamp truncated to 32 bits, as tracked by the price oracle
    pub fn block_timestamp(&self) -> u32 {
        (self.timestamp % (1u64 << 32)) as u32
    }
}
