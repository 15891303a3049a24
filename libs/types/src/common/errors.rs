//! Error types for identifier validation
//!
//! Raised when a token identifier or token pair cannot be used by the engine.

use ethereum_types::Address;
use thiserror::Error;

/// Errors that can occur while validating token identifiers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Both sides of a pair name the same token
    #[error("Identical token addresses: {0:#x}")]
    IdenticalTokens(Address),

    /// The null identifier was used where a token is required
    #[error("Token address cannot be the zero address")]
    ZeroAddress,

    /// String input could not be parsed as a 20-byte address
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },
}
