//! Deterministic pair identity
//!
//! A pair's address is a pure function of the registry identity, the
//! canonical token pair and a fixed code fingerprint, following the CREATE2
//! rule:
//!
//! ```text
//! salt    = keccak256(token0 ‖ token1)
//! address = keccak256(0xff ‖ registry ‖ salt ‖ code_hash)[12..]
//! ```
//!
//! Anyone can compute it before the pair exists; the router locates pairs
//! this way instead of reading the registry.

use once_cell::sync::Lazy;
use protocol_config::{CREATE2_PREFIX, PAIR_CODE_TAG};
use sha3::{Digest, Keccak256};
use types::{Address, TokenPair, ValidationError, H256};

static DEFAULT_PAIR_CODE_HASH: Lazy<H256> = Lazy::new(|| keccak256(&[PAIR_CODE_TAG]));

/// keccak256 over the concatenation of `parts`
pub fn keccak256(parts: &[&[u8]]) -> H256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    H256::from_slice(&hasher.finalize())
}

/// Fingerprint used when the deployment does not override it
pub fn default_pair_code_hash() -> H256 {
    *DEFAULT_PAIR_CODE_HASH
}

/// Salt of a canonical pair: keccak256 of both token addresses, packed
pub fn pair_salt(pair: &TokenPair) -> H256 {
    keccak256(&[pair.token0().as_bytes(), pair.token1().as_bytes()])
}

/// Address of an already canonical pair
pub fn pair_address(registry: Address, pair: &TokenPair, code_hash: H256) -> Address {
    let salt = pair_salt(pair);
    let digest = keccak256(&[
        &[CREATE2_PREFIX][..],
        registry.as_bytes(),
        salt.as_bytes(),
        code_hash.as_bytes(),
    ]);
    Address::from_slice(&digest.as_bytes()[12..])
}

/// Address of the pair for two tokens given in any order
pub fn pair_for(
    registry: Address,
    token_a: Address,
    token_b: Address,
    code_hash: H256,
) -> Result<Address, ValidationError> {
    let pair = TokenPair::new(token_a, token_b)?;
    Ok(pair_address(registry, &pair, code_hash))
}
