//! # AMM Shared Types
//!
//! Identifier and event types shared by the registry, the pair engine, the
//! router and the tooling built on top of them.
//!
//! ## Design Philosophy
//!
//! - **Canonical Pairs**: [`TokenPair`] can only be built in `token0 < token1` order
//! - **Exact Integers**: all amounts are [`U256`], never floating point
//! - **Explicit Effects**: operations return an [`Outcome`] carrying their events
//!   instead of writing to an implicit log
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Address, CallContext, TokenPair};
//!
//! let owner = Address::from_low_u64_be(0x01);
//! let ctx = CallContext::new(owner, 1_700_000_000);
//!
//! let pair = TokenPair::new(
//!     Address::from_low_u64_be(0xB0),
//!     Address::from_low_u64_be(0xA0),
//! )
//! .unwrap();
//! assert!(pair.token0() < pair.token1());
//! assert_eq!(ctx.sender, owner);
//! ```

pub mod common;
pub mod events;

pub use common::errors::ValidationError;
pub use common::identifiers::{
    is_valid_address, parse_address, sort_tokens, CallContext, TokenPair,
};
pub use events::{AmmEvent, LogEntry, Outcome};

// Fixed-width primitives used throughout the engine
pub use ethereum_types::{Address, H256, U256};
