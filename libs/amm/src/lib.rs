//! # AMM Library - Constant-Product Exchange Engine
//!
//! ## Purpose
//!
//! Deterministic, in-process constant-product market maker: a registry that
//! creates and indexes pairs, a reserve engine per canonical token pair, and
//! a stateless router composing balanced liquidity deposits and multi-hop
//! swaps. All amounts are exact `U256` integers; every formula floors the
//! same way on the quoting side and on the invariant-checking side.
//!
//! ## Integration Points
//!
//! - **Custody**: token balances live behind the [`TokenLedger`] trait; the
//!   engine reads balances and instructs transfers, never holding funds itself
//! - **Callers**: every mutating call carries a [`CallContext`](types::CallContext)
//!   with the caller identity and the current timestamp
//! - **Events**: operations return an [`Outcome`](types::Outcome) with the
//!   events they produced, in emission order
//! - **Configuration**: registry and router identities come from
//!   [`ProtocolConfig`](protocol_config::ProtocolConfig)
//!
//! ## Architecture Role
//!
//! ```text
//! Router ──derives address──▶ PairRegistry ──owns──▶ Pair (reserve engine)
//!    │                             │                      │
//!    └────── transfer_from ───────▶ TokenLedger ◀── balance_of / transfer
//! ```
//!
//! Every public operation is all-or-nothing: a failure anywhere restores the
//! registry, the pairs and the ledger to their state before the call.

mod atomic;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod pair;
pub mod pair_address;
pub mod pool_traits;
pub mod router;
pub mod v2_math;

pub use error::{AmmError, LedgerError, Result};
pub use factory::PairRegistry;
pub use ledger::{InMemoryLedger, TokenLedger};
pub use pair::Pair;
pub use pair_address::{default_pair_code_hash, pair_for};
pub use pool_traits::AmmPool;
pub use router::{
    AddLiquidityParams, RemoveLiquidityParams, Router, SwapExactTokensForTokensParams,
    SwapTokensForExactTokensParams,
};
pub use v2_math::{V2Math, V2PoolState};
