//! Protocol constants
//!
//! Fixed economic parameters of the constant-product engine. The pair's
//! invariant check and the router's pricing formula both read these, so the
//! two can never disagree about the fee.

/// LP units permanently locked on the first mint of every pair
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Swap fee parameters, expressed in thousandths
pub mod fees {
    /// Denominator of all fee fractions
    pub const FEE_DENOMINATOR: u64 = 1_000;

    /// Fee charged on the input side of a swap (0.3%)
    pub const SWAP_FEE_NUMERATOR: u64 = 3;

    /// Portion of the input that reaches the reserves (99.7%)
    pub const AMOUNT_IN_WITH_FEE_NUMERATOR: u64 = FEE_DENOMINATOR - SWAP_FEE_NUMERATOR;

    /// Protocol fee takes 1/(n+1) of the growth in sqrt(k) when enabled
    pub const PROTOCOL_FEE_DIVISOR: u64 = 5;
}

/// Reserve storage limits
pub mod reserves {
    /// Reserves are bounded to unsigned 112-bit integers
    pub const RESERVE_BITS: usize = 112;

    /// Fixed-point resolution of the cumulative price accumulators (UQ112x112)
    pub const PRICE_RESOLUTION_BITS: usize = 112;
}

/// Tag hashed into the default pair code fingerprint
pub const PAIR_CODE_TAG: &[u8] = b"constant-product-pair/v1";

/// CREATE2 address derivation prefix byte
pub const CREATE2_PREFIX: u8 = 0xff;
