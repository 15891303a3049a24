//! Pool trait definitions for unified AMM interface

use crate::error::Result;
use crate::v2_math::{V2Math, V2PoolState};
use types::U256;

/// Unified pool interface for path pricing
pub trait AmmPool {
    /// Calculate output amount for given input
    fn get_amount_out(&self, amount_in: U256) -> Result<U256>;

    /// Calculate required input for desired output
    fn get_amount_in(&self, amount_out: U256) -> Result<U256>;

    /// Get current reserves as `(reserve_in, reserve_out)`
    fn get_liquidity(&self) -> (U256, U256);
}

impl AmmPool for V2PoolState {
    fn get_amount_out(&self, amount_in: U256) -> Result<U256> {
        V2Math::get_amount_out(amount_in, self.reserve_in, self.reserve_out)
    }

    fn get_amount_in(&self, amount_out: U256) -> Result<U256> {
        V2Math::get_amount_in(amount_out, self.reserve_in, self.reserve_out)
    }

    fn get_liquidity(&self) -> (U256, U256) {
        (self.reserve_in, self.reserve_out)
    }
}
