//! Constant-product AMM math with exact integer calculations
//!
//! Every formula here uses floor division on `U256`, exactly as the pair
//! engine does when it checks the invariant, so a quote computed off-band
//! matches the amount a live swap delivers.

use crate::error::{AmmError, Result};
use protocol_config::fees::{AMOUNT_IN_WITH_FEE_NUMERATOR, FEE_DENOMINATOR};
use types::U256;

/// Reserves of a pool seen from the direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2PoolState {
    pub reserve_in: U256,
    pub reserve_out: U256,
}

/// Constant-product math functions with zero precision loss
pub struct V2Math;

impl V2Math {
    /// Equivalent amount of the other asset at the current reserve ratio
    ///
    /// `amount_b = amount_a * reserve_b / reserve_a`, no fee applied.
    pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256> {
        if amount_a.is_zero() {
            return Err(AmmError::InsufficientAmount);
        }
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        Ok(mul(amount_a, reserve_b)? / reserve_a)
    }

    /// Calculate exact output amount using the fee-adjusted x*y=k formula
    ///
    /// `out = in * 997 * reserve_out / (reserve_in * 1000 + in * 997)`
    pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
        if amount_in.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let amount_in_with_fee = mul(amount_in, U256::from(AMOUNT_IN_WITH_FEE_NUMERATOR))?;
        let numerator = mul(amount_in_with_fee, reserve_out)?;
        let denominator = add(mul(reserve_in, U256::from(FEE_DENOMINATOR))?, amount_in_with_fee)?;

        Ok(numerator / denominator)
    }

    /// Calculate required input amount for a desired output (reverse calculation)
    ///
    /// Rounds up by one unit so the input always covers the output.
    pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }

        let numerator = mul(mul(reserve_in, amount_out)?, U256::from(FEE_DENOMINATOR))?;
        let denominator = mul(
            reserve_out - amount_out,
            U256::from(AMOUNT_IN_WITH_FEE_NUMERATOR),
        )?;

        add(numerator / denominator, U256::one())
    }

    /// Integer square root (Babylonian method), rounded down
    pub fn sqrt(y: U256) -> U256 {
        let two = U256::from(2u64);
        if y > U256::from(3u64) {
            let mut z = y;
            let mut x = y / two + U256::one();
            while x < z {
                z = x;
                x = (y / x + x) / two;
            }
            z
        } else if !y.is_zero() {
            U256::one()
        } else {
            U256::zero()
        }
    }
}

/// Checked multiplication mapping overflow to [`AmmError::Overflow`]
pub(crate) fn mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(AmmError::Overflow)
}

/// Checked addition mapping overflow to [`AmmError::Overflow`]
pub(crate) fn add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(AmmError::Overflow)
}

/// Checked subtraction mapping underflow to [`AmmError::Overflow`]
pub(crate) fn sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b).ok_or(AmmError::Overflow)
}
