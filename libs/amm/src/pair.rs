//! # Pair Reserve Engine
//!
//! Holds the reserves of one canonical token pair and executes
//! invariant-preserving liquidity and swap operations.
//!
//! ## Custody Model
//!
//! Callers move input tokens into the pair's custody *before* calling
//! [`Pair::mint`] or [`Pair::swap`]. The engine never trusts declared
//! amounts: it diffs actual ledger balances against its tracked reserves to
//! learn what was deposited. `swap` sends outputs optimistically and only
//! then checks that enough input arrived to keep the fee-adjusted product of
//! balances at or above the product of reserves.
//!
//! ## Atomicity
//!
//! Every public operation runs as one transition: on any error both the pair
//! and the ledger are restored, so no partial mint, burn or swap is ever
//! observable.

use crate::atomic::atomically;
use crate::error::{AmmError, Result};
use crate::ledger::TokenLedger;
use crate::v2_math::{mul, sub, V2Math, V2PoolState};
use protocol_config::fees::{FEE_DENOMINATOR, PROTOCOL_FEE_DIVISOR, SWAP_FEE_NUMERATOR};
use protocol_config::reserves::{PRICE_RESOLUTION_BITS, RESERVE_BITS};
use protocol_config::MINIMUM_LIQUIDITY;
use tracing::debug;
use types::{Address, AmmEvent, CallContext, LogEntry, Outcome, TokenPair, U256};

/// Largest value a reserve may hold (uint112)
pub fn max_reserve() -> U256 {
    (U256::one() << RESERVE_BITS) - U256::one()
}

/// Reserve engine state of a single pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    address: Address,
    factory: Address,
    token0: Address,
    token1: Address,

    reserve0: U256,
    reserve1: U256,
    block_timestamp_last: u32,

    // UQ112x112 time-weighted price accumulators, wrapping
    price0_cumulative_last: U256,
    price1_cumulative_last: U256,

    /// reserve0 * reserve1 as of the most recent liquidity event, when protocol fee is on
    k_last: U256,
}

impl Pair {
    /// Fresh pair with zero reserves; only the registry creates pairs
    pub(crate) fn new(address: Address, factory: Address, tokens: TokenPair) -> Self {
        Self {
            address,
            factory,
            token0: tokens.token0(),
            token1: tokens.token1(),
            reserve0: U256::zero(),
            reserve1: U256::zero(),
            block_timestamp_last: 0,
            price0_cumulative_last: U256::zero(),
            price1_cumulative_last: U256::zero(),
            k_last: U256::zero(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    /// `(reserve0, reserve1, block_timestamp_last)`
    pub fn get_reserves(&self) -> (U256, U256, u32) {
        (self.reserve0, self.reserve1, self.block_timestamp_last)
    }

    pub fn price0_cumulative_last(&self) -> U256 {
        self.price0_cumulative_last
    }

    pub fn price1_cumulative_last(&self) -> U256 {
        self.price1_cumulative_last
    }

    pub fn k_last(&self) -> U256 {
        self.k_last
    }

    /// Outstanding LP units, read from the ledger
    pub fn total_supply<L: TokenLedger>(&self, ledger: &L) -> U256 {
        ledger.total_supply(self.address)
    }

    /// Reserves oriented for a trade that sells `token_in`
    pub fn pool_state(&self, token_in: Address) -> Option<V2PoolState> {
        if token_in == self.token0 {
            Some(V2PoolState {
                reserve_in: self.reserve0,
                reserve_out: self.reserve1,
            })
        } else if token_in == self.token1 {
            Some(V2PoolState {
                reserve_in: self.reserve1,
                reserve_out: self.reserve0,
            })
        } else {
            None
        }
    }

    /// Mint LP units for the tokens deposited since the last update
    ///
    /// Returns the liquidity credited to `to`.
    pub fn mint<L>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
        fee_to: Option<Address>,
        to: Address,
    ) -> Result<Outcome<U256>>
    where
        L: TokenLedger + Clone,
    {
        atomically(self, ledger, |pair, ledger| {
            pair.apply_mint(ctx, ledger, fee_to, to)
        })
    }

    /// Burn the LP units held by the pair and pay out both tokens to `to`
    ///
    /// Returns `(amount0, amount1)` paid out.
    pub fn burn<L>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
        fee_to: Option<Address>,
        to: Address,
    ) -> Result<Outcome<(U256, U256)>>
    where
        L: TokenLedger + Clone,
    {
        atomically(self, ledger, |pair, ledger| {
            pair.apply_burn(ctx, ledger, fee_to, to)
        })
    }

    /// Send the requested outputs to `to`, then verify the inputs that arrived
    ///
    /// A non-empty `data` would request a flash-swap callback, which this
    /// engine does not perform; it is accepted and ignored.
    pub fn swap<L>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
        data: &[u8],
    ) -> Result<Outcome<()>>
    where
        L: TokenLedger + Clone,
    {
        atomically(self, ledger, |pair, ledger| {
            pair.apply_swap(ctx, ledger, amount0_out, amount1_out, to, data)
        })
    }

    /// Send any balance above the reserves to `to`
    ///
    /// Returns the `(amount0, amount1)` skimmed. Reserves are not touched.
    pub fn skim<L>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
        to: Address,
    ) -> Result<Outcome<(U256, U256)>>
    where
        L: TokenLedger + Clone,
    {
        atomically(self, ledger, |pair, ledger| {
            let excess0 = sub(ledger.balance_of(pair.token0, pair.address), pair.reserve0)?;
            let excess1 = sub(ledger.balance_of(pair.token1, pair.address), pair.reserve1)?;
            ledger.transfer(pair.token0, pair.address, to, excess0)?;
            ledger.transfer(pair.token1, pair.address, to, excess1)?;
            debug!(pair = ?pair.address, sender = ?ctx.sender, %excess0, %excess1, "skim");
            Ok(Outcome::new((excess0, excess1), Vec::new()))
        })
    }

    /// Force reserves to match actual custody balances
    pub fn sync<L>(&mut self, ctx: &CallContext, ledger: &mut L) -> Result<Outcome<()>>
    where
        L: TokenLedger + Clone,
    {
        atomically(self, ledger, |pair, ledger| {
            let mut events = Vec::new();
            let balance0 = ledger.balance_of(pair.token0, pair.address);
            let balance1 = ledger.balance_of(pair.token1, pair.address);
            let (reserve0, reserve1) = (pair.reserve0, pair.reserve1);
            pair.update(ctx, balance0, balance1, reserve0, reserve1, &mut events)?;
            Ok(Outcome::new((), events))
        })
    }

    // The apply_* steps mutate in place and leave partial state on error;
    // callers run them under a checkpoint.
    pub(crate) fn apply_mint<L: TokenLedger>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
        fee_to: Option<Address>,
        to: Address,
    ) -> Result<Outcome<U256>> {
        let mut events = Vec::new();
        let (reserve0, reserve1) = (self.reserve0, self.reserve1);
        let balance0 = ledger.balance_of(self.token0, self.address);
        let balance1 = ledger.balance_of(self.token1, self.address);
        let amount0 = sub(balance0, reserve0)?;
        let amount1 = sub(balance1, reserve1)?;

        let fee_on = self.mint_fee(ledger, fee_to, reserve0, reserve1, &mut events)?;
        let total_supply = ledger.total_supply(self.address);

        let liquidity = if total_supply.is_zero() {
            let minimum = U256::from(MINIMUM_LIQUIDITY);
            let liquidity = V2Math::sqrt(mul(amount0, amount1)?)
                .checked_sub(minimum)
                .ok_or(AmmError::InsufficientLiquidityMinted)?;
            // permanently lock the first MINIMUM_LIQUIDITY units
            self.mint_lp(ledger, Address::zero(), minimum, &mut events)?;
            liquidity
        } else {
            if reserve0.is_zero() || reserve1.is_zero() {
                return Err(AmmError::InsufficientLiquidity);
            }
            let share0 = mul(amount0, total_supply)? / reserve0;
            let share1 = mul(amount1, total_supply)? / reserve1;
            share0.min(share1)
        };

        if liquidity.is_zero() {
            return Err(AmmError::InsufficientLiquidityMinted);
        }
        self.mint_lp(ledger, to, liquidity, &mut events)?;

        self.update(ctx, balance0, balance1, reserve0, reserve1, &mut events)?;
        if fee_on {
            self.k_last = mul(self.reserve0, self.reserve1)?;
        }

        self.emit(
            &mut events,
            AmmEvent::Mint {
                sender: ctx.sender,
                amount0,
                amount1,
            },
        );
        debug!(pair = ?self.address, to = ?to, %liquidity, %amount0, %amount1, "mint");
        Ok(Outcome::new(liquidity, events))
    }

    pub(crate) fn apply_burn<L: TokenLedger>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
        fee_to: Option<Address>,
        to: Address,
    ) -> Result<Outcome<(U256, U256)>> {
        let mut events = Vec::new();
        let (reserve0, reserve1) = (self.reserve0, self.reserve1);
        let balance0 = ledger.balance_of(self.token0, self.address);
        let balance1 = ledger.balance_of(self.token1, self.address);
        let liquidity = ledger.balance_of(self.address, self.address);

        let fee_on = self.mint_fee(ledger, fee_to, reserve0, reserve1, &mut events)?;
        let total_supply = ledger.total_supply(self.address);
        if total_supply.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }

        // pro-rata on actual balances
        let amount0 = mul(liquidity, balance0)? / total_supply;
        let amount1 = mul(liquidity, balance1)? / total_supply;
        if amount0.is_zero() || amount1.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }

        self.burn_lp(ledger, self.address, liquidity, &mut events)?;
        ledger.transfer(self.token0, self.address, to, amount0)?;
        ledger.transfer(self.token1, self.address, to, amount1)?;

        let balance0 = ledger.balance_of(self.token0, self.address);
        let balance1 = ledger.balance_of(self.token1, self.address);
        self.update(ctx, balance0, balance1, reserve0, reserve1, &mut events)?;
        if fee_on {
            self.k_last = mul(self.reserve0, self.reserve1)?;
        }

        self.emit(
            &mut events,
            AmmEvent::Burn {
                sender: ctx.sender,
                amount0,
                amount1,
                to,
            },
        );
        debug!(pair = ?self.address, to = ?to, %liquidity, %amount0, %amount1, "burn");
        Ok(Outcome::new((amount0, amount1), events))
    }

    pub(crate) fn apply_swap<L: TokenLedger>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
        data: &[u8],
    ) -> Result<Outcome<()>> {
        if amount0_out.is_zero() && amount1_out.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        let (reserve0, reserve1) = (self.reserve0, self.reserve1);
        if amount0_out >= reserve0 || amount1_out >= reserve1 {
            return Err(AmmError::InsufficientLiquidity);
        }
        if to == self.token0 || to == self.token1 {
            return Err(AmmError::InvalidRecipient { to });
        }

        // optimistically transfer outputs
        if !amount0_out.is_zero() {
            ledger.transfer(self.token0, self.address, to, amount0_out)?;
        }
        if !amount1_out.is_zero() {
            ledger.transfer(self.token1, self.address, to, amount1_out)?;
        }
        if !data.is_empty() {
            debug!(pair = ?self.address, len = data.len(), "swap callback data ignored");
        }

        let balance0 = ledger.balance_of(self.token0, self.address);
        let balance1 = ledger.balance_of(self.token1, self.address);
        let amount0_in = amount_in(balance0, reserve0, amount0_out);
        let amount1_in = amount_in(balance1, reserve1, amount1_out);
        if amount0_in.is_zero() && amount1_in.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }

        let scale = U256::from(FEE_DENOMINATOR);
        let fee = U256::from(SWAP_FEE_NUMERATOR);
        let balance0_adjusted = sub(mul(balance0, scale)?, mul(amount0_in, fee)?)?;
        let balance1_adjusted = sub(mul(balance1, scale)?, mul(amount1_in, fee)?)?;
        let k_after = mul(balance0_adjusted, balance1_adjusted)?;
        let k_before = mul(mul(reserve0, reserve1)?, mul(scale, scale)?)?;
        if k_after < k_before {
            return Err(AmmError::K);
        }

        let mut events = Vec::new();
        self.update(ctx, balance0, balance1, reserve0, reserve1, &mut events)?;
        self.emit(
            &mut events,
            AmmEvent::Swap {
                sender: ctx.sender,
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                to,
            },
        );
        debug!(
            pair = ?self.address,
            %amount0_in, %amount1_in, %amount0_out, %amount1_out,
            "swap"
        );
        Ok(Outcome::new((), events))
    }

    /// Mint the protocol's share of fee growth to `fee_to`
    ///
    /// Returns whether the protocol fee is on.
    fn mint_fee<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        fee_to: Option<Address>,
        reserve0: U256,
        reserve1: U256,
        events: &mut Vec<LogEntry>,
    ) -> Result<bool> {
        let Some(fee_to) = fee_to else {
            if !self.k_last.is_zero() {
                self.k_last = U256::zero();
            }
            return Ok(false);
        };

        if !self.k_last.is_zero() {
            let root_k = V2Math::sqrt(mul(reserve0, reserve1)?);
            let root_k_last = V2Math::sqrt(self.k_last);
            if root_k > root_k_last {
                let total_supply = ledger.total_supply(self.address);
                let numerator = mul(total_supply, root_k - root_k_last)?;
                let denominator = mul(root_k, U256::from(PROTOCOL_FEE_DIVISOR))? + root_k_last;
                let liquidity = numerator / denominator;
                if !liquidity.is_zero() {
                    self.mint_lp(ledger, fee_to, liquidity, events)?;
                    debug!(pair = ?self.address, fee_to = ?fee_to, %liquidity, "protocol fee minted");
                }
            }
        }
        Ok(true)
    }

    /// Record new reserves and advance the price accumulators
    fn update(
        &mut self,
        ctx: &CallContext,
        balance0: U256,
        balance1: U256,
        reserve0: U256,
        reserve1: U256,
        events: &mut Vec<LogEntry>,
    ) -> Result<()> {
        let max = max_reserve();
        if balance0 > max || balance1 > max {
            return Err(AmmError::Overflow);
        }

        let block_timestamp = ctx.block_timestamp();
        let time_elapsed = block_timestamp.wrapping_sub(self.block_timestamp_last);
        if time_elapsed > 0 && !reserve0.is_zero() && !reserve1.is_zero() {
            let elapsed = U256::from(time_elapsed);
            let price0 = (reserve1 << PRICE_RESOLUTION_BITS) / reserve0;
            let price1 = (reserve0 << PRICE_RESOLUTION_BITS) / reserve1;
            self.price0_cumulative_last = self
                .price0_cumulative_last
                .overflowing_add(price0.overflowing_mul(elapsed).0)
                .0;
            self.price1_cumulative_last = self
                .price1_cumulative_last
                .overflowing_add(price1.overflowing_mul(elapsed).0)
                .0;
        }

        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.block_timestamp_last = block_timestamp;
        self.emit(
            events,
            AmmEvent::Sync {
                reserve0: balance0,
                reserve1: balance1,
            },
        );
        Ok(())
    }

    fn mint_lp<L: TokenLedger>(
        &self,
        ledger: &mut L,
        to: Address,
        value: U256,
        events: &mut Vec<LogEntry>,
    ) -> Result<()> {
        ledger.mint(self.address, to, value)?;
        self.emit(
            events,
            AmmEvent::Transfer {
                from: Address::zero(),
                to,
                value,
            },
        );
        Ok(())
    }

    fn burn_lp<L: TokenLedger>(
        &self,
        ledger: &mut L,
        from: Address,
        value: U256,
        events: &mut Vec<LogEntry>,
    ) -> Result<()> {
        ledger.burn(self.address, from, value)?;
        self.emit(
            events,
            AmmEvent::Transfer {
                from,
                to: Address::zero(),
                value,
            },
        );
        Ok(())
    }

    fn emit(&self, events: &mut Vec<LogEntry>, event: AmmEvent) {
        events.push(LogEntry {
            emitter: self.address,
            event,
        });
    }
}

/// Input inferred from the balance left after an optimistic transfer
fn amount_in(balance: U256, reserve: U256, amount_out: U256) -> U256 {
    let retained = reserve - amount_out;
    if balance > retained {
        balance - retained
    } else {
        U256::zero()
    }
}
