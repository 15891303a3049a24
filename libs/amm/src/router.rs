//! # Router
//!
//! Stateless orchestration over the registry and its pairs: computes
//! balanced liquidity amounts and hop-by-hop swap amounts, enforces the
//! caller's bounds and deadline, moves the caller's tokens into pair custody
//! and then delegates every state change to the pair engine.
//!
//! The router locates pairs by deriving their addresses, never by asking the
//! registry for them, so it only needs the registry identity and code
//! fingerprint. Each public operation is a single atomic transition over the
//! registry and the ledger: if any hop of a multi-hop swap fails, nothing of
//! the earlier hops remains. The router holds the only checkpoint for the
//! call; pair steps run unguarded inside it.

use crate::atomic::atomically;
use crate::error::{AmmError, Result};
use crate::factory::PairRegistry;
use crate::ledger::TokenLedger;
use crate::pair::Pair;
use crate::pair_address::{default_pair_code_hash, pair_for};
use crate::pool_traits::AmmPool;
use crate::v2_math::{V2Math, V2PoolState};
use protocol_config::ProtocolConfig;
use tracing::debug;
use types::{Address, CallContext, LogEntry, Outcome, TokenPair, H256, U256};

/// Deposit both tokens of a pair at the current ratio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: u64,
}

/// Redeem LP units for both underlying tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub liquidity: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: u64,
}

/// Sell an exact input along `path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapExactTokensForTokensParams {
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: u64,
}

/// Buy an exact output along `path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTokensForExactTokensParams {
    pub amount_out: U256,
    pub amount_in_max: U256,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Router {
    address: Address,
    factory: Address,
    pair_code_hash: H256,
}

impl Router {
    /// Router bound to `registry`
    pub fn new(address: Address, registry: &PairRegistry) -> Self {
        Self {
            address,
            factory: registry.address(),
            pair_code_hash: registry.pair_code_hash(),
        }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self {
            address: config.router.address,
            factory: config.registry.address,
            pair_code_hash: config
                .registry
                .pair_code_hash
                .unwrap_or_else(default_pair_code_hash),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    /// Derived address of the pair for two tokens in any order
    pub fn pair_for(&self, token_a: Address, token_b: Address) -> Result<Address> {
        Ok(pair_for(self.factory, token_a, token_b, self.pair_code_hash)?)
    }

    /// Add liquidity, creating the pair first when it does not exist
    ///
    /// Returns `(amount_a, amount_b, liquidity)`.
    pub fn add_liquidity<L>(
        &self,
        ctx: &CallContext,
        registry: &mut PairRegistry,
        ledger: &mut L,
        params: &AddLiquidityParams,
    ) -> Result<Outcome<(U256, U256, U256)>>
    where
        L: TokenLedger + Clone,
    {
        ensure_deadline(ctx, params.deadline)?;
        atomically(registry, ledger, |registry, ledger| {
            let mut events = Vec::new();
            if registry.get_pair(params.token_a, params.token_b).is_none() {
                let created = registry.create_pair(params.token_a, params.token_b)?;
                events.extend(created.events);
            }

            let (amount_a, amount_b) = self.liquidity_amounts(registry, params)?;
            let pair_address = self.pair_for(params.token_a, params.token_b)?;
            ledger.transfer_from(params.token_a, self.address, ctx.sender, pair_address, amount_a)?;
            ledger.transfer_from(params.token_b, self.address, ctx.sender, pair_address, amount_b)?;

            let fee_to = registry.fee_to();
            let pair = self.engine(registry, params.token_a, params.token_b)?;
            let minted = pair.apply_mint(&ctx.with_sender(self.address), ledger, fee_to, params.to)?;
            let (liquidity, mint_events) = minted.into_parts();
            events.extend(mint_events);

            debug!(
                pair = ?pair_address,
                %amount_a, %amount_b, %liquidity,
                "add_liquidity"
            );
            Ok(Outcome::new((amount_a, amount_b, liquidity), events))
        })
    }

    /// Burn LP units held by the caller and pay out both tokens to `to`
    ///
    /// Returns `(amount_a, amount_b)`.
    pub fn remove_liquidity<L>(
        &self,
        ctx: &CallContext,
        registry: &mut PairRegistry,
        ledger: &mut L,
        params: &RemoveLiquidityParams,
    ) -> Result<Outcome<(U256, U256)>>
    where
        L: TokenLedger + Clone,
    {
        ensure_deadline(ctx, params.deadline)?;
        atomically(registry, ledger, |registry, ledger| {
            let pair_address = self.pair_for(params.token_a, params.token_b)?;
            let fee_to = registry.fee_to();
            let pair = self.engine(registry, params.token_a, params.token_b)?;

            // LP units are the ledger token named by the pair address
            ledger.transfer_from(
                pair_address,
                self.address,
                ctx.sender,
                pair_address,
                params.liquidity,
            )?;
            let burned = pair.apply_burn(&ctx.with_sender(self.address), ledger, fee_to, params.to)?;
            let ((amount0, amount1), events) = burned.into_parts();

            let (amount_a, amount_b) = if params.token_a == pair.token0() {
                (amount0, amount1)
            } else {
                (amount1, amount0)
            };
            if amount_a < params.amount_a_min {
                return Err(AmmError::InsufficientAAmount {
                    amount: amount_a,
                    min: params.amount_a_min,
                });
            }
            if amount_b < params.amount_b_min {
                return Err(AmmError::InsufficientBAmount {
                    amount: amount_b,
                    min: params.amount_b_min,
                });
            }

            debug!(pair = ?pair_address, %amount_a, %amount_b, "remove_liquidity");
            Ok(Outcome::new((amount_a, amount_b), events))
        })
    }

    /// Swap an exact input through every pair along `path`
    ///
    /// Returns the amount at each step of the path, input first.
    pub fn swap_exact_tokens_for_tokens<L>(
        &self,
        ctx: &CallContext,
        registry: &mut PairRegistry,
        ledger: &mut L,
        params: &SwapExactTokensForTokensParams,
    ) -> Result<Outcome<Vec<U256>>>
    where
        L: TokenLedger + Clone,
    {
        ensure_deadline(ctx, params.deadline)?;
        let amounts = self.get_amounts_out(registry, params.amount_in, &params.path)?;
        let amount_out = amounts.last().copied().unwrap_or_default();
        if amount_out < params.amount_out_min {
            return Err(AmmError::InsufficientOutputAmount);
        }

        atomically(registry, ledger, |registry, ledger| {
            let events = self.execute_swaps(ctx, registry, ledger, &amounts, &params.path, params.to)?;
            debug!(
                hops = params.path.len() - 1,
                amount_in = %params.amount_in,
                %amount_out,
                "swap_exact_tokens_for_tokens"
            );
            Ok(Outcome::new(amounts, events))
        })
    }

    /// Swap as little input as needed to receive an exact output
    ///
    /// Returns the amount at each step of the path, input first.
    pub fn swap_tokens_for_exact_tokens<L>(
        &self,
        ctx: &CallContext,
        registry: &mut PairRegistry,
        ledger: &mut L,
        params: &SwapTokensForExactTokensParams,
    ) -> Result<Outcome<Vec<U256>>>
    where
        L: TokenLedger + Clone,
    {
        ensure_deadline(ctx, params.deadline)?;
        let amounts = self.get_amounts_in(registry, params.amount_out, &params.path)?;
        let required = amounts.first().copied().unwrap_or_default();
        if required > params.amount_in_max {
            return Err(AmmError::ExcessiveInputAmount {
                required,
                max: params.amount_in_max,
            });
        }

        atomically(registry, ledger, |registry, ledger| {
            let events = self.execute_swaps(ctx, registry, ledger, &amounts, &params.path, params.to)?;
            debug!(
                hops = params.path.len() - 1,
                amount_in = %required,
                amount_out = %params.amount_out,
                "swap_tokens_for_exact_tokens"
            );
            Ok(Outcome::new(amounts, events))
        })
    }

    /// Outputs of each hop for an exact input, input first
    pub fn get_amounts_out(
        &self,
        registry: &PairRegistry,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>> {
        if path.len() < 2 {
            return Err(AmmError::InvalidPath { len: path.len() });
        }

        let mut amounts = Vec::with_capacity(path.len());
        let mut amount = amount_in;
        amounts.push(amount);
        for hop in path.windows(2) {
            amount = self.pool_state(registry, hop[0], hop[1])?.get_amount_out(amount)?;
            amounts.push(amount);
        }
        Ok(amounts)
    }

    /// Inputs required at each hop for an exact output, input first
    pub fn get_amounts_in(
        &self,
        registry: &PairRegistry,
        amount_out: U256,
        path: &[Address],
    ) -> Result<Vec<U256>> {
        if path.len() < 2 {
            return Err(AmmError::InvalidPath { len: path.len() });
        }

        let mut amounts = vec![U256::zero(); path.len()];
        amounts[path.len() - 1] = amount_out;
        for i in (1..path.len()).rev() {
            amounts[i - 1] = self
                .pool_state(registry, path[i - 1], path[i])?
                .get_amount_in(amounts[i])?;
        }
        Ok(amounts)
    }

    /// Pay the first pair, then swap hop by hop, each output landing in the next pair
    fn execute_swaps<L: TokenLedger + Clone>(
        &self,
        ctx: &CallContext,
        registry: &mut PairRegistry,
        ledger: &mut L,
        amounts: &[U256],
        path: &[Address],
        to: Address,
    ) -> Result<Vec<LogEntry>> {
        let first_pair = self.pair_for(path[0], path[1])?;
        ledger.transfer_from(path[0], self.address, ctx.sender, first_pair, amounts[0])?;

        let router_ctx = ctx.with_sender(self.address);
        let mut events = Vec::new();
        for (i, hop) in path.windows(2).enumerate() {
            let (input, output) = (hop[0], hop[1]);
            let amount_out = amounts[i + 1];
            let tokens = TokenPair::new(input, output)?;
            let (amount0_out, amount1_out) = if input == tokens.token0() {
                (U256::zero(), amount_out)
            } else {
                (amount_out, U256::zero())
            };
            let recipient = match path.get(i + 2) {
                Some(&next) => self.pair_for(output, next)?,
                None => to,
            };

            let pair = self.engine(registry, input, output)?;
            let swapped =
                pair.apply_swap(&router_ctx, ledger, amount0_out, amount1_out, recipient, &[])?;
            events.extend(swapped.events);
        }
        Ok(events)
    }

    /// Balanced deposit for the pair's current ratio
    fn liquidity_amounts(
        &self,
        registry: &PairRegistry,
        params: &AddLiquidityParams,
    ) -> Result<(U256, U256)> {
        let pool = self.pool_state(registry, params.token_a, params.token_b)?;
        let (reserve_a, reserve_b) = pool.get_liquidity();
        if reserve_a.is_zero() && reserve_b.is_zero() {
            return Ok((params.amount_a_desired, params.amount_b_desired));
        }

        let amount_b_optimal = V2Math::quote(params.amount_a_desired, reserve_a, reserve_b)?;
        if amount_b_optimal <= params.amount_b_desired {
            if amount_b_optimal < params.amount_b_min {
                return Err(AmmError::InsufficientBAmount {
                    amount: amount_b_optimal,
                    min: params.amount_b_min,
                });
            }
            return Ok((params.amount_a_desired, amount_b_optimal));
        }

        let amount_a_optimal = V2Math::quote(params.amount_b_desired, reserve_b, reserve_a)?;
        if amount_a_optimal < params.amount_a_min {
            return Err(AmmError::InsufficientAAmount {
                amount: amount_a_optimal,
                min: params.amount_a_min,
            });
        }
        Ok((amount_a_optimal, params.amount_b_desired))
    }

    /// Reserves of the pair for `input`/`output`, oriented for selling `input`
    fn pool_state(
        &self,
        registry: &PairRegistry,
        input: Address,
        output: Address,
    ) -> Result<V2PoolState> {
        let address = self.pair_for(input, output)?;
        registry
            .pair(address)
            .and_then(|pair| pair.pool_state(input))
            .ok_or(AmmError::PairNotFound {
                token_a: input,
                token_b: output,
            })
    }

    fn engine<'r>(
        &self,
        registry: &'r mut PairRegistry,
        token_a: Address,
        token_b: Address,
    ) -> Result<&'r mut Pair> {
        let address = self.pair_for(token_a, token_b)?;
        registry
            .pair_mut(address)
            .ok_or(AmmError::PairNotFound { token_a, token_b })
    }
}

fn ensure_deadline(ctx: &CallContext, deadline: u64) -> Result<()> {
    if ctx.timestamp > deadline {
        return Err(AmmError::Expired {
            deadline,
            now: ctx.timestamp,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::ledger::InMemoryLedger;
    use std::cell::Cell;
    use std::rc::Rc;

    const OWNER: u64 = 0xA11CE;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn setup() -> (Router, PairRegistry, InMemoryLedger) {
        let registry = PairRegistry::new(addr(0xFAC7), addr(0xAD));
        let router = Router::new(addr(0x0E7E), &registry);
        let mut ledger = InMemoryLedger::new();
        for token in [addr(1), addr(2), addr(3)] {
            ledger.mint(token, addr(OWNER), ether(1_000)).unwrap();
            ledger.approve(token, addr(OWNER), router.address(), U256::MAX);
        }
        (router, registry, ledger)
    }

    fn add(
        router: &Router,
        registry: &mut PairRegistry,
        ledger: &mut InMemoryLedger,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
    ) -> Outcome<(U256, U256, U256)> {
        let params = AddLiquidityParams {
            token_a,
            token_b,
            amount_a_desired: amount_a,
            amount_b_desired: amount_b,
            amount_a_min: U256::zero(),
            amount_b_min: U256::zero(),
            to: addr(OWNER),
            deadline: 100,
        };
        router
            .add_liquidity(&CallContext::new(addr(OWNER), 1), registry, ledger, &params)
            .unwrap()
    }

    #[test]
    fn test_path_validation() {
        let (router, registry, _) = setup();
        assert_eq!(
            router.get_amounts_out(&registry, ether(1), &[addr(1)]),
            Err(AmmError::InvalidPath { len: 1 })
        );
        assert_eq!(
            router.get_amounts_in(&registry, ether(1), &[]),
            Err(AmmError::InvalidPath { len: 0 })
        );
        assert_eq!(
            router.get_amounts_out(&registry, ether(1), &[addr(1), addr(2)]),
            Err(AmmError::PairNotFound {
                token_a: addr(1),
                token_b: addr(2),
            })
        );
    }

    #[test]
    fn test_add_liquidity_uses_balanced_amounts() {
        let (router, mut registry, mut ledger) = setup();
        add(&router, &mut registry, &mut ledger, addr(1), addr(2), ether(10), ether(40));

        // B side is in excess; only the ratio-matching amount is pulled
        let outcome = add(&router, &mut registry, &mut ledger, addr(1), addr(2), ether(1), ether(10));
        assert_eq!(outcome.value.0, ether(1));
        assert_eq!(outcome.value.1, ether(4));

        // A side is in excess
        let outcome = add(&router, &mut registry, &mut ledger, addr(1), addr(2), ether(10), ether(4));
        assert_eq!(outcome.value.0, ether(1));
        assert_eq!(outcome.value.1, ether(4));
    }

    #[test]
    fn test_add_liquidity_enforces_minimums() {
        let (router, mut registry, mut ledger) = setup();
        add(&router, &mut registry, &mut ledger, addr(1), addr(2), ether(10), ether(10));
        let before = (registry.clone(), ledger.clone());

        let params = AddLiquidityParams {
            token_a: addr(1),
            token_b: addr(2),
            amount_a_desired: ether(2),
            amount_b_desired: ether(1),
            amount_a_min: ether(2),
            amount_b_min: U256::zero(),
            to: addr(OWNER),
            deadline: 100,
        };
        let err = router
            .add_liquidity(&CallContext::new(addr(OWNER), 1), &mut registry, &mut ledger, &params)
            .unwrap_err();

        assert_eq!(
            err,
            AmmError::InsufficientAAmount {
                amount: ether(1),
                min: ether(2),
            }
        );
        assert_eq!((registry, ledger), before);
    }

    #[test]
    fn test_add_liquidity_enforces_b_minimum() {
        let (router, mut registry, mut ledger) = setup();
        add(&router, &mut registry, &mut ledger, addr(1), addr(2), ether(10), ether(10));
        let before = (registry.clone(), ledger.clone());

        // B side is in excess, so the ratio-matching 1 B falls short of the floor
        let params = AddLiquidityParams {
            token_a: addr(1),
            token_b: addr(2),
            amount_a_desired: ether(1),
            amount_b_desired: ether(5),
            amount_a_min: U256::zero(),
            amount_b_min: ether(2),
            to: addr(OWNER),
            deadline: 100,
        };
        let err = router
            .add_liquidity(&CallContext::new(addr(OWNER), 1), &mut registry, &mut ledger, &params)
            .unwrap_err();

        assert_eq!(
            err,
            AmmError::InsufficientBAmount {
                amount: ether(1),
                min: ether(2),
            }
        );
        assert_eq!(err.reason(), "INSUFFICIENT_B_AMOUNT");
        assert_eq!((registry, ledger), before);
    }

    /// Ledger that counts how often it is cloned
    #[derive(Debug)]
    struct CountingLedger {
        inner: InMemoryLedger,
        clones: Rc<Cell<usize>>,
    }

    impl Clone for CountingLedger {
        fn clone(&self) -> Self {
            self.clones.set(self.clones.get() + 1);
            Self {
                inner: self.inner.clone(),
                clones: Rc::clone(&self.clones),
            }
        }
    }

    impl TokenLedger for CountingLedger {
        fn balance_of(&self, token: Address, owner: Address) -> U256 {
            self.inner.balance_of(token, owner)
        }

        fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
            self.inner.allowance(token, owner, spender)
        }

        fn total_supply(&self, token: Address) -> U256 {
            self.inner.total_supply(token)
        }

        fn transfer(
            &mut self,
            token: Address,
            from: Address,
            to: Address,
            amount: U256,
        ) -> std::result::Result<(), LedgerError> {
            self.inner.transfer(token, from, to, amount)
        }

        fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: U256) {
            self.inner.approve(token, owner, spender, amount)
        }

        fn mint(
            &mut self,
            token: Address,
            to: Address,
            amount: U256,
        ) -> std::result::Result<(), LedgerError> {
            self.inner.mint(token, to, amount)
        }

        fn burn(
            &mut self,
            token: Address,
            from: Address,
            amount: U256,
        ) -> std::result::Result<(), LedgerError> {
            self.inner.burn(token, from, amount)
        }
    }

    #[test]
    fn test_one_checkpoint_per_router_call() {
        let (router, mut registry, inner) = setup();
        let clones = Rc::new(Cell::new(0));
        let mut ledger = CountingLedger {
            inner,
            clones: Rc::clone(&clones),
        };
        let ctx = CallContext::new(addr(OWNER), 1);

        for (token_a, token_b) in [(addr(1), addr(2)), (addr(2), addr(3))] {
            let params = AddLiquidityParams {
                token_a,
                token_b,
                amount_a_desired: ether(50),
                amount_b_desired: ether(50),
                amount_a_min: U256::zero(),
                amount_b_min: U256::zero(),
                to: addr(OWNER),
                deadline: 100,
            };
            router.add_liquidity(&ctx, &mut registry, &mut ledger, &params).unwrap();
        }
        assert_eq!(clones.get(), 2);

        let params = SwapExactTokensForTokensParams {
            amount_in: ether(1),
            amount_out_min: U256::zero(),
            path: vec![addr(1), addr(2), addr(3)],
            to: addr(0xB0B),
            deadline: 100,
        };
        router
            .swap_exact_tokens_for_tokens(&ctx, &mut registry, &mut ledger, &params)
            .unwrap();

        // two hops, still a single ledger checkpoint
        assert_eq!(clones.get(), 3);
    }

    #[test]
    fn test_expired_deadline() {
        let (router, mut registry, mut ledger) = setup();
        let params = SwapExactTokensForTokensParams {
            amount_in: ether(1),
            amount_out_min: U256::zero(),
            path: vec![addr(1), addr(2)],
            to: addr(OWNER),
            deadline: 10,
        };

        let err = router
            .swap_exact_tokens_for_tokens(
                &CallContext::new(addr(OWNER), 11),
                &mut registry,
                &mut ledger,
                &params,
            )
            .unwrap_err();
        assert_eq!(err, AmmError::Expired { deadline: 10, now: 11 });
    }

    #[test]
    fn test_exact_output_spends_quoted_input() {
        let (router, mut registry, mut ledger) = setup();
        add(&router, &mut registry, &mut ledger, addr(1), addr(2), ether(50), ether(80));
        add(&router, &mut registry, &mut ledger, addr(2), addr(3), ether(60), ether(30));
        let path = vec![addr(1), addr(2), addr(3)];

        let quoted = router.get_amounts_in(&registry, ether(2), &path).unwrap();
        let spent_before = ledger.balance_of(addr(1), addr(OWNER));
        let params = SwapTokensForExactTokensParams {
            amount_out: ether(2),
            amount_in_max: quoted[0],
            path: path.clone(),
            to: addr(0xB0B),
            deadline: 100,
        };
        let outcome = router
            .swap_tokens_for_exact_tokens(
                &CallContext::new(addr(OWNER), 2),
                &mut registry,
                &mut ledger,
                &params,
            )
            .unwrap();

        assert_eq!(outcome.value, quoted);
        assert_eq!(spent_before - ledger.balance_of(addr(1), addr(OWNER)), quoted[0]);
        assert_eq!(ledger.balance_of(addr(3), addr(0xB0B)), ether(2));

        let too_tight = SwapTokensForExactTokensParams {
            amount_in_max: U256::one(),
            ..params
        };
        assert!(matches!(
            router.swap_tokens_for_exact_tokens(
                &CallContext::new(addr(OWNER), 2),
                &mut registry,
                &mut ledger,
                &too_tight,
            ),
            Err(AmmError::ExcessiveInputAmount { .. })
        ));
    }
}
