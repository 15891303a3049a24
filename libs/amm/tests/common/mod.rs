//! Shared fixture: one registry, one router, a funded owner and three tokens

#![allow(dead_code)]

use amm::{AddLiquidityParams, InMemoryLedger, Pair, PairRegistry, Router, TokenLedger};
use types::{Address, CallContext, Outcome, U256};

pub const REGISTRY: u64 = 0xFAC7;
pub const ADMIN: u64 = 0xAD;
pub const ROUTER: u64 = 0x0E7E;
pub const OWNER: u64 = 0xA11CE;
pub const OTHER: u64 = 0xB0B;

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

pub fn dec(value: &str) -> U256 {
    U256::from_dec_str(value).unwrap()
}

pub struct Fixture {
    pub registry: PairRegistry,
    pub router: Router,
    pub ledger: InMemoryLedger,
    pub owner: Address,
    /// Sorted so that `token_a` is always token0 of the A/B pair
    pub token_a: Address,
    pub token_b: Address,
    pub token_c: Address,
}

impl Fixture {
    pub fn new() -> Self {
        let registry = PairRegistry::new(addr(REGISTRY), addr(ADMIN));
        let router = Router::new(addr(ROUTER), &registry);
        let mut ledger = InMemoryLedger::new();
        let owner = addr(OWNER);
        let (token_a, token_b, token_c) = (addr(0x1A), addr(0x1B), addr(0x1C));

        for token in [token_a, token_b, token_c] {
            ledger.mint(token, owner, ether(1_000_000)).unwrap();
        }

        Self {
            registry,
            router,
            ledger,
            owner,
            token_a,
            token_b,
            token_c,
        }
    }

    pub fn ctx(&self, timestamp: u64) -> CallContext {
        CallContext::new(self.owner, timestamp)
    }

    pub fn approve_router(&mut self, token: Address, amount: U256) {
        let router = self.router.address();
        self.ledger.approve(token, self.owner, router, amount);
    }

    /// Approve exactly the desired amounts and add liquidity at timestamp 1
    pub fn add_liquidity(
        &mut self,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
    ) -> Outcome<(U256, U256, U256)> {
        self.approve_router(token_a, amount_a);
        self.approve_router(token_b, amount_b);
        let params = AddLiquidityParams {
            token_a,
            token_b,
            amount_a_desired: amount_a,
            amount_b_desired: amount_b,
            amount_a_min: U256::zero(),
            amount_b_min: U256::zero(),
            to: self.owner,
            deadline: 600,
        };
        let ctx = self.ctx(1);
        self.router
            .add_liquidity(&ctx, &mut self.registry, &mut self.ledger, &params)
            .unwrap()
    }

    pub fn pair_address(&self, token_a: Address, token_b: Address) -> Address {
        self.registry.get_pair(token_a, token_b).unwrap()
    }

    pub fn pair(&self, token_a: Address, token_b: Address) -> &Pair {
        self.registry.pair(self.pair_address(token_a, token_b)).unwrap()
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        self.ledger.balance_of(token, owner)
    }
}
