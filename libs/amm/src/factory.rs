//! # Pair Registry
//!
//! Creates pairs, indexes them by canonical token pair and in creation
//! order, and holds the protocol fee administration. The registry is an
//! explicit value handed to the router and to tests; there is no
//! process-wide instance.

use crate::error::{AmmError, Result};
use crate::pair::Pair;
use crate::pair_address::{default_pair_code_hash, pair_address};
use protocol_config::ProtocolConfig;
use std::collections::HashMap;
use tracing::{info, warn};
use types::{Address, AmmEvent, CallContext, LogEntry, Outcome, TokenPair, H256};

/// Registry of every pair created under one registry identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRegistry {
    address: Address,
    fee_to: Option<Address>,
    fee_to_setter: Address,
    pair_code_hash: H256,

    /// canonical pair -> pair address, written once per pair
    pairs: HashMap<TokenPair, Address>,
    /// creation order
    all_pairs: Vec<Address>,
    engines: HashMap<Address, Pair>,
}

impl PairRegistry {
    pub fn new(address: Address, fee_to_setter: Address) -> Self {
        Self::with_code_hash(address, fee_to_setter, default_pair_code_hash())
    }

    /// Registry deriving pair addresses from a custom code fingerprint
    pub fn with_code_hash(address: Address, fee_to_setter: Address, pair_code_hash: H256) -> Self {
        Self {
            address,
            fee_to: None,
            fee_to_setter,
            pair_code_hash,
            pairs: HashMap::new(),
            all_pairs: Vec::new(),
            engines: HashMap::new(),
        }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        let registry = &config.registry;
        let mut this = Self::with_code_hash(
            registry.address,
            registry.fee_to_setter,
            registry.pair_code_hash.unwrap_or_else(default_pair_code_hash),
        );
        this.fee_to = registry.fee_to;
        this
    }

    /// Create the pair for two tokens given in any order
    ///
    /// Returns the new pair's address, which equals
    /// [`pair_for`](crate::pair_address::pair_for) on the same inputs.
    pub fn create_pair(&mut self, token_a: Address, token_b: Address) -> Result<Outcome<Address>> {
        let tokens = TokenPair::new(token_a, token_b)?;
        if let Some(&pair) = self.pairs.get(&tokens) {
            return Err(AmmError::PairExists {
                token0: tokens.token0(),
                token1: tokens.token1(),
                pair,
            });
        }

        let pair = pair_address(self.address, &tokens, self.pair_code_hash);
        self.engines
            .insert(pair, Pair::new(pair, self.address, tokens));
        self.pairs.insert(tokens, pair);
        self.all_pairs.push(pair);

        info!(
            token0 = ?tokens.token0(),
            token1 = ?tokens.token1(),
            pair = ?pair,
            total = self.all_pairs.len(),
            "Pair created"
        );

        let event = LogEntry {
            emitter: self.address,
            event: AmmEvent::PairCreated {
                token0: tokens.token0(),
                token1: tokens.token1(),
                pair,
                all_pairs_len: self.all_pairs.len() as u64,
            },
        };
        Ok(Outcome::new(pair, vec![event]))
    }

    /// Pair address for two tokens in any order, if created
    pub fn get_pair(&self, token_a: Address, token_b: Address) -> Option<Address> {
        let tokens = TokenPair::new(token_a, token_b).ok()?;
        self.pairs.get(&tokens).copied()
    }

    /// The `index`-th pair in creation order
    pub fn all_pairs(&self, index: usize) -> Option<Address> {
        self.all_pairs.get(index).copied()
    }

    pub fn all_pairs_length(&self) -> usize {
        self.all_pairs.len()
    }

    pub fn pair(&self, address: Address) -> Option<&Pair> {
        self.engines.get(&address)
    }

    pub fn pair_mut(&mut self, address: Address) -> Option<&mut Pair> {
        self.engines.get_mut(&address)
    }

    /// Replace the protocol fee recipient; `None` turns the protocol fee off
    pub fn set_fee_to(&mut self, ctx: &CallContext, recipient: Option<Address>) -> Result<()> {
        self.ensure_admin(ctx)?;
        info!(fee_to = ?recipient, "Protocol fee recipient updated");
        self.fee_to = recipient;
        Ok(())
    }

    /// Hand fee administration to another account
    pub fn set_fee_to_setter(&mut self, ctx: &CallContext, admin: Address) -> Result<()> {
        self.ensure_admin(ctx)?;
        info!(fee_to_setter = ?admin, "Fee administrator updated");
        self.fee_to_setter = admin;
        Ok(())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn fee_to(&self) -> Option<Address> {
        self.fee_to
    }

    pub fn fee_to_setter(&self) -> Address {
        self.fee_to_setter
    }

    pub fn pair_code_hash(&self) -> H256 {
        self.pair_code_hash
    }

    fn ensure_admin(&self, ctx: &CallContext) -> Result<()> {
        if ctx.sender != self.fee_to_setter {
            warn!(caller = ?ctx.sender, "Rejected fee administration call");
            return Err(AmmError::Forbidden { caller: ctx.sender });
        }
        Ok(())
    }
}
