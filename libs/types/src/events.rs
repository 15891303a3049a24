//! # Observable Events
//!
//! Events are the only externally observable side channel of the engine.
//! Every operation returns the events it produced in an [`Outcome`], each
//! tagged with the identity of the component that emitted it. Field order
//! follows the canonical event signatures and must not change.

use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Events emitted by the registry and by pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AmmEvent {
    /// `PairCreated(address token0, address token1, address pair, uint256 allPairsLength)`
    PairCreated {
        token0: Address,
        token1: Address,
        pair: Address,
        all_pairs_len: u64,
    },

    /// `Mint(address sender, uint256 amount0, uint256 amount1)`
    Mint {
        sender: Address,
        amount0: U256,
        amount1: U256,
    },

    /// `Burn(address sender, uint256 amount0, uint256 amount1, address to)`
    Burn {
        sender: Address,
        amount0: U256,
        amount1: U256,
        to: Address,
    },

    /// `Swap(address sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address to)`
    Swap {
        sender: Address,
        amount0_in: U256,
        amount1_in: U256,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
    },

    /// `Sync(uint112 reserve0, uint112 reserve1)`
    Sync { reserve0: U256, reserve1: U256 },

    /// `Transfer(address from, address to, uint256 value)` of LP units
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
}

impl AmmEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AmmEvent::PairCreated { .. } => "PairCreated",
            AmmEvent::Mint { .. } => "Mint",
            AmmEvent::Burn { .. } => "Burn",
            AmmEvent::Swap { .. } => "Swap",
            AmmEvent::Sync { .. } => "Sync",
            AmmEvent::Transfer { .. } => "Transfer",
        }
    }
}

/// An event together with the component that emitted it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub emitter: Address,
    pub event: AmmEvent,
}

/// Result value of an operation plus the events it produced, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub events: Vec<LogEntry>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, events: Vec<LogEntry>) -> Self {
        Self { value, events }
    }

    pub fn into_parts(self) -> (T, Vec<LogEntry>) {
        (self.value, self.events)
    }

    /// Events emitted by one component
    pub fn events_from(&self, emitter: Address) -> impl Iterator<Item = &AmmEvent> {
        self.events
            .iter()
            .filter(move |entry| entry.emitter == emitter)
            .map(|entry| &entry.event)
    }

    /// First event with the given name emitted by `emitter`
    pub fn find(&self, emitter: Address, name: &str) -> Option<&AmmEvent> {
        self.events_from(emitter).find(|event| event.name() == name)
    }
}
