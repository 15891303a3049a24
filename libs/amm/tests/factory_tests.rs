//! Pair registry behaviour: creation, lookup, events and fee administration

mod common;

use amm::{default_pair_code_hash, pair_for, AmmError, PairRegistry};
use common::*;
use types::{Address, AmmEvent, CallContext, U256};

fn registry_with_pair() -> (PairRegistry, Address) {
    let mut registry = PairRegistry::new(addr(REGISTRY), addr(ADMIN));
    let pair = registry.create_pair(addr(0x1A), addr(0x1B)).unwrap().value;
    (registry, pair)
}

#[test]
fn initializes_token_addresses() {
    let (registry, pair) = registry_with_pair();
    let engine = registry.pair(pair).unwrap();

    assert_eq!(engine.token0(), addr(0x1A));
    assert_eq!(engine.token1(), addr(0x1B));
    assert_eq!(engine.get_reserves(), (U256::zero(), U256::zero(), 0));
}

#[test]
fn creates_pair_sorted_and_indexed() {
    let mut registry = PairRegistry::new(addr(REGISTRY), addr(ADMIN));
    let pair = registry.create_pair(addr(0x1B), addr(0x1A)).unwrap().value;

    assert!(!pair.is_zero());
    assert_eq!(registry.get_pair(addr(0x1A), addr(0x1B)), Some(pair));
    assert_eq!(registry.get_pair(addr(0x1B), addr(0x1A)), Some(pair));
    assert_eq!(registry.all_pairs(0), Some(pair));

    let engine = registry.pair(pair).unwrap();
    assert_eq!(engine.token0(), addr(0x1A));
    assert_eq!(engine.token1(), addr(0x1B));
}

#[test]
fn pair_address_predictable_off_band() {
    let (_, pair) = registry_with_pair();
    let derived = pair_for(addr(REGISTRY), addr(0x1B), addr(0x1A), default_pair_code_hash()).unwrap();
    assert_eq!(pair, derived);
}

#[test]
fn emits_pair_created_with_running_length() {
    let mut registry = PairRegistry::new(addr(REGISTRY), addr(ADMIN));
    let first = registry.create_pair(addr(1), addr(2)).unwrap();
    let second = registry.create_pair(addr(3), addr(2)).unwrap();

    assert_eq!(
        first.find(addr(REGISTRY), "PairCreated"),
        Some(&AmmEvent::PairCreated {
            token0: addr(1),
            token1: addr(2),
            pair: first.value,
            all_pairs_len: 1,
        })
    );
    assert_eq!(
        second.find(addr(REGISTRY), "PairCreated"),
        Some(&AmmEvent::PairCreated {
            token0: addr(2),
            token1: addr(3),
            pair: second.value,
            all_pairs_len: 2,
        })
    );
    assert_eq!(registry.all_pairs(1), Some(second.value));
    assert_eq!(registry.all_pairs_length(), 2);
}

#[test]
fn rejects_identical_addresses() {
    let (mut registry, _) = registry_with_pair();
    let err = registry.create_pair(addr(0x1A), addr(0x1A)).unwrap_err();
    assert_eq!(err, AmmError::IdenticalTokens);
    assert_eq!(err.reason(), "IDENTICAL_ADDRESSES");
}

#[test]
fn rejects_zero_address() {
    let (mut registry, _) = registry_with_pair();
    let err = registry
        .create_pair(addr(0x1A), Address::zero())
        .unwrap_err();
    assert_eq!(err, AmmError::ZeroAddress);
    assert_eq!(err.reason(), "ZERO_ADDRESS");
}

#[test]
fn rejects_creating_pair_twice() {
    let (mut registry, _) = registry_with_pair();
    let before = registry.clone();

    let err = registry.create_pair(addr(0x1A), addr(0x1B)).unwrap_err();

    assert_eq!(err.reason(), "PAIR_EXISTS");
    assert_eq!(registry, before);
    assert_eq!(registry.all_pairs_length(), 1);
}

#[test]
fn set_fee_to_only_by_fee_to_setter() {
    let (mut registry, _) = registry_with_pair();
    let non_setter = CallContext::new(addr(OTHER), 0);

    let err = registry
        .set_fee_to(&non_setter, Some(addr(OTHER)))
        .unwrap_err();
    assert_eq!(err.reason(), "FORBIDDEN");
    assert_eq!(registry.fee_to(), None);

    registry
        .set_fee_to(&CallContext::new(addr(ADMIN), 0), Some(addr(OTHER)))
        .unwrap();
    assert_eq!(registry.fee_to(), Some(addr(OTHER)));
}

#[test]
fn set_fee_to_setter_only_by_fee_to_setter() {
    let (mut registry, _) = registry_with_pair();
    let before = registry.clone();
    let non_setter = CallContext::new(addr(OTHER), 0);

    let err = registry
        .set_fee_to_setter(&non_setter, addr(OTHER))
        .unwrap_err();
    assert_eq!(err, AmmError::Forbidden { caller: addr(OTHER) });
    assert_eq!(err.reason(), "FORBIDDEN");
    assert_eq!(registry.fee_to_setter(), addr(ADMIN));
    assert_eq!(registry, before);

    registry
        .set_fee_to_setter(&CallContext::new(addr(ADMIN), 0), addr(OTHER))
        .unwrap();
    assert_eq!(registry.fee_to_setter(), addr(OTHER));
}
