//! Token Custody Ledger
//!
//! The engine never holds token balances itself. It asks a ledger for the
//! balances it has custody of and instructs the ledger to move tokens. The
//! ledger fails loudly on insufficient balance or allowance; the engine does
//! not re-validate beyond reading the resulting balances.
//!
//! LP units are ordinary ledger tokens whose identifier is the pair address.

use crate::error::LedgerError;
use std::collections::HashMap;
use tracing::trace;
use types::{Address, U256};

/// ERC20-style custody of many tokens
pub trait TokenLedger {
    /// Balance of `owner` in `token`
    fn balance_of(&self, token: Address, owner: Address) -> U256;

    /// Amount `spender` may move out of `owner`'s balance of `token`
    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256;

    /// Outstanding supply of `token`
    fn total_supply(&self, token: Address) -> U256;

    /// Move `amount` of `token` from `from` to `to`
    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Set the allowance of `spender` over `owner`'s `token`
    fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: U256);

    /// Create `amount` of `token` for `to`
    fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), LedgerError>;

    /// Destroy `amount` of `token` held by `from`
    fn burn(&mut self, token: Address, from: Address, amount: U256) -> Result<(), LedgerError>;

    /// Move `amount` of `owner`'s `token` to `to` on behalf of `spender`
    ///
    /// An allowance of `U256::MAX` is treated as unlimited and never reduced.
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        owner: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(token, owner, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                token,
                owner,
                spender,
                allowance,
                needed: amount,
            });
        }
        self.transfer(token, owner, to, amount)?;
        if allowance != U256::MAX {
            self.approve(token, owner, spender, allowance - amount);
        }
        Ok(())
    }
}

/// In-memory ledger used by tests and tooling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryLedger {
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    supplies: HashMap<Address, U256>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn debit(&mut self, token: Address, owner: Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self.balance_of(token, owner);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                token,
                owner,
                balance,
                needed: amount,
            });
        }
        self.balances.insert((token, owner), balance - amount);
        Ok(())
    }

    fn credit(&mut self, token: Address, owner: Address, amount: U256) {
        // bounded by total supply, which is checked on mint
        let entry = self.balances.entry((token, owner)).or_default();
        *entry = entry.saturating_add(amount);
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn total_supply(&self, token: Address) -> U256 {
        self.supplies.get(&token).copied().unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.debit(token, from, amount)?;
        self.credit(token, to, amount);
        trace!(token = ?token, from = ?from, to = ?to, %amount, "transfer");
        Ok(())
    }

    fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((token, owner, spender), amount);
    }

    fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        let supply = self.total_supply(token);
        let new_supply = supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { token })?;
        self.supplies.insert(token, new_supply);
        self.credit(token, to, amount);
        Ok(())
    }

    fn burn(&mut self, token: Address, from: Address, amount: U256) -> Result<(), LedgerError> {
        self.debit(token, from, amount)?;
        let supply = self.total_supply(token);
        self.supplies.insert(token, supply.saturating_sub(amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_mint_transfer_burn() {
        let (token, alice, bob) = (addr(1), addr(2), addr(3));
        let mut ledger = InMemoryLedger::new();

        ledger.mint(token, alice, U256::from(100)).unwrap();
        ledger.transfer(token, alice, bob, U256::from(40)).unwrap();
        ledger.burn(token, bob, U256::from(10)).unwrap();

        assert_eq!(ledger.balance_of(token, alice), U256::from(60));
        assert_eq!(ledger.balance_of(token, bob), U256::from(30));
        assert_eq!(ledger.total_supply(token), U256::from(90));
    }

    #[test]
    fn test_transfer_fails_loudly() {
        let (token, alice, bob) = (addr(1), addr(2), addr(3));
        let mut ledger = InMemoryLedger::new();
        ledger.mint(token, alice, U256::from(5)).unwrap();

        let err = ledger
            .transfer(token, alice, bob, U256::from(6))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance_of(token, alice), U256::from(5));
        assert_eq!(ledger.balance_of(token, bob), U256::zero());
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (token, owner, spender, to) = (addr(1), addr(2), addr(3), addr(4));
        let mut ledger = InMemoryLedger::new();
        ledger.mint(token, owner, U256::from(100)).unwrap();
        ledger.approve(token, owner, spender, U256::from(30));

        ledger
            .transfer_from(token, spender, owner, to, U256::from(20))
            .unwrap();
        assert_eq!(ledger.allowance(token, owner, spender), U256::from(10));

        let err = ledger
            .transfer_from(token, spender, owner, to, U256::from(11))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
        assert_eq!(ledger.balance_of(token, to), U256::from(20));
    }

    #[test]
    fn test_unlimited_allowance_is_not_reduced() {
        let (token, owner, spender, to) = (addr(1), addr(2), addr(3), addr(4));
        let mut ledger = InMemoryLedger::new();
        ledger.mint(token, owner, U256::from(100)).unwrap();
        ledger.approve(token, owner, spender, U256::MAX);

        ledger
            .transfer_from(token, spender, owner, to, U256::from(50))
            .unwrap();
        assert_eq!(ledger.allowance(token, owner, spender), U256::MAX);
    }
}
