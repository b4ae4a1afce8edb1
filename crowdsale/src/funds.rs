//! Native currency bank
//!
//! Stand-in for the chain's value-transfer primitive: balances of the
//! native coin per address. Purchases pay into it, escrow lives in it and
//! refunds are paid out of it.

use jovi_token::Address;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FundsError {
    #[error("Insufficient funds for {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        account: Address,
        requested: u128,
        available: u128,
    },

    #[error("Invalid payee: the zero address")]
    InvalidPayee,

    #[error("Native balance overflow")]
    Overflow,
}

#[derive(Debug, Clone, Default)]
pub struct NativeBank {
    balances: HashMap<Address, u128>,
}

pub type SharedBank = Arc<RwLock<NativeBank>>;

impl NativeBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedBank {
        Arc::new(RwLock::new(self))
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Create native funds out of thin air (genesis allocations, tests)
    pub fn credit(&mut self, account: &Address, amount: u128) -> Result<(), FundsError> {
        let balance = self.balances.entry(*account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(FundsError::Overflow)?;
        Ok(())
    }

    /// Fails exactly when `transfer` with the same arguments would
    pub fn check_transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), FundsError> {
        if to.is_zero() {
            return Err(FundsError::InvalidPayee);
        }

        let available = self.balance_of(from);
        if available < amount {
            return Err(FundsError::InsufficientFunds {
                account: *from,
                requested: amount,
                available,
            });
        }

        if from != to {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(FundsError::Overflow)?;
        }
        Ok(())
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), FundsError> {
        self.check_transfer(from, to, amount)?;
        if from == to {
            return Ok(());
        }

        // Both bounded by the check above
        let available = self.balance_of(from);
        *self.balances.entry(*to).or_insert(0) += amount;
        self.balances.insert(*from, available - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer() {
        let alice = Address::from_low_u64(1);
        let bob = Address::from_low_u64(2);
        let mut bank = NativeBank::new();
        bank.credit(&alice, 100).unwrap();

        bank.transfer(&alice, &bob, 30).unwrap();
        assert_eq!(bank.balance_of(&alice), 70);
        assert_eq!(bank.balance_of(&bob), 30);

        assert_eq!(
            bank.transfer(&bob, &alice, 31),
            Err(FundsError::InsufficientFunds {
                account: bob,
                requested: 31,
                available: 30
            })
        );
        assert_eq!(bank.transfer(&alice, &Address::ZERO, 1), Err(FundsError::InvalidPayee));
    }

    #[test]
    fn test_self_transfer() {
        let alice = Address::from_low_u64(1);
        let mut bank = NativeBank::new();
        bank.credit(&alice, 100).unwrap();

        bank.transfer(&alice, &alice, 60).unwrap();
        assert_eq!(bank.balance_of(&alice), 100);
    }

    #[test]
    fn test_check_transfer_leaves_balances() {
        let alice = Address::from_low_u64(1);
        let bob = Address::from_low_u64(2);
        let mut bank = NativeBank::new();
        bank.credit(&alice, 10).unwrap();
        bank.credit(&bob, u128::MAX).unwrap();

        assert!(bank.check_transfer(&alice, &alice, 10).is_ok());
        assert_eq!(bank.check_transfer(&alice, &bob, 1), Err(FundsError::Overflow));
        assert_eq!(bank.transfer(&alice, &bob, 1), Err(FundsError::Overflow));
        assert!(matches!(
            bank.check_transfer(&alice, &bob, 11),
            Err(FundsError::InsufficientFunds { .. })
        ));

        assert_eq!(bank.balance_of(&alice), 10);
        assert_eq!(bank.balance_of(&bob), u128::MAX);
    }
}
