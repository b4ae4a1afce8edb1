//! Refund escrow bookkeeping
//!
//! Tracks who paid what into a refundable sale. The coins themselves sit in
//! the native bank under the sale's address; this type only records
//! ownership and the escrow's lifecycle:
//!
//! Active ──close()──────────▶ Closed     (goal reached, wallet is paid)
//!    └────enable_refunds()──▶ Refunding  (goal missed, payers withdraw)

use jovi_token::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowState {
    Active,
    Refunding,
    Closed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    #[error("Escrow is {0:?}, expected Active")]
    NotActive(EscrowState),

    #[error("Escrow is {0:?}, refunds are not enabled")]
    NotRefunding(EscrowState),

    #[error("Nothing deposited for {0}")]
    NothingDeposited(Address),

    #[error("Escrow total overflow")]
    Overflow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundEscrow {
    state: EscrowState,
    deposits: HashMap<Address, u128>,
    total_held: u128,
}

impl RefundEscrow {
    pub fn new() -> Self {
        Self {
            state: EscrowState::Active,
            deposits: HashMap::new(),
            total_held: 0,
        }
    }

    pub fn state(&self) -> EscrowState {
        self.state
    }

    pub fn deposits_of(&self, payer: &Address) -> u128 {
        self.deposits.get(payer).copied().unwrap_or(0)
    }

    /// Sum of all deposits not yet withdrawn or released
    pub fn total_held(&self) -> u128 {
        self.total_held
    }

    pub fn check_active(&self) -> Result<(), EscrowError> {
        if self.state != EscrowState::Active {
            return Err(EscrowError::NotActive(self.state));
        }
        Ok(())
    }

    /// Returns the total held after depositing `amount`
    pub fn check_deposit(&self, amount: u128) -> Result<u128, EscrowError> {
        self.check_active()?;
        self.total_held
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)
    }

    /// Returns what `withdraw(payee)` would pay out
    pub fn check_withdraw(&self, payee: &Address) -> Result<u128, EscrowError> {
        if self.state != EscrowState::Refunding {
            return Err(EscrowError::NotRefunding(self.state));
        }
        match self.deposits_of(payee) {
            0 => Err(EscrowError::NothingDeposited(*payee)),
            amount => Ok(amount),
        }
    }

    pub fn deposit(&mut self, payer: &Address, amount: u128) -> Result<(), EscrowError> {
        let total = self.check_deposit(amount)?;
        *self.deposits.entry(*payer).or_insert(0) += amount;
        self.total_held = total;
        Ok(())
    }

    /// Goal missed: let payers withdraw their deposits
    pub fn enable_refunds(&mut self) -> Result<(), EscrowError> {
        self.check_active()?;
        self.state = EscrowState::Refunding;
        Ok(())
    }

    /// Goal reached: hand everything held to the beneficiary. Returns the
    /// amount released.
    pub fn close(&mut self) -> Result<u128, EscrowError> {
        self.check_active()?;
        self.state = EscrowState::Closed;

        let released = self.total_held;
        self.total_held = 0;
        self.deposits.clear();
        Ok(released)
    }

    /// Zero out `payee`'s deposit and return it
    pub fn withdraw(&mut self, payee: &Address) -> Result<u128, EscrowError> {
        let amount = self.check_withdraw(payee)?;
        self.deposits.remove(payee);
        self.total_held -= amount;
        Ok(amount)
    }
}

impl Default for RefundEscrow {
    fn default() -> Self {
        Self::new()
    }
}
