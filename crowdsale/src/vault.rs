//! Token timelock vaults
//!
//! A vault is an address on the ledger whose balance can only be moved to
//! one fixed beneficiary, and only once its release time has passed. The
//! vault keeps no state of its own beyond its identity.

use crate::clock::Clock;
use jovi_token::{Address, SharedLedger, TokenError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Tokens are locked until {release_time} (now {now})")]
    TooEarly { now: u64, release_time: u64 },

    #[error("Vault holds no tokens")]
    NothingToRelease,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

#[derive(Clone)]
pub struct TokenTimelock {
    address: Address,
    beneficiary: Address,
    release_time: u64,
    ledger: SharedLedger,
    clock: Arc<dyn Clock>,
}

impl TokenTimelock {
    pub fn new(
        address: Address,
        beneficiary: Address,
        release_time: u64,
        ledger: SharedLedger,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            address,
            beneficiary,
            release_time,
            ledger,
            clock,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    pub fn release_time(&self) -> u64 {
        self.release_time
    }

    /// Tokens currently locked in the vault
    pub fn balance(&self) -> u128 {
        self.ledger.read().balance_of(&self.address)
    }

    /// Send the whole balance to the beneficiary. Anyone may trigger it.
    pub fn release(&self) -> Result<u128, VaultError> {
        let now = self.clock.now();
        if now < self.release_time {
            return Err(VaultError::TooEarly {
                now,
                release_time: self.release_time,
            });
        }

        let mut ledger = self.ledger.write();
        let amount = ledger.balance_of(&self.address);
        if amount == 0 {
            return Err(VaultError::NothingToRelease);
        }

        ledger.transfer(&self.address, &self.beneficiary, amount)?;
        log::info!(
            "Vault {} released {} to {}",
            self.address,
            amount,
            self.beneficiary
        );
        Ok(amount)
    }
}

impl fmt::Debug for TokenTimelock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenTimelock")
            .field("address", &self.address)
            .field("beneficiary", &self.beneficiary)
            .field("release_time", &self.release_time)
            .finish_non_exhaustive()
    }
}
