//! Events recorded by the token ledger

use crate::address::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    /// Balance movement. Mints carry `from == Address::ZERO`.
    Transfer {
        from: Address,
        to: Address,
        value: u128,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: u128,
    },
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },
    MinterAdded {
        account: Address,
    },
    MinterRemoved {
        account: Address,
    },
    PauserAdded {
        account: Address,
    },
    PauserRemoved {
        account: Address,
    },
}

impl TokenEvent {
    pub fn is_mint(&self) -> bool {
        matches!(self, TokenEvent::Transfer { from, .. } if from.is_zero())
    }
}
