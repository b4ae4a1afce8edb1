//! JOVI Token Ledger
//!
//! ERC20-style fungible token held in process:
//! - Role-gated minting and pausing
//! - Transfers and allowances blocked while paused
//! - Explicit caller identities on every mutating call
//! - Staged (all-or-nothing) multi-step updates

pub mod address;
pub mod error;
pub mod events;
pub mod ledger;
pub mod roles;
pub mod units;

use parking_lot::RwLock;
use std::sync::Arc;

pub use address::{Address, AddressError};
pub use error::{Result, TokenError};
pub use events::TokenEvent;
pub use ledger::TokenLedger;
pub use roles::{Role, RoleSet};
pub use units::{format_ether, format_units, parse_ether, parse_units, DEFAULT_DECIMALS, ETHER};

/// Ledger handle shared by the sale, the vaults and direct holders
pub type SharedLedger = Arc<RwLock<TokenLedger>>;

/// Wrap a ledger for sharing
pub fn shared(ledger: TokenLedger) -> SharedLedger {
    Arc::new(RwLock::new(ledger))
}

/// Token defaults used by the reference deployment
pub mod defaults {
    pub const NAME: &str = "JoviToken";
    pub const SYMBOL: &str = "JOVI";
    pub const DECIMALS: u8 = crate::DEFAULT_DECIMALS;
}
