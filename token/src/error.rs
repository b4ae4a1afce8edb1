//! Token ledger error types

use crate::address::Address;
use crate::roles::Role;
use thiserror::Error;

/// Token ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unauthorized: {account} is not a {role}")]
    Unauthorized { role: Role, account: Address },

    #[error("Token transfers are paused")]
    Paused,

    #[error("Ledger paused flag is already {paused}")]
    AlreadyInState { paused: bool },

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("Insufficient allowance: requested {requested}, approved {approved}")]
    InsufficientAllowance { requested: u128, approved: u128 },

    #[error("Invalid recipient: the zero address")]
    InvalidRecipient,

    #[error("{account} already holds the {role} role")]
    AlreadyHasRole { role: Role, account: Address },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, TokenError>;
