//! Crowdsale error types

use crate::config::ConfigError;
use crate::escrow::EscrowError;
use crate::funds::FundsError;
use crate::stage::CrowdsaleStage;
use jovi_token::{Address, TokenError};
use thiserror::Error;

/// Sale coordinator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrowdsaleError {
    #[error("Unauthorized: {0} is not the sale administrator")]
    Unauthorized(Address),

    #[error("Invalid stage transition: {from:?} -> {to:?}")]
    InvalidStageTransition {
        from: CrowdsaleStage,
        to: CrowdsaleStage,
    },

    #[error("Sale not open at {now}: window is [{opening_time}, {closing_time}]")]
    NotOpen {
        now: u64,
        opening_time: u64,
        closing_time: u64,
    },

    #[error("Purchase value must be greater than zero")]
    ZeroValue,

    #[error("Invalid beneficiary: the zero address")]
    InvalidBeneficiary,

    #[error("First contribution {value} is below the investor minimum {min}")]
    BelowMinCap { value: u128, min: u128 },

    #[error("Contribution would reach {total}, above the investor maximum {max}")]
    AboveMaxCap { total: u128, max: u128 },

    #[error("Raised funds would reach {total}, above the campaign cap {cap}")]
    CampaignCapExceeded { total: u128, cap: u128 },

    #[error("Sale has not closed yet (closes at {closing_time}, now {now})")]
    TooEarly { now: u64, closing_time: u64 },

    #[error("Sale already finalized")]
    AlreadyFinalized,

    #[error("Sale has closed")]
    SaleClosed,

    #[error("Sale not finalized")]
    NotFinalized,

    #[error("Goal was reached, refunds are not available")]
    GoalWasReached,

    #[error("Nothing to refund for {0}")]
    NothingToRefund(Address),

    #[error("Invalid sale configuration: {0}")]
    InvalidConfig(String),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Funds error: {0}")]
    Funds(#[from] FundsError),

    #[error("Escrow error: {0}")]
    Escrow(#[from] EscrowError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CrowdsaleError>;
