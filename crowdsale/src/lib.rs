//! JOVI Crowdsale
//!
//! Sells JOVI tokens for the native coin:
//! - Two pricing stages (PreICO, ICO) inside a fixed time window
//! - Per-investor and campaign caps
//! - Goal-based finalization with refunds or stakeholder vaults
//! - Timelocked vaults for founders, foundation and partners

pub mod clock;
pub mod config;
pub mod crowdsale;
pub mod deploy;
pub mod distribution;
pub mod error;
pub mod escrow;
pub mod events;
pub mod funds;
pub mod stage;
pub mod vault;

use parking_lot::Mutex;
use std::sync::Arc;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    ConfigError, CrowdsaleConfig, DeploymentConfig, FullSaleParams, GoalTerms, SaleSection,
    Stakeholders, TokenSection,
};
pub use crowdsale::{Crowdsale, StakeholderVaults};
pub use deploy::{deploy, Deployment, DeploymentSummary};
pub use distribution::{Allocation, Distribution};
pub use error::{CrowdsaleError, Result};
pub use escrow::{EscrowError, EscrowState, RefundEscrow};
pub use events::SaleEvent;
pub use funds::{FundsError, NativeBank, SharedBank};
pub use stage::{CrowdsaleStage, SaleStatus};
pub use vault::{TokenTimelock, VaultError};

/// Coordinator handle for callers that share one sale
pub type SharedCrowdsale = Arc<Mutex<Crowdsale>>;

/// Parameters of the reference deployment
pub mod defaults {
    use crate::clock::duration;
    use jovi_token::ETHER;

    /// Tokens per coin during PreICO
    pub const PRE_ICO_RATE: u128 = 500;
    /// Tokens per coin during ICO
    pub const ICO_RATE: u128 = 250;

    pub const CAP: u128 = 100 * ETHER;
    pub const GOAL: u128 = 50 * ETHER;

    /// 0.002 coin
    pub const INVESTOR_MIN_CAP: u128 = 2 * ETHER / 1000;
    pub const INVESTOR_MAX_CAP: u128 = 50 * ETHER;

    pub const OPENING_DELAY: u64 = duration::minutes(5);
    pub const SALE_DURATION: u64 = duration::years(1);
    pub const LOCK_DURATION: u64 = duration::years(2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use jovi_token::ETHER;

    #[test]
    fn test_module_constants() {
        assert_eq!(defaults::PRE_ICO_RATE, 2 * defaults::ICO_RATE);
        assert_eq!(defaults::GOAL * 2, defaults::CAP);
        assert_eq!(defaults::INVESTOR_MIN_CAP, 2_000_000_000_000_000);
        assert!(defaults::INVESTOR_MAX_CAP <= defaults::CAP);
        assert_eq!(defaults::OPENING_DELAY, 300);
        assert_eq!(defaults::LOCK_DURATION, 2 * defaults::SALE_DURATION);
        assert_eq!(ETHER, 10u128.pow(18));
    }
}
