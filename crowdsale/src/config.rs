//! Sale configuration
//!
//! Two layers:
//! - `CrowdsaleConfig`: the absolute, validated parameters a `Crowdsale` is
//!   built from. Comes in a minimal shape (single rate, no goal) and a full
//!   shape (stage rates, goal, stakeholder vaults).
//! - `DeploymentConfig`: the TOML deployment file. Amounts are decimal ether
//!   strings and times are offsets from the deployment moment.

use crate::defaults;
use crate::distribution::Distribution;
use crate::error::{CrowdsaleError, Result};
use jovi_token::{format_ether, parse_ether, Address};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Addresses that receive the post-sale allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stakeholders {
    pub founders: Address,
    pub foundation: Address,
    pub partners: Address,
}

/// Goal-based (refundable) terms of a full deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTerms {
    /// Minimum raised for success
    pub goal: u128,
    pub stakeholders: Stakeholders,
    /// Stakeholder vaults unlock at this time
    pub release_time: u64,
    pub distribution: Distribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrowdsaleConfig {
    /// Account allowed to change the stage and finalize
    pub admin: Address,
    /// Beneficiary of the raised funds
    pub wallet: Address,
    pub pre_ico_rate: u128,
    pub ico_rate: u128,
    /// Maximum total raised
    pub cap: u128,
    pub investor_min_cap: u128,
    pub investor_max_cap: u128,
    pub opening_time: u64,
    pub closing_time: u64,
    /// `None` for the minimal shape
    pub goal: Option<GoalTerms>,
}

/// Parameters of the full deployment shape
#[derive(Debug, Clone)]
pub struct FullSaleParams {
    pub admin: Address,
    pub pre_ico_rate: u128,
    pub ico_rate: u128,
    pub wallet: Address,
    pub cap: u128,
    pub goal: u128,
    pub opening_time: u64,
    pub closing_time: u64,
    pub founders: Address,
    pub foundation: Address,
    pub partners: Address,
    pub release_time: u64,
}

impl CrowdsaleConfig {
    /// Single-rate sale without goal, refunds or vaults. Funds are forwarded
    /// to the wallet on every purchase.
    pub fn minimal(
        admin: Address,
        rate: u128,
        wallet: Address,
        cap: u128,
        opening_time: u64,
        closing_time: u64,
    ) -> Self {
        Self {
            admin,
            wallet,
            pre_ico_rate: rate,
            ico_rate: rate,
            cap,
            investor_min_cap: defaults::INVESTOR_MIN_CAP,
            investor_max_cap: defaults::INVESTOR_MAX_CAP,
            opening_time,
            closing_time,
            goal: None,
        }
    }

    /// Staged, goal-based sale with stakeholder vaults
    pub fn full(params: FullSaleParams) -> Self {
        Self {
            admin: params.admin,
            wallet: params.wallet,
            pre_ico_rate: params.pre_ico_rate,
            ico_rate: params.ico_rate,
            cap: params.cap,
            investor_min_cap: defaults::INVESTOR_MIN_CAP,
            investor_max_cap: defaults::INVESTOR_MAX_CAP,
            opening_time: params.opening_time,
            closing_time: params.closing_time,
            goal: Some(GoalTerms {
                goal: params.goal,
                stakeholders: Stakeholders {
                    founders: params.founders,
                    foundation: params.foundation,
                    partners: params.partners,
                },
                release_time: params.release_time,
                distribution: Distribution::default(),
            }),
        }
    }

    pub fn with_investor_caps(mut self, min: u128, max: u128) -> Self {
        self.investor_min_cap = min;
        self.investor_max_cap = max;
        self
    }

    /// Replace the distribution table (full shape only)
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        if let Some(terms) = self.goal.as_mut() {
            terms.distribution = distribution;
        }
        self
    }

    /// Whether purchases are escrowed and refundable
    pub fn is_refundable(&self) -> bool {
        self.goal.is_some()
    }

    /// Check every construction-time invariant against the current time
    pub fn validate(&self, now: u64) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> { Err(CrowdsaleError::InvalidConfig(msg.to_string())) };

        if self.admin.is_zero() {
            return invalid("admin is the zero address");
        }
        if self.wallet.is_zero() {
            return invalid("wallet is the zero address");
        }
        if self.pre_ico_rate == 0 || self.ico_rate == 0 {
            return invalid("rates must be greater than zero");
        }
        if self.cap == 0 {
            return invalid("cap must be greater than zero");
        }
        if self.investor_max_cap == 0 || self.investor_min_cap > self.investor_max_cap {
            return invalid("investor caps must satisfy 0 <= min <= max, max > 0");
        }
        if self.opening_time < now {
            return invalid("opening time is in the past");
        }
        if self.opening_time >= self.closing_time {
            return invalid("opening time must be before closing time");
        }

        if let Some(terms) = &self.goal {
            if terms.goal == 0 || terms.goal > self.cap {
                return invalid("goal must be greater than zero and not above the cap");
            }
            if terms.release_time <= self.closing_time {
                return invalid("release time must be after closing time");
            }
            let s = &terms.stakeholders;
            if s.founders.is_zero() || s.foundation.is_zero() || s.partners.is_zero() {
                return invalid("stakeholder addresses must be non-zero");
            }
            terms.distribution.validate()?;
        }

        Ok(())
    }
}

// ---- deployment file ----

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSection {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenSection {
    fn default() -> Self {
        Self {
            name: jovi_token::defaults::NAME.to_string(),
            symbol: jovi_token::defaults::SYMBOL.to_string(),
            decimals: jovi_token::defaults::DECIMALS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleSection {
    /// Tokens per whole coin
    pub pre_ico_rate: u64,
    pub ico_rate: u64,
    /// Ether amounts as decimal strings
    pub cap: String,
    pub goal: String,
    /// `false` deploys the minimal shape: no goal, refunds or vaults
    pub refundable: bool,
    pub investor_min_cap: String,
    pub investor_max_cap: String,
    /// Seconds from deployment to opening
    pub opening_delay: u64,
    /// Seconds from opening to closing
    pub sale_duration: u64,
    /// Seconds from closing to vault release
    pub lock_duration: u64,
    pub wallet: Option<Address>,
    pub founders: Option<Address>,
    pub foundation: Option<Address>,
    pub partners: Option<Address>,
}

impl Default for SaleSection {
    fn default() -> Self {
        Self {
            pre_ico_rate: defaults::PRE_ICO_RATE as u64,
            ico_rate: defaults::ICO_RATE as u64,
            cap: format_ether(defaults::CAP),
            goal: format_ether(defaults::GOAL),
            refundable: true,
            investor_min_cap: format_ether(defaults::INVESTOR_MIN_CAP),
            investor_max_cap: format_ether(defaults::INVESTOR_MAX_CAP),
            opening_delay: defaults::OPENING_DELAY,
            sale_duration: defaults::SALE_DURATION,
            lock_duration: defaults::LOCK_DURATION,
            wallet: None,
            founders: None,
            foundation: None,
            partners: None,
        }
    }
}

/// Contents of a deployment TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub token: TokenSection,
    pub crowdsale: SaleSection,
    pub distribution: Distribution,
}

impl DeploymentConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the file into absolute sale parameters. Missing wallet and
    /// stakeholder addresses fall back to the deployer.
    pub fn sale_config(
        &self,
        deployer: Address,
        now: u64,
    ) -> std::result::Result<CrowdsaleConfig, ConfigError> {
        let sale = &self.crowdsale;
        let ether = |field: &'static str, value: &str| {
            parse_ether(value).map_err(|e| ConfigError::Invalid {
                field,
                message: e.to_string(),
            })
        };
        let or_deployer = |field: &str, value: Option<Address>| {
            value.unwrap_or_else(|| {
                log::warn!("{} address is undefined, setting it to deployer {}", field, deployer);
                deployer
            })
        };

        let opening_time = now
            .checked_add(sale.opening_delay)
            .ok_or(ConfigError::Invalid {
                field: "opening_delay",
                message: "timestamp overflow".to_string(),
            })?;
        let closing_time = opening_time
            .checked_add(sale.sale_duration)
            .ok_or(ConfigError::Invalid {
                field: "sale_duration",
                message: "timestamp overflow".to_string(),
            })?;

        let wallet = or_deployer("Wallet", sale.wallet);
        let cap = ether("cap", &sale.cap)?;

        let config = if !sale.refundable {
            CrowdsaleConfig::minimal(
                deployer,
                sale.pre_ico_rate as u128,
                wallet,
                cap,
                opening_time,
                closing_time,
            )
        } else {
            let release_time =
                closing_time
                    .checked_add(sale.lock_duration)
                    .ok_or(ConfigError::Invalid {
                        field: "lock_duration",
                        message: "timestamp overflow".to_string(),
                    })?;

            CrowdsaleConfig::full(FullSaleParams {
                admin: deployer,
                pre_ico_rate: sale.pre_ico_rate as u128,
                ico_rate: sale.ico_rate as u128,
                wallet,
                cap,
                goal: ether("goal", &sale.goal)?,
                opening_time,
                closing_time,
                founders: or_deployer("Founder", sale.founders),
                foundation: or_deployer("Foundation", sale.foundation),
                partners: or_deployer("Partners", sale.partners),
                release_time,
            })
            .with_distribution(self.distribution)
        };

        Ok(config.with_investor_caps(
            ether("investor_min_cap", &sale.investor_min_cap)?,
            ether("investor_max_cap", &sale.investor_max_cap)?,
        ))
    }
}
