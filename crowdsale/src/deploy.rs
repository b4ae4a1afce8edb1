//! Reference deployment
//!
//! Wires a ledger and a sale together the way the production rollout does:
//! the ledger is created by the deployer, the sale gets times relative to
//! the moment of deployment, trading is paused until the sale succeeds and
//! the sale receives the pauser and minter roles.

use crate::clock::Clock;
use crate::config::DeploymentConfig;
use crate::crowdsale::Crowdsale;
use crate::distribution::Distribution;
use crate::error::{CrowdsaleError, Result};
use crate::funds::SharedBank;
use chrono::{DateTime, Utc};
use jovi_token::{format_ether, shared, Address, SharedLedger, TokenLedger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Nonce the deployer uses for the ledger
pub const TOKEN_NONCE: u64 = 0;
/// Nonce the deployer uses for the sale
pub const SALE_NONCE: u64 = 1;

pub struct Deployment {
    pub deployer: Address,
    pub ledger: SharedLedger,
    pub crowdsale: Crowdsale,
}

/// Deploy a token and its sale from a deployment file
pub fn deploy(
    config: &DeploymentConfig,
    deployer: Address,
    clock: Arc<dyn Clock>,
    bank: SharedBank,
) -> Result<Deployment> {
    if deployer.is_zero() {
        return Err(CrowdsaleError::InvalidConfig(
            "deployer is the zero address".to_string(),
        ));
    }

    let now = clock.now();
    let sale_config = config.sale_config(deployer, now)?;

    let token_address = Address::derive(&deployer, TOKEN_NONCE);
    let sale_address = Address::derive(&deployer, SALE_NONCE);

    let ledger = shared(TokenLedger::new(
        token_address,
        config.token.name.clone(),
        config.token.symbol.clone(),
        config.token.decimals,
        deployer,
    ));
    let crowdsale = Crowdsale::new(sale_address, sale_config, ledger.clone(), bank, clock)?;

    ledger.write().stage(|draft| -> Result<()> {
        draft.pause(&deployer)?;
        draft.add_pauser(&deployer, &sale_address)?;
        draft.add_minter(&deployer, &sale_address)?;
        Ok(())
    })?;

    log::info!(
        "Deployed {} at {} with crowdsale {} (deployer {})",
        config.token.symbol,
        token_address,
        sale_address,
        deployer
    );

    Ok(Deployment {
        deployer,
        ledger,
        crowdsale,
    })
}

/// Printable snapshot of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub deployer: Address,
    pub token: TokenSummary,
    pub crowdsale: SaleSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSummary {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub paused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSummary {
    pub address: Address,
    pub admin: Address,
    pub wallet: Address,
    pub pre_ico_rate: u128,
    pub ico_rate: u128,
    /// Ether amounts, formatted
    pub cap: String,
    pub goal: Option<String>,
    pub opening_time: String,
    pub closing_time: String,
    pub release_time: Option<String>,
    pub distribution: Option<Distribution>,
    pub vaults: Vec<VaultSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSummary {
    pub label: String,
    pub address: Address,
    pub beneficiary: Address,
}

fn timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

impl Deployment {
    pub fn summary(&self) -> DeploymentSummary {
        let ledger = self.ledger.read();
        let sale = &self.crowdsale;
        let config = sale.config();

        let vaults: Vec<VaultSummary> = sale
            .vaults()
            .map(|v| {
                [
                    ("founders", &v.founders),
                    ("foundation", &v.foundation),
                    ("partners", &v.partners),
                ]
                .into_iter()
                .map(|(label, vault)| VaultSummary {
                    label: label.to_string(),
                    address: vault.address(),
                    beneficiary: vault.beneficiary(),
                })
                .collect()
            })
            .unwrap_or_default();

        DeploymentSummary {
            deployer: self.deployer,
            token: TokenSummary {
                address: ledger.address(),
                name: ledger.name().to_string(),
                symbol: ledger.symbol().to_string(),
                decimals: ledger.decimals(),
                paused: ledger.paused(),
            },
            crowdsale: SaleSummary {
                address: sale.address(),
                admin: sale.admin(),
                wallet: sale.wallet(),
                pre_ico_rate: config.pre_ico_rate,
                ico_rate: config.ico_rate,
                cap: format_ether(sale.cap()),
                goal: sale.goal().map(format_ether),
                opening_time: timestamp(sale.opening_time()),
                closing_time: timestamp(sale.closing_time()),
                release_time: sale.release_time().map(timestamp),
                distribution: sale.distribution(),
                vaults,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ConfigError;
    use crate::funds::NativeBank;
    use jovi_token::ETHER;

    fn deploy_default(deployer: Address) -> Deployment {
        deploy(
            &DeploymentConfig::default(),
            deployer,
            Arc::new(ManualClock::new(1_700_000_000)),
            NativeBank::new().shared(),
        )
        .unwrap()
    }

    #[test]
    fn test_deploy_wires_roles() {
        let deployer = Address::from_low_u64(1);
        let deployment = deploy_default(deployer);
        let sale = deployment.crowdsale.address();
        let token = deployment.crowdsale.token();

        let ledger = deployment.ledger.read();
        assert!(ledger.paused());
        assert!(ledger.is_minter(&sale));
        assert!(ledger.is_pauser(&sale));
        assert!(ledger.is_minter(&deployer));
        assert_eq!(ledger.address(), Address::derive(&deployer, TOKEN_NONCE));
        assert_eq!(sale, Address::derive(&deployer, SALE_NONCE));
        assert_eq!(token, ledger.address());
    }

    #[test]
    fn test_summary() {
        let deployment = deploy_default(Address::from_low_u64(1));
        let summary = deployment.summary();

        assert_eq!(summary.token.symbol, "JOVI");
        assert!(summary.token.paused);
        assert_eq!(summary.crowdsale.cap, format_ether(100 * ETHER));
        assert_eq!(summary.crowdsale.vaults.len(), 3);
        assert_eq!(summary.crowdsale.vaults[0].label, "founders");
        assert_eq!(summary.crowdsale.opening_time, "2023-11-14T22:18:20+00:00");

        let json = serde_json::to_string(&summary).unwrap();
        let back: DeploymentSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_bad_deployment_file_keeps_field() {
        let mut config = DeploymentConfig::default();
        config.crowdsale.goal = "fifty".to_string();

        let result = deploy(
            &config,
            Address::from_low_u64(1),
            Arc::new(ManualClock::new(0)),
            NativeBank::new().shared(),
        );
        assert!(matches!(
            result,
            Err(CrowdsaleError::Config(ConfigError::Invalid { field: "goal", .. }))
        ));
    }

    #[test]
    fn test_zero_deployer_rejected() {
        let result = deploy(
            &DeploymentConfig::default(),
            Address::ZERO,
            Arc::new(ManualClock::new(0)),
            NativeBank::new().shared(),
        );
        assert!(matches!(result, Err(CrowdsaleError::InvalidConfig(_))));
    }
}
