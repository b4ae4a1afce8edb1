//! Sale coordinator
//!
//! Sells tokens for the native coin during a fixed window. Purchases mint
//! `value * rate` tokens on the ledger; the rate depends on the stage. A
//! full deployment escrows every payment until `finalize()` decides whether
//! the goal was met:
//! - reached: stakeholder vaults get their share, escrow goes to the wallet,
//!   the ledger is unpaused and minting is closed
//! - missed: escrow switches to refunds, the ledger stays paused
//!
//! Every mutating call locks the ledger and then the bank, checks each
//! step against the current state and applies the changes only once all
//! checks pass.

use crate::clock::Clock;
use crate::config::CrowdsaleConfig;
use crate::distribution::{Allocation, Distribution};
use crate::error::{CrowdsaleError, Result};
use crate::escrow::{EscrowState, RefundEscrow};
use crate::events::SaleEvent;
use crate::funds::SharedBank;
use crate::stage::{CrowdsaleStage, SaleStatus};
use crate::vault::TokenTimelock;
use jovi_token::{Address, SharedLedger};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Timelock vaults created for a goal-based sale
#[derive(Debug, Clone)]
pub struct StakeholderVaults {
    pub founders: TokenTimelock,
    pub foundation: TokenTimelock,
    pub partners: TokenTimelock,
}

impl StakeholderVaults {
    fn addresses(&self) -> [Address; 3] {
        [
            self.founders.address(),
            self.foundation.address(),
            self.partners.address(),
        ]
    }
}

pub struct Crowdsale {
    address: Address,
    config: CrowdsaleConfig,
    ledger: SharedLedger,
    bank: SharedBank,
    clock: Arc<dyn Clock>,

    stage: CrowdsaleStage,
    wei_raised: u128,
    contributions: HashMap<Address, u128>,
    escrow: RefundEscrow,
    vaults: Option<StakeholderVaults>,

    finalized: bool,
    goal_reached: Option<bool>,
    allocation: Option<Allocation>,
    events: Vec<SaleEvent>,
}

impl Crowdsale {
    /// Create the coordinator at `address`. For goal-based sales the three
    /// stakeholder vaults are created at addresses derived from it.
    pub fn new(
        address: Address,
        config: CrowdsaleConfig,
        ledger: SharedLedger,
        bank: SharedBank,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if address.is_zero() {
            return Err(CrowdsaleError::InvalidConfig(
                "sale address is the zero address".to_string(),
            ));
        }
        config.validate(clock.now())?;

        let vaults = config.goal.as_ref().map(|terms| {
            let vault = |nonce: u64, beneficiary: Address| {
                TokenTimelock::new(
                    Address::derive(&address, nonce),
                    beneficiary,
                    terms.release_time,
                    ledger.clone(),
                    clock.clone(),
                )
            };
            StakeholderVaults {
                founders: vault(1, terms.stakeholders.founders),
                foundation: vault(2, terms.stakeholders.foundation),
                partners: vault(3, terms.stakeholders.partners),
            }
        });

        log::info!(
            "Crowdsale {} created: cap {}, window [{}, {}], {}",
            address,
            config.cap,
            config.opening_time,
            config.closing_time,
            if config.is_refundable() {
                "refundable"
            } else {
                "forwarding"
            }
        );

        Ok(Self {
            address,
            config,
            ledger,
            bank,
            clock,
            stage: CrowdsaleStage::default(),
            wei_raised: 0,
            contributions: HashMap::new(),
            escrow: RefundEscrow::new(),
            vaults,
            finalized: false,
            goal_reached: None,
            allocation: None,
            events: Vec::new(),
        })
    }

    // ---- administration ----

    fn only_admin(&self, caller: &Address) -> Result<()> {
        if *caller != self.config.admin {
            return Err(CrowdsaleError::Unauthorized(*caller));
        }
        Ok(())
    }

    /// Advance the pricing stage. Only PreICO -> ICO is allowed.
    pub fn set_crowdsale_stage(&mut self, caller: &Address, stage: CrowdsaleStage) -> Result<()> {
        self.only_admin(caller)?;
        if self.finalized {
            return Err(CrowdsaleError::AlreadyFinalized);
        }
        if self.has_closed() {
            return Err(CrowdsaleError::SaleClosed);
        }
        if !self.stage.can_advance_to(stage) {
            return Err(CrowdsaleError::InvalidStageTransition {
                from: self.stage,
                to: stage,
            });
        }

        let from = self.stage;
        self.stage = stage;
        let rate = self.rate();
        self.events.push(SaleEvent::StageChanged {
            from,
            to: stage,
            rate,
        });
        log::info!("Crowdsale {} stage {} -> {} (rate {})", self.address, from, stage, rate);
        Ok(())
    }

    /// Hand administration to another account
    pub fn transfer_admin(&mut self, caller: &Address, new_admin: Address) -> Result<()> {
        self.only_admin(caller)?;
        if new_admin.is_zero() {
            return Err(CrowdsaleError::InvalidConfig(
                "new admin is the zero address".to_string(),
            ));
        }

        let previous = self.config.admin;
        self.config.admin = new_admin;
        self.events.push(SaleEvent::AdminTransferred {
            previous,
            new: new_admin,
        });
        log::info!("Crowdsale {} admin {} -> {}", self.address, previous, new_admin);
        Ok(())
    }

    // ---- purchases ----

    /// Checks a purchase and returns the beneficiary's new contribution and
    /// the new raised total
    fn validate_purchase(&self, beneficiary: &Address, value: u128, now: u64) -> Result<(u128, u128)> {
        if beneficiary.is_zero() {
            return Err(CrowdsaleError::InvalidBeneficiary);
        }
        if self.finalized {
            return Err(CrowdsaleError::AlreadyFinalized);
        }
        if now < self.config.opening_time || now > self.config.closing_time {
            return Err(CrowdsaleError::NotOpen {
                now,
                opening_time: self.config.opening_time,
                closing_time: self.config.closing_time,
            });
        }
        if value == 0 {
            return Err(CrowdsaleError::ZeroValue);
        }

        let contribution = self
            .contribution_of(beneficiary)
            .checked_add(value)
            .ok_or(CrowdsaleError::Overflow)?;
        if contribution < self.config.investor_min_cap {
            return Err(CrowdsaleError::BelowMinCap {
                value,
                min: self.config.investor_min_cap,
            });
        }
        if contribution > self.config.investor_max_cap {
            return Err(CrowdsaleError::AboveMaxCap {
                total: contribution,
                max: self.config.investor_max_cap,
            });
        }

        let raised = self
            .wei_raised
            .checked_add(value)
            .ok_or(CrowdsaleError::Overflow)?;
        if raised > self.config.cap {
            return Err(CrowdsaleError::CampaignCapExceeded {
                total: raised,
                cap: self.config.cap,
            });
        }

        Ok((contribution, raised))
    }

    /// `purchaser` pays `value` for tokens minted to `beneficiary`. Returns
    /// the number of tokens minted.
    pub fn buy_tokens(&mut self, purchaser: &Address, beneficiary: &Address, value: u128) -> Result<u128> {
        let now = self.clock.now();
        let (contribution, raised) = self.validate_purchase(beneficiary, value, now)?;
        let amount = value
            .checked_mul(self.rate())
            .ok_or(CrowdsaleError::Overflow)?;

        let sale = self.address;
        let refundable = self.config.is_refundable();
        let payee = if refundable { sale } else { self.config.wallet };

        {
            let mut ledger = self.ledger.write();
            let mut bank = self.bank.write();

            ledger.check_mint(&sale, beneficiary, amount)?;
            bank.check_transfer(purchaser, &payee, value)?;
            if refundable {
                self.escrow.check_deposit(value)?;
            }

            ledger.mint(&sale, beneficiary, amount)?;
            bank.transfer(purchaser, &payee, value)?;
            if refundable {
                self.escrow.deposit(purchaser, value)?;
            }
        }

        self.wei_raised = raised;
        self.contributions.insert(*beneficiary, contribution);
        self.events.push(SaleEvent::TokensPurchased {
            purchaser: *purchaser,
            beneficiary: *beneficiary,
            value,
            amount,
        });
        log::info!(
            "{} bought {} tokens for {} at rate {} (beneficiary {})",
            purchaser,
            amount,
            value,
            self.rate(),
            beneficiary
        );
        Ok(amount)
    }

    // ---- finalization ----

    /// Close the sale after it has ended. Returns whether the goal was met.
    pub fn finalize(&mut self, caller: &Address) -> Result<bool> {
        self.only_admin(caller)?;
        if self.finalized {
            return Err(CrowdsaleError::AlreadyFinalized);
        }
        let now = self.clock.now();
        if !self.has_closed() {
            return Err(CrowdsaleError::TooEarly {
                now,
                closing_time: self.config.closing_time,
            });
        }

        let goal_reached = self.live_goal_reached();
        let refundable = self.config.is_refundable();
        let sale = self.address;
        let wallet = self.config.wallet;

        if !goal_reached {
            self.escrow.enable_refunds()?;
            self.commit_finalize(false, None);
            return Ok(false);
        }

        let allocation = {
            let mut ledger = self.ledger.write();
            let mut bank = self.bank.write();

            let vault_shares = match (self.config.goal.as_ref(), self.vaults.as_ref()) {
                (Some(terms), Some(vaults)) => {
                    let allocation = terms.distribution.allocate(ledger.total_supply())?;
                    let shares = [
                        allocation.founders,
                        allocation.foundation,
                        allocation.partners,
                    ];
                    Some((allocation, vaults.addresses(), shares))
                }
                _ => None,
            };

            if let Some((allocation, addresses, shares)) = &vault_shares {
                for (vault, share) in addresses.iter().zip(shares) {
                    if *share > 0 {
                        ledger.check_mint(&sale, vault, *share)?;
                    }
                }
                ledger
                    .total_supply()
                    .checked_add(allocation.stakeholder_total())
                    .ok_or(CrowdsaleError::Overflow)?;
            }
            ledger.check_renounce_minter(&sale)?;
            let paused = ledger.paused();
            if paused {
                ledger.check_unpause(&sale)?;
            }
            if refundable {
                self.escrow.check_active()?;
                bank.check_transfer(&sale, &wallet, self.escrow.total_held())?;
            }

            if let Some((_, addresses, shares)) = &vault_shares {
                for (vault, share) in addresses.iter().zip(shares) {
                    if *share > 0 {
                        ledger.mint(&sale, vault, *share)?;
                    }
                }
            }
            ledger.renounce_minter(&sale)?;
            if paused {
                ledger.unpause(&sale)?;
            }
            if refundable {
                let released = self.escrow.close()?;
                bank.transfer(&sale, &wallet, released)?;
            }
            vault_shares.map(|(allocation, _, _)| allocation)
        };

        self.commit_finalize(true, allocation);
        Ok(true)
    }

    fn commit_finalize(&mut self, goal_reached: bool, allocation: Option<Allocation>) {
        self.finalized = true;
        self.goal_reached = Some(goal_reached);
        self.allocation = allocation;
        self.events.push(SaleEvent::Finalized {
            goal_reached,
            raised: self.wei_raised,
        });

        if goal_reached {
            log::info!(
                "Crowdsale {} finalized: goal reached with {} raised",
                self.address,
                self.wei_raised
            );
        } else {
            log::warn!(
                "Crowdsale {} finalized: goal missed with {} raised, refunds enabled",
                self.address,
                self.wei_raised
            );
        }
    }

    /// Pay back `refundee`'s escrowed deposit after a failed sale
    pub fn claim_refund(&mut self, refundee: &Address) -> Result<u128> {
        if !self.finalized {
            return Err(CrowdsaleError::NotFinalized);
        }
        if self.goal_reached() {
            return Err(CrowdsaleError::GoalWasReached);
        }
        if self.escrow.deposits_of(refundee) == 0 {
            return Err(CrowdsaleError::NothingToRefund(*refundee));
        }

        let sale = self.address;
        let amount = {
            let mut bank = self.bank.write();
            let amount = self.escrow.check_withdraw(refundee)?;
            bank.check_transfer(&sale, refundee, amount)?;

            self.escrow.withdraw(refundee)?;
            bank.transfer(&sale, refundee, amount)?;
            amount
        };

        self.events.push(SaleEvent::Refunded {
            refundee: *refundee,
            amount,
        });
        log::info!("Refunded {} to {}", amount, refundee);
        Ok(amount)
    }

    // ---- reads ----

    pub fn address(&self) -> Address {
        self.address
    }

    /// Address of the token ledger
    pub fn token(&self) -> Address {
        self.ledger.read().address()
    }

    pub fn config(&self) -> &CrowdsaleConfig {
        &self.config
    }

    pub fn admin(&self) -> Address {
        self.config.admin
    }

    pub fn wallet(&self) -> Address {
        self.config.wallet
    }

    pub fn stage(&self) -> CrowdsaleStage {
        self.stage
    }

    /// Tokens per unit of native coin in the current stage
    pub fn rate(&self) -> u128 {
        match self.stage {
            CrowdsaleStage::PreICO => self.config.pre_ico_rate,
            CrowdsaleStage::ICO => self.config.ico_rate,
        }
    }

    pub fn cap(&self) -> u128 {
        self.config.cap
    }

    /// `None` for sales without a goal
    pub fn goal(&self) -> Option<u128> {
        self.config.goal.as_ref().map(|terms| terms.goal)
    }

    fn live_goal_reached(&self) -> bool {
        self.goal().map_or(true, |goal| self.wei_raised >= goal)
    }

    /// Fixed at finalization; before that, whether the current raise meets
    /// the goal. Always true for sales without a goal.
    pub fn goal_reached(&self) -> bool {
        self.goal_reached
            .unwrap_or_else(|| self.live_goal_reached())
    }

    pub fn wei_raised(&self) -> u128 {
        self.wei_raised
    }

    /// Total paid in for `beneficiary` so far
    pub fn contribution_of(&self, beneficiary: &Address) -> u128 {
        self.contributions.get(beneficiary).copied().unwrap_or(0)
    }

    /// Refundable deposit held for `payer`
    pub fn deposits_of(&self, payer: &Address) -> u128 {
        self.escrow.deposits_of(payer)
    }

    pub fn escrow_state(&self) -> EscrowState {
        self.escrow.state()
    }

    pub fn investor_min_cap(&self) -> u128 {
        self.config.investor_min_cap
    }

    pub fn investor_max_cap(&self) -> u128 {
        self.config.investor_max_cap
    }

    pub fn distribution(&self) -> Option<Distribution> {
        self.config.goal.as_ref().map(|terms| terms.distribution)
    }

    /// Amounts minted into the vaults, once finalized successfully
    pub fn allocation(&self) -> Option<Allocation> {
        self.allocation
    }

    pub fn vaults(&self) -> Option<&StakeholderVaults> {
        self.vaults.as_ref()
    }

    pub fn founders_vault(&self) -> Option<&TokenTimelock> {
        self.vaults.as_ref().map(|v| &v.founders)
    }

    pub fn foundation_vault(&self) -> Option<&TokenTimelock> {
        self.vaults.as_ref().map(|v| &v.foundation)
    }

    pub fn partners_vault(&self) -> Option<&TokenTimelock> {
        self.vaults.as_ref().map(|v| &v.partners)
    }

    pub fn opening_time(&self) -> u64 {
        self.config.opening_time
    }

    pub fn closing_time(&self) -> u64 {
        self.config.closing_time
    }

    pub fn release_time(&self) -> Option<u64> {
        self.config.goal.as_ref().map(|terms| terms.release_time)
    }

    pub fn cap_reached(&self) -> bool {
        self.wei_raised >= self.config.cap
    }

    pub fn is_open(&self) -> bool {
        let now = self.clock.now();
        !self.finalized
            && now >= self.config.opening_time
            && now <= self.config.closing_time
            && !self.cap_reached()
    }

    /// Past the closing time, or nothing left to sell
    pub fn has_closed(&self) -> bool {
        self.clock.now() > self.config.closing_time || self.cap_reached()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn status(&self) -> SaleStatus {
        if self.finalized {
            return SaleStatus::Finalized {
                goal_reached: self.goal_reached(),
            };
        }
        if self.clock.now() < self.config.opening_time {
            SaleStatus::NotStarted
        } else if self.has_closed() {
            SaleStatus::Closed
        } else {
            SaleStatus::Open
        }
    }

    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }
}

impl fmt::Debug for Crowdsale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crowdsale")
            .field("address", &self.address)
            .field("stage", &self.stage)
            .field("wei_raised", &self.wei_raised)
            .field("finalized", &self.finalized)
            .field("goal_reached", &self.goal_reached)
            .finish_non_exhaustive()
    }
}
