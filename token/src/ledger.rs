//! Token Ledger
//!
//! Named, fixed-decimals fungible balances with role-gated minting and
//! pausing. Every mutating call takes the calling account explicitly; the
//! ledger never infers identity.
//!
//! Invariant: the sum of all balances equals `total_supply()` after every
//! call, successful or not. Failed calls leave the ledger untouched.

use crate::address::Address;
use crate::error::{Result, TokenError};
use crate::events::TokenEvent;
use crate::roles::{Role, RoleSet};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct TokenLedger {
    address: Address,
    name: String,
    symbol: String,
    decimals: u8,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
    minters: RoleSet,
    pausers: RoleSet,
    paused: bool,
    events: Vec<TokenEvent>,
}

impl TokenLedger {
    /// Create an empty ledger. The deployer becomes the first minter and
    /// the first pauser.
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        deployer: Address,
    ) -> Self {
        let name = name.into();
        let symbol = symbol.into();
        log::info!(
            "Token {} ({}) created at {} by {}",
            name,
            symbol,
            address,
            deployer
        );

        Self {
            address,
            name,
            symbol,
            decimals,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            minters: RoleSet::with_member(Role::Minter, deployer),
            pausers: RoleSet::with_member(Role::Pauser, deployer),
            paused: false,
            events: vec![
                TokenEvent::MinterAdded { account: deployer },
                TokenEvent::PauserAdded { account: deployer },
            ],
        }
    }

    /// Run `f` against a draft copy and keep its changes only if it
    /// returns `Ok`. Several ledger calls made through the draft commit
    /// together or not at all.
    pub fn stage<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut TokenLedger) -> std::result::Result<T, E>,
    {
        let mut draft = self.clone();
        let out = f(&mut draft)?;
        *self = draft;
        Ok(out)
    }

    // ---- identity ----

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    // ---- reads ----

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn is_minter(&self, account: &Address) -> bool {
        self.minters.contains(account)
    }

    pub fn is_pauser(&self, account: &Address) -> bool {
        self.pausers.contains(account)
    }

    /// All accounts with a recorded balance
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.balances.iter()
    }

    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    // ---- balance operations ----

    /// Fails exactly when `mint` with the same arguments would. Returns the
    /// supply after the mint.
    pub fn check_mint(&self, caller: &Address, to: &Address, amount: u128) -> Result<u128> {
        self.minters.require(caller)?;
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }
        self.total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)
    }

    /// Create `amount` new units for `to`
    pub fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<()> {
        let new_supply = self.check_mint(caller, to, amount)?;
        // Cannot overflow: the balance is bounded by the supply
        *self.balances.entry(*to).or_insert(0) += amount;
        self.total_supply = new_supply;

        self.events.push(TokenEvent::Transfer {
            from: Address::ZERO,
            to: *to,
            value: amount,
        });
        log::debug!("Minted {} {} to {} (by {})", amount, self.symbol, to, caller);
        Ok(())
    }

    /// Move `amount` from the caller to `to`
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<()> {
        if self.paused {
            return Err(TokenError::Paused);
        }
        self.move_balance(caller, to, amount)
    }

    /// Let `spender` move up to `amount` of the caller's balance
    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: u128) -> Result<()> {
        if self.paused {
            return Err(TokenError::Paused);
        }
        if spender.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }

        self.allowances.insert((*caller, *spender), amount);
        self.events.push(TokenEvent::Approval {
            owner: *caller,
            spender: *spender,
            value: amount,
        });
        Ok(())
    }

    /// Move `amount` from `from` to `to` against the caller's allowance
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        if self.paused {
            return Err(TokenError::Paused);
        }

        let approved = self.allowance(from, caller);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                requested: amount,
                approved,
            });
        }

        self.move_balance(from, to, amount)?;

        let remaining = approved - amount;
        self.allowances.insert((*from, *caller), remaining);
        self.events.push(TokenEvent::Approval {
            owner: *from,
            spender: *caller,
            value: remaining,
        });
        Ok(())
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }

        self.balances.insert(*from, available - amount);
        *self.balances.entry(*to).or_insert(0) += amount;

        self.events.push(TokenEvent::Transfer {
            from: *from,
            to: *to,
            value: amount,
        });
        Ok(())
    }

    // ---- pause control ----

    pub fn pause(&mut self, caller: &Address) -> Result<()> {
        self.pausers.require(caller)?;
        if self.paused {
            return Err(TokenError::AlreadyInState { paused: true });
        }

        self.paused = true;
        self.events.push(TokenEvent::Paused { account: *caller });
        log::info!("Token {} paused by {}", self.symbol, caller);
        Ok(())
    }

    pub fn check_unpause(&self, caller: &Address) -> Result<()> {
        self.pausers.require(caller)?;
        if !self.paused {
            return Err(TokenError::AlreadyInState { paused: false });
        }
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<()> {
        self.check_unpause(caller)?;
        self.paused = false;
        self.events.push(TokenEvent::Unpaused { account: *caller });
        log::info!("Token {} unpaused by {}", self.symbol, caller);
        Ok(())
    }

    // ---- role administration ----

    pub fn add_minter(&mut self, caller: &Address, account: &Address) -> Result<()> {
        self.minters.grant(caller, *account)?;
        self.events.push(TokenEvent::MinterAdded { account: *account });
        log::debug!("{} granted minter role to {}", caller, account);
        Ok(())
    }

    pub fn check_renounce_minter(&self, caller: &Address) -> Result<()> {
        self.minters.require(caller)
    }

    /// Drop the caller's own mint authority. Once the last minter renounces,
    /// the supply is final.
    pub fn renounce_minter(&mut self, caller: &Address) -> Result<()> {
        self.minters.renounce(caller)?;
        self.events.push(TokenEvent::MinterRemoved { account: *caller });
        log::info!("{} renounced minter role", caller);
        Ok(())
    }

    pub fn add_pauser(&mut self, caller: &Address, account: &Address) -> Result<()> {
        self.pausers.grant(caller, *account)?;
        self.events.push(TokenEvent::PauserAdded { account: *account });
        log::debug!("{} granted pauser role to {}", caller, account);
        Ok(())
    }

    pub fn renounce_pauser(&mut self, caller: &Address) -> Result<()> {
        self.pausers.renounce(caller)?;
        self.events.push(TokenEvent::PauserRemoved { account: *caller });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TokenLedger, Address) {
        let owner = Address::from_low_u64(1);
        let ledger = TokenLedger::new(
            Address::derive(&owner, 0),
            "JoviToken",
            "JOVI",
            18,
            owner,
        );
        (ledger, owner)
    }

    #[test]
    fn test_identity() {
        let (ledger, owner) = setup();
        assert_eq!(ledger.name(), "JoviToken");
        assert_eq!(ledger.symbol(), "JOVI");
        assert_eq!(ledger.decimals(), 18);
        assert_eq!(ledger.total_supply(), 0);
        assert!(ledger.is_minter(&owner));
        assert!(ledger.is_pauser(&owner));
        assert!(!ledger.paused());
    }

    #[test]
    fn test_mint() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);

        ledger.mint(&owner, &alice, 1000).unwrap();
        assert_eq!(ledger.balance_of(&alice), 1000);
        assert_eq!(ledger.total_supply(), 1000);

        let last = ledger.events().last().unwrap();
        assert!(last.is_mint());
    }

    #[test]
    fn test_mint_requires_minter() {
        let (mut ledger, _owner) = setup();
        let alice = Address::from_low_u64(2);

        let err = ledger.mint(&alice, &alice, 1000).unwrap_err();
        assert_eq!(
            err,
            TokenError::Unauthorized {
                role: Role::Minter,
                account: alice
            }
        );
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn test_mint_to_zero_address() {
        let (mut ledger, owner) = setup();
        assert_eq!(
            ledger.mint(&owner, &Address::ZERO, 1),
            Err(TokenError::InvalidRecipient)
        );
    }

    #[test]
    fn test_transfer() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);
        let bob = Address::from_low_u64(3);

        ledger.mint(&owner, &alice, 1000).unwrap();
        ledger.transfer(&alice, &bob, 400).unwrap();

        assert_eq!(ledger.balance_of(&alice), 600);
        assert_eq!(ledger.balance_of(&bob), 400);
        assert_eq!(ledger.total_supply(), 1000);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);
        let bob = Address::from_low_u64(3);
        ledger.mint(&owner, &alice, 10).unwrap();

        assert_eq!(
            ledger.transfer(&alice, &bob, 11),
            Err(TokenError::InsufficientBalance {
                requested: 11,
                available: 10
            })
        );
        assert_eq!(ledger.transfer(&alice, &Address::ZERO, 1), Err(TokenError::InvalidRecipient));
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);
        ledger.mint(&owner, &alice, 10).unwrap();

        ledger.transfer(&alice, &alice, 10).unwrap();
        assert_eq!(ledger.balance_of(&alice), 10);
    }

    #[test]
    fn test_pause_blocks_transfers() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);
        let bob = Address::from_low_u64(3);
        ledger.mint(&owner, &alice, 100).unwrap();

        ledger.pause(&owner).unwrap();
        assert_eq!(ledger.transfer(&alice, &bob, 1), Err(TokenError::Paused));
        assert_eq!(ledger.approve(&alice, &bob, 1), Err(TokenError::Paused));

        // Minting is still possible while paused
        ledger.mint(&owner, &alice, 1).unwrap();

        ledger.unpause(&owner).unwrap();
        ledger.transfer(&alice, &bob, 1).unwrap();
    }

    #[test]
    fn test_pause_state_checks() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);

        assert!(matches!(
            ledger.pause(&alice),
            Err(TokenError::Unauthorized { role: Role::Pauser, .. })
        ));
        assert_eq!(
            ledger.unpause(&owner),
            Err(TokenError::AlreadyInState { paused: false })
        );

        ledger.pause(&owner).unwrap();
        assert_eq!(
            ledger.pause(&owner),
            Err(TokenError::AlreadyInState { paused: true })
        );
    }

    #[test]
    fn test_allowances() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);
        let bob = Address::from_low_u64(3);
        let carol = Address::from_low_u64(4);
        ledger.mint(&owner, &alice, 100).unwrap();

        ledger.approve(&alice, &bob, 60).unwrap();
        assert_eq!(ledger.allowance(&alice, &bob), 60);

        ledger.transfer_from(&bob, &alice, &carol, 50).unwrap();
        assert_eq!(ledger.balance_of(&carol), 50);
        assert_eq!(ledger.allowance(&alice, &bob), 10);

        assert_eq!(
            ledger.transfer_from(&bob, &alice, &carol, 11),
            Err(TokenError::InsufficientAllowance {
                requested: 11,
                approved: 10
            })
        );
    }

    #[test]
    fn test_role_administration() {
        let (mut ledger, owner) = setup();
        let sale = Address::from_low_u64(9);

        ledger.add_minter(&owner, &sale).unwrap();
        ledger.add_pauser(&owner, &sale).unwrap();
        assert!(ledger.is_minter(&sale));
        assert!(ledger.is_pauser(&sale));

        ledger.renounce_minter(&sale).unwrap();
        assert!(!ledger.is_minter(&sale));
        assert!(ledger.mint(&sale, &sale, 1).is_err());

        ledger.renounce_pauser(&sale).unwrap();
        assert!(!ledger.is_pauser(&sale));
    }

    #[test]
    fn test_checks_match_mutations() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);
        let before = ledger.events().len();

        assert_eq!(ledger.check_mint(&owner, &alice, 500), Ok(500));
        assert_eq!(
            ledger.check_mint(&alice, &alice, 500),
            Err(TokenError::Unauthorized {
                role: Role::Minter,
                account: alice
            })
        );
        assert_eq!(
            ledger.check_mint(&owner, &Address::ZERO, 1),
            Err(TokenError::InvalidRecipient)
        );
        assert_eq!(
            ledger.check_unpause(&owner),
            Err(TokenError::AlreadyInState { paused: false })
        );
        assert!(ledger.check_renounce_minter(&alice).is_err());
        assert!(ledger.check_renounce_minter(&owner).is_ok());

        // Checks never change state
        assert_eq!(ledger.total_supply(), 0);
        assert!(ledger.is_minter(&owner));
        assert_eq!(ledger.events().len(), before);

        ledger.mint(&owner, &alice, u128::MAX).unwrap();
        assert_eq!(ledger.check_mint(&owner, &alice, 1), Err(TokenError::Overflow));
        assert_eq!(ledger.mint(&owner, &alice, 1), Err(TokenError::Overflow));

        ledger.pause(&owner).unwrap();
        assert_eq!(ledger.check_unpause(&alice).is_err(), ledger.unpause(&alice).is_err());
        assert!(ledger.check_unpause(&owner).is_ok());
    }

    #[test]
    fn test_stage_rolls_back_on_error() {
        let (mut ledger, owner) = setup();
        let alice = Address::from_low_u64(2);

        let result: Result<()> = ledger.stage(|draft| {
            draft.mint(&owner, &alice, 500)?;
            draft.mint(&alice, &alice, 500)
        });

        assert!(result.is_err());
        assert_eq!(ledger.balance_of(&alice), 0);
        assert_eq!(ledger.total_supply(), 0);

        ledger
            .stage(|draft| draft.mint(&owner, &alice, 500))
            .unwrap();
        assert_eq!(ledger.total_supply(), 500);
    }
}
