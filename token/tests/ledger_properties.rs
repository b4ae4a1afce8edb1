//! Property-style checks over random ledger call sequences

use jovi_token::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn new_ledger(owner: Address) -> TokenLedger {
    TokenLedger::new(
        Address::derive(&owner, 0),
        defaults::NAME,
        defaults::SYMBOL,
        defaults::DECIMALS,
        owner,
    )
}

fn sum_of_balances(ledger: &TokenLedger) -> u128 {
    ledger.accounts().map(|(_, balance)| *balance).sum()
}

/// Total supply equals the sum of balances after every call, including
/// calls that fail
#[test]
fn test_supply_matches_balances_for_random_sequences() {
    let owner = Address::from_low_u64(1);
    let accounts: Vec<Address> = (1..=6).map(Address::from_low_u64).collect();

    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ledger = new_ledger(owner);

        for _ in 0..200 {
            let from = accounts[rng.random_range(0..accounts.len())];
            let to = accounts[rng.random_range(0..accounts.len())];
            let amount = rng.random_range(0..1_000u128);

            let _ = match rng.random_range(0..4) {
                0 => ledger.mint(&from, &to, amount),
                1 | 2 => ledger.transfer(&from, &to, amount),
                _ => {
                    if ledger.paused() {
                        ledger.unpause(&owner)
                    } else {
                        ledger.pause(&owner)
                    }
                }
            };

            assert_eq!(
                ledger.total_supply(),
                sum_of_balances(&ledger),
                "supply invariant broken with seed {}",
                seed
            );
        }
    }
}

/// While paused, no transfer of a non-zero amount succeeds regardless of
/// sender and recipient
#[test]
fn test_transfer_always_fails_while_paused() {
    let owner = Address::from_low_u64(1);
    let accounts: Vec<Address> = (1..=5).map(Address::from_low_u64).collect();
    let mut ledger = new_ledger(owner);

    for account in &accounts {
        ledger.mint(&owner, account, 1_000).unwrap();
    }
    ledger.pause(&owner).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let from = accounts[rng.random_range(0..accounts.len())];
        let to = accounts[rng.random_range(0..accounts.len())];
        let amount = rng.random_range(1..=1_000u128);

        assert_eq!(ledger.transfer(&from, &to, amount), Err(TokenError::Paused));
    }

    for account in &accounts {
        assert_eq!(ledger.balance_of(account), 1_000);
    }
}

#[test]
fn test_every_successful_call_emits_one_event() {
    let owner = Address::from_low_u64(1);
    let alice = Address::from_low_u64(2);
    let mut ledger = new_ledger(owner);
    let before = ledger.events().len();

    ledger.mint(&owner, &alice, 10).unwrap();
    ledger.transfer(&alice, &owner, 5).unwrap();
    assert_eq!(ledger.events().len(), before + 2);

    // Failures record nothing
    let _ = ledger.transfer(&alice, &owner, 50);
    let _ = ledger.mint(&alice, &alice, 1);
    assert_eq!(ledger.events().len(), before + 2);

    assert_eq!(
        ledger.events()[before],
        TokenEvent::Transfer {
            from: Address::ZERO,
            to: alice,
            value: 10
        }
    );
}

#[test]
fn test_shared_ledger_handle() {
    let owner = Address::from_low_u64(1);
    let handle = shared(new_ledger(owner));
    let clone = handle.clone();

    handle
        .write()
        .mint(&owner, &Address::from_low_u64(2), 42)
        .unwrap();
    assert_eq!(clone.read().total_supply(), 42);
}
