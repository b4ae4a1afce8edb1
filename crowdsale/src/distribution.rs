//! Post-sale token distribution
//!
//! Tokens minted during the sale make up the token-sale share of the final
//! supply. On a successful finalization the remaining shares are minted for
//! the founders, the foundation and the partners so that all four shares
//! follow the configured percentages.
//!
//! Rounding: `full = floor(sold * 100 / token_sale)` and each stakeholder
//! gets `floor(full * pct / 100)`. Whatever is lost to flooring stays
//! unminted and counts towards the token-sale share.

use crate::error::{CrowdsaleError, Result};
use serde::{Deserialize, Serialize};

/// Percentage split of the final supply. Must sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub token_sale: u8,
    pub founders: u8,
    pub foundation: u8,
    pub partners: u8,
}

/// Token amounts to mint into each stakeholder vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Supply implied by the tokens sold and the token-sale percentage
    pub full_supply: u128,
    /// Tokens minted during the sale
    pub sold: u128,
    pub founders: u128,
    pub foundation: u128,
    pub partners: u128,
}

impl Distribution {
    pub fn validate(&self) -> Result<()> {
        let total = self.token_sale as u32
            + self.founders as u32
            + self.foundation as u32
            + self.partners as u32;

        if total != 100 {
            return Err(CrowdsaleError::InvalidConfig(format!(
                "distribution must sum to 100, got {}",
                total
            )));
        }
        if self.token_sale == 0 {
            return Err(CrowdsaleError::InvalidConfig(
                "token sale share must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Split the final supply given the number of tokens sold
    pub fn allocate(&self, sold: u128) -> Result<Allocation> {
        self.validate()?;

        let full_supply = sold
            .checked_mul(100)
            .ok_or(CrowdsaleError::Overflow)?
            / self.token_sale as u128;

        let share = |pct: u8| -> Result<u128> {
            full_supply
                .checked_mul(pct as u128)
                .map(|v| v / 100)
                .ok_or(CrowdsaleError::Overflow)
        };

        Ok(Allocation {
            full_supply,
            sold,
            founders: share(self.founders)?,
            foundation: share(self.foundation)?,
            partners: share(self.partners)?,
        })
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            token_sale: 70,
            founders: 10,
            foundation: 10,
            partners: 10,
        }
    }
}

impl Allocation {
    /// Tokens minted at finalization
    pub fn stakeholder_total(&self) -> u128 {
        self.founders + self.foundation + self.partners
    }

    /// Rounding dust that was not minted
    pub fn remainder(&self) -> u128 {
        self.full_supply - self.sold - self.stakeholder_total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jovi_token::ETHER;

    #[test]
    fn test_default_split() {
        let dist = Distribution::default();
        dist.validate().unwrap();

        let alloc = dist.allocate(70_000).unwrap();
        assert_eq!(alloc.full_supply, 100_000);
        assert_eq!(alloc.founders, 10_000);
        assert_eq!(alloc.foundation, 10_000);
        assert_eq!(alloc.partners, 10_000);
        assert_eq!(alloc.remainder(), 0);
    }

    #[test]
    fn test_rounding_goes_to_token_sale() {
        let dist = Distribution::default();

        // 50 ether at 500 tokens each, not divisible by 70
        let sold = 25_000 * ETHER;
        let alloc = dist.allocate(sold).unwrap();

        assert_eq!(alloc.full_supply, 35_714_285_714_285_714_285_714);
        assert_eq!(alloc.founders, 3_571_428_571_428_571_428_571);
        assert_eq!(alloc.foundation, alloc.founders);
        assert_eq!(alloc.partners, alloc.founders);
        assert_eq!(alloc.remainder(), 1);
        assert!(alloc.sold + alloc.stakeholder_total() <= alloc.full_supply);
    }

    #[test]
    fn test_uneven_split() {
        let dist = Distribution {
            token_sale: 55,
            founders: 25,
            foundation: 15,
            partners: 5,
        };

        let alloc = dist.allocate(55).unwrap();
        assert_eq!(alloc.full_supply, 100);
        assert_eq!(
            (alloc.founders, alloc.foundation, alloc.partners),
            (25, 15, 5)
        );
    }

    #[test]
    fn test_invalid_split() {
        let bad = Distribution {
            token_sale: 70,
            founders: 10,
            foundation: 10,
            partners: 5,
        };
        assert!(bad.validate().is_err());

        let no_sale = Distribution {
            token_sale: 0,
            founders: 50,
            foundation: 25,
            partners: 25,
        };
        assert!(no_sale.allocate(10).is_err());
    }

    #[test]
    fn test_nothing_sold() {
        let alloc = Distribution::default().allocate(0).unwrap();
        assert_eq!(alloc.stakeholder_total(), 0);
    }
}
