//! Role-based authority sets
//!
//! Each privileged ledger operation checks membership in one explicit set
//! instead of inheriting an access-control base type.

use crate::address::Address;
use crate::error::{Result, TokenError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Minter,
    Pauser,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Minter => write!(f, "minter"),
            Role::Pauser => write!(f, "pauser"),
        }
    }
}

/// Set of accounts holding one role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSet {
    role: Role,
    members: HashSet<Address>,
}

impl RoleSet {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            members: HashSet::new(),
        }
    }

    /// Role set seeded with its first holder
    pub fn with_member(role: Role, account: Address) -> Self {
        let mut set = Self::new(role);
        set.members.insert(account);
        set
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Fail with `Unauthorized` unless `account` holds the role
    pub fn require(&self, account: &Address) -> Result<()> {
        if self.contains(account) {
            Ok(())
        } else {
            Err(TokenError::Unauthorized {
                role: self.role,
                account: *account,
            })
        }
    }

    /// Grant the role to `account`; only an existing holder may do so
    pub fn grant(&mut self, caller: &Address, account: Address) -> Result<()> {
        self.require(caller)?;
        if account.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }
        if !self.members.insert(account) {
            return Err(TokenError::AlreadyHasRole {
                role: self.role,
                account,
            });
        }
        Ok(())
    }

    /// Remove the caller's own membership
    pub fn renounce(&mut self, caller: &Address) -> Result<()> {
        self.require(caller)?;
        self.members.remove(caller);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_requires_existing_holder() {
        let admin = Address::from_low_u64(1);
        let other = Address::from_low_u64(2);
        let mut minters = RoleSet::with_member(Role::Minter, admin);

        let err = minters.grant(&other, other).unwrap_err();
        assert_eq!(
            err,
            TokenError::Unauthorized {
                role: Role::Minter,
                account: other
            }
        );

        minters.grant(&admin, other).unwrap();
        assert!(minters.contains(&other));
        assert_eq!(minters.len(), 2);

        // Granting twice is rejected
        assert!(matches!(
            minters.grant(&admin, other),
            Err(TokenError::AlreadyHasRole { .. })
        ));
    }

    #[test]
    fn test_renounce() {
        let admin = Address::from_low_u64(1);
        let mut pausers = RoleSet::with_member(Role::Pauser, admin);

        pausers.renounce(&admin).unwrap();
        assert!(pausers.is_empty());

        // Cannot renounce a role you no longer hold
        assert!(pausers.renounce(&admin).is_err());
    }
}
