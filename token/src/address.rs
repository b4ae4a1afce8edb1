//! Account identifiers
//!
//! Addresses are 20-byte identifiers rendered as `0x`-prefixed hex. Contract
//! addresses are derived from the deploying account and a nonce the same way
//! contract creation does on chain: the last 20 bytes of
//! `keccak256(deployer || nonce)`.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null address. Minting records it as the sender.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    /// Address of the contract created by `deployer` at `nonce`
    pub fn derive(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(deployer.0);
        hasher.update(nonce.to_be_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Address(bytes)
    }

    /// Test and demo helper: an address whose low 8 bytes hold `n`
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&n.to_be_bytes());
        Address(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),

    #[error("Invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let decoded = hex::decode(stripped).map_err(|e| AddressError::InvalidHex(e.to_string()))?;

        if decoded.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(decoded.len()));
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Address(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
