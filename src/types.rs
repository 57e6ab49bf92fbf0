//! Network and protocol identifiers for Filecoin addresses

use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Wire Constants
// ============================================================================

/// Length of the blake2b-160 hash carried by secp256k1 and actor addresses
pub const PAYLOAD_HASH_LENGTH: usize = 20;

/// Length of a BLS public key payload
pub const BLS_PUBLIC_KEY_LENGTH: usize = 48;

/// Length of the blake2b checksum appended to the base32 body
pub const CHECKSUM_LENGTH: usize = 4;

/// Maximum sub-address length of a delegated address
pub const MAX_SUBADDRESS_LENGTH: usize = 54;

/// Longest valid textual address (network + protocol + 84 body chars)
pub const MAX_ADDRESS_STRING_LENGTH: usize = 2 + 84;

/// Actor IDs and namespaces are 63-bit
pub const MAX_ACTOR_ID: u64 = i64::MAX as u64;

// ============================================================================
// Network
// ============================================================================

/// Filecoin network an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Single-character prefix used in the textual encoding
    pub fn prefix(&self) -> char {
        match self {
            Network::Mainnet => 'f',
            Network::Testnet => 't',
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            'f' => Some(Network::Mainnet),
            't' => Some(Network::Testnet),
            _ => None,
        }
    }

    /// Resolve a network name as used in deployment configs.
    ///
    /// Every non-mainnet deployment (testnet, devnet, ...) uses testnet addresses.
    pub fn resolve(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "f" => Ok(Network::Mainnet),
            "testnet" | "devnet" | "localnet" | "t" => Ok(Network::Testnet),
            other => Err(eyre!("Unknown Filecoin network: {}", other)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        Network::resolve(s)
    }
}

// ============================================================================
// Protocol
// ============================================================================

/// Address protocol, the first byte of the binary form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Id = 0,
    Secp256k1 = 1,
    Actor = 2,
    Bls = 3,
    Delegated = 4,
}

impl Protocol {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Protocol::Id),
            1 => Some(Protocol::Secp256k1),
            2 => Some(Protocol::Actor),
            3 => Some(Protocol::Bls),
            4 => Some(Protocol::Delegated),
            _ => None,
        }
    }

    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .and_then(Self::from_byte)
    }

    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Fixed payload length for hash/key protocols
    pub fn payload_length(&self) -> Option<usize> {
        match self {
            Protocol::Secp256k1 | Protocol::Actor => Some(PAYLOAD_HASH_LENGTH),
            Protocol::Bls => Some(BLS_PUBLIC_KEY_LENGTH),
            Protocol::Id | Protocol::Delegated => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Id => write!(f, "id"),
            Protocol::Secp256k1 => write!(f, "secp256k1"),
            Protocol::Actor => write!(f, "actor"),
            Protocol::Bls => write!(f, "bls"),
            Protocol::Delegated => write!(f, "delegated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_prefix() {
        assert_eq!(Network::Mainnet.prefix(), 'f');
        assert_eq!(Network::Testnet.prefix(), 't');
        assert_eq!(Network::from_prefix('t'), Some(Network::Testnet));
        assert_eq!(Network::from_prefix('x'), None);
    }

    #[test]
    fn test_network_resolve() {
        assert_eq!(Network::resolve("mainnet").unwrap(), Network::Mainnet);
        assert_eq!(Network::resolve("Testnet").unwrap(), Network::Testnet);
        assert_eq!(Network::resolve("devnet").unwrap(), Network::Testnet);
        assert_eq!("f".parse::<Network>().unwrap(), Network::Mainnet);
        assert!(Network::resolve("bitcoin").is_err());
    }

    #[test]
    fn test_protocol_digits() {
        assert_eq!(Protocol::from_digit('1'), Some(Protocol::Secp256k1));
        assert_eq!(Protocol::from_digit('4'), Some(Protocol::Delegated));
        assert_eq!(Protocol::from_digit('5'), None);
        assert_eq!(Protocol::from_digit('a'), None);
        assert_eq!(Protocol::Bls.as_byte(), 3);
        assert_eq!(Protocol::Bls.payload_length(), Some(48));
        assert_eq!(Protocol::Id.payload_length(), None);
    }
}
