//! Filecoin Address Encoding
//!
//! Decodes human-readable Filecoin addresses into their binary form and back.
//!
//! ## Textual Format
//!
//! ```text
//! | Network (1 char) | Protocol (1 digit) | Body |
//! ```
//!
//! - Network: `f` (mainnet) or `t` (testnet)
//! - Protocol `0` (ID): body is the decimal actor ID
//! - Protocol `1`/`2`/`3` (secp256k1/actor/BLS): body is lowercase unpadded
//!   RFC 4648 base32 of `payload || checksum`
//! - Protocol `4` (delegated): body is `<namespace>f<base32(subaddress || checksum)>`
//!
//! ## Binary Format
//!
//! ```text
//! | Protocol (1 byte) | Payload (variable) |
//! ```
//!
//! ID payloads are unsigned LEB128. Delegated payloads are
//! `leb128(namespace) || subaddress`.
//!
//! The checksum is a 4-byte blake2b digest of the binary form.

use bech32::{u5, FromBase32, ToBase32};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;
use crate::types::{
    Network, Protocol, BLS_PUBLIC_KEY_LENGTH, CHECKSUM_LENGTH, MAX_ACTOR_ID,
    MAX_ADDRESS_STRING_LENGTH, MAX_SUBADDRESS_LENGTH, PAYLOAD_HASH_LENGTH,
};

/// Lowercase RFC 4648 base32 alphabet
const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Namespace digits (at most 19 for a 63-bit value), separator, base32 of
/// the largest sub-address plus checksum
const MAX_DELEGATED_STRING_LENGTH: usize = 2 + 19 + 1 + 93;

/// Block explorer used for address links
const EXPLORER_ADDRESS_URL: &str = "https://filfox.info/en/address";

// ============================================================================
// Address Structure
// ============================================================================

/// Protocol-specific address payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
    /// Actor ID
    Id(u64),
    /// blake2b-160 of an uncompressed secp256k1 public key
    Secp256k1([u8; PAYLOAD_HASH_LENGTH]),
    /// blake2b-160 of actor creation data
    Actor([u8; PAYLOAD_HASH_LENGTH]),
    /// BLS public key
    Bls([u8; BLS_PUBLIC_KEY_LENGTH]),
    /// Address managed by the actor `namespace`
    Delegated { namespace: u64, subaddress: Vec<u8> },
}

/// A decoded Filecoin address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub network: Network,
    pub payload: Payload,
}

impl Address {
    // ============================================================================
    // Constructors
    // ============================================================================

    pub fn new_id(network: Network, id: u64) -> Result<Self, AddressError> {
        if id > MAX_ACTOR_ID {
            return Err(AddressError::InvalidId(id.to_string()));
        }
        Ok(Self {
            network,
            payload: Payload::Id(id),
        })
    }

    pub fn new_secp256k1(network: Network, hash: [u8; PAYLOAD_HASH_LENGTH]) -> Self {
        Self {
            network,
            payload: Payload::Secp256k1(hash),
        }
    }

    pub fn new_actor(network: Network, hash: [u8; PAYLOAD_HASH_LENGTH]) -> Self {
        Self {
            network,
            payload: Payload::Actor(hash),
        }
    }

    pub fn new_bls(network: Network, key: [u8; BLS_PUBLIC_KEY_LENGTH]) -> Self {
        Self {
            network,
            payload: Payload::Bls(key),
        }
    }

    pub fn new_delegated(
        network: Network,
        namespace: u64,
        subaddress: &[u8],
    ) -> Result<Self, AddressError> {
        if namespace > MAX_ACTOR_ID {
            return Err(AddressError::InvalidId(namespace.to_string()));
        }
        if subaddress.len() > MAX_SUBADDRESS_LENGTH {
            return Err(AddressError::SubaddressTooLong(subaddress.len()));
        }
        Ok(Self {
            network,
            payload: Payload::Delegated {
                namespace,
                subaddress: subaddress.to_vec(),
            },
        })
    }

    /// Derive the secp256k1 address of an uncompressed (65-byte) public key
    pub fn from_secp256k1_public_key(
        network: Network,
        public_key: &[u8],
    ) -> Result<Self, AddressError> {
        if public_key.len() != 65 || public_key[0] != 0x04 {
            return Err(AddressError::InvalidPublicKey(format!(
                "expected 65-byte uncompressed secp256k1 key, got {} bytes",
                public_key.len()
            )));
        }
        Ok(Self::new_secp256k1(network, address_hash(public_key)))
    }

    pub fn from_bls_public_key(network: Network, public_key: &[u8]) -> Result<Self, AddressError> {
        let key: [u8; BLS_PUBLIC_KEY_LENGTH] = public_key.try_into().map_err(|_| {
            AddressError::InvalidPublicKey(format!(
                "expected {}-byte BLS key, got {} bytes",
                BLS_PUBLIC_KEY_LENGTH,
                public_key.len()
            ))
        })?;
        Ok(Self::new_bls(network, key))
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn protocol(&self) -> Protocol {
        match self.payload {
            Payload::Id(_) => Protocol::Id,
            Payload::Secp256k1(_) => Protocol::Secp256k1,
            Payload::Actor(_) => Protocol::Actor,
            Payload::Bls(_) => Protocol::Bls,
            Payload::Delegated { .. } => Protocol::Delegated,
        }
    }

    /// Payload bytes without the protocol prefix
    pub fn payload_bytes(&self) -> Vec<u8> {
        match &self.payload {
            Payload::Id(id) => encode_leb128(*id),
            Payload::Secp256k1(hash) | Payload::Actor(hash) => hash.to_vec(),
            Payload::Bls(key) => key.to_vec(),
            Payload::Delegated {
                namespace,
                subaddress,
            } => {
                let mut bytes = encode_leb128(*namespace);
                bytes.extend_from_slice(subaddress);
                bytes
            }
        }
    }

    // ============================================================================
    // Binary Serialization
    // ============================================================================

    /// Binary form: `protocol || payload`
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload = self.payload_bytes();
        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(self.protocol().as_byte());
        bytes.extend_from_slice(&payload);
        bytes
    }

    /// Parse the binary form. The network is not part of the bytes.
    pub fn from_bytes(network: Network, bytes: &[u8]) -> Result<Self, AddressError> {
        let (&first, payload) = bytes.split_first().ok_or(AddressError::EmptyBytes)?;
        let protocol = Protocol::from_byte(first)
            .ok_or_else(|| AddressError::UnknownProtocol(first.to_string()))?;

        match protocol {
            Protocol::Id => {
                let (id, used) = decode_leb128(payload)?;
                if used != payload.len() {
                    return Err(AddressError::InvalidLeb128);
                }
                Self::new_id(network, id)
            }
            Protocol::Secp256k1 => Ok(Self::new_secp256k1(
                network,
                fixed_payload(protocol, payload)?,
            )),
            Protocol::Actor => Ok(Self::new_actor(network, fixed_payload(protocol, payload)?)),
            Protocol::Bls => Ok(Self::new_bls(network, fixed_payload(protocol, payload)?)),
            Protocol::Delegated => {
                let (namespace, used) = decode_leb128(payload)?;
                Self::new_delegated(network, namespace, &payload[used..])
            }
        }
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    pub fn checksum(&self) -> [u8; CHECKSUM_LENGTH] {
        checksum(&self.to_bytes())
    }

    pub fn explorer_link(&self) -> String {
        format!("{}/{}", EXPLORER_ADDRESS_URL, self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.network.prefix(),
            self.protocol().as_byte()
        )?;
        match &self.payload {
            Payload::Id(id) => write!(f, "{}", id),
            Payload::Delegated {
                namespace,
                subaddress,
            } => {
                let mut body = subaddress.clone();
                body.extend_from_slice(&self.checksum());
                write!(f, "{}f{}", namespace, encode_base32(&body))
            }
            _ => {
                let mut body = self.payload_bytes();
                body.extend_from_slice(&self.checksum());
                write!(f, "{}", encode_base32(&body))
            }
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_address(s)
    }
}

// ============================================================================
// String Decoding
// ============================================================================

/// Decode a textual Filecoin address
pub fn decode_address(addr: &str) -> Result<Address, AddressError> {
    let len = addr.len();
    if len < 3 {
        return Err(AddressError::TooShort { len });
    }

    let mut chars = addr.chars();
    let network_char = chars.next().ok_or(AddressError::TooShort { len })?;
    let network =
        Network::from_prefix(network_char).ok_or(AddressError::UnknownNetwork(network_char))?;

    let protocol_char = chars.next().ok_or(AddressError::TooShort { len })?;
    let protocol = Protocol::from_digit(protocol_char)
        .ok_or_else(|| AddressError::UnknownProtocol(protocol_char.to_string()))?;

    let max = match protocol {
        Protocol::Delegated => MAX_DELEGATED_STRING_LENGTH,
        _ => MAX_ADDRESS_STRING_LENGTH,
    };
    if len > max {
        return Err(AddressError::TooLong { len, max });
    }

    // Both prefix chars are ASCII at this point
    let body = &addr[2..];

    match protocol {
        Protocol::Id => Address::new_id(network, parse_actor_id(body)?),
        Protocol::Secp256k1 | Protocol::Actor | Protocol::Bls => {
            let decoded = decode_base32(body)?;
            let expected = protocol.payload_length().unwrap_or(PAYLOAD_HASH_LENGTH);
            if decoded.len() != expected + CHECKSUM_LENGTH {
                return Err(AddressError::InvalidPayloadLength {
                    protocol,
                    expected,
                    actual: decoded.len().saturating_sub(CHECKSUM_LENGTH),
                });
            }
            let (payload, sum) = decoded.split_at(expected);
            let address = match protocol {
                Protocol::Secp256k1 => {
                    Address::new_secp256k1(network, fixed_payload(protocol, payload)?)
                }
                Protocol::Actor => Address::new_actor(network, fixed_payload(protocol, payload)?),
                _ => Address::new_bls(network, fixed_payload(protocol, payload)?),
            };
            verify_checksum(&address, sum)?;
            Ok(address)
        }
        Protocol::Delegated => {
            let (namespace, encoded) = body
                .split_once('f')
                .ok_or_else(|| AddressError::InvalidId(body.to_string()))?;
            let namespace = parse_actor_id(namespace)?;
            let decoded = decode_base32(encoded)?;
            if decoded.len() < CHECKSUM_LENGTH {
                return Err(AddressError::InvalidPayloadLength {
                    protocol,
                    expected: CHECKSUM_LENGTH,
                    actual: decoded.len(),
                });
            }
            let (subaddress, sum) = decoded.split_at(decoded.len() - CHECKSUM_LENGTH);
            let address = Address::new_delegated(network, namespace, subaddress)?;
            verify_checksum(&address, sum)?;
            Ok(address)
        }
    }
}

/// Decode a textual address straight to its binary form
pub fn address_to_bytes(addr: &str) -> Result<Vec<u8>, AddressError> {
    decode_address(addr).map(|a| a.to_bytes())
}

/// Encode bytes as a textual address.
///
/// Accepts either a bare 20-byte secp256k1 hash or a full binary address.
pub fn bytes_to_address(network: Network, bytes: &[u8]) -> Result<String, AddressError> {
    let address = match <[u8; PAYLOAD_HASH_LENGTH]>::try_from(bytes) {
        Ok(hash) => Address::new_secp256k1(network, hash),
        Err(_) => Address::from_bytes(network, bytes)?,
    };
    Ok(address.to_string())
}

pub fn validate_address_string(addr: &str) -> bool {
    decode_address(addr).is_ok()
}

// ============================================================================
// Hashing
// ============================================================================

/// blake2b-160 digest used for secp256k1 and actor payloads
pub fn address_hash(data: &[u8]) -> [u8; PAYLOAD_HASH_LENGTH] {
    let hash = blake2b_simd::Params::new()
        .hash_length(PAYLOAD_HASH_LENGTH)
        .hash(data);
    let mut result = [0u8; PAYLOAD_HASH_LENGTH];
    result.copy_from_slice(hash.as_bytes());
    result
}

/// 4-byte blake2b checksum over the binary address
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let hash = blake2b_simd::Params::new()
        .hash_length(CHECKSUM_LENGTH)
        .hash(data);
    let mut result = [0u8; CHECKSUM_LENGTH];
    result.copy_from_slice(hash.as_bytes());
    result
}

fn verify_checksum(address: &Address, actual: &[u8]) -> Result<(), AddressError> {
    let expected = address.checksum();
    if expected.as_slice() != actual {
        return Err(AddressError::ChecksumMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        });
    }
    Ok(())
}

// ============================================================================
// Encoding Helpers
// ============================================================================

fn fixed_payload<const N: usize>(protocol: Protocol, bytes: &[u8]) -> Result<[u8; N], AddressError> {
    bytes
        .try_into()
        .map_err(|_| AddressError::InvalidPayloadLength {
            protocol,
            expected: N,
            actual: bytes.len(),
        })
}

fn parse_actor_id(digits: &str) -> Result<u64, AddressError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::InvalidId(digits.to_string()));
    }
    let id: u64 = digits
        .parse()
        .map_err(|_| AddressError::InvalidId(digits.to_string()))?;
    if id > MAX_ACTOR_ID {
        return Err(AddressError::InvalidId(digits.to_string()));
    }
    Ok(id)
}

/// Lowercase unpadded base32; bit regrouping goes through bech32's u5
fn encode_base32(bytes: &[u8]) -> String {
    bytes
        .to_base32()
        .into_iter()
        .map(|v| BASE32_ALPHABET[v.to_u8() as usize] as char)
        .collect()
}

fn decode_base32(s: &str) -> Result<Vec<u8>, AddressError> {
    let groups = s
        .chars()
        .map(|c| {
            let index = BASE32_ALPHABET
                .iter()
                .position(|&a| a as char == c)
                .ok_or(AddressError::InvalidCharacter(c))?;
            u5::try_from_u8(index as u8).map_err(|_| AddressError::InvalidCharacter(c))
        })
        .collect::<Result<Vec<u5>, _>>()?;

    Vec::<u8>::from_base32(&groups).map_err(|_| AddressError::InvalidPadding)
}

fn encode_leb128(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Returns the value and the number of bytes consumed
fn decode_leb128(bytes: &[u8]) -> Result<(u64, usize), AddressError> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate().take(10) {
        let chunk = u64::from(byte & 0x7f);
        if i == 9 && chunk > 1 {
            return Err(AddressError::InvalidLeb128);
        }
        value |= chunk << (7 * i);
        if byte & 0x80 == 0 {
            // Reject non-minimal encodings such as 0x80 0x00
            if i > 0 && byte == 0 {
                return Err(AddressError::InvalidLeb128);
            }
            return Ok((value, i + 1));
        }
    }
    Err(AddressError::InvalidLeb128)
}
