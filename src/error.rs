use thiserror::Error;

use crate::types::{Network, Protocol};

/// Reasons an address string or byte sequence fails to decode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address too short: {len} chars")]
    TooShort { len: usize },

    #[error("Address too long: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("Unknown network prefix: {0:?}")]
    UnknownNetwork(char),

    #[error("Unknown address protocol: {0}")]
    UnknownProtocol(String),

    #[error("Invalid actor ID: {0}")]
    InvalidId(String),

    #[error("Invalid base32 character: {0:?}")]
    InvalidCharacter(char),

    #[error("Invalid base32 padding")]
    InvalidPadding,

    #[error("Invalid {protocol} payload length: expected {expected} bytes, got {actual}")]
    InvalidPayloadLength {
        protocol: Protocol,
        expected: usize,
        actual: usize,
    },

    #[error("Delegated sub-address too long: {0} bytes")]
    SubaddressTooLong(usize),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Network mismatch: expected {expected}, got {actual}")]
    NetworkMismatch { expected: Network, actual: Network },

    #[error("Empty address bytes")]
    EmptyBytes,

    #[error("Invalid LEB128 varint")]
    InvalidLeb128,

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}
