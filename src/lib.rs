//! filecoin-addr: Filecoin Address Codec
//!
//! Decodes human-readable Filecoin addresses (`f1...`, `t1...`) into the raw
//! bytes used in protocol messages, and reports them.
//!
//! - **Address Codec** - String and binary encoding for all five address protocols
//! - **Report** - Decode-and-report routine over a pluggable [`AddressDecoder`]
//! - **Config** - Environment configuration for the CLI
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! filecoin-addr = { path = "../filecoin-addr" }
//! ```

pub mod address_codec;
pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use address_codec::{
    address_to_bytes, bytes_to_address, decode_address, validate_address_string, Address,
    Payload,
};
pub use error::AddressError;
pub use report::{
    decode_and_report, AddressDecoder, FilecoinDecoder, OutputFormat, ReportError,
    REFERENCE_ADDRESS,
};
pub use types::{Network, Protocol};
