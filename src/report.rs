//! Decode-and-report
//!
//! Decodes one address through an [`AddressDecoder`] and writes a single line
//! describing the raw bytes. Nothing is written when decoding fails.

use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::address_codec::{decode_address, Address};
use crate::error::AddressError;
use crate::types::Network;

/// Testnet secp256k1 address decoded when no input is given
pub const REFERENCE_ADDRESS: &str = "t1zl3sj2t7eazaojiqytccq4zlwosjxixsnf4rhyy";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Decode failure: {0}")]
    Decode(#[from] AddressError),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Decoder Seam
// ============================================================================

/// Turns a human-readable address into its raw bytes
pub trait AddressDecoder {
    fn decode(&self, address: &str) -> Result<Vec<u8>, AddressError>;
}

/// Filecoin address decoder, optionally pinned to one network
#[derive(Debug, Clone, Copy, Default)]
pub struct FilecoinDecoder {
    pub expected_network: Option<Network>,
}

impl FilecoinDecoder {
    pub fn new(expected_network: Option<Network>) -> Self {
        Self { expected_network }
    }

    /// Decode to the structured form, enforcing the expected network
    pub fn decode_address(&self, address: &str) -> Result<Address, AddressError> {
        let decoded = decode_address(address)?;
        if let Some(expected) = self.expected_network {
            if decoded.network != expected {
                return Err(AddressError::NetworkMismatch {
                    expected,
                    actual: decoded.network,
                });
            }
        }
        Ok(decoded)
    }
}

impl AddressDecoder for FilecoinDecoder {
    fn decode(&self, address: &str) -> Result<Vec<u8>, AddressError> {
        let decoded = self.decode_address(address)?;
        debug!(
            address = %address,
            network = %decoded.network,
            protocol = %decoded.protocol(),
            explorer = %decoded.explorer_link(),
            "Decoded address"
        );
        Ok(decoded.to_bytes())
    }
}

// ============================================================================
// Output Format
// ============================================================================

/// How decoded bytes are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `01caf724...`
    #[default]
    Hex,
    /// `[1, 202, 247, ...]`
    Bytes,
    /// `{"address":"t1...","length":21,"bytes":"01ca..."}`
    Json,
}

impl FromStr for OutputFormat {
    type Err = eyre::Report;

    fn from_str(s: &str) -> eyre::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(OutputFormat::Hex),
            "bytes" | "array" => Ok(OutputFormat::Bytes),
            "json" => Ok(OutputFormat::Json),
            other => Err(eyre::eyre!("Unknown output format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Hex => write!(f, "hex"),
            OutputFormat::Bytes => write!(f, "bytes"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    address: &'a str,
    length: usize,
    bytes: String,
}

fn format_line(address: &str, bytes: &[u8], format: OutputFormat) -> Result<String, ReportError> {
    Ok(match format {
        OutputFormat::Hex => hex::encode(bytes),
        OutputFormat::Bytes => format!("{:?}", bytes),
        OutputFormat::Json => serde_json::to_string(&JsonReport {
            address,
            length: bytes.len(),
            bytes: hex::encode(bytes),
        })?,
    })
}

// ============================================================================
// Decode and Report
// ============================================================================

/// Decode `address` and write one line of output on success.
///
/// Returns the decoded bytes. On failure the error is returned before
/// anything reaches `out`.
pub fn decode_and_report<D, W>(
    decoder: &D,
    address: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<Vec<u8>, ReportError>
where
    D: AddressDecoder + ?Sized,
    W: Write + ?Sized,
{
    let bytes = decoder.decode(address).map_err(|e| {
        debug!(address = %address, error = %e, "Address rejected");
        e
    })?;

    let line = format_line(address, &bytes, format)?;
    writeln!(out, "{}", line)?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectAll;

    impl AddressDecoder for RejectAll {
        fn decode(&self, _address: &str) -> Result<Vec<u8>, AddressError> {
            Err(AddressError::EmptyBytes)
        }
    }

    #[test]
    fn test_reference_hex() {
        let mut out = Vec::new();
        let bytes = decode_and_report(
            &FilecoinDecoder::default(),
            REFERENCE_ADDRESS,
            OutputFormat::Hex,
            &mut out,
        )
        .unwrap();

        assert_eq!(bytes.len(), 21);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "01caf724ea7f2032072510c4c428732bb3a49ba2f2\n"
        );
    }

    #[test]
    fn test_bytes_format() {
        let mut out = Vec::new();
        decode_and_report(
            &FilecoinDecoder::default(),
            "f01234",
            OutputFormat::Bytes,
            &mut out,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[0, 210, 9]\n");
    }

    #[test]
    fn test_json_format() {
        let mut out = Vec::new();
        decode_and_report(
            &FilecoinDecoder::default(),
            REFERENCE_ADDRESS,
            OutputFormat::Json,
            &mut out,
        )
        .unwrap();

        let line = String::from_utf8(out).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["address"], REFERENCE_ADDRESS);
        assert_eq!(value["length"].as_u64(), Some(21));
        assert_eq!(value["bytes"], "01caf724ea7f2032072510c4c428732bb3a49ba2f2");
    }

    #[test]
    fn test_failure_writes_nothing() {
        let mut out = Vec::new();
        let result = decode_and_report(&RejectAll, REFERENCE_ADDRESS, OutputFormat::Hex, &mut out);

        assert!(matches!(result, Err(ReportError::Decode(AddressError::EmptyBytes))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_expected_network() {
        let decoder = FilecoinDecoder::new(Some(Network::Mainnet));
        let mut out = Vec::new();
        let result = decode_and_report(&decoder, REFERENCE_ADDRESS, OutputFormat::Hex, &mut out);

        assert!(matches!(
            result,
            Err(ReportError::Decode(AddressError::NetworkMismatch {
                expected: Network::Mainnet,
                actual: Network::Testnet,
            }))
        ));
        assert!(out.is_empty());

        let testnet = FilecoinDecoder::new(Some(Network::Testnet));
        assert!(testnet.decode(REFERENCE_ADDRESS).is_ok());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("hex".parse::<OutputFormat>().unwrap(), OutputFormat::Hex);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("array".parse::<OutputFormat>().unwrap(), OutputFormat::Bytes);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
