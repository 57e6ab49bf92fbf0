//! Filecoin Address CLI
//!
//! Decodes human-readable Filecoin addresses and prints their raw bytes.
//!
//! - `filecoin-addr`                      -> decode the reference testnet address
//! - `filecoin-addr decode <ADDRESS>...`  -> decode each address, stop at the first failure
//! - `filecoin-addr encode <HEX>`         -> bytes to address string
//! - `filecoin-addr validate <ADDRESS>`   -> print `true`/`false`

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use std::io::Write;
use tracing::{debug, info};

use filecoin_addr::config::Config;
use filecoin_addr::{
    bytes_to_address, decode_and_report, validate_address_string, FilecoinDecoder, Network,
    OutputFormat, REFERENCE_ADDRESS,
};

#[derive(Parser)]
#[command(name = "filecoin-addr")]
#[command(about = "Decode Filecoin addresses to raw bytes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Expected network (mainnet, testnet, devnet, f, t). Overrides FIL_NETWORK
    #[arg(short, long, global = true)]
    network: Option<String>,

    /// Output format (hex, bytes, json). Overrides FIL_OUTPUT_FORMAT
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode addresses and print their raw bytes
    Decode {
        /// Addresses to decode (defaults to the reference testnet address)
        addresses: Vec<String>,
    },

    /// Encode raw address bytes (hex) as an address string
    ///
    /// Accepts a bare 20-byte secp256k1 hash or a full protocol-prefixed address.
    Encode {
        /// Hex bytes, with or without 0x prefix
        bytes: String,
    },

    /// Check whether an address string is valid
    Validate {
        /// Address string to check
        address: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let network = cli.network.as_deref().map(Network::resolve).transpose()?;
    let format = cli
        .format
        .as_deref()
        .map(str::parse::<OutputFormat>)
        .transpose()?;
    let config = Config::load()?.with_overrides(network, format);
    debug!(
        network = ?config.expected_network,
        format = %config.output_format,
        "Configuration loaded"
    );

    let command = cli.command.unwrap_or(Commands::Decode {
        addresses: Vec::new(),
    });

    match command {
        Commands::Decode { addresses } => decode(&config, addresses),
        Commands::Encode { bytes } => {
            let address = encode_hex(&bytes, config.expected_network)?;
            println!("{}", address);
            Ok(())
        }
        Commands::Validate { address } => {
            let stdout = std::io::stdout();
            let valid = validate(&address, &mut stdout.lock())?;
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn decode(config: &Config, addresses: Vec<String>) -> Result<()> {
    let addresses = if addresses.is_empty() {
        vec![REFERENCE_ADDRESS.to_string()]
    } else {
        addresses
    };

    let decoder = FilecoinDecoder::new(config.expected_network);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for address in &addresses {
        decode_and_report(&decoder, address, config.output_format, &mut out)?;
    }
    out.flush()?;

    info!(count = addresses.len(), "Decoded addresses");
    Ok(())
}

/// Hex bytes (optionally 0x-prefixed) to an address string, mainnet unless told otherwise
fn encode_hex(bytes: &str, network: Option<Network>) -> Result<String> {
    let raw = hex::decode(bytes.trim().trim_start_matches("0x"))
        .map_err(|e| eyre!("Invalid hex bytes: {}", e))?;
    let network = network.unwrap_or(Network::Mainnet);
    Ok(bytes_to_address(network, &raw)?)
}

/// Writes `true`/`false` and returns the verdict
fn validate<W: Write>(address: &str, out: &mut W) -> Result<bool> {
    let valid = validate_address_string(address);
    writeln!(out, "{}", valid)?;
    Ok(valid)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "info,filecoin_addr=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_HEX: &str = "01caf724ea7f2032072510c4c428732bb3a49ba2f2";

    #[test]
    fn test_encode_full_address_hex() {
        let encoded = encode_hex(REFERENCE_HEX, Some(Network::Testnet)).unwrap();
        assert_eq!(encoded, REFERENCE_ADDRESS);

        let prefixed = encode_hex(&format!("0x{}", REFERENCE_HEX), Some(Network::Testnet)).unwrap();
        assert_eq!(prefixed, REFERENCE_ADDRESS);
    }

    #[test]
    fn test_encode_bare_hash_defaults_to_mainnet() {
        let encoded = encode_hex(&REFERENCE_HEX[2..], None).unwrap();
        assert_eq!(encoded, "f1zl3sj2t7eazaojiqytccq4zlwosjxixsnf4rhyy");
    }

    #[test]
    fn test_encode_invalid_hex() {
        assert!(encode_hex("0xzz", None).is_err());
        assert!(encode_hex("abc", None).is_err());
        // Valid hex, but not an address
        assert!(encode_hex("09", None).is_err());
    }

    #[test]
    fn test_validate_output() {
        let mut out = Vec::new();
        assert!(validate(REFERENCE_ADDRESS, &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "true\n");

        let mut out = Vec::new();
        assert!(!validate("t1notanaddress", &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "false\n");
    }
}
