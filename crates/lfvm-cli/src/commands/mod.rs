//! Subcommand implementations

pub mod dict;
pub mod disasm;
pub mod run;

use lfvm_primitives::Address;

use crate::CliError;

/// Decode a hex argument, with or without `0x` prefix
pub fn parse_hex(s: &str) -> Result<Vec<u8>, CliError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| CliError::InvalidHex(format!("{}: {}", s, e)))
}

/// Parse a 20-byte account address
pub fn parse_address(s: &str) -> Result<Address, CliError> {
    Address::from_hex(s.trim()).map_err(|e| CliError::InvalidAddress(format!("{}: {}", s, e)))
}
