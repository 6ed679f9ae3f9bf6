//! `lfvm dict`: manage a contract address dictionary file

use clap::{Args, Subcommand};
use lfvm_state::ContractDictionary;
use serde_json::Value;
use std::path::PathBuf;

use super::parse_address;
use crate::{config::Config, output::Output, CliError};

/// Arguments of `lfvm dict`
#[derive(Debug, Args)]
pub struct DictArgs {
    /// Dictionary file, defaults to the configured one
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: DictCommand,
}

/// Dictionary subcommands
#[derive(Debug, Subcommand)]
pub enum DictCommand {
    /// Assign indices to addresses and save the file
    Add {
        /// Addresses to add (hex)
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Look up the address stored at an index
    Get {
        /// Index to decode
        index: u32,
    },
    /// Look up the index of an address
    Index {
        /// Address to encode (hex)
        address: String,
    },
    /// List all entries
    List,
}

impl DictArgs {
    /// Load the file, run the subcommand, save if it changed
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let path = self
            .file
            .or_else(|| config.dictionary.clone())
            .ok_or_else(|| CliError::InvalidInput("no dictionary file given, use --file".to_string()))?;
        let dict = ContractDictionary::new();
        dict.read(&path)?;

        match self.command {
            DictCommand::Add { addresses } => {
                let mut out = Output::new(json);
                let mut assigned = Vec::with_capacity(addresses.len());
                for raw in &addresses {
                    let address = parse_address(raw)?;
                    let index = dict.encode(&address)?;
                    out = out.line(format!("{} {}", index, address));
                    assigned.push(serde_json::json!({ "index": index, "address": address.to_hex() }));
                }
                dict.write(&path)?;
                out.field_value("assigned", Value::Array(assigned))
                    .field_u64("entries", dict.len() as u64)
                    .print();
            }
            DictCommand::Get { index } => {
                let address = dict.decode(index)?;
                Output::new(json)
                    .field_u64("index", index as u64)
                    .field("address", &address.to_hex())
                    .line(address.to_hex())
                    .print();
            }
            DictCommand::Index { address } => {
                let address = parse_address(&address)?;
                let index = dict
                    .addresses()
                    .iter()
                    .position(|a| *a == address)
                    .ok_or_else(|| CliError::InvalidInput(format!("{} is not in the dictionary", address)))?;
                Output::new(json)
                    .field_u64("index", index as u64)
                    .field("address", &address.to_hex())
                    .line(index.to_string())
                    .print();
            }
            DictCommand::List => {
                let addresses = dict.addresses();
                let mut out = Output::new(json).field_u64("entries", addresses.len() as u64).field_value(
                    "addresses",
                    Value::Array(addresses.iter().map(|a| Value::String(a.to_hex())).collect()),
                );
                for (index, address) in addresses.iter().enumerate() {
                    out = out.line(format!("{} {}", index, address));
                }
                out.print();
            }
        }
        Ok(())
    }
}
