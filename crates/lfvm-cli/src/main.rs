//! # lfvm-cli
//!
//! Command-line front end for the LFVM interpreter.
//!
//! ## Usage
//!
//! ```bash
//! # Execute bytecode against a fresh ledger
//! lfvm run --code 0x600160020160005260206000f3
//! lfvm run --code 0x... --input 0x... --gas 100000 --value 5 --no-fusion
//!
//! # Show the decoded (and fused) program
//! lfvm disasm --code 0x...
//!
//! # Contract address dictionary files
//! lfvm dict --file contracts.dict add 0x1111111111111111111111111111111111111111
//! lfvm dict --file contracts.dict get 0
//! lfvm dict --file contracts.dict list
//!
//! # Configuration
//! lfvm config --show
//! ```

use clap::{Parser, Subcommand};
use lfvm_interpreter::Revision;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// LFVM interpreter CLI
#[derive(Parser, Debug)]
#[command(name = "lfvm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Configuration file, defaults to ~/.lfvm/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute bytecode
    Run(commands::run::RunArgs),
    /// Print the decoded program
    Disasm(commands::disasm::DisasmArgs),
    /// Manage a contract address dictionary file
    Dict(commands::dict::DictArgs),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the protocol revision
        #[arg(long)]
        set_revision: Option<Revision>,
        /// Set the default gas limit
        #[arg(long)]
        set_gas_limit: Option<u64>,
        /// Set the default dictionary file
        #[arg(long)]
        set_dictionary: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = Config::load(cli.config.as_deref()).and_then(|mut config| match cli.command {
        Commands::Run(args) => args.execute(&config, cli.json),
        Commands::Disasm(args) => args.execute(&config, cli.json),
        Commands::Dict(args) => args.execute(&config, cli.json),
        Commands::Config {
            show,
            set_revision,
            set_gas_limit,
            set_dictionary,
        } => handle_config(
            &mut config,
            cli.config.as_deref(),
            ConfigEdits {
                show,
                revision: set_revision,
                gas_limit: set_gas_limit,
                dictionary: set_dictionary,
            },
            cli.json,
        ),
    });

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

struct ConfigEdits {
    show: bool,
    revision: Option<Revision>,
    gas_limit: Option<u64>,
    dictionary: Option<PathBuf>,
}

fn handle_config(config: &mut Config, path: Option<&Path>, edits: ConfigEdits, json: bool) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(revision) = edits.revision {
        config.revision = revision;
        modified = true;
    }
    if let Some(gas_limit) = edits.gas_limit {
        config.gas_limit = gas_limit;
        modified = true;
    }
    if let Some(dictionary) = edits.dictionary {
        config.dictionary = Some(dictionary);
        modified = true;
    }

    if modified {
        let saved = config.save(path)?;
        Output::new(json)
            .field("status", "saved")
            .field("path", &saved.display().to_string())
            .line(format!("Configuration saved to {}", saved.display()))
            .print();
    } else if edits.show {
        let dictionary = config
            .dictionary
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        Output::new(json)
            .field("revision", &config.revision.to_string())
            .field_u64("gas_limit", config.gas_limit)
            .field_bool("fusion", config.fusion)
            .field_bool("all_but_one_64th", config.all_but_one_64th)
            .field_u64("max_call_depth", config.max_call_depth as u64)
            .field("dictionary", &dictionary)
            .line(format!("Revision:       {}", config.revision))
            .line(format!("Gas limit:      {}", config.gas_limit))
            .line(format!("Fusion:         {}", config.fusion))
            .line(format!("1/64 retention: {}", config.all_but_one_64th))
            .line(format!("Max call depth: {}", config.max_call_depth))
            .line(format!("Dictionary:     {}", dictionary))
            .print();
    } else {
        Output::new(json)
            .line("Use --show to display config, or --set-revision/--set-gas-limit/--set-dictionary to modify")
            .print();
    }

    Ok(())
}
