//! `lfvm run`: execute bytecode against a fresh in-memory ledger

use clap::Args;
use lfvm_interpreter::{BlockContext, Evm, ExecutionResult, Revision, TxContext};
use lfvm_primitives::{Address, U256};
use lfvm_state::{Account, MemoryStateDb, StateDb, TracingStateDb};
use serde_json::Value;
use tracing::info;

use super::parse_hex;
use crate::{config::Config, output::Output, CliError};

/// Account the transaction is sent from
pub const SENDER: Address = Address::from_bytes([0xca; 20]);
/// Account holding the code for a call
pub const CONTRACT: Address = Address::from_bytes([0xc0; 20]);

/// Arguments of `lfvm run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Bytecode to execute (hex)
    #[arg(long)]
    pub code: String,
    /// Call data (hex)
    #[arg(long, default_value = "")]
    pub input: String,
    /// Gas limit, defaults to the configured one
    #[arg(long)]
    pub gas: Option<u64>,
    /// Value sent along, in wei
    #[arg(long, default_value_t = 0)]
    pub value: u64,
    /// Protocol revision (istanbul, berlin, london, shanghai)
    #[arg(long)]
    pub revision: Option<Revision>,
    /// Decode without super-instructions
    #[arg(long)]
    pub no_fusion: bool,
    /// Run the code as init code of a contract creation
    #[arg(long)]
    pub create: bool,
    /// Emit a trace event for every ledger access
    #[arg(long)]
    pub trace_ledger: bool,
}

struct Request {
    code: Vec<u8>,
    input: Vec<u8>,
    gas: u64,
    value: U256,
    create: bool,
    trace_ledger: bool,
}

struct Report {
    result: ExecutionResult,
    logs: usize,
}

impl RunArgs {
    /// Execute and print the report
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let mut evm_config = config.interpreter();
        if let Some(revision) = self.revision {
            evm_config.revision = revision;
        }
        if self.no_fusion {
            evm_config.fusion = false;
        }
        let request = Request {
            code: parse_hex(&self.code)?,
            input: parse_hex(&self.input)?,
            gas: self.gas.unwrap_or(config.gas_limit),
            value: U256::from(self.value),
            create: self.create,
            trace_ledger: self.trace_ledger,
        };

        let report = run(request, evm_config);
        print_report(&report, json);
        Ok(())
    }
}

fn run(request: Request, config: lfvm_interpreter::Config) -> Report {
    let mut state = MemoryStateDb::new();
    state.insert_account(SENDER, Account::with_balance(request.value));
    if !request.create {
        state.insert_account(CONTRACT, Account::with_code(request.code.clone()));
    }
    info!(
        revision = %config.revision,
        fusion = config.fusion,
        gas = request.gas,
        create = request.create,
        "executing"
    );

    if request.trace_ledger {
        let mut traced = TracingStateDb::new(state);
        let result = transact(&mut traced, &request, config);
        Report {
            result,
            logs: traced.inner().logs().len(),
        }
    } else {
        let result = transact(&mut state, &request, config);
        Report {
            result,
            logs: state.logs().len(),
        }
    }
}

fn transact<S: StateDb>(state: &mut S, request: &Request, config: lfvm_interpreter::Config) -> ExecutionResult {
    let block = BlockContext::default();
    let tx = TxContext {
        origin: SENDER,
        gas_price: U256::zero(),
    };
    let mut evm = Evm::new(state, &block, &tx, config);
    if request.create {
        evm.transact_create(SENDER, request.code.clone(), request.gas, request.value)
    } else {
        evm.transact_call(SENDER, CONTRACT, request.value, request.input.clone(), request.gas)
    }
}

fn print_report(report: &Report, json: bool) {
    let result = &report.result;
    let output_hex = format!("0x{}", hex::encode(&result.output));
    let created = result
        .created_address
        .map(|a| Value::String(a.to_hex()))
        .unwrap_or(Value::Null);

    let mut out = Output::new(json)
        .field("status", &result.status.to_string())
        .field_bool("success", result.is_success())
        .field_u64("gas_used", result.gas_used)
        .field_u64("gas_left", result.gas_left)
        .field_u64("refund", result.refund)
        .field_hex("output", &result.output)
        .field_u64("logs", report.logs as u64)
        .field_value("created", created)
        .line(format!("status:   {}", result.status))
        .line(format!("gas used: {}", result.gas_used))
        .line(format!("gas left: {}", result.gas_left))
        .line(format!("refund:   {}", result.refund))
        .line(format!("output:   {}", output_hex))
        .line(format!("logs:     {}", report.logs));
    if let Some(address) = result.created_address {
        out = out.line(format!("created:  {}", address));
    }
    out.print();
}
