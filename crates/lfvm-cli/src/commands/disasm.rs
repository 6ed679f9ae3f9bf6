//! `lfvm disasm`: show the decoded instruction stream

use clap::Args;
use lfvm_interpreter::{Code, Instruction};
use serde_json::{json, Value};

use super::parse_hex;
use crate::{config::Config, output::Output, CliError};

/// Arguments of `lfvm disasm`
#[derive(Debug, Args)]
pub struct DisasmArgs {
    /// Bytecode to decode (hex)
    #[arg(long)]
    pub code: String,
    /// Decode without super-instructions
    #[arg(long)]
    pub no_fusion: bool,
}

impl DisasmArgs {
    /// Decode and print one instruction per line
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let fusion = config.fusion && !self.no_fusion;
        let code = Code::decode(parse_hex(&self.code)?, fusion);
        let fused = code.instructions().iter().filter(|ins| ins.op.is_fused()).count();

        let mut out = Output::new(json)
            .field_u64("bytes", code.bytes().len() as u64)
            .field_u64("instructions", code.len() as u64)
            .field_u64("fused", fused as u64)
            .field_value(
                "program",
                Value::Array(code.instructions().iter().map(to_json).collect()),
            );
        for ins in code.instructions() {
            out = out.line(ins.to_string());
        }
        out.print();
        Ok(())
    }
}

fn to_json(ins: &Instruction) -> Value {
    json!({
        "pc": ins.pc,
        "op": ins.op.to_string(),
        "gas": ins.gas,
        "arg": format!("0x{:x}", ins.arg),
    })
}
