//! # lfvm-interpreter
//!
//! EVM bytecode interpreter with super-instruction fusion.
//!
//! This crate provides:
//! - Decoding of bytecode into instructions, optionally fusing common
//!   opcode sequences ([`Code`], [`Op`])
//! - The per-frame dispatch loop ([`Interpreter`])
//! - The call/create dispatcher shared by all frames ([`Evm`])
//! - Gas schedule and metering for Istanbul through Shanghai
//!
//! All ledger access goes through [`lfvm_state::StateDb`].
//!
//! ```no_run
//! use lfvm_interpreter::{BlockContext, Config, Evm, TxContext};
//! use lfvm_primitives::{Address, U256};
//! use lfvm_state::MemoryStateDb;
//!
//! let mut state = MemoryStateDb::new();
//! let block = BlockContext::default();
//! let tx = TxContext::default();
//! let mut evm = Evm::new(&mut state, &block, &tx, Config::default());
//! let result = evm.transact_call(Address::ZERO, Address::ZERO, U256::zero(), vec![], 100_000);
//! assert!(result.is_success());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod code;
mod config;
mod context;
mod error;
mod evm;
pub mod gas;
mod instructions;
mod interpreter;
mod memory;
mod opcode;
mod stack;
pub mod word;

pub use code::{Code, Instruction};
pub use config::{Config, Revision};
pub use context::{BlockContext, CallContext, TxContext};
pub use error::{EvmError, EvmResult};
pub use evm::{CallKind, CallOutcome, CallParams, CreateParams, Evm, ExecutionResult};
pub use gas::GasMeter;
pub use interpreter::{FrameResult, Interpreter, Status};
pub use memory::Memory;
pub use opcode::{Op, Opcode};
pub use stack::Stack;
pub use word::Word;
