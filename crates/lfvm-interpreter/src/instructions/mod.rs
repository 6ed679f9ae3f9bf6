//! Instruction handlers
//!
//! Every handler is an `Interpreter` method. Static gas has already been
//! charged by the dispatch loop; handlers charge their dynamic part before
//! producing any side effect.

mod arithmetic;
mod control;
mod environment;
mod fused;
mod memory;
mod storage;
mod system;

use crate::code::Instruction;
use crate::error::{EvmError, EvmResult};
use crate::evm::{CallKind, Evm};
use crate::interpreter::{Interpreter, Status};
use crate::opcode::{Op, Opcode};
use crate::word::{self, Word};
use lfvm_state::StateDb;

impl Interpreter {
    pub(crate) fn execute<S: StateDb + ?Sized>(
        &mut self,
        ins: &Instruction,
        evm: &mut Evm<'_, S>,
    ) -> EvmResult<()> {
        match ins.op {
            Op::Basic(op) => self.execute_basic(op, ins, evm),
            Op::Invalid(byte) => Err(EvmError::InvalidOpcode(byte)),
            fused => self.execute_fused(fused, &ins.arg),
        }
    }

    fn execute_basic<S: StateDb + ?Sized>(
        &mut self,
        op: Opcode,
        ins: &Instruction,
        evm: &mut Evm<'_, S>,
    ) -> EvmResult<()> {
        match op {
            Opcode::STOP => {
                self.status = Status::Stopped;
                Ok(())
            }

            // Arithmetic
            Opcode::ADD => self.binary(|a, b| a.overflowing_add(*b).0),
            Opcode::MUL => self.binary(|a, b| a.overflowing_mul(*b).0),
            Opcode::SUB => self.binary(|a, b| a.overflowing_sub(*b).0),
            Opcode::DIV => self.binary(word::div),
            Opcode::SDIV => self.binary(word::sdiv),
            Opcode::MOD => self.binary(word::rem),
            Opcode::SMOD => self.binary(word::smod),
            Opcode::ADDMOD => self.ternary(word::addmod),
            Opcode::MULMOD => self.ternary(word::mulmod),
            Opcode::EXP => self.op_exp(),
            Opcode::SIGNEXTEND => self.binary(word::signextend),

            // Comparison & bitwise
            Opcode::LT => self.binary(|a, b| word::from_bool(a < b)),
            Opcode::GT => self.binary(|a, b| word::from_bool(a > b)),
            Opcode::SLT => self.binary(|a, b| word::from_bool(word::slt(a, b))),
            Opcode::SGT => self.binary(|a, b| word::from_bool(word::sgt(a, b))),
            Opcode::EQ => self.binary(|a, b| word::from_bool(a == b)),
            Opcode::ISZERO => self.unary(|a| word::from_bool(a.is_zero())),
            Opcode::AND => self.binary(|a, b| *a & *b),
            Opcode::OR => self.binary(|a, b| *a | *b),
            Opcode::XOR => self.binary(|a, b| *a ^ *b),
            Opcode::NOT => self.unary(|a| !*a),
            Opcode::BYTE => self.binary(word::byte),
            Opcode::SHL => self.binary(word::shl),
            Opcode::SHR => self.binary(word::shr),
            Opcode::SAR => self.binary(word::sar),

            Opcode::KECCAK256 => self.op_keccak256(evm),

            // Environment
            Opcode::ADDRESS => self.stack.push(self.call.address.to_word()),
            Opcode::BALANCE => self.op_balance(evm),
            Opcode::ORIGIN => self.stack.push(evm.tx.origin.to_word()),
            Opcode::CALLER => self.stack.push(self.call.caller.to_word()),
            Opcode::CALLVALUE => self.stack.push(self.call.value),
            Opcode::CALLDATALOAD => self.op_calldataload(),
            Opcode::CALLDATASIZE => self.stack.push(Word::from(self.call.input.len())),
            Opcode::CALLDATACOPY => self.op_calldatacopy(),
            Opcode::CODESIZE => self.stack.push(Word::from(self.code.bytes().len())),
            Opcode::CODECOPY => self.op_codecopy(),
            Opcode::GASPRICE => self.stack.push(evm.tx.gas_price),
            Opcode::EXTCODESIZE => self.op_extcodesize(evm),
            Opcode::EXTCODECOPY => self.op_extcodecopy(evm),
            Opcode::RETURNDATASIZE => self.stack.push(Word::from(self.return_data.len())),
            Opcode::RETURNDATACOPY => self.op_returndatacopy(),
            Opcode::EXTCODEHASH => self.op_extcodehash(evm),

            // Block information
            Opcode::BLOCKHASH => self.op_blockhash(evm),
            Opcode::COINBASE => self.stack.push(evm.block.coinbase.to_word()),
            Opcode::TIMESTAMP => self.stack.push(Word::from(evm.block.timestamp)),
            Opcode::NUMBER => self.stack.push(Word::from(evm.block.number)),
            Opcode::PREVRANDAO => self.stack.push(evm.block.prevrandao.to_word()),
            Opcode::GASLIMIT => self.stack.push(Word::from(evm.block.gas_limit)),
            Opcode::CHAINID => self.stack.push(Word::from(evm.block.chain_id)),
            Opcode::SELFBALANCE => {
                let balance = evm.state.get_balance(&self.call.address);
                self.stack.push(balance)
            }
            Opcode::BASEFEE => self.stack.push(evm.block.base_fee),

            // Stack, memory, storage and flow
            Opcode::POP => self.stack.pop().map(drop),
            Opcode::MLOAD => self.op_mload(),
            Opcode::MSTORE => self.op_mstore(),
            Opcode::MSTORE8 => self.op_mstore8(),
            Opcode::SLOAD => self.op_sload(evm),
            Opcode::SSTORE => self.op_sstore(evm),
            Opcode::JUMP => self.op_jump(),
            Opcode::JUMPI => self.op_jumpi(),
            Opcode::PC => self.stack.push(Word::from(ins.pc)),
            Opcode::MSIZE => self.stack.push(Word::from(self.memory.len())),
            Opcode::GAS => self.stack.push(Word::from(self.gas.remaining())),
            Opcode::JUMPDEST => Ok(()),
            Opcode::PUSH0 => {
                if !evm.config.revision.is_shanghai() {
                    return Err(EvmError::InvalidOpcode(op.byte()));
                }
                self.stack.push(Word::zero())
            }
            _ if op.push_size() > 0 => self.stack.push(ins.arg),
            _ if op.dup_depth() > 0 => self.stack.dup(op.dup_depth()),
            _ if op.swap_depth() > 0 => self.stack.swap(op.swap_depth()),

            // Logging
            Opcode::LOG0 | Opcode::LOG1 | Opcode::LOG2 | Opcode::LOG3 | Opcode::LOG4 => {
                self.op_log(evm, op.log_topics())
            }

            // System
            Opcode::CREATE => self.op_create(evm, false),
            Opcode::CREATE2 => self.op_create(evm, true),
            Opcode::CALL => self.op_call(evm, CallKind::Call),
            Opcode::CALLCODE => self.op_call(evm, CallKind::CallCode),
            Opcode::DELEGATECALL => self.op_call(evm, CallKind::DelegateCall),
            Opcode::STATICCALL => self.op_call(evm, CallKind::StaticCall),
            Opcode::RETURN => self.op_return(Status::Returned),
            Opcode::REVERT => self.op_return(Status::Reverted),
            Opcode::SELFDESTRUCT => self.op_selfdestruct(evm),
            Opcode::INVALID => Err(EvmError::InvalidOpcode(op.byte())),

            // PUSH1..32, DUP and SWAP are matched by the guards above
            _ => Err(EvmError::InvalidOpcode(op.byte())),
        }
    }

    fn require_non_static(&self) -> EvmResult<()> {
        if self.call.is_static {
            Err(EvmError::StaticCallViolation)
        } else {
            Ok(())
        }
    }
}
