//! Frame execution
//!
//! An [`Interpreter`] owns everything private to one call frame. The ledger
//! and the block environment are reached through the [`Evm`] passed to
//! [`Interpreter::run`].
//!
//! A frame never runs its children itself. CALL* and CREATE* leave a
//! `FrameRequest` behind and the frame suspends; the dispatcher keeps
//! suspended frames on a heap stack and hands the child's outcome back
//! through `Interpreter::resume`. Nesting depth therefore costs no host
//! stack.
//!
//! `pc` is an index into the decoded instruction list. It is advanced past
//! the current instruction before the handler runs, so a jump simply
//! overwrites it with the target index.

use crate::code::{Code, Instruction};
use crate::context::CallContext;
use crate::error::EvmError;
use crate::evm::{CallOutcome, CallParams, CreateParams, Evm};
use crate::gas::GasMeter;
use crate::memory::Memory;
use crate::stack::Stack;
use lfvm_state::StateDb;
use std::fmt;
use std::sync::Arc;

/// Frame state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Still executing
    Running,
    /// STOP or end of code
    Stopped,
    /// RETURN
    Returned,
    /// REVERT
    Reverted,
    /// SELFDESTRUCT
    Suicided,
    /// Undefined opcode or INVALID
    InvalidInstruction,
    /// Any other fatal error
    Failed(EvmError),
}

impl Status {
    /// Whether the frame finished without error (its effects persist)
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Stopped | Status::Returned | Status::Suicided)
    }

    /// Whether unused gas goes back to the caller
    pub fn returns_gas(&self) -> bool {
        self.is_success() || *self == Status::Reverted
    }

    fn from_error(err: EvmError) -> Self {
        match err {
            EvmError::InvalidOpcode(_) => Status::InvalidInstruction,
            other => Status::Failed(other),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running => f.write_str("running"),
            Status::Stopped => f.write_str("stopped"),
            Status::Returned => f.write_str("returned"),
            Status::Reverted => f.write_str("reverted"),
            Status::Suicided => f.write_str("suicided"),
            Status::InvalidInstruction => f.write_str("invalid instruction"),
            Status::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// What a finished frame reports to its caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameResult {
    /// Terminal status
    pub status: Status,
    /// RETURN or REVERT data, empty otherwise
    pub output: Vec<u8>,
    /// Unused gas; zero unless the status returns gas
    pub gas_left: u64,
    /// Ledger refund counter when the frame ended
    pub refund: u64,
}

/// Nested frame a suspended frame is waiting for
#[derive(Debug)]
pub(crate) enum FrameRequest {
    Call(CallParams),
    Create(CreateParams),
}

/// Where the outcome of a child goes once it finishes
#[derive(Debug, Clone, Copy)]
pub(crate) enum Pending {
    Call { out_offset: u64, out_len: u64 },
    Create,
}

/// Why `Interpreter::advance` stopped
#[derive(Debug)]
pub(crate) enum Exit {
    Nested(FrameRequest),
    Finished(FrameResult),
}

/// Interpreter state of one call frame
pub struct Interpreter {
    pub(crate) code: Arc<Code>,
    pub(crate) pc: usize,
    pub(crate) status: Status,
    pub(crate) gas: GasMeter,
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    pub(crate) call: CallContext,
    pub(crate) return_data: Vec<u8>,
    pub(crate) output: Vec<u8>,
    pub(crate) request: Option<FrameRequest>,
    pub(crate) pending: Option<Pending>,
}

impl Interpreter {
    /// Frame running `code` with the gas and input of `call`
    pub fn new(code: Arc<Code>, call: CallContext) -> Self {
        Self {
            code,
            pc: 0,
            status: Status::Running,
            gas: GasMeter::new(call.gas),
            stack: Stack::new(),
            memory: Memory::new(),
            call,
            return_data: Vec::new(),
            output: Vec::new(),
            request: None,
            pending: None,
        }
    }

    /// Execute until a terminal status is reached, running every nested
    /// frame this one starts
    pub fn run<S: StateDb + ?Sized>(self, evm: &mut Evm<'_, S>) -> FrameResult {
        evm.drive(self)
    }

    /// Execute until the frame finishes or asks for a nested frame
    pub(crate) fn advance<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> Exit {
        while self.status == Status::Running {
            let ins = match self.code.get(self.pc) {
                Some(ins) => *ins,
                None => {
                    self.status = Status::Stopped;
                    break;
                }
            };
            self.pc += 1;
            if let Err(err) = self.step(&ins, evm) {
                self.status = Status::from_error(err);
            } else if let Some(request) = self.request.take() {
                return Exit::Nested(request);
            }
        }
        Exit::Finished(self.finish(evm))
    }

    /// Deliver the outcome of the nested frame this one is suspended on
    pub(crate) fn resume(&mut self, outcome: CallOutcome) {
        let delivered = match self.pending.take() {
            Some(Pending::Call { out_offset, out_len }) => self.complete_call(out_offset, out_len, outcome),
            Some(Pending::Create) => self.complete_create(outcome),
            None => Ok(()),
        };
        if let Err(err) = delivered {
            self.status = Status::from_error(err);
        }
    }

    fn step<S: StateDb + ?Sized>(&mut self, ins: &Instruction, evm: &mut Evm<'_, S>) -> Result<(), EvmError> {
        self.gas.charge(u64::from(ins.gas))?;
        self.execute(ins, evm)
    }

    fn finish<S: StateDb + ?Sized>(&mut self, evm: &Evm<'_, S>) -> FrameResult {
        if !self.status.returns_gas() {
            self.gas.consume_all();
        }
        let output = match self.status {
            Status::Returned | Status::Reverted => std::mem::take(&mut self.output),
            _ => Vec::new(),
        };
        FrameResult {
            status: self.status.clone(),
            output,
            gas_left: self.gas.remaining(),
            refund: evm.state.get_refund(),
        }
    }

    /// Gas left in this frame
    pub fn gas_remaining(&self) -> u64 {
        self.gas.remaining()
    }

    /// Current status
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Operand stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Linear memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("pc", &self.pc)
            .field("status", &self.status)
            .field("gas", &self.gas.remaining())
            .field("stack", &self.stack)
            .field("memory_len", &self.memory.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::{BlockContext, TxContext};
    use crate::word::Word;
    use lfvm_primitives::{Address, U256};
    use lfvm_state::MemoryStateDb;

    fn run_with(code: &[u8], gas: u64, fusion: bool) -> FrameResult {
        let mut state = MemoryStateDb::new();
        let block = BlockContext::default();
        let tx = TxContext::default();
        let mut evm = Evm::new(&mut state, &block, &tx, Config::default());
        let call = CallContext::new(
            Address::from_bytes([0x11; 20]),
            Address::from_bytes([0x22; 20]),
            U256::zero(),
            vec![],
            gas,
        );
        Interpreter::new(Arc::new(Code::decode(code.to_vec(), fusion)), call).run(&mut evm)
    }

    fn run_code(code: &[u8], gas: u64) -> FrameResult {
        run_with(code, gas, true)
    }

    fn returned_word(result: &FrameResult) -> Word {
        assert_eq!(result.status, Status::Returned, "{:?}", result);
        Word::from_big_endian(&result.output)
    }

    // PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN
    const RETURN_TOP: [u8; 8] = [0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];

    fn with_return(body: &[u8]) -> Vec<u8> {
        let mut code = body.to_vec();
        code.extend_from_slice(&RETURN_TOP);
        code
    }

    #[test]
    fn test_stop() {
        let result = run_code(&[0x00], 100);
        assert_eq!(result.status, Status::Stopped);
        assert_eq!(result.gas_left, 100);
        assert!(result.output.is_empty());
    }

    #[test]
    fn test_end_of_code_is_stop() {
        let result = run_code(&[0x60, 0x01], 100);
        assert_eq!(result.status, Status::Stopped);
        assert_eq!(result.gas_left, 97);
    }

    #[test]
    fn test_empty_code() {
        let result = run_code(&[], 100);
        assert_eq!(result.status, Status::Stopped);
        assert_eq!(result.gas_left, 100);
    }

    #[test]
    fn test_push_add_return() {
        let result = run_code(&with_return(&[0x60, 0x01, 0x60, 0x02, 0x01]), 100_000);
        assert_eq!(returned_word(&result), Word::from(3u64));
    }

    #[test]
    fn test_add_wraps() {
        // PUSH32 0xff..ff PUSH1 1 ADD
        let mut body = vec![0x7f];
        body.extend_from_slice(&[0xff; 32]);
        body.extend_from_slice(&[0x60, 0x01, 0x01]);
        let result = run_code(&with_return(&body), 100_000);
        assert_eq!(returned_word(&result), Word::zero());
    }

    #[test]
    fn test_sub_operand_order() {
        // PUSH1 3 PUSH1 10 SUB -> 10 - 3
        let result = run_code(&with_return(&[0x60, 0x03, 0x60, 0x0a, 0x03]), 100_000);
        assert_eq!(returned_word(&result), Word::from(7u64));
    }

    #[test]
    fn test_revert_keeps_output_and_gas() {
        // PUSH1 0xaa PUSH1 0 MSTORE8 PUSH1 1 PUSH1 0 REVERT
        let code = [0x60, 0xaa, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xfd];
        let result = run_code(&code, 1000);
        assert_eq!(result.status, Status::Reverted);
        assert_eq!(result.output, vec![0xaa]);
        assert!(result.gas_left > 0);
    }

    // ==================== Failure Tests ====================

    #[test]
    fn test_out_of_gas_consumes_everything() {
        let result = run_code(&[0x60, 0x01, 0x60, 0x02, 0x01], 5);
        assert_eq!(result.status, Status::Failed(EvmError::OutOfGas));
        assert_eq!(result.gas_left, 0);
    }

    #[test]
    fn test_mstore_far_offset_fails_with_unlimited_gas() {
        // PUSH1 1 PUSH6 0x010000000000 MSTORE
        let code = [0x60, 0x01, 0x65, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x52];
        let result = run_code(&code, u64::MAX);
        assert_eq!(result.status, Status::Failed(EvmError::OutOfGas));
        assert_eq!(result.gas_left, 0);
    }

    #[test]
    fn test_stack_underflow() {
        let result = run_code(&[0x01], 100);
        assert_eq!(result.status, Status::Failed(EvmError::StackUnderflow));
        assert_eq!(result.gas_left, 0);
    }

    #[test]
    fn test_stack_overflow() {
        // 1025 x PUSH0 (Shanghai) is too many; use PC instead
        let code = vec![0x58; 1025];
        let result = run_code(&code, 1_000_000);
        assert_eq!(result.status, Status::Failed(EvmError::StackOverflow));
    }

    #[test]
    fn test_undefined_opcode() {
        let result = run_code(&[0x0c], 100);
        assert_eq!(result.status, Status::InvalidInstruction);
        assert_eq!(result.gas_left, 0);
    }

    #[test]
    fn test_designated_invalid() {
        let result = run_code(&[0xfe], 100);
        assert_eq!(result.status, Status::InvalidInstruction);
    }

    #[test]
    fn test_push0_needs_shanghai() {
        let result = run_code(&[0x5f], 100);
        assert_eq!(result.status, Status::InvalidInstruction);
    }

    // ==================== Jump Tests ====================

    #[test]
    fn test_jump() {
        // PUSH1 4 JUMP INVALID JUMPDEST PUSH1 1 ...return
        let result = run_code(&with_return(&[0x60, 0x04, 0x56, 0xfe, 0x5b, 0x60, 0x01]), 100_000);
        assert_eq!(returned_word(&result), Word::one());
    }

    #[test]
    fn test_jumpi_not_taken() {
        // PUSH1 0 PUSH1 8 JUMPI PUSH1 2 ...
        let result = run_code(
            &with_return(&[0x60, 0x00, 0x60, 0x08, 0x57, 0x60, 0x02]),
            100_000,
        );
        assert_eq!(returned_word(&result), Word::from(2u64));
    }

    #[test]
    fn test_invalid_jump() {
        let result = run_code(&[0x60, 0x03, 0x56, 0x00], 100);
        assert_eq!(result.status, Status::Failed(EvmError::InvalidJump(3)));
    }

    #[test]
    fn test_jump_into_push_data() {
        // PUSH1 4 JUMP PUSH1 0x5b
        let result = run_code(&[0x60, 0x04, 0x56, 0x60, 0x5b], 100);
        assert_eq!(result.status, Status::Failed(EvmError::InvalidJump(4)));
    }

    #[test]
    fn test_loop_runs_out_of_gas() {
        // JUMPDEST PUSH1 0 JUMP
        let result = run_code(&[0x5b, 0x60, 0x00, 0x56], 10_000);
        assert_eq!(result.status, Status::Failed(EvmError::OutOfGas));
    }

    #[test]
    fn test_pc_reports_byte_offset() {
        // PUSH2 0x0000 POP PC ...
        let result = run_code(&with_return(&[0x61, 0x00, 0x00, 0x50, 0x58]), 100_000);
        assert_eq!(returned_word(&result), Word::from(4u64));
    }

    #[test]
    fn test_gas_opcode() {
        // GAS ... gas before GAS = 100000, GAS costs 2
        let result = run_code(&with_return(&[0x5a]), 100_000);
        assert_eq!(returned_word(&result), Word::from(99_998u64));
    }

    // ==================== Fusion Tests ====================

    #[test]
    fn test_fused_and_unfused_agree() {
        // PUSH1 1 PUSH1 2 PUSH1 3 SHL SUB DUP1 PUSH1 5 ADD SWAP1 POP
        let body = [
            0x60, 0x01, 0x60, 0x02, 0x60, 0x03, 0x1b, 0x03, 0x80, 0x60, 0x05, 0x01, 0x90, 0x50,
        ];
        let code = with_return(&body);
        let fused = run_with(&code, 100_000, true);
        let plain = run_with(&code, 100_000, false);
        assert_eq!(fused, plain);
        // (2 << 3) - 1 + 5
        assert_eq!(returned_word(&fused), Word::from(20u64));
    }
}
