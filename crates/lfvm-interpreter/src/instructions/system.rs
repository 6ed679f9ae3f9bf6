//! Logs, nested calls, contract creation and self-destruction

use crate::error::{EvmError, EvmResult};
use crate::evm::{CallKind, CallOutcome, CallParams, CreateParams, Evm};
use crate::gas::{self, cost};
use crate::interpreter::{FrameRequest, Interpreter, Pending, Status};
use crate::memory::memory_range;
use crate::word::{self, Word};
use lfvm_primitives::{Address, H256};
use lfvm_state::{Log, StateDb};

impl Interpreter {
    pub(super) fn op_log<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>, topics: usize) -> EvmResult<()> {
        self.require_non_static()?;
        self.stack.require(2 + topics)?;
        let [offset, len] = self.stack.pop_n::<2>()?;
        let mut topic_list = Vec::with_capacity(topics);
        for _ in 0..topics {
            topic_list.push(H256::from_word(&self.stack.pop()?));
        }
        let (offset, len) = memory_range(&offset, &len)?;
        self.gas.charge(gas::log_data_gas(len))?;
        self.memory.ensure_capacity(offset, len, &mut self.gas)?;
        evm.state.add_log(Log {
            address: self.call.address,
            topics: topic_list,
            data: self.memory.get_copy(offset, len),
        });
        Ok(())
    }

    pub(super) fn op_call<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>, kind: CallKind) -> EvmResult<()> {
        let has_value = matches!(kind, CallKind::Call | CallKind::CallCode);
        self.stack.require(if has_value { 7 } else { 6 })?;
        let [requested, to] = self.stack.pop_n::<2>()?;
        let value = if has_value { self.stack.pop()? } else { Word::zero() };
        let [in_offset, in_len, out_offset, out_len] = self.stack.pop_n::<4>()?;
        let to = Address::from_word(&to);
        if kind == CallKind::Call && !value.is_zero() {
            self.require_non_static()?;
        }

        let (in_offset, in_len) = memory_range(&in_offset, &in_len)?;
        let (out_offset, out_len) = memory_range(&out_offset, &out_len)?;
        self.memory.ensure_capacity(in_offset, in_len, &mut self.gas)?;
        self.memory.ensure_capacity(out_offset, out_len, &mut self.gas)?;
        self.charge_account_access(evm, &to)?;

        let mut base = 0;
        if !value.is_zero() {
            base += cost::CALL_VALUE;
            if kind == CallKind::Call && evm.state.empty(&to) {
                base += cost::CALL_NEW_ACCOUNT;
            }
        }
        let forwarded = gas::call_gas(self.gas.remaining(), base, &requested, evm.config.all_but_one_64th)?;
        self.gas.charge(base.saturating_add(forwarded))?;
        let stipend = if value.is_zero() { 0 } else { cost::CALL_STIPEND };

        let (caller, address, value) = match kind {
            CallKind::Call | CallKind::StaticCall => (self.call.address, to, value),
            CallKind::CallCode => (self.call.address, self.call.address, value),
            CallKind::DelegateCall => (self.call.caller, self.call.address, self.call.value),
        };
        let params = CallParams {
            kind,
            caller,
            address,
            code_address: to,
            value,
            input: self.memory.get_copy(in_offset, in_len),
            gas: forwarded + stipend,
            depth: self.call.depth + 1,
            is_static: self.call.is_static || kind == CallKind::StaticCall,
        };
        self.pending = Some(Pending::Call { out_offset, out_len });
        self.request = Some(FrameRequest::Call(params));
        Ok(())
    }

    /// Copy the callee's output and push its success flag
    pub(crate) fn complete_call(&mut self, out_offset: u64, out_len: u64, outcome: CallOutcome) -> EvmResult<()> {
        if outcome.status.returns_gas() {
            let copied = out_len.min(outcome.output.len() as u64);
            self.memory.set(out_offset, copied, &outcome.output);
        }
        self.gas.refund_gas(outcome.gas_left);
        self.return_data = outcome.output;
        self.stack.push(word::from_bool(outcome.status.is_success()))
    }

    pub(super) fn op_create<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>, salted: bool) -> EvmResult<()> {
        self.require_non_static()?;
        self.stack.require(if salted { 4 } else { 3 })?;
        let [value, offset, len] = self.stack.pop_n::<3>()?;
        let salt = if salted {
            Some(H256::from_word(&self.stack.pop()?))
        } else {
            None
        };

        let (offset, len) = memory_range(&offset, &len)?;
        let revision = evm.config.revision;
        if revision.is_shanghai() && len > evm.config.max_initcode_size as u64 {
            return Err(EvmError::OutOfGas);
        }
        self.gas.charge(gas::initcode_gas(revision, len, salted))?;
        self.memory.ensure_capacity(offset, len, &mut self.gas)?;
        let init_code = self.memory.get_copy(offset, len);

        let forwarded = gas::create_gas(self.gas.remaining(), evm.config.all_but_one_64th);
        self.gas.charge(forwarded)?;
        self.pending = Some(Pending::Create);
        self.request = Some(FrameRequest::Create(CreateParams {
            caller: self.call.address,
            value,
            init_code,
            gas: forwarded,
            depth: self.call.depth + 1,
            salt,
        }));
        Ok(())
    }

    /// Push the created address, or zero on failure
    pub(crate) fn complete_create(&mut self, outcome: CallOutcome) -> EvmResult<()> {
        self.gas.refund_gas(outcome.gas_left);
        self.return_data = if outcome.status == Status::Reverted {
            outcome.output
        } else {
            Vec::new()
        };
        let created = outcome.created.map(|address| address.to_word()).unwrap_or_default();
        self.stack.push(created)
    }

    pub(super) fn op_selfdestruct<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        self.require_non_static()?;
        let beneficiary = Address::from_word(&self.stack.pop()?);
        let address = self.call.address;
        let revision = evm.config.revision;

        let cold = revision.has_access_lists() && !evm.state.address_in_access_list(&beneficiary);
        let balance = evm.state.get_balance(&address);
        let mut extra = 0;
        if cold {
            extra += cost::COLD_ACCOUNT_ACCESS;
        }
        if !balance.is_zero() && evm.state.empty(&beneficiary) {
            extra += cost::SELFDESTRUCT_NEW_ACCOUNT;
        }
        self.gas.charge(extra)?;
        if cold {
            evm.state.add_address_to_access_list(beneficiary);
        }

        if revision.has_selfdestruct_refund() && !evm.state.has_suicided(&address) {
            evm.state.add_refund(cost::SELFDESTRUCT_REFUND);
        }
        evm.state.add_balance(beneficiary, balance);
        evm.state.suicide(&address);
        self.status = Status::Suicided;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Revision;
    use crate::context::CallContext;
    use crate::error::EvmError;
    use crate::instructions::test_utils::*;
    use crate::interpreter::Status;
    use crate::word::Word;
    use lfvm_crypto::create_address;
    use lfvm_primitives::{Address, H256, U256};
    use lfvm_state::{Account, MemoryStateDb, StateDb};

    const CALLEE: Address = Address::from_bytes([0x44; 20]);
    const HEIR: Address = Address::from_bytes([0x55; 20]);

    fn push20(address: &Address) -> Vec<u8> {
        let mut code = vec![0x73];
        code.extend_from_slice(address.as_bytes());
        code
    }

    // CALL with `gas` to CALLEE, no value, input empty, 32 bytes of output at 0
    fn call_callee(opcode: u8, gas: u16) -> Vec<u8> {
        // out_len out_offset in_len in_offset [value] address gas
        let mut code = vec![0x60, 0x20, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00];
        if opcode == 0xf1 || opcode == 0xf2 {
            code.extend_from_slice(&[0x60, 0x00]);
        }
        code.extend(push20(&CALLEE));
        code.push(0x61);
        code.extend_from_slice(&gas.to_be_bytes());
        code.push(opcode);
        code
    }

    // ==================== Log Tests ====================

    #[test]
    fn test_log2() {
        let mut state = MemoryStateDb::new();
        // PUSH1 0xaa PUSH1 0 MSTORE8 PUSH1 2 PUSH1 1 PUSH1 1 PUSH1 0 LOG2 STOP
        let code = [0x60, 0xaa, 0x60, 0x00, 0x53, 0x60, 0x02, 0x60, 0x01, 0x60, 0x01, 0x60, 0x00, 0xa2, 0x00];
        let result = run_in(&mut state, Revision::London, &code, call_context(100_000));
        assert_eq!(result.status, Status::Stopped);
        let log = &state.logs()[0];
        assert_eq!(log.address, CONTRACT);
        assert_eq!(log.data, vec![0xaa]);
        assert_eq!(
            log.topics,
            vec![H256::from_word(&U256::from(1u64)), H256::from_word(&U256::from(2u64))]
        );
    }

    #[test]
    fn test_log_in_static_frame() {
        let mut state = MemoryStateDb::new();
        let call = CallContext::new_static(CONTRACT, CALLER, vec![], 100_000);
        let result = run_in(&mut state, Revision::London, &[0x60, 0x00, 0x60, 0x00, 0xa0], call);
        assert_eq!(result.status, Status::Failed(EvmError::StaticCallViolation));
        assert!(state.logs().is_empty());
    }

    // ==================== Call Tests ====================

    fn callee_returning_42() -> Account {
        // PUSH1 0x2a PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN
        Account::with_code(vec![0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3])
    }

    #[test]
    fn test_call_copies_output_and_pushes_success() {
        for opcode in [0xf1u8, 0xf2, 0xf4, 0xfa] {
            let mut state = MemoryStateDb::new();
            state.insert_account(CALLEE, callee_returning_42());
            // success flag in slot 0x20, output in slot 0
            let mut code = call_callee(opcode, 0xffff);
            code.extend_from_slice(&[0x60, 0x20, 0x52, 0x60, 0x40, 0x60, 0x00, 0xf3]);
            let result = run_in(&mut state, Revision::London, &code, call_context(200_000));
            assert_eq!(result.status, Status::Returned, "opcode {:#x}", opcode);
            assert_eq!(Word::from_big_endian(&result.output[..32]), Word::from(42u64));
            assert_eq!(Word::from_big_endian(&result.output[32..]), Word::one());
        }
    }

    #[test]
    fn test_returndatasize_after_call() {
        let mut state = MemoryStateDb::new();
        state.insert_account(CALLEE, callee_returning_42());
        let mut body = call_callee(0xf1, 0xffff);
        body.extend_from_slice(&[0x50, 0x3d]);
        let result = run_in(&mut state, Revision::London, &with_return(&body), call_context(200_000));
        assert_eq!(returned(&result), Word::from(32u64));
    }

    #[test]
    fn test_call_to_reverting_callee() {
        let mut state = MemoryStateDb::new();
        // PUSH1 1 PUSH1 0 SSTORE PUSH1 0 PUSH1 0 REVERT
        state.insert_account(
            CALLEE,
            Account::with_code(vec![0x60, 0x01, 0x60, 0x00, 0x55, 0x60, 0x00, 0x60, 0x00, 0xfd]),
        );
        let result = run_in(&mut state, Revision::London, &with_return(&call_callee(0xf1, 0xffff)), call_context(200_000));
        assert_eq!(returned(&result), Word::zero());
        assert_eq!(state.get_state(&CALLEE, &H256::ZERO), H256::ZERO);
    }

    #[test]
    fn test_staticcall_blocks_sstore() {
        let mut state = MemoryStateDb::new();
        state.insert_account(CALLEE, Account::with_code(vec![0x60, 0x01, 0x60, 0x00, 0x55, 0x00]));
        let result = run_in(&mut state, Revision::London, &with_return(&call_callee(0xfa, 0xffff)), call_context(200_000));
        assert_eq!(returned(&result), Word::zero());
    }

    #[test]
    fn test_delegatecall_writes_caller_storage() {
        let mut state = MemoryStateDb::new();
        state.insert_account(CALLEE, Account::with_code(vec![0x60, 0x07, 0x60, 0x00, 0x55, 0x00]));
        let result = run_in(&mut state, Revision::London, &with_return(&call_callee(0xf4, 0xffff)), call_context(200_000));
        assert_eq!(returned(&result), Word::one());
        assert_eq!(state.get_state(&CONTRACT, &H256::ZERO), H256::from_word(&U256::from(7u64)));
        assert_eq!(state.get_state(&CALLEE, &H256::ZERO), H256::ZERO);
    }

    #[test]
    fn test_call_with_value_in_static_frame() {
        let mut state = MemoryStateDb::new();
        // value 1
        let mut code = vec![0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x01];
        code.extend(push20(&CALLEE));
        code.extend_from_slice(&[0x61, 0xff, 0xff, 0xf1]);
        let call = CallContext::new_static(CONTRACT, CALLER, vec![], 100_000);
        let result = run_in(&mut state, Revision::London, &code, call);
        assert_eq!(result.status, Status::Failed(EvmError::StaticCallViolation));
    }

    // Callee that returns the gas it sees: GAS PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN
    fn gas_reporter() -> Account {
        Account::with_code(vec![0x5a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3])
    }

    // ... POP PUSH1 0 MLOAD: load the callee's output
    const LOAD_OUTPUT: [u8; 4] = [0x50, 0x60, 0x00, 0x51];

    #[test]
    fn test_call_value_transfer_and_stipend() {
        let mut state = MemoryStateDb::new();
        state.insert_account(CONTRACT, Account::with_balance(U256::from(100u64)));
        state.insert_account(CALLEE, gas_reporter());
        // value 5, requested gas 0
        let mut code = vec![0x60, 0x20, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x05];
        code.extend(push20(&CALLEE));
        code.extend_from_slice(&[0x60, 0x00, 0xf1]);
        code.extend_from_slice(&LOAD_OUTPUT);
        let result = run_in(&mut state, Revision::London, &with_return(&code), call_context(100_000));
        // stipend minus the callee's GAS
        assert_eq!(returned(&result), Word::from(2300u64 - 2));
        assert_eq!(state.get_balance(&CALLEE), U256::from(5u64));
        assert_eq!(state.get_balance(&CONTRACT), U256::from(95u64));
    }

    #[test]
    fn test_call_gas_capped_by_all_but_one_64th() {
        let mut state = MemoryStateDb::new();
        state.insert_account(CALLEE, gas_reporter());
        let mut code = call_callee(0xf1, 0xffff);
        code.extend_from_slice(&LOAD_OUTPUT);
        let gas = 10_000;
        let result = run_in(&mut state, Revision::London, &with_return(&code), call_context(gas));
        // seven pushes, CALL, one word of memory, cold access
        let available = gas - (7 * 3 + 100 + 3 + 2500);
        let forwarded = available - available / 64;
        assert_eq!(returned(&result), Word::from(forwarded - 2));
    }

    #[test]
    fn test_call_gas_uncapped_without_retention() {
        let mut state = MemoryStateDb::new();
        state.insert_account(CALLEE, gas_reporter());
        let block = crate::context::BlockContext::default();
        let tx = crate::context::TxContext::default();
        let config = crate::config::Config {
            all_but_one_64th: false,
            ..Default::default()
        };
        let mut evm = crate::evm::Evm::new(&mut state, &block, &tx, config);
        let mut code = call_callee(0xf1, 1000);
        code.extend_from_slice(&LOAD_OUTPUT);
        let result = crate::interpreter::Interpreter::new(
            std::sync::Arc::new(crate::code::Code::decode(with_return(&code), true)),
            call_context(10_000),
        )
        .run(&mut evm);
        assert_eq!(returned(&result), Word::from(1000u64 - 2));
    }

    // ==================== Create Tests ====================

    // PUSH5 <init> PUSH1 0 MSTORE, then CREATE/CREATE2 from memory[27..32]
    fn create_code(salted: bool) -> Vec<u8> {
        // init: PUSH1 1 PUSH1 0 RETURN
        let mut code = vec![0x64, 0x60, 0x01, 0x60, 0x00, 0xf3, 0x60, 0x00, 0x52];
        if salted {
            code.extend_from_slice(&[0x60, 0x09]);
        }
        code.extend_from_slice(&[0x60, 0x05, 0x60, 0x1b, 0x60, 0x00]);
        code.push(if salted { 0xf5 } else { 0xf0 });
        code
    }

    #[test]
    fn test_create_from_contract() {
        let mut state = MemoryStateDb::new();
        let result = run_in(&mut state, Revision::London, &with_return(&create_code(false)), call_context(200_000));
        let expected = create_address(&CONTRACT, 0);
        assert_eq!(returned(&result), expected.to_word());
        assert_eq!(state.get_code(&expected), vec![0x00]);
        assert_eq!(state.get_nonce(&CONTRACT), 1);
    }

    #[test]
    fn test_create2_from_contract() {
        let mut state = MemoryStateDb::new();
        let result = run_in(&mut state, Revision::London, &with_return(&create_code(true)), call_context(200_000));
        let salt = H256::from_word(&U256::from(9u64));
        let init = [0x60, 0x01, 0x60, 0x00, 0xf3];
        let expected = lfvm_crypto::create2_address(&CONTRACT, &salt, &lfvm_crypto::keccak256(&init));
        assert_eq!(returned(&result), expected.to_word());
    }

    #[test]
    fn test_create_in_static_frame() {
        let mut state = MemoryStateDb::new();
        let call = CallContext::new_static(CONTRACT, CALLER, vec![], 200_000);
        let result = run_in(&mut state, Revision::London, &create_code(false), call);
        assert_eq!(result.status, Status::Failed(EvmError::StaticCallViolation));
    }

    #[test]
    fn test_create_without_funds_pushes_zero() {
        let mut state = MemoryStateDb::new();
        // value 1 instead of 0
        let mut code = create_code(false);
        let len = code.len();
        code[len - 2] = 0x01;
        let result = run_in(&mut state, Revision::London, &with_return(&code), call_context(200_000));
        assert_eq!(returned(&result), Word::zero());
    }

    // ==================== Selfdestruct Tests ====================

    #[test]
    fn test_selfdestruct_moves_balance() {
        let mut state = MemoryStateDb::new();
        state.insert_account(CONTRACT, Account::with_balance(U256::from(50u64)));
        let mut code = push20(&HEIR);
        code.push(0xff);
        let result = run_in(&mut state, Revision::London, &code, call_context(100_000));
        assert_eq!(result.status, Status::Suicided);
        assert!(state.has_suicided(&CONTRACT));
        assert_eq!(state.get_balance(&HEIR), U256::from(50u64));
        // 3 + 5000 + 2600 cold + 25000 new account
        assert_eq!(result.gas_left, 100_000 - (3 + 5000 + 2600 + 25000));
        assert_eq!(result.refund, 0);
    }

    #[test]
    fn test_selfdestruct_refund_before_london() {
        let mut state = MemoryStateDb::new();
        let mut code = push20(&HEIR);
        code.push(0xff);
        let result = run_in(&mut state, Revision::Berlin, &code, call_context(100_000));
        assert_eq!(result.status, Status::Suicided);
        assert_eq!(result.refund, 24_000);
    }
}
