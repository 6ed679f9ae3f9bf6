//! Call/create dispatcher
//!
//! [`Evm`] owns the shared view of one top-level invocation: the ledger,
//! the block and transaction environment and the configuration. Every
//! frame, including nested ones started by CALL* and CREATE*, is entered
//! through the same checks as [`Evm::execute_call`] or
//! [`Evm::execute_create`], which take a ledger snapshot before the frame
//! runs and revert to it unless the frame succeeds.
//!
//! Suspended parents live on a `Vec` owned by `Evm::drive`, so the host
//! stack stays flat however deep contracts nest.

use crate::code::Code;
use crate::config::Config;
use crate::context::{BlockContext, CallContext, TxContext};
use crate::error::EvmError;
use crate::interpreter::{Exit, FrameRequest, FrameResult, Interpreter, Status};
use lfvm_crypto::{create2_address, create_address, keccak256, EMPTY_CODE_HASH};
use lfvm_primitives::{Address, H256, U256};
use lfvm_state::{Snapshot, StateDb};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Flavour of a message call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// CALL
    Call,
    /// CALLCODE: run the target's code on the caller's account
    CallCode,
    /// DELEGATECALL: like CALLCODE, keeping the caller and value of the parent
    DelegateCall,
    /// STATICCALL: no state modification allowed
    StaticCall,
}

/// Everything needed to start a call frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallParams {
    /// Call flavour
    pub kind: CallKind,
    /// Caller seen by the new frame
    pub caller: Address,
    /// Account whose storage and balance the frame acts on
    pub address: Address,
    /// Account the code is loaded from
    pub code_address: Address,
    /// Transferred (CALL) or apparent (CALLCODE, DELEGATECALL) value
    pub value: U256,
    /// Call data
    pub input: Vec<u8>,
    /// Gas handed to the frame
    pub gas: u64,
    /// Frame depth, 0 for the outermost frame
    pub depth: usize,
    /// Whether state modifications are forbidden
    pub is_static: bool,
}

impl CallParams {
    /// Top-level parameters for a call of kind `kind` from `caller` to `to`
    pub fn new(kind: CallKind, caller: Address, to: Address, value: U256, input: Vec<u8>, gas: u64) -> Self {
        let address = match kind {
            CallKind::Call | CallKind::StaticCall => to,
            CallKind::CallCode | CallKind::DelegateCall => caller,
        };
        Self {
            kind,
            caller,
            address,
            code_address: to,
            value,
            input,
            gas,
            depth: 0,
            is_static: kind == CallKind::StaticCall,
        }
    }

    fn transfers_value(&self) -> bool {
        matches!(self.kind, CallKind::Call | CallKind::CallCode) && !self.value.is_zero()
    }
}

/// Everything needed to start a create frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParams {
    /// Creating account
    pub caller: Address,
    /// Endowment
    pub value: U256,
    /// Init code
    pub init_code: Vec<u8>,
    /// Gas handed to the frame
    pub gas: u64,
    /// Frame depth, 0 for the outermost frame
    pub depth: usize,
    /// CREATE2 salt; `None` for CREATE
    pub salt: Option<H256>,
}

/// What a finished call or create reports to its caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    /// Terminal status of the frame
    pub status: Status,
    /// Return or revert data; deployed code for a successful create
    pub output: Vec<u8>,
    /// Gas handed back to the caller
    pub gas_left: u64,
    /// Address of the created account, only for a successful create
    pub created: Option<Address>,
}

impl CallOutcome {
    // The frame never started; its whole allowance goes back.
    fn rejected(err: EvmError, gas: u64) -> Self {
        Self {
            status: Status::Failed(err),
            output: Vec::new(),
            gas_left: gas,
            created: None,
        }
    }

    fn failed(err: EvmError) -> Self {
        Self::rejected(err, 0)
    }

    fn stopped(gas: u64) -> Self {
        Self {
            status: Status::Stopped,
            output: Vec::new(),
            gas_left: gas,
            created: None,
        }
    }

    /// Whether the frame's effects persist
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a top-level transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Terminal status of the outermost frame
    pub status: Status,
    /// Output of the outermost frame
    pub output: Vec<u8>,
    /// Gas consumed
    pub gas_used: u64,
    /// Gas not consumed
    pub gas_left: u64,
    /// Refund counter at the end of execution (uncapped)
    pub refund: u64,
    /// Created account for a successful create transaction
    pub created_address: Option<Address>,
}

impl ExecutionResult {
    /// Whether the transaction succeeded
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

// Bookkeeping for a started frame, settled when it finishes
#[derive(Debug, Clone, Copy)]
struct FrameGuard {
    snapshot: Snapshot,
    created: Option<Address>,
}

// Result of entering a frame: either settled by the pre-checks or running
enum Entry {
    Done(CallOutcome),
    Frame(Interpreter, FrameGuard),
}

/// Dispatcher shared by every frame of one invocation
pub struct Evm<'a, S: StateDb + ?Sized> {
    pub(crate) state: &'a mut S,
    pub(crate) block: &'a BlockContext,
    pub(crate) tx: &'a TxContext,
    pub(crate) config: Config,
    code_cache: HashMap<(H256, bool), Arc<Code>>,
}

impl<'a, S: StateDb + ?Sized> Evm<'a, S> {
    /// Create a dispatcher over `state`
    pub fn new(state: &'a mut S, block: &'a BlockContext, tx: &'a TxContext, config: Config) -> Self {
        Self {
            state,
            block,
            tx,
            config,
            code_cache: HashMap::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The ledger
    pub fn state(&self) -> &S {
        self.state
    }

    /// The ledger, mutably
    pub fn state_mut(&mut self) -> &mut S {
        self.state
    }

    // ==================== Top-level entry points ====================

    /// CALL from `caller` to `to` at depth 0
    pub fn call(&mut self, caller: Address, to: Address, value: U256, input: Vec<u8>, gas: u64) -> CallOutcome {
        self.execute_call(CallParams::new(CallKind::Call, caller, to, value, input, gas))
    }

    /// CALLCODE: run `to`'s code on `caller`'s account
    pub fn call_code(&mut self, caller: Address, to: Address, value: U256, input: Vec<u8>, gas: u64) -> CallOutcome {
        self.execute_call(CallParams::new(CallKind::CallCode, caller, to, value, input, gas))
    }

    /// DELEGATECALL: run `to`'s code on `caller`'s account
    pub fn delegate_call(&mut self, caller: Address, to: Address, input: Vec<u8>, gas: u64) -> CallOutcome {
        self.execute_call(CallParams::new(CallKind::DelegateCall, caller, to, U256::zero(), input, gas))
    }

    /// STATICCALL from `caller` to `to`
    pub fn static_call(&mut self, caller: Address, to: Address, input: Vec<u8>, gas: u64) -> CallOutcome {
        self.execute_call(CallParams::new(CallKind::StaticCall, caller, to, U256::zero(), input, gas))
    }

    /// CREATE with the address derived from `caller`'s nonce
    pub fn create(&mut self, caller: Address, init_code: Vec<u8>, gas: u64, value: U256) -> CallOutcome {
        self.execute_create(CreateParams {
            caller,
            value,
            init_code,
            gas,
            depth: 0,
            salt: None,
        })
    }

    /// CREATE2 with the address derived from `salt` and the init code hash
    pub fn create2(&mut self, caller: Address, init_code: Vec<u8>, gas: u64, value: U256, salt: H256) -> CallOutcome {
        self.execute_create(CreateParams {
            caller,
            value,
            init_code,
            gas,
            depth: 0,
            salt: Some(salt),
        })
    }

    /// Run a message-call transaction from `sender` to `to`
    pub fn transact_call(
        &mut self,
        sender: Address,
        to: Address,
        value: U256,
        input: Vec<u8>,
        gas: u64,
    ) -> ExecutionResult {
        self.prepare_access_list(sender, Some(to));
        let outcome = self.call(sender, to, value, input, gas);
        self.execution_result(outcome, gas)
    }

    /// Run a contract-creation transaction from `sender`
    pub fn transact_create(&mut self, sender: Address, init_code: Vec<u8>, gas: u64, value: U256) -> ExecutionResult {
        self.prepare_access_list(sender, None);
        let outcome = self.create(sender, init_code, gas, value);
        self.execution_result(outcome, gas)
    }

    fn prepare_access_list(&mut self, sender: Address, dest: Option<Address>) {
        if !self.config.revision.has_access_lists() {
            return;
        }
        self.state.prepare_access_list(sender, dest, &[], &Vec::new());
        if self.config.revision.is_shanghai() {
            self.state.add_address_to_access_list(self.block.coinbase);
        }
    }

    fn execution_result(&self, outcome: CallOutcome, gas: u64) -> ExecutionResult {
        let gas_left = outcome.gas_left.min(gas);
        ExecutionResult {
            status: outcome.status,
            output: outcome.output,
            gas_used: gas - gas_left,
            gas_left,
            refund: self.state.get_refund(),
            created_address: outcome.created,
        }
    }

    // ==================== Frame entry ====================

    /// Run a call frame and every frame it starts
    pub fn execute_call(&mut self, params: CallParams) -> CallOutcome {
        let entry = self.enter_call(params);
        self.settle(entry)
    }

    /// Run a create frame and deploy the returned code
    pub fn execute_create(&mut self, params: CreateParams) -> CallOutcome {
        let entry = self.enter_create(params);
        self.settle(entry)
    }

    fn settle(&mut self, entry: Entry) -> CallOutcome {
        match entry {
            Entry::Done(outcome) => outcome,
            Entry::Frame(frame, guard) => {
                let result = self.drive(frame);
                self.leave(guard, result)
            }
        }
    }

    /// Run `root` to completion. Nested frames are pushed on a heap stack
    /// instead of recursing; the root's raw result is returned.
    pub(crate) fn drive(&mut self, root: Interpreter) -> FrameResult {
        let mut current = root;
        let mut suspended: Vec<(Interpreter, FrameGuard)> = Vec::new();
        loop {
            let entry = match current.advance(self) {
                Exit::Nested(FrameRequest::Call(params)) => self.enter_call(params),
                Exit::Nested(FrameRequest::Create(params)) => self.enter_create(params),
                Exit::Finished(result) => match suspended.pop() {
                    None => return result,
                    Some((parent, guard)) => {
                        let outcome = self.leave(guard, result);
                        current = parent;
                        current.resume(outcome);
                        continue;
                    }
                },
            };
            match entry {
                Entry::Done(outcome) => current.resume(outcome),
                Entry::Frame(child, guard) => {
                    let parent = std::mem::replace(&mut current, child);
                    suspended.push((parent, guard));
                }
            }
        }
    }

    fn enter_call(&mut self, params: CallParams) -> Entry {
        debug!(
            kind = ?params.kind,
            to = %params.address,
            code = %params.code_address,
            depth = params.depth,
            gas = params.gas,
            "call"
        );
        if params.depth > self.config.max_call_depth {
            return Entry::Done(CallOutcome::rejected(
                EvmError::CallDepthExceeded(self.config.max_call_depth),
                params.gas,
            ));
        }
        if params.transfers_value() && self.state.get_balance(&params.caller) < params.value {
            return Entry::Done(CallOutcome::rejected(EvmError::InsufficientBalance, params.gas));
        }

        let snapshot = self.state.snapshot();
        if params.kind == CallKind::Call {
            if !self.state.exist(&params.address) {
                if params.value.is_zero() {
                    return Entry::Done(CallOutcome::stopped(params.gas));
                }
                self.state.create_account(params.address);
            }
            self.transfer(params.caller, params.address, params.value);
        }

        let Some(code) = self.load_code(&params.code_address) else {
            return Entry::Done(CallOutcome::stopped(params.gas));
        };
        let call = CallContext {
            address: params.address,
            caller: params.caller,
            code_address: params.code_address,
            value: params.value,
            input: params.input,
            gas: params.gas,
            is_static: params.is_static,
            depth: params.depth,
        };
        Entry::Frame(Interpreter::new(code, call), FrameGuard { snapshot, created: None })
    }

    fn enter_create(&mut self, params: CreateParams) -> Entry {
        debug!(
            caller = %params.caller,
            depth = params.depth,
            gas = params.gas,
            salted = params.salt.is_some(),
            "create"
        );
        if params.depth > self.config.max_call_depth {
            return Entry::Done(CallOutcome::rejected(
                EvmError::CallDepthExceeded(self.config.max_call_depth),
                params.gas,
            ));
        }
        if self.state.get_balance(&params.caller) < params.value {
            return Entry::Done(CallOutcome::rejected(EvmError::InsufficientBalance, params.gas));
        }
        let nonce = self.state.get_nonce(&params.caller);
        if nonce == u64::MAX {
            return Entry::Done(CallOutcome::rejected(EvmError::NonceOverflow, params.gas));
        }
        self.state.set_nonce(params.caller, nonce + 1);

        let address = match &params.salt {
            None => create_address(&params.caller, nonce),
            Some(salt) => create2_address(&params.caller, salt, &keccak256(&params.init_code)),
        };
        if self.config.revision.has_access_lists() {
            self.state.add_address_to_access_list(address);
        }
        let existing_hash = self.state.get_code_hash(&address);
        if self.state.get_nonce(&address) != 0 || !(existing_hash.is_zero() || existing_hash == EMPTY_CODE_HASH) {
            debug!(%address, "create collision");
            return Entry::Done(CallOutcome::failed(EvmError::CreateCollision));
        }

        let snapshot = self.state.snapshot();
        self.state.create_account(address);
        self.state.set_nonce(address, 1);
        self.transfer(params.caller, address, params.value);

        let code = Arc::new(Code::decode(params.init_code, self.config.fusion));
        let call = CallContext {
            address,
            caller: params.caller,
            code_address: address,
            value: params.value,
            input: Vec::new(),
            gas: params.gas,
            is_static: false,
            depth: params.depth,
        };
        Entry::Frame(
            Interpreter::new(code, call),
            FrameGuard {
                snapshot,
                created: Some(address),
            },
        )
    }

    // Revert a failed frame; deploy the code of a successful create
    fn leave(&mut self, guard: FrameGuard, result: FrameResult) -> CallOutcome {
        if !result.status.is_success() {
            self.state.revert_to_snapshot(guard.snapshot);
            debug!(status = %result.status, gas_left = result.gas_left, "frame failed");
            return CallOutcome {
                status: result.status,
                output: result.output,
                gas_left: result.gas_left,
                created: None,
            };
        }
        let Some(address) = guard.created else {
            debug!(status = %result.status, gas_left = result.gas_left, "call finished");
            return CallOutcome {
                status: result.status,
                output: result.output,
                gas_left: result.gas_left,
                created: None,
            };
        };

        let deployed = result.output;
        let deposit = crate::gas::cost::CODE_DEPOSIT.saturating_mul(deployed.len() as u64);
        let rejected = if deployed.len() > self.config.max_code_size {
            Some(EvmError::MaxCodeSizeExceeded)
        } else if self.config.revision.rejects_ef_code() && deployed.first() == Some(&0xef) {
            Some(EvmError::InvalidCodePrefix)
        } else if deposit > result.gas_left {
            Some(EvmError::OutOfGas)
        } else {
            None
        };
        if let Some(err) = rejected {
            self.state.revert_to_snapshot(guard.snapshot);
            debug!(%address, error = %err, "code deposit rejected");
            return CallOutcome::failed(err);
        }

        self.state.set_code(address, deployed.clone());
        debug!(%address, size = deployed.len(), "contract deployed");
        CallOutcome {
            status: result.status,
            output: deployed,
            gas_left: result.gas_left - deposit,
            created: Some(address),
        }
    }

    fn transfer(&mut self, from: Address, to: Address, value: U256) {
        if value.is_zero() {
            return;
        }
        self.state.sub_balance(from, value);
        self.state.add_balance(to, value);
    }

    fn load_code(&mut self, address: &Address) -> Option<Arc<Code>> {
        let hash = self.state.get_code_hash(address);
        if hash.is_zero() || hash == EMPTY_CODE_HASH {
            return None;
        }
        let key = (hash, self.config.fusion);
        if let Some(code) = self.code_cache.get(&key) {
            return Some(Arc::clone(code));
        }
        let bytes = self.state.get_code(address);
        if bytes.is_empty() {
            return None;
        }
        let code = Arc::new(Code::decode(bytes, self.config.fusion));
        self.code_cache.insert(key, Arc::clone(&code));
        Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Revision;
    use lfvm_state::{Account, MemoryStateDb};

    const SENDER: Address = Address::from_bytes([0x01; 20]);
    const TARGET: Address = Address::from_bytes([0x02; 20]);

    fn funded() -> MemoryStateDb {
        let mut state = MemoryStateDb::new();
        state.insert_account(SENDER, Account::with_balance(U256::from(1_000_000u64)));
        state
    }

    fn run<T>(state: &mut MemoryStateDb, config: Config, f: impl FnOnce(&mut Evm<'_, MemoryStateDb>) -> T) -> T {
        let block = BlockContext::default();
        let tx = TxContext {
            origin: SENDER,
            ..Default::default()
        };
        let mut evm = Evm::new(state, &block, &tx, config);
        f(&mut evm)
    }

    #[test]
    fn test_plain_transfer() {
        let mut state = funded();
        let outcome = run(&mut state, Config::default(), |evm| {
            evm.call(SENDER, TARGET, U256::from(10u64), vec![], 50_000)
        });
        assert_eq!(outcome.status, Status::Stopped);
        assert_eq!(outcome.gas_left, 50_000);
        assert_eq!(state.get_balance(&TARGET), U256::from(10u64));
        assert_eq!(state.get_balance(&SENDER), U256::from(999_990u64));
    }

    #[test]
    fn test_zero_value_call_to_missing_account_creates_nothing() {
        let mut state = funded();
        let outcome = run(&mut state, Config::default(), |evm| {
            evm.call(SENDER, TARGET, U256::zero(), vec![], 50_000)
        });
        assert!(outcome.is_success());
        assert!(!state.exist(&TARGET));
    }

    #[test]
    fn test_insufficient_balance_returns_gas() {
        let mut state = MemoryStateDb::new();
        let outcome = run(&mut state, Config::default(), |evm| {
            evm.call(SENDER, TARGET, U256::one(), vec![], 50_000)
        });
        assert_eq!(outcome.status, Status::Failed(EvmError::InsufficientBalance));
        assert_eq!(outcome.gas_left, 50_000);
    }

    #[test]
    fn test_depth_limit() {
        let mut state = funded();
        let config = Config {
            max_call_depth: 3,
            ..Default::default()
        };
        let mut params = CallParams::new(CallKind::Call, SENDER, TARGET, U256::zero(), vec![], 1000);
        params.depth = 4;
        let outcome = run(&mut state, config, |evm| evm.execute_call(params));
        assert_eq!(outcome.status, Status::Failed(EvmError::CallDepthExceeded(3)));
        assert_eq!(outcome.gas_left, 1000);
    }

    #[test]
    fn test_failed_call_reverts_transfer() {
        let mut state = funded();
        state.insert_account(TARGET, Account::with_code(vec![0xfe]));
        let outcome = run(&mut state, Config::default(), |evm| {
            evm.call(SENDER, TARGET, U256::from(10u64), vec![], 50_000)
        });
        assert_eq!(outcome.status, Status::InvalidInstruction);
        assert_eq!(outcome.gas_left, 0);
        assert_eq!(state.get_balance(&TARGET), U256::zero());
        assert_eq!(state.get_balance(&SENDER), U256::from(1_000_000u64));
    }

    #[test]
    fn test_call_params_by_kind() {
        let delegate = CallParams::new(CallKind::DelegateCall, SENDER, TARGET, U256::zero(), vec![], 1);
        assert_eq!(delegate.address, SENDER);
        assert_eq!(delegate.code_address, TARGET);
        let stat = CallParams::new(CallKind::StaticCall, SENDER, TARGET, U256::zero(), vec![], 1);
        assert!(stat.is_static);
        assert_eq!(stat.address, TARGET);
    }

    // ==================== Create Tests ====================

    // Init code returning the single byte 0x00 as runtime code:
    // PUSH1 1 PUSH1 0 RETURN
    const INIT_ONE_BYTE: [u8; 5] = [0x60, 0x01, 0x60, 0x00, 0xf3];

    #[test]
    fn test_create_deploys_code() {
        let mut state = funded();
        let outcome = run(&mut state, Config::default(), |evm| {
            evm.create(SENDER, INIT_ONE_BYTE.to_vec(), 100_000, U256::from(5u64))
        });
        let address = create_address(&SENDER, 0);
        assert_eq!(outcome.created, Some(address));
        assert_eq!(state.get_code(&address), vec![0x00]);
        assert_eq!(state.get_nonce(&address), 1);
        assert_eq!(state.get_nonce(&SENDER), 1);
        assert_eq!(state.get_balance(&address), U256::from(5u64));
        // 3 + 3 + 3 (memory) + 200 deposit
        assert_eq!(outcome.gas_left, 100_000 - 209);
    }

    #[test]
    fn test_create2_address() {
        let mut state = funded();
        let salt = H256::from_bytes([0x42; 32]);
        let outcome = run(&mut state, Config::default(), |evm| {
            evm.create2(SENDER, INIT_ONE_BYTE.to_vec(), 100_000, U256::zero(), salt)
        });
        let expected = create2_address(&SENDER, &salt, &keccak256(&INIT_ONE_BYTE));
        assert_eq!(outcome.created, Some(expected));
    }

    #[test]
    fn test_create_collision() {
        let mut state = funded();
        let address = create_address(&SENDER, 0);
        state.insert_account(address, Account::with_code(vec![0x00]));
        let outcome = run(&mut state, Config::default(), |evm| {
            evm.create(SENDER, INIT_ONE_BYTE.to_vec(), 100_000, U256::zero())
        });
        assert_eq!(outcome.status, Status::Failed(EvmError::CreateCollision));
        assert_eq!(outcome.gas_left, 0);
        // the nonce bump survives
        assert_eq!(state.get_nonce(&SENDER), 1);
    }

    #[test]
    fn test_create_rejects_ef_prefix_on_london() {
        // PUSH1 0xef PUSH1 0 MSTORE8 PUSH1 1 PUSH1 0 RETURN
        let init = vec![0x60, 0xef, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xf3];
        let mut state = funded();
        let outcome = run(&mut state, Config::with_revision(Revision::London), |evm| {
            evm.create(SENDER, init.clone(), 100_000, U256::zero())
        });
        assert_eq!(outcome.status, Status::Failed(EvmError::InvalidCodePrefix));
        assert!(!state.exist(&create_address(&SENDER, 0)));

        let mut state = funded();
        let outcome = run(&mut state, Config::with_revision(Revision::Berlin), |evm| {
            evm.create(SENDER, init, 100_000, U256::zero())
        });
        assert!(outcome.is_success());
    }

    #[test]
    fn test_create_code_size_limit() {
        let mut state = funded();
        let config = Config {
            max_code_size: 0,
            ..Default::default()
        };
        let outcome = run(&mut state, config, |evm| {
            evm.create(SENDER, INIT_ONE_BYTE.to_vec(), 100_000, U256::zero())
        });
        assert_eq!(outcome.status, Status::Failed(EvmError::MaxCodeSizeExceeded));
    }

    #[test]
    fn test_create_deposit_out_of_gas() {
        let mut state = funded();
        let outcome = run(&mut state, Config::default(), |evm| {
            evm.create(SENDER, INIT_ONE_BYTE.to_vec(), 9 + 199, U256::zero())
        });
        assert_eq!(outcome.status, Status::Failed(EvmError::OutOfGas));
        assert_eq!(outcome.gas_left, 0);
        assert!(!state.exist(&create_address(&SENDER, 0)));
    }

    // ==================== Transaction Tests ====================

    #[test]
    fn test_transact_call_reports_gas_used() {
        let mut state = funded();
        // PUSH1 1 PUSH1 0 SSTORE STOP
        state.insert_account(TARGET, Account::with_code(vec![0x60, 0x01, 0x60, 0x00, 0x55, 0x00]));
        let result = run(&mut state, Config::default(), |evm| {
            evm.transact_call(SENDER, TARGET, U256::zero(), vec![], 100_000)
        });
        assert!(result.is_success());
        // target is warm; slot 0 is cold
        assert_eq!(result.gas_used, 6 + 2100 + 20000);
        assert_eq!(result.gas_left, 100_000 - result.gas_used);
    }

    #[test]
    fn test_transact_create() {
        let mut state = funded();
        let result = run(&mut state, Config::default(), |evm| {
            evm.transact_create(SENDER, INIT_ONE_BYTE.to_vec(), 100_000, U256::zero())
        });
        assert!(result.is_success());
        assert_eq!(result.created_address, Some(create_address(&SENDER, 0)));
        assert_eq!(result.output, vec![0x00]);
    }
}
