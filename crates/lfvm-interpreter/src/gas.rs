//! Gas metering and cost calculations

use crate::config::Revision;
use crate::error::{EvmError, EvmResult};
use crate::opcode::Opcode;
use crate::word::Word;
use lfvm_primitives::H256;

/// Gas costs for EVM operations
pub mod cost {
    /// Zero gas
    pub const ZERO: u64 = 0;
    /// Base gas
    pub const BASE: u64 = 2;
    /// Very low gas
    pub const VERYLOW: u64 = 3;
    /// Low gas
    pub const LOW: u64 = 5;
    /// Mid gas
    pub const MID: u64 = 8;
    /// High gas
    pub const HIGH: u64 = 10;
    /// JUMPDEST gas
    pub const JUMPDEST: u64 = 1;
    /// EXP base gas
    pub const EXP: u64 = 10;
    /// EXP per byte of exponent
    pub const EXP_BYTE: u64 = 50;
    /// KECCAK256 base gas
    pub const SHA3: u64 = 30;
    /// KECCAK256 per word
    pub const SHA3_WORD: u64 = 6;
    /// BLOCKHASH gas
    pub const BLOCKHASH: u64 = 20;

    /// Warm account or slot read (EIP-2929)
    pub const WARM_STORAGE_READ: u64 = 100;
    /// Cold account access (EIP-2929)
    pub const COLD_ACCOUNT_ACCESS: u64 = 2600;
    /// Cold slot read (EIP-2929)
    pub const COLD_SLOAD: u64 = 2100;
    /// Account access before access lists (EIP-1884)
    pub const ISTANBUL_ACCOUNT_ACCESS: u64 = 700;
    /// SLOAD before access lists (EIP-1884)
    pub const ISTANBUL_SLOAD: u64 = 800;

    /// SSTORE from zero to non-zero
    pub const SSTORE_SET: u64 = 20000;
    /// SSTORE of a non-zero slot (EIP-2200)
    pub const SSTORE_RESET: u64 = 5000;
    /// SSTORE of a non-zero slot with access lists: 5000 - COLD_SLOAD
    pub const SSTORE_RESET_BERLIN: u64 = 2900;
    /// Refund for clearing a slot before London
    pub const SSTORE_CLEAR_REFUND: u64 = 15000;
    /// Refund for clearing a slot (EIP-3529)
    pub const SSTORE_CLEAR_REFUND_LONDON: u64 = 4800;
    /// SSTORE fails when no more than this is left (EIP-2200)
    pub const SSTORE_SENTRY: u64 = 2300;

    /// LOG base gas
    pub const LOG: u64 = 375;
    /// LOG per topic
    pub const LOG_TOPIC: u64 = 375;
    /// LOG per data byte
    pub const LOG_DATA: u64 = 8;

    /// CREATE gas
    pub const CREATE: u64 = 32000;
    /// CREATE2 gas
    pub const CREATE2: u64 = 32000;
    /// CREATE2 hashing per init-code word
    pub const CREATE2_WORD: u64 = 6;
    /// Init-code per word (EIP-3860)
    pub const INITCODE_WORD: u64 = 2;
    /// Code deposit per byte
    pub const CODE_DEPOSIT: u64 = 200;

    /// CALL with non-zero value
    pub const CALL_VALUE: u64 = 9000;
    /// CALL to an empty account with value
    pub const CALL_NEW_ACCOUNT: u64 = 25000;
    /// Stipend handed to the callee with value
    pub const CALL_STIPEND: u64 = 2300;

    /// Memory per word
    pub const MEMORY: u64 = 3;
    /// Copy per word
    pub const COPY: u64 = 3;

    /// SELFDESTRUCT gas
    pub const SELFDESTRUCT: u64 = 5000;
    /// SELFDESTRUCT to an empty account with balance
    pub const SELFDESTRUCT_NEW_ACCOUNT: u64 = 25000;
    /// SELFDESTRUCT refund before London
    pub const SELFDESTRUCT_REFUND: u64 = 24000;

    /// Max call depth
    pub const MAX_CALL_DEPTH: usize = 1024;
    /// Max stack size
    pub const MAX_STACK_SIZE: usize = 1024;
    /// Max contract code size (EIP-170)
    pub const MAX_CODE_SIZE: usize = 24576;
    /// Max init code size (EIP-3860)
    pub const MAX_INIT_CODE_SIZE: usize = 49152;
}

/// Get static gas cost for an opcode.
///
/// Account and slot accesses are priced warm here; the handlers add the
/// cold or pre-Berlin surcharge.
pub fn static_gas(opcode: Opcode) -> u64 {
    match opcode {
        // Zero cost
        Opcode::STOP | Opcode::RETURN | Opcode::REVERT | Opcode::SSTORE | Opcode::INVALID => {
            cost::ZERO
        }

        // Base cost (2)
        Opcode::ADDRESS | Opcode::ORIGIN | Opcode::CALLER | Opcode::CALLVALUE |
        Opcode::CALLDATASIZE | Opcode::CODESIZE | Opcode::GASPRICE |
        Opcode::COINBASE | Opcode::TIMESTAMP | Opcode::NUMBER |
        Opcode::PREVRANDAO | Opcode::GASLIMIT | Opcode::CHAINID |
        Opcode::RETURNDATASIZE | Opcode::POP | Opcode::PC |
        Opcode::MSIZE | Opcode::GAS | Opcode::BASEFEE | Opcode::PUSH0 => cost::BASE,

        // Low cost (5)
        Opcode::MUL | Opcode::DIV | Opcode::SDIV | Opcode::MOD |
        Opcode::SMOD | Opcode::SIGNEXTEND | Opcode::SELFBALANCE => cost::LOW,

        // Mid cost (8)
        Opcode::ADDMOD | Opcode::MULMOD | Opcode::JUMP => cost::MID,

        // High cost (10)
        Opcode::JUMPI => cost::HIGH,

        Opcode::JUMPDEST => cost::JUMPDEST,

        // Base part of dynamic costs
        Opcode::EXP => cost::EXP,
        Opcode::KECCAK256 => cost::SHA3,
        Opcode::BLOCKHASH => cost::BLOCKHASH,
        Opcode::BALANCE | Opcode::EXTCODESIZE | Opcode::EXTCODECOPY |
        Opcode::EXTCODEHASH | Opcode::SLOAD => cost::WARM_STORAGE_READ,
        Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL |
        Opcode::STATICCALL => cost::WARM_STORAGE_READ,
        Opcode::LOG0 | Opcode::LOG1 | Opcode::LOG2 | Opcode::LOG3 | Opcode::LOG4 => {
            cost::LOG + cost::LOG_TOPIC * opcode.log_topics() as u64
        }
        Opcode::CREATE => cost::CREATE,
        Opcode::CREATE2 => cost::CREATE2,
        Opcode::SELFDESTRUCT => cost::SELFDESTRUCT,

        // Very low cost (3): remaining arithmetic, comparison, memory,
        // copy base, PUSH1..32, DUP, SWAP
        _ => cost::VERYLOW,
    }
}

/// Extra gas for touching an account beyond the warm base price
pub fn account_access_surcharge(revision: Revision, warm: bool) -> u64 {
    if !revision.has_access_lists() {
        cost::ISTANBUL_ACCOUNT_ACCESS - cost::WARM_STORAGE_READ
    } else if warm {
        0
    } else {
        cost::COLD_ACCOUNT_ACCESS - cost::WARM_STORAGE_READ
    }
}

/// Extra gas for SLOAD beyond the warm base price
pub fn sload_surcharge(revision: Revision, warm: bool) -> u64 {
    if !revision.has_access_lists() {
        cost::ISTANBUL_SLOAD - cost::WARM_STORAGE_READ
    } else if warm {
        0
    } else {
        cost::COLD_SLOAD - cost::WARM_STORAGE_READ
    }
}

/// Remaining gas of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMeter {
    remaining: u64,
}

impl GasMeter {
    /// Meter holding `limit`
    pub fn new(limit: u64) -> Self {
        Self { remaining: limit }
    }

    /// Gas left
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Deduct `amount` if available; nothing is deducted on failure
    #[inline]
    pub fn use_gas(&mut self, amount: u64) -> bool {
        match self.remaining.checked_sub(amount) {
            Some(left) => {
                self.remaining = left;
                true
            }
            None => false,
        }
    }

    /// [`use_gas`](Self::use_gas) mapped to [`EvmError::OutOfGas`]
    #[inline]
    pub fn charge(&mut self, amount: u64) -> EvmResult<()> {
        if self.use_gas(amount) {
            Ok(())
        } else {
            Err(EvmError::OutOfGas)
        }
    }

    /// Return unused gas from a nested frame
    pub fn refund_gas(&mut self, amount: u64) {
        self.remaining = self.remaining.saturating_add(amount);
    }

    /// Drop everything that is left
    pub fn consume_all(&mut self) {
        self.remaining = 0;
    }
}

fn words(len: u64) -> u64 {
    len / 32 + u64::from(len % 32 != 0)
}

/// Total cost of holding `words` words of memory, `3w + w²/512`
pub fn memory_cost(words: u64) -> u64 {
    let w = u128::from(words);
    let total = u128::from(cost::MEMORY) * w + w * w / 512;
    u64::try_from(total).unwrap_or(u64::MAX)
}

/// Calculate copy cost (for CALLDATACOPY, CODECOPY, etc.)
pub fn copy_gas(length: u64) -> u64 {
    cost::COPY.saturating_mul(words(length))
}

/// Per-byte part of EXP
pub fn exp_byte_gas(exponent: &Word) -> u64 {
    cost::EXP_BYTE * crate::word::byte_len(exponent)
}

/// Per-word part of KECCAK256
pub fn sha3_word_gas(length: u64) -> u64 {
    cost::SHA3_WORD.saturating_mul(words(length))
}

/// Per-byte part of LOG
pub fn log_data_gas(length: u64) -> u64 {
    cost::LOG_DATA.saturating_mul(length)
}

/// Per-word cost of init code: EIP-3860 on Shanghai plus hashing for CREATE2
pub fn initcode_gas(revision: Revision, length: u64, hashed: bool) -> u64 {
    let mut per_word = 0;
    if revision.is_shanghai() {
        per_word += cost::INITCODE_WORD;
    }
    if hashed {
        per_word += cost::CREATE2_WORD;
    }
    per_word.saturating_mul(words(length))
}

/// Gas forwarded to a nested call.
///
/// `available` is what the caller holds, `base` the part of the call cost
/// already computed (memory, value, new account). With `retain` the
/// request is capped at all but one 64th of what is left after `base`.
pub fn call_gas(available: u64, base: u64, requested: &Word, retain: bool) -> EvmResult<u64> {
    if retain {
        let left = available.checked_sub(base).ok_or(EvmError::OutOfGas)?;
        let cap = left - left / 64;
        if requested.bits() > 64 || requested.low_u64() > cap {
            return Ok(cap);
        }
        return Ok(requested.low_u64());
    }
    if requested.bits() > 64 {
        return Err(EvmError::OutOfGas);
    }
    Ok(requested.low_u64())
}

/// Gas left to a CREATE frame after the caller's share is retained
pub fn create_gas(available: u64, retain: bool) -> u64 {
    if retain {
        available - available / 64
    } else {
        available
    }
}

/// Charge and refund delta of one SSTORE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SstoreCost {
    /// Gas to charge
    pub gas: u64,
    /// Signed change of the refund counter
    pub refund: i64,
}

/// Net-metered SSTORE cost (EIP-2200, EIP-2929, EIP-3529)
pub fn sstore_cost(
    revision: Revision,
    original: &H256,
    current: &H256,
    new: &H256,
    cold: bool,
) -> SstoreCost {
    let (sload, reset, clear_refund) = match revision {
        Revision::Istanbul => (
            cost::ISTANBUL_SLOAD,
            cost::SSTORE_RESET,
            cost::SSTORE_CLEAR_REFUND,
        ),
        Revision::Berlin => (
            cost::WARM_STORAGE_READ,
            cost::SSTORE_RESET_BERLIN,
            cost::SSTORE_CLEAR_REFUND,
        ),
        Revision::London | Revision::Shanghai => (
            cost::WARM_STORAGE_READ,
            cost::SSTORE_RESET_BERLIN,
            cost::SSTORE_CLEAR_REFUND_LONDON,
        ),
    };
    let clear_refund = clear_refund as i64;

    let mut gas = if cold && revision.has_access_lists() {
        cost::COLD_SLOAD
    } else {
        0
    };
    let mut refund = 0i64;

    // no-op write
    if current == new {
        return SstoreCost {
            gas: gas + sload,
            refund,
        };
    }

    // clean slot
    if original == current {
        if original.is_zero() {
            gas += cost::SSTORE_SET;
        } else {
            if new.is_zero() {
                refund += clear_refund;
            }
            gas += reset;
        }
        return SstoreCost { gas, refund };
    }

    // dirty slot
    if !original.is_zero() {
        if current.is_zero() {
            refund -= clear_refund;
        } else if new.is_zero() {
            refund += clear_refund;
        }
    }
    if original == new {
        if original.is_zero() {
            refund += (cost::SSTORE_SET - sload) as i64;
        } else {
            refund += (reset - sload) as i64;
        }
    }
    SstoreCost {
        gas: gas + sload,
        refund,
    }
}
