//! Opcode definitions and the super-instruction set

use std::fmt;

/// EVM opcodes (see Yellow Paper Appendix H)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    // Stop and Arithmetic
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0A,
    SIGNEXTEND = 0x0B,

    // Comparison & Bitwise Logic
    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1A,
    SHL = 0x1B,
    SHR = 0x1C,
    SAR = 0x1D,

    KECCAK256 = 0x20,

    // Environmental Information
    ADDRESS = 0x30,
    BALANCE = 0x31,
    ORIGIN = 0x32,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,
    CALLDATACOPY = 0x37,
    CODESIZE = 0x38,
    CODECOPY = 0x39,
    GASPRICE = 0x3A,
    EXTCODESIZE = 0x3B,
    EXTCODECOPY = 0x3C,
    RETURNDATASIZE = 0x3D,
    RETURNDATACOPY = 0x3E,
    EXTCODEHASH = 0x3F,

    // Block Information
    BLOCKHASH = 0x40,
    COINBASE = 0x41,
    TIMESTAMP = 0x42,
    NUMBER = 0x43,
    PREVRANDAO = 0x44,
    GASLIMIT = 0x45,
    CHAINID = 0x46,
    SELFBALANCE = 0x47,
    BASEFEE = 0x48,

    // Stack, Memory, Storage and Flow Operations
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5A,
    JUMPDEST = 0x5B,
    PUSH0 = 0x5F,

    // Push Operations
    PUSH1 = 0x60,
    PUSH2 = 0x61,
    PUSH3 = 0x62,
    PUSH4 = 0x63,
    PUSH5 = 0x64,
    PUSH6 = 0x65,
    PUSH7 = 0x66,
    PUSH8 = 0x67,
    PUSH9 = 0x68,
    PUSH10 = 0x69,
    PUSH11 = 0x6A,
    PUSH12 = 0x6B,
    PUSH13 = 0x6C,
    PUSH14 = 0x6D,
    PUSH15 = 0x6E,
    PUSH16 = 0x6F,
    PUSH17 = 0x70,
    PUSH18 = 0x71,
    PUSH19 = 0x72,
    PUSH20 = 0x73,
    PUSH21 = 0x74,
    PUSH22 = 0x75,
    PUSH23 = 0x76,
    PUSH24 = 0x77,
    PUSH25 = 0x78,
    PUSH26 = 0x79,
    PUSH27 = 0x7A,
    PUSH28 = 0x7B,
    PUSH29 = 0x7C,
    PUSH30 = 0x7D,
    PUSH31 = 0x7E,
    PUSH32 = 0x7F,

    // Dup Operations
    DUP1 = 0x80,
    DUP2 = 0x81,
    DUP3 = 0x82,
    DUP4 = 0x83,
    DUP5 = 0x84,
    DUP6 = 0x85,
    DUP7 = 0x86,
    DUP8 = 0x87,
    DUP9 = 0x88,
    DUP10 = 0x89,
    DUP11 = 0x8A,
    DUP12 = 0x8B,
    DUP13 = 0x8C,
    DUP14 = 0x8D,
    DUP15 = 0x8E,
    DUP16 = 0x8F,

    // Swap Operations
    SWAP1 = 0x90,
    SWAP2 = 0x91,
    SWAP3 = 0x92,
    SWAP4 = 0x93,
    SWAP5 = 0x94,
    SWAP6 = 0x95,
    SWAP7 = 0x96,
    SWAP8 = 0x97,
    SWAP9 = 0x98,
    SWAP10 = 0x99,
    SWAP11 = 0x9A,
    SWAP12 = 0x9B,
    SWAP13 = 0x9C,
    SWAP14 = 0x9D,
    SWAP15 = 0x9E,
    SWAP16 = 0x9F,

    // Logging
    LOG0 = 0xA0,
    LOG1 = 0xA1,
    LOG2 = 0xA2,
    LOG3 = 0xA3,
    LOG4 = 0xA4,

    // System Operations
    CREATE = 0xF0,
    CALL = 0xF1,
    CALLCODE = 0xF2,
    RETURN = 0xF3,
    DELEGATECALL = 0xF4,
    CREATE2 = 0xF5,
    STATICCALL = 0xFA,
    REVERT = 0xFD,
    INVALID = 0xFE,
    SELFDESTRUCT = 0xFF,
}

const PUSH_OPS: [Opcode; 32] = [
    Opcode::PUSH1, Opcode::PUSH2, Opcode::PUSH3, Opcode::PUSH4,
    Opcode::PUSH5, Opcode::PUSH6, Opcode::PUSH7, Opcode::PUSH8,
    Opcode::PUSH9, Opcode::PUSH10, Opcode::PUSH11, Opcode::PUSH12,
    Opcode::PUSH13, Opcode::PUSH14, Opcode::PUSH15, Opcode::PUSH16,
    Opcode::PUSH17, Opcode::PUSH18, Opcode::PUSH19, Opcode::PUSH20,
    Opcode::PUSH21, Opcode::PUSH22, Opcode::PUSH23, Opcode::PUSH24,
    Opcode::PUSH25, Opcode::PUSH26, Opcode::PUSH27, Opcode::PUSH28,
    Opcode::PUSH29, Opcode::PUSH30, Opcode::PUSH31, Opcode::PUSH32,
];

const DUP_OPS: [Opcode; 16] = [
    Opcode::DUP1, Opcode::DUP2, Opcode::DUP3, Opcode::DUP4,
    Opcode::DUP5, Opcode::DUP6, Opcode::DUP7, Opcode::DUP8,
    Opcode::DUP9, Opcode::DUP10, Opcode::DUP11, Opcode::DUP12,
    Opcode::DUP13, Opcode::DUP14, Opcode::DUP15, Opcode::DUP16,
];

const SWAP_OPS: [Opcode; 16] = [
    Opcode::SWAP1, Opcode::SWAP2, Opcode::SWAP3, Opcode::SWAP4,
    Opcode::SWAP5, Opcode::SWAP6, Opcode::SWAP7, Opcode::SWAP8,
    Opcode::SWAP9, Opcode::SWAP10, Opcode::SWAP11, Opcode::SWAP12,
    Opcode::SWAP13, Opcode::SWAP14, Opcode::SWAP15, Opcode::SWAP16,
];

impl Opcode {
    /// Decode a byte, `None` for undefined opcodes
    pub fn from_byte(byte: u8) -> Option<Self> {
        let op = match byte {
            0x00 => Self::STOP,
            0x01 => Self::ADD,
            0x02 => Self::MUL,
            0x03 => Self::SUB,
            0x04 => Self::DIV,
            0x05 => Self::SDIV,
            0x06 => Self::MOD,
            0x07 => Self::SMOD,
            0x08 => Self::ADDMOD,
            0x09 => Self::MULMOD,
            0x0A => Self::EXP,
            0x0B => Self::SIGNEXTEND,
            0x10 => Self::LT,
            0x11 => Self::GT,
            0x12 => Self::SLT,
            0x13 => Self::SGT,
            0x14 => Self::EQ,
            0x15 => Self::ISZERO,
            0x16 => Self::AND,
            0x17 => Self::OR,
            0x18 => Self::XOR,
            0x19 => Self::NOT,
            0x1A => Self::BYTE,
            0x1B => Self::SHL,
            0x1C => Self::SHR,
            0x1D => Self::SAR,
            0x20 => Self::KECCAK256,
            0x30 => Self::ADDRESS,
            0x31 => Self::BALANCE,
            0x32 => Self::ORIGIN,
            0x33 => Self::CALLER,
            0x34 => Self::CALLVALUE,
            0x35 => Self::CALLDATALOAD,
            0x36 => Self::CALLDATASIZE,
            0x37 => Self::CALLDATACOPY,
            0x38 => Self::CODESIZE,
            0x39 => Self::CODECOPY,
            0x3A => Self::GASPRICE,
            0x3B => Self::EXTCODESIZE,
            0x3C => Self::EXTCODECOPY,
            0x3D => Self::RETURNDATASIZE,
            0x3E => Self::RETURNDATACOPY,
            0x3F => Self::EXTCODEHASH,
            0x40 => Self::BLOCKHASH,
            0x41 => Self::COINBASE,
            0x42 => Self::TIMESTAMP,
            0x43 => Self::NUMBER,
            0x44 => Self::PREVRANDAO,
            0x45 => Self::GASLIMIT,
            0x46 => Self::CHAINID,
            0x47 => Self::SELFBALANCE,
            0x48 => Self::BASEFEE,
            0x50 => Self::POP,
            0x51 => Self::MLOAD,
            0x52 => Self::MSTORE,
            0x53 => Self::MSTORE8,
            0x54 => Self::SLOAD,
            0x55 => Self::SSTORE,
            0x56 => Self::JUMP,
            0x57 => Self::JUMPI,
            0x58 => Self::PC,
            0x59 => Self::MSIZE,
            0x5A => Self::GAS,
            0x5B => Self::JUMPDEST,
            0x5F => Self::PUSH0,
            0x60..=0x7F => PUSH_OPS[(byte - 0x60) as usize],
            0x80..=0x8F => DUP_OPS[(byte - 0x80) as usize],
            0x90..=0x9F => SWAP_OPS[(byte - 0x90) as usize],
            0xA0 => Self::LOG0,
            0xA1 => Self::LOG1,
            0xA2 => Self::LOG2,
            0xA3 => Self::LOG3,
            0xA4 => Self::LOG4,
            0xF0 => Self::CREATE,
            0xF1 => Self::CALL,
            0xF2 => Self::CALLCODE,
            0xF3 => Self::RETURN,
            0xF4 => Self::DELEGATECALL,
            0xF5 => Self::CREATE2,
            0xFA => Self::STATICCALL,
            0xFD => Self::REVERT,
            0xFE => Self::INVALID,
            0xFF => Self::SELFDESTRUCT,
            _ => return None,
        };
        Some(op)
    }

    /// Raw byte value
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Get PUSH operand size (1-32 for PUSH1-PUSH32, 0 otherwise)
    pub fn push_size(self) -> usize {
        let byte = self as u8;
        if (0x60..=0x7F).contains(&byte) {
            (byte - 0x5F) as usize
        } else {
            0
        }
    }

    /// Check if this is a PUSH opcode (PUSH0 included)
    pub fn is_push(self) -> bool {
        (0x5F..=0x7F).contains(&(self as u8))
    }

    /// Get DUP depth (1-16 for DUP1-DUP16, 0 otherwise)
    pub fn dup_depth(self) -> usize {
        let byte = self as u8;
        if (0x80..=0x8F).contains(&byte) {
            (byte - 0x7F) as usize
        } else {
            0
        }
    }

    /// Get SWAP depth (1-16 for SWAP1-SWAP16, 0 otherwise)
    pub fn swap_depth(self) -> usize {
        let byte = self as u8;
        if (0x90..=0x9F).contains(&byte) {
            (byte - 0x8F) as usize
        } else {
            0
        }
    }

    /// Get LOG topic count (0-4 for LOG0-LOG4, 0 otherwise)
    pub fn log_topics(self) -> usize {
        let byte = self as u8;
        if (0xA0..=0xA4).contains(&byte) {
            (byte - 0xA0) as usize
        } else {
            0
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A decoded operation: a single opcode, an undefined byte, or a fused
/// super-instruction standing for a fixed opcode sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Op {
    /// One defined opcode
    Basic(Opcode),
    /// Undefined byte; executing it fails the frame
    Invalid(u8),

    Swap1Pop,
    Swap2Pop,
    Push1Push1,
    Push1Add,
    Push1Shl,
    Push1Dup1,
    Push2Jump,
    Push2Jumpi,
    Swap2Swap1,
    Dup2Mstore,
    Dup2Lt,
    PopPop,
    PopJump,
    IsZeroPush2Jumpi,
    Swap2Swap1PopJump,
    Swap1PopSwap2Swap1,
    PopSwap2Swap1Pop,
    Push1Push4Dup3,
    AndSwap1PopSwap2Swap1,
    Push1Push1Push1ShlSub,
}

impl Op {
    /// Every super-instruction, longest sequence first
    pub const FUSED: [Op; 20] = [
        Op::Swap2Swap1PopJump,
        Op::Swap1PopSwap2Swap1,
        Op::PopSwap2Swap1Pop,
        Op::AndSwap1PopSwap2Swap1,
        Op::Push1Push1Push1ShlSub,
        Op::IsZeroPush2Jumpi,
        Op::Push1Push4Dup3,
        Op::Swap1Pop,
        Op::Swap2Pop,
        Op::Push1Push1,
        Op::Push1Add,
        Op::Push1Shl,
        Op::Push1Dup1,
        Op::Push2Jump,
        Op::Push2Jumpi,
        Op::Swap2Swap1,
        Op::Dup2Mstore,
        Op::Dup2Lt,
        Op::PopPop,
        Op::PopJump,
    ];

    /// The opcode sequence this operation stands for. Empty for `Invalid`.
    pub fn components(&self) -> &'static [Opcode] {
        use Opcode::*;
        match self {
            Op::Basic(op) => basic_slice(*op),
            Op::Invalid(_) => &[],
            Op::Swap1Pop => &[SWAP1, POP],
            Op::Swap2Pop => &[SWAP2, POP],
            Op::Push1Push1 => &[PUSH1, PUSH1],
            Op::Push1Add => &[PUSH1, ADD],
            Op::Push1Shl => &[PUSH1, SHL],
            Op::Push1Dup1 => &[PUSH1, DUP1],
            Op::Push2Jump => &[PUSH2, JUMP],
            Op::Push2Jumpi => &[PUSH2, JUMPI],
            Op::Swap2Swap1 => &[SWAP2, SWAP1],
            Op::Dup2Mstore => &[DUP2, MSTORE],
            Op::Dup2Lt => &[DUP2, LT],
            Op::PopPop => &[POP, POP],
            Op::PopJump => &[POP, JUMP],
            Op::IsZeroPush2Jumpi => &[ISZERO, PUSH2, JUMPI],
            Op::Swap2Swap1PopJump => &[SWAP2, SWAP1, POP, JUMP],
            Op::Swap1PopSwap2Swap1 => &[SWAP1, POP, SWAP2, SWAP1],
            Op::PopSwap2Swap1Pop => &[POP, SWAP2, SWAP1, POP],
            Op::Push1Push4Dup3 => &[PUSH1, PUSH4, DUP3],
            Op::AndSwap1PopSwap2Swap1 => &[AND, SWAP1, POP, SWAP2, SWAP1],
            Op::Push1Push1Push1ShlSub => &[PUSH1, PUSH1, PUSH1, SHL, SUB],
        }
    }

    /// Whether this is a super-instruction
    pub fn is_fused(&self) -> bool {
        !matches!(self, Op::Basic(_) | Op::Invalid(_))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Basic(op) => write!(f, "{}", op),
            Op::Invalid(byte) => write!(f, "INVALID(0x{:02x})", byte),
            fused => {
                let names: Vec<String> = fused.components().iter().map(|o| o.to_string()).collect();
                write!(f, "{}", names.join("+"))
            }
        }
    }
}

// Every defined opcode at its own byte, so `components` can hand out a
// `'static` one-element slice for basic operations.
static BY_BYTE: [Opcode; 256] = {
    let mut table = [Opcode::INVALID; 256];
    let mut i = 0;
    while i < NAMED.len() {
        table[NAMED[i] as usize] = NAMED[i];
        i += 1;
    }
    let mut i = 0;
    while i < 32 {
        table[PUSH_OPS[i] as usize] = PUSH_OPS[i];
        if i < 16 {
            table[DUP_OPS[i] as usize] = DUP_OPS[i];
            table[SWAP_OPS[i] as usize] = SWAP_OPS[i];
        }
        i += 1;
    }
    table
};

fn basic_slice(op: Opcode) -> &'static [Opcode] {
    std::slice::from_ref(&BY_BYTE[op as usize])
}

const NAMED: [Opcode; 80] = {
    use Opcode::*;
    [
        STOP, ADD, MUL, SUB, DIV, SDIV, MOD, SMOD, ADDMOD, MULMOD, EXP, SIGNEXTEND,
        LT, GT, SLT, SGT, EQ, ISZERO, AND, OR, XOR, NOT, BYTE, SHL, SHR, SAR,
        KECCAK256,
        ADDRESS, BALANCE, ORIGIN, CALLER, CALLVALUE, CALLDATALOAD, CALLDATASIZE,
        CALLDATACOPY, CODESIZE, CODECOPY, GASPRICE, EXTCODESIZE, EXTCODECOPY,
        RETURNDATASIZE, RETURNDATACOPY, EXTCODEHASH,
        BLOCKHASH, COINBASE, TIMESTAMP, NUMBER, PREVRANDAO, GASLIMIT, CHAINID,
        SELFBALANCE, BASEFEE,
        POP, MLOAD, MSTORE, MSTORE8, SLOAD, SSTORE, JUMP, JUMPI, PC, MSIZE, GAS,
        JUMPDEST, PUSH0,
        LOG0, LOG1, LOG2, LOG3, LOG4,
        CREATE, CALL, CALLCODE, RETURN, DELEGATECALL, CREATE2, STATICCALL, REVERT,
        INVALID, SELFDESTRUCT,
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_size() {
        assert_eq!(Opcode::PUSH0.push_size(), 0);
        assert_eq!(Opcode::PUSH1.push_size(), 1);
        assert_eq!(Opcode::PUSH32.push_size(), 32);
        assert_eq!(Opcode::ADD.push_size(), 0);
    }

    #[test]
    fn test_dup_swap_depth() {
        assert_eq!(Opcode::DUP1.dup_depth(), 1);
        assert_eq!(Opcode::DUP16.dup_depth(), 16);
        assert_eq!(Opcode::SWAP1.swap_depth(), 1);
        assert_eq!(Opcode::SWAP16.swap_depth(), 16);
        assert_eq!(Opcode::ADD.dup_depth(), 0);
        assert_eq!(Opcode::ADD.swap_depth(), 0);
    }

    #[test]
    fn test_log_topics() {
        assert_eq!(Opcode::LOG0.log_topics(), 0);
        assert_eq!(Opcode::LOG4.log_topics(), 4);
        assert_eq!(Opcode::STOP.log_topics(), 0);
    }

    #[test]
    fn test_from_byte_invalid() {
        for byte in [0x0C, 0x1E, 0x21, 0x49, 0x5C, 0x5D, 0x5E, 0xA5, 0xEF, 0xF6, 0xFB] {
            assert_eq!(Opcode::from_byte(byte), None, "byte 0x{:02x}", byte);
        }
    }

    #[test]
    fn test_all_valid_opcodes_roundtrip() {
        let mut defined = 0;
        for byte in 0..=255u8 {
            if let Some(op) = Opcode::from_byte(byte) {
                assert_eq!(op.byte(), byte);
                defined += 1;
            }
        }
        // 80 named + 32 PUSH + 16 DUP + 16 SWAP
        assert_eq!(defined, 144);
    }

    // ==================== Super-instruction Tests ====================

    #[test]
    fn test_basic_components() {
        for byte in 0..=255u8 {
            if let Some(op) = Opcode::from_byte(byte) {
                assert_eq!(Op::Basic(op).components(), &[op]);
            }
        }
        assert!(Op::Invalid(0x0C).components().is_empty());
    }

    #[test]
    fn test_fused_components() {
        assert_eq!(
            Op::IsZeroPush2Jumpi.components(),
            &[Opcode::ISZERO, Opcode::PUSH2, Opcode::JUMPI]
        );
        for op in Op::FUSED {
            assert!(op.is_fused());
            assert!(op.components().len() >= 2);
            assert!(!op.components().contains(&Opcode::JUMPDEST));
        }
    }

    #[test]
    fn test_fused_sorted_longest_first() {
        let lens: Vec<usize> = Op::FUSED.iter().map(|op| op.components().len()).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Op::Basic(Opcode::PUSH1).to_string(), "PUSH1");
        assert_eq!(Op::Push1Add.to_string(), "PUSH1+ADD");
        assert_eq!(Op::Invalid(0xef).to_string(), "INVALID(0xef)");
    }
}
