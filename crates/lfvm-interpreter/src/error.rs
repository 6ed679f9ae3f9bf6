//! Error types for the interpreter

use thiserror::Error;

/// Reasons a frame can fail
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Jump to a location that is not a JUMPDEST
    #[error("invalid jump destination: {0}")]
    InvalidJump(usize),

    /// Undefined or unavailable opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// State modification attempted in static context
    #[error("state modification in static call")]
    StaticCallViolation,

    /// RETURNDATACOPY beyond the last call's output
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// CREATE target already has code or nonce
    #[error("contract address collision")]
    CreateCollision,

    /// Deployed code larger than the configured limit
    #[error("max code size exceeded")]
    MaxCodeSizeExceeded,

    /// Deployed code starting with 0xEF
    #[error("invalid code: must not begin with 0xef")]
    InvalidCodePrefix,

    /// Call depth limit reached
    #[error("call depth exceeded (max {0})")]
    CallDepthExceeded(usize),

    /// Caller cannot cover the transferred value
    #[error("insufficient balance for transfer")]
    InsufficientBalance,

    /// Creator nonce at its maximum
    #[error("nonce overflow")]
    NonceOverflow,
}

/// Result type for interpreter operations
pub type EvmResult<T> = Result<T, EvmError>;
