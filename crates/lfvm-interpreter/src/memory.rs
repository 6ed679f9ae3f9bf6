//! Linear memory
//!
//! Byte-addressable, grows in 32-byte words and never shrinks. Growth is
//! paid for through the frame's [`GasMeter`] before it happens.

use crate::error::{EvmError, EvmResult};
use crate::gas::{memory_cost, GasMeter};
use crate::word::Word;

/// Turn an (offset, length) operand pair into native integers.
///
/// A zero length yields `(0, 0)` whatever the offset. A range whose end
/// does not fit in 64 bits can never be paid for and is out of gas.
pub fn memory_range(offset: &Word, len: &Word) -> EvmResult<(u64, u64)> {
    if len.is_zero() {
        return Ok((0, 0));
    }
    if offset.bits() > 64 || len.bits() > 64 {
        return Err(EvmError::OutOfGas);
    }
    let (offset, len) = (offset.low_u64(), len.low_u64());
    offset.checked_add(len).ok_or(EvmError::OutOfGas)?;
    Ok((offset, len))
}

/// Largest memory a frame may grow to; the cost of anything bigger does not
/// fit in 64 bits of gas
pub const MAX_MEMORY_SIZE: u64 = 0x1F_FFFF_FFE0;

/// EVM memory (byte-addressable, expandable)
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Current size in bytes (always a multiple of 32)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing was allocated yet
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current size in words
    pub fn words(&self) -> u64 {
        (self.data.len() / 32) as u64
    }

    /// Grow to cover `[offset, offset + len)`, charging the expansion.
    ///
    /// A zero length never grows and never charges. On failure memory is
    /// left unchanged.
    pub fn ensure_capacity(&mut self, offset: u64, len: u64, gas: &mut GasMeter) -> EvmResult<()> {
        if len == 0 {
            return Ok(());
        }
        let end = offset.checked_add(len).ok_or(EvmError::OutOfGas)?;
        if end <= self.data.len() as u64 {
            return Ok(());
        }
        if end > MAX_MEMORY_SIZE {
            return Err(EvmError::OutOfGas);
        }
        let new_words = end / 32 + u64::from(end % 32 != 0);
        let fee = memory_cost(new_words).saturating_sub(memory_cost(self.words()));
        gas.charge(fee)?;
        let new_len = new_words
            .checked_mul(32)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(EvmError::OutOfGas)?;
        self.data.resize(new_len, 0);
        Ok(())
    }

    /// Store a 32-byte word. Capacity must already cover the range.
    pub fn set_word(&mut self, offset: u64, value: &Word) {
        let start = offset as usize;
        value.to_big_endian(&mut self.data[start..start + 32]);
    }

    /// Load the 32-byte word at `offset` into `out`, zero-filling past the end
    pub fn copy_word(&self, offset: u64, out: &mut Word) {
        let mut buf = [0u8; 32];
        self.read_into(offset, &mut buf);
        *out = Word::from_big_endian(&buf);
    }

    /// Store one byte. Capacity must already cover it.
    pub fn set_byte(&mut self, offset: u64, value: u8) {
        self.data[offset as usize] = value;
    }

    /// Write `len` bytes at `offset`: the prefix comes from `data`, the rest
    /// is zero. Capacity must already cover the range.
    pub fn set(&mut self, offset: u64, len: u64, data: &[u8]) {
        if len == 0 {
            return;
        }
        let start = offset as usize;
        let len = len as usize;
        let copied = data.len().min(len);
        self.data[start..start + copied].copy_from_slice(&data[..copied]);
        self.data[start + copied..start + len].fill(0);
    }

    /// Borrow bytes `[offset, offset + len)` clamped to the current size.
    /// The view is only valid until the next mutation.
    pub fn get_slice(&self, offset: u64, len: u64) -> &[u8] {
        let size = self.data.len() as u64;
        let start = offset.min(size) as usize;
        let end = offset.saturating_add(len).min(size) as usize;
        &self.data[start..end]
    }

    /// Owned copy of `[offset, offset + len)`, zero-filled past the end
    pub fn get_copy(&self, offset: u64, len: u64) -> Vec<u8> {
        let mut out = vec![0u8; len as usize];
        self.read_into(offset, &mut out);
        out
    }

    /// Get raw data slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn read_into(&self, offset: u64, out: &mut [u8]) {
        let available = self.get_slice(offset, out.len() as u64);
        out[..available.len()].copy_from_slice(available);
    }
}

/// `source[start..start + len]` clamped to the source; callers pad with zeros
pub fn source_slice<'a>(source: &'a [u8], start: &Word, len: u64) -> &'a [u8] {
    if start.bits() > 64 {
        return &[];
    }
    let size = source.len() as u64;
    let begin = start.low_u64().min(size) as usize;
    let end = start.low_u64().saturating_add(len).min(size) as usize;
    &source[begin..end]
}
