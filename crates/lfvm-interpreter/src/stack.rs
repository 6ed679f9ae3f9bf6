//! Operand stack
//!
//! A fixed arena of [`MAX_STACK_SIZE`] words plus a length. Slots above the
//! length are garbage and never read.

use crate::error::{EvmError, EvmResult};
use crate::gas::cost::MAX_STACK_SIZE;
use crate::word::Word;

/// EVM stack (max 1024 items, 256-bit each)
#[derive(Clone)]
pub struct Stack {
    data: Box<[Word]>,
    len: usize,
}

impl Stack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self {
            data: vec![Word::zero(); MAX_STACK_SIZE].into_boxed_slice(),
            len: 0,
        }
    }

    /// Push a value onto the stack
    #[inline]
    pub fn push(&mut self, value: Word) -> EvmResult<()> {
        if self.len >= MAX_STACK_SIZE {
            return Err(EvmError::StackOverflow);
        }
        self.data[self.len] = value;
        self.len += 1;
        Ok(())
    }

    /// Pop a value from the stack
    #[inline]
    pub fn pop(&mut self) -> EvmResult<Word> {
        if self.len == 0 {
            return Err(EvmError::StackUnderflow);
        }
        self.len -= 1;
        Ok(self.data[self.len])
    }

    /// Pop `N` values, top of stack first
    #[inline]
    pub fn pop_n<const N: usize>(&mut self) -> EvmResult<[Word; N]> {
        self.require(N)?;
        let mut out = [Word::zero(); N];
        for slot in out.iter_mut() {
            self.len -= 1;
            *slot = self.data[self.len];
        }
        Ok(out)
    }

    /// Peek at the top of the stack
    #[inline]
    pub fn peek(&self) -> EvmResult<&Word> {
        self.back(0)
    }

    /// Mutable reference to the top of the stack
    #[inline]
    pub fn peek_mut(&mut self) -> EvmResult<&mut Word> {
        self.back_mut(0)
    }

    /// Item at `depth` (0 = top)
    #[inline]
    pub fn back(&self, depth: usize) -> EvmResult<&Word> {
        if depth >= self.len {
            return Err(EvmError::StackUnderflow);
        }
        Ok(&self.data[self.len - 1 - depth])
    }

    /// Mutable item at `depth` (0 = top)
    #[inline]
    pub fn back_mut(&mut self, depth: usize) -> EvmResult<&mut Word> {
        if depth >= self.len {
            return Err(EvmError::StackUnderflow);
        }
        Ok(&mut self.data[self.len - 1 - depth])
    }

    /// Swap top with item at depth (1 = swap with second item)
    #[inline]
    pub fn swap(&mut self, depth: usize) -> EvmResult<()> {
        if depth == 0 || depth >= self.len {
            return Err(EvmError::StackUnderflow);
        }
        let top = self.len - 1;
        self.data.swap(top, top - depth);
        Ok(())
    }

    /// Duplicate item at depth to top (1 = dup top)
    #[inline]
    pub fn dup(&mut self, depth: usize) -> EvmResult<()> {
        if depth == 0 || depth > self.len {
            return Err(EvmError::StackUnderflow);
        }
        let value = self.data[self.len - depth];
        self.push(value)
    }

    /// Fail with underflow unless at least `n` items are present
    #[inline]
    pub fn require(&self, n: usize) -> EvmResult<()> {
        if self.len < n {
            Err(EvmError::StackUnderflow)
        } else {
            Ok(())
        }
    }

    /// Fail with overflow unless `n` more items fit
    #[inline]
    pub fn ensure_room(&self, n: usize) -> EvmResult<()> {
        if self.len + n > MAX_STACK_SIZE {
            Err(EvmError::StackOverflow)
        } else {
            Ok(())
        }
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live items, bottom first
    pub fn as_slice(&self) -> &[Word] {
        &self.data[..self.len]
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
