//! Arithmetic, comparison and bitwise handlers
//!
//! Operands are popped and the result overwrites the new top of stack in
//! place.

use crate::error::EvmResult;
use crate::gas;
use crate::interpreter::Interpreter;
use crate::word::{self, Word};

impl Interpreter {
    #[inline]
    pub(super) fn unary(&mut self, f: impl FnOnce(&Word) -> Word) -> EvmResult<()> {
        let top = self.stack.peek_mut()?;
        *top = f(top);
        Ok(())
    }

    #[inline]
    pub(super) fn binary(&mut self, f: impl FnOnce(&Word, &Word) -> Word) -> EvmResult<()> {
        self.stack.require(2)?;
        let a = self.stack.pop()?;
        let b = self.stack.peek_mut()?;
        *b = f(&a, b);
        Ok(())
    }

    #[inline]
    pub(super) fn ternary(&mut self, f: impl FnOnce(&Word, &Word, &Word) -> Word) -> EvmResult<()> {
        self.stack.require(3)?;
        let [a, b] = self.stack.pop_n::<2>()?;
        let c = self.stack.peek_mut()?;
        *c = f(&a, &b, c);
        Ok(())
    }

    pub(super) fn op_exp(&mut self) -> EvmResult<()> {
        let exponent = *self.stack.back(1)?;
        self.gas.charge(gas::exp_byte_gas(&exponent))?;
        self.binary(word::exp)
    }
}
