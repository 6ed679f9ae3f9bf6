//! Jumps and frame termination

use crate::error::EvmResult;
use crate::interpreter::{Interpreter, Status};
use crate::memory::memory_range;
use crate::word::Word;

impl Interpreter {
    /// Continue at the JUMPDEST whose byte offset is `dest`
    #[inline]
    pub(super) fn jump_to(&mut self, dest: &Word) -> EvmResult<()> {
        self.pc = self.code.jump_target(dest)?;
        Ok(())
    }

    pub(super) fn op_jump(&mut self) -> EvmResult<()> {
        let dest = self.stack.pop()?;
        self.jump_to(&dest)
    }

    pub(super) fn op_jumpi(&mut self) -> EvmResult<()> {
        let [dest, cond] = self.stack.pop_n::<2>()?;
        if cond.is_zero() {
            Ok(())
        } else {
            self.jump_to(&dest)
        }
    }

    /// RETURN or REVERT with the memory range on the stack as output
    pub(super) fn op_return(&mut self, status: Status) -> EvmResult<()> {
        let [offset, len] = self.stack.pop_n::<2>()?;
        let (offset, len) = memory_range(&offset, &len)?;
        self.memory.ensure_capacity(offset, len, &mut self.gas)?;
        self.output = self.memory.get_copy(offset, len);
        self.status = status;
        Ok(())
    }
}
