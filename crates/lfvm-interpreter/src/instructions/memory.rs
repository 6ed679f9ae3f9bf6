//! Memory access, hashing and data copies

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::gas::{self, GasMeter};
use crate::interpreter::Interpreter;
use crate::memory::{memory_range, source_slice, Memory};
use crate::word::Word;
use lfvm_crypto::keccak256;
use lfvm_state::StateDb;
use primitive_types::U256;

const WORD_LEN: Word = U256([32, 0, 0, 0]);

/// Copy `len` bytes of `source` starting at `src_offset` into memory at
/// `dest`, zero-padding past the end of `source`.
pub(super) fn copy_to_memory(
    memory: &mut Memory,
    gas: &mut GasMeter,
    dest: &Word,
    len: &Word,
    source: &[u8],
    src_offset: &Word,
) -> EvmResult<()> {
    let (offset, len) = memory_range(dest, len)?;
    gas.charge(gas::copy_gas(len))?;
    memory.ensure_capacity(offset, len, gas)?;
    memory.set(offset, len, source_slice(source, src_offset, len));
    Ok(())
}

impl Interpreter {
    pub(super) fn op_mload(&mut self) -> EvmResult<()> {
        let top = self.stack.peek_mut()?;
        let (offset, _) = memory_range(top, &WORD_LEN)?;
        self.memory.ensure_capacity(offset, 32, &mut self.gas)?;
        self.memory.copy_word(offset, top);
        Ok(())
    }

    pub(super) fn op_mstore(&mut self) -> EvmResult<()> {
        let [offset, value] = self.stack.pop_n::<2>()?;
        self.mstore(&offset, &value)
    }

    pub(super) fn mstore(&mut self, offset: &Word, value: &Word) -> EvmResult<()> {
        let (offset, _) = memory_range(offset, &WORD_LEN)?;
        self.memory.ensure_capacity(offset, 32, &mut self.gas)?;
        self.memory.set_word(offset, value);
        Ok(())
    }

    pub(super) fn op_mstore8(&mut self) -> EvmResult<()> {
        let [offset, value] = self.stack.pop_n::<2>()?;
        let (offset, _) = memory_range(&offset, &Word::one())?;
        self.memory.ensure_capacity(offset, 1, &mut self.gas)?;
        self.memory.set_byte(offset, value.low_u64() as u8);
        Ok(())
    }

    pub(super) fn op_keccak256<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        let [offset, len] = self.stack.pop_n::<2>()?;
        let (offset, len) = memory_range(&offset, &len)?;
        self.gas.charge(gas::sha3_word_gas(len))?;
        self.memory.ensure_capacity(offset, len, &mut self.gas)?;
        let data = self.memory.get_slice(offset, len);
        let hash = keccak256(data);
        if evm.config.record_preimages {
            evm.state.add_preimage(hash, data.to_vec());
        }
        self.stack.push(hash.to_word())
    }

    pub(super) fn op_calldataload(&mut self) -> EvmResult<()> {
        let top = self.stack.peek_mut()?;
        let data = source_slice(&self.call.input, top, 32);
        let mut buf = [0u8; 32];
        buf[..data.len()].copy_from_slice(data);
        *top = Word::from_big_endian(&buf);
        Ok(())
    }

    pub(super) fn op_calldatacopy(&mut self) -> EvmResult<()> {
        let [dest, offset, len] = self.stack.pop_n::<3>()?;
        copy_to_memory(
            &mut self.memory,
            &mut self.gas,
            &dest,
            &len,
            &self.call.input,
            &offset,
        )
    }

    pub(super) fn op_codecopy(&mut self) -> EvmResult<()> {
        let [dest, offset, len] = self.stack.pop_n::<3>()?;
        copy_to_memory(
            &mut self.memory,
            &mut self.gas,
            &dest,
            &len,
            self.code.bytes(),
            &offset,
        )
    }

    pub(super) fn op_returndatacopy(&mut self) -> EvmResult<()> {
        let [dest, offset, len] = self.stack.pop_n::<3>()?;
        if offset.bits() > 64 || len.bits() > 64 {
            return Err(EvmError::ReturnDataOutOfBounds);
        }
        let end = offset
            .low_u64()
            .checked_add(len.low_u64())
            .ok_or(EvmError::ReturnDataOutOfBounds)?;
        if end > self.return_data.len() as u64 {
            return Err(EvmError::ReturnDataOutOfBounds);
        }
        copy_to_memory(
            &mut self.memory,
            &mut self.gas,
            &dest,
            &len,
            &self.return_data,
            &offset,
        )
    }
}
