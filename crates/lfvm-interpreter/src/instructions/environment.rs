//! Account and block queries

use super::memory::copy_to_memory;
use crate::error::EvmResult;
use crate::evm::Evm;
use crate::gas;
use crate::interpreter::Interpreter;
use crate::word::Word;
use lfvm_primitives::Address;
use lfvm_state::StateDb;

impl Interpreter {
    /// Charge the cold or pre-Berlin part of an account access and warm the
    /// account afterwards.
    pub(super) fn charge_account_access<S: StateDb + ?Sized>(
        &mut self,
        evm: &mut Evm<'_, S>,
        address: &Address,
    ) -> EvmResult<()> {
        let revision = evm.config.revision;
        let warm = !revision.has_access_lists() || evm.state.address_in_access_list(address);
        self.gas
            .charge(gas::account_access_surcharge(revision, warm))?;
        if !warm {
            evm.state.add_address_to_access_list(*address);
        }
        Ok(())
    }

    fn top_address(&self) -> EvmResult<Address> {
        Ok(Address::from_word(self.stack.peek()?))
    }

    pub(super) fn op_balance<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        let address = self.top_address()?;
        self.charge_account_access(evm, &address)?;
        *self.stack.peek_mut()? = evm.state.get_balance(&address);
        Ok(())
    }

    pub(super) fn op_extcodesize<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        let address = self.top_address()?;
        self.charge_account_access(evm, &address)?;
        *self.stack.peek_mut()? = Word::from(evm.state.get_code_size(&address));
        Ok(())
    }

    pub(super) fn op_extcodehash<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        let address = self.top_address()?;
        self.charge_account_access(evm, &address)?;
        let hash = if evm.state.empty(&address) {
            Word::zero()
        } else {
            evm.state.get_code_hash(&address).to_word()
        };
        *self.stack.peek_mut()? = hash;
        Ok(())
    }

    pub(super) fn op_extcodecopy<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        let [address, dest, offset, len] = self.stack.pop_n::<4>()?;
        let address = Address::from_word(&address);
        self.charge_account_access(evm, &address)?;
        let code = evm.state.get_code(&address);
        copy_to_memory(&mut self.memory, &mut self.gas, &dest, &len, &code, &offset)
    }

    pub(super) fn op_blockhash<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        let top = self.stack.peek_mut()?;
        *top = evm.block.block_hash(top).to_word();
        Ok(())
    }
}
