//! SLOAD and SSTORE

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::gas::{self, cost};
use crate::interpreter::Interpreter;
use lfvm_primitives::H256;
use lfvm_state::StateDb;

impl Interpreter {
    pub(super) fn op_sload<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        let key = H256::from_word(self.stack.peek()?);
        let address = self.call.address;
        let revision = evm.config.revision;
        let warm = !revision.has_access_lists() || evm.state.slot_in_access_list(&address, &key).1;
        self.gas.charge(gas::sload_surcharge(revision, warm))?;
        if !warm {
            evm.state.add_slot_to_access_list(address, key);
        }
        *self.stack.peek_mut()? = evm.state.get_state(&address, &key).to_word();
        Ok(())
    }

    pub(super) fn op_sstore<S: StateDb + ?Sized>(&mut self, evm: &mut Evm<'_, S>) -> EvmResult<()> {
        self.require_non_static()?;
        if self.gas.remaining() <= cost::SSTORE_SENTRY {
            return Err(EvmError::OutOfGas);
        }
        let [key, value] = self.stack.pop_n::<2>()?;
        let (key, value) = (H256::from_word(&key), H256::from_word(&value));
        let address = self.call.address;
        let revision = evm.config.revision;
        let cold = revision.has_access_lists() && !evm.state.slot_in_access_list(&address, &key).1;

        let original = evm.state.get_committed_state(&address, &key);
        let current = evm.state.get_state(&address, &key);
        let sstore = gas::sstore_cost(revision, &original, &current, &value, cold);
        self.gas.charge(sstore.gas)?;
        if cold {
            evm.state.add_slot_to_access_list(address, key);
        }
        if sstore.refund > 0 {
            evm.state.add_refund(sstore.refund as u64);
        } else if sstore.refund < 0 {
            evm.state.sub_refund(sstore.refund.unsigned_abs());
        }
        evm.state.set_state(address, key, value);
        Ok(())
    }
}
