//! Tracing ledger proxy

use crate::error::StateResult;
use crate::traits::{AccessList, Log, Snapshot, StateDb};
use lfvm_primitives::{Address, H256, U256};
use tracing::trace;

/// Forwards every call to an inner ledger, emitting a `trace` event for
/// each one. Wrap a ledger in this to see the exact sequence of ledger
/// accesses an execution performs.
#[derive(Debug, Default)]
pub struct TracingStateDb<S> {
    inner: S,
}

impl<S: StateDb> TracingStateDb<S> {
    /// Wrap a ledger
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped ledger
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: StateDb> StateDb for TracingStateDb<S> {
    fn create_account(&mut self, address: Address) -> bool {
        trace!(%address, "CreateAccount");
        self.inner.create_account(address)
    }

    fn get_balance(&self, address: &Address) -> U256 {
        let balance = self.inner.get_balance(address);
        trace!(%address, %balance, "GetBalance");
        balance
    }

    fn set_balance(&mut self, address: Address, amount: U256) {
        trace!(%address, %amount, "SetBalance");
        self.inner.set_balance(address, amount)
    }

    fn add_balance(&mut self, address: Address, amount: U256) {
        trace!(%address, %amount, "AddBalance");
        self.inner.add_balance(address, amount)
    }

    fn sub_balance(&mut self, address: Address, amount: U256) {
        trace!(%address, %amount, "SubBalance");
        self.inner.sub_balance(address, amount)
    }

    fn get_nonce(&self, address: &Address) -> u64 {
        let nonce = self.inner.get_nonce(address);
        trace!(%address, nonce, "GetNonce");
        nonce
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        trace!(%address, nonce, "SetNonce");
        self.inner.set_nonce(address, nonce)
    }

    fn get_code(&self, address: &Address) -> Vec<u8> {
        let code = self.inner.get_code(address);
        trace!(%address, len = code.len(), "GetCode");
        code
    }

    fn set_code(&mut self, address: Address, code: Vec<u8>) {
        trace!(%address, len = code.len(), "SetCode");
        self.inner.set_code(address, code)
    }

    fn get_code_hash(&self, address: &Address) -> H256 {
        let hash = self.inner.get_code_hash(address);
        trace!(%address, %hash, "GetCodeHash");
        hash
    }

    fn get_code_size(&self, address: &Address) -> usize {
        let size = self.inner.get_code_size(address);
        trace!(%address, size, "GetCodeSize");
        size
    }

    fn get_state(&self, address: &Address, key: &H256) -> H256 {
        let value = self.inner.get_state(address, key);
        trace!(%address, %key, %value, "GetState");
        value
    }

    fn set_state(&mut self, address: Address, key: H256, value: H256) {
        trace!(%address, %key, %value, "SetState");
        self.inner.set_state(address, key, value)
    }

    fn get_committed_state(&self, address: &Address, key: &H256) -> H256 {
        let value = self.inner.get_committed_state(address, key);
        trace!(%address, %key, %value, "GetCommittedState");
        value
    }

    fn add_refund(&mut self, gas: u64) {
        trace!(gas, "AddRefund");
        self.inner.add_refund(gas)
    }

    fn sub_refund(&mut self, gas: u64) {
        trace!(gas, "SubRefund");
        self.inner.sub_refund(gas)
    }

    fn get_refund(&self) -> u64 {
        let refund = self.inner.get_refund();
        trace!(refund, "GetRefund");
        refund
    }

    fn exist(&self, address: &Address) -> bool {
        let exists = self.inner.exist(address);
        trace!(%address, exists, "Exist");
        exists
    }

    fn empty(&self, address: &Address) -> bool {
        let empty = self.inner.empty(address);
        trace!(%address, empty, "Empty");
        empty
    }

    fn suicide(&mut self, address: &Address) -> bool {
        trace!(%address, "Suicide");
        self.inner.suicide(address)
    }

    fn has_suicided(&self, address: &Address) -> bool {
        let suicided = self.inner.has_suicided(address);
        trace!(%address, suicided, "HasSuicided");
        suicided
    }

    fn address_in_access_list(&self, address: &Address) -> bool {
        let warm = self.inner.address_in_access_list(address);
        trace!(%address, warm, "AddressInAccessList");
        warm
    }

    fn slot_in_access_list(&self, address: &Address, slot: &H256) -> (bool, bool) {
        let (address_warm, slot_warm) = self.inner.slot_in_access_list(address, slot);
        trace!(%address, %slot, address_warm, slot_warm, "SlotInAccessList");
        (address_warm, slot_warm)
    }

    fn add_address_to_access_list(&mut self, address: Address) {
        trace!(%address, "AddAddressToAccessList");
        self.inner.add_address_to_access_list(address)
    }

    fn add_slot_to_access_list(&mut self, address: Address, slot: H256) {
        trace!(%address, %slot, "AddSlotToAccessList");
        self.inner.add_slot_to_access_list(address, slot)
    }

    fn prepare_access_list(
        &mut self,
        sender: Address,
        dest: Option<Address>,
        precompiles: &[Address],
        list: &AccessList,
    ) {
        trace!(%sender, ?dest, entries = list.len(), "PrepareAccessList");
        self.inner.prepare_access_list(sender, dest, precompiles, list)
    }

    fn snapshot(&mut self) -> Snapshot {
        let snapshot = self.inner.snapshot();
        trace!(id = snapshot.id(), "Snapshot");
        snapshot
    }

    fn revert_to_snapshot(&mut self, snapshot: Snapshot) {
        trace!(id = snapshot.id(), "RevertToSnapshot");
        self.inner.revert_to_snapshot(snapshot)
    }

    fn add_log(&mut self, log: Log) {
        trace!(address = %log.address, topics = log.topics.len(), "AddLog");
        self.inner.add_log(log)
    }

    fn add_preimage(&mut self, hash: H256, data: Vec<u8>) {
        trace!(%hash, len = data.len(), "AddPreimage");
        self.inner.add_preimage(hash, data)
    }

    fn for_each_storage(
        &self,
        address: &Address,
        visit: &mut dyn FnMut(&H256, &H256) -> bool,
    ) -> StateResult<()> {
        trace!(%address, "ForEachStorage");
        self.inner.for_each_storage(address, visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStateDb;

    #[test]
    fn test_proxy_forwards() {
        let mut db = TracingStateDb::new(MemoryStateDb::new());
        let addr = Address::from_bytes([1; 20]);
        let snap = db.snapshot();
        db.add_balance(addr, U256::from(7u64));
        assert_eq!(db.get_balance(&addr), U256::from(7u64));
        assert_eq!(db.inner().get_balance(&addr), U256::from(7u64));

        db.revert_to_snapshot(snap);
        assert!(!db.exist(&addr));
        assert!(!db.into_inner().exist(&addr));
    }
}
