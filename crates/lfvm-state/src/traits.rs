//! Ledger capability interface

use crate::error::StateResult;
use lfvm_primitives::{Address, H256, U256};

/// Opaque ledger checkpoint returned by [`StateDb::snapshot`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snapshot(pub(crate) usize);

impl Snapshot {
    /// Token for an arbitrary position, for ledgers implemented outside this crate
    pub fn new(id: usize) -> Self {
        Snapshot(id)
    }

    /// Raw position behind this token
    pub fn id(&self) -> usize {
        self.0
    }
}

/// Event log entry emitted by LOG0..LOG4
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Log {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics (at most 4)
    pub topics: Vec<H256>,
    /// Unindexed payload
    pub data: Vec<u8>,
}

/// Pre-declared accounts and storage slots (EIP-2930)
pub type AccessList = Vec<(Address, Vec<H256>)>;

/// Capabilities the interpreter needs from the ledger.
///
/// Every frame of one top-level invocation shares a single implementation
/// by mutable reference. Rollback goes exclusively through
/// [`snapshot`](StateDb::snapshot) and
/// [`revert_to_snapshot`](StateDb::revert_to_snapshot).
pub trait StateDb {
    /// Create a fresh account at `address`, keeping any balance it already
    /// held. Returns `true` when no account existed before.
    fn create_account(&mut self, address: Address) -> bool;

    /// Account balance, zero for missing accounts
    fn get_balance(&self, address: &Address) -> U256;
    /// Overwrite the balance
    fn set_balance(&mut self, address: Address, amount: U256);
    /// Credit the balance (wrapping is the caller's concern)
    fn add_balance(&mut self, address: Address, amount: U256);
    /// Debit the balance
    fn sub_balance(&mut self, address: Address, amount: U256);

    /// Account nonce
    fn get_nonce(&self, address: &Address) -> u64;
    /// Overwrite the nonce
    fn set_nonce(&mut self, address: Address, nonce: u64);

    /// Deployed code, empty for accounts without code
    fn get_code(&self, address: &Address) -> Vec<u8>;
    /// Install code
    fn set_code(&mut self, address: Address, code: Vec<u8>);
    /// Keccak hash of the code; zero for accounts that do not exist
    fn get_code_hash(&self, address: &Address) -> H256;
    /// Length of the code in bytes
    fn get_code_size(&self, address: &Address) -> usize;

    /// Current value of a storage slot
    fn get_state(&self, address: &Address, key: &H256) -> H256;
    /// Write a storage slot
    fn set_state(&mut self, address: Address, key: H256, value: H256);
    /// Value of a storage slot at the start of the transaction
    fn get_committed_state(&self, address: &Address, key: &H256) -> H256;

    /// Increase the refund counter
    fn add_refund(&mut self, gas: u64);
    /// Decrease the refund counter
    fn sub_refund(&mut self, gas: u64);
    /// Current refund counter
    fn get_refund(&self) -> u64;

    /// Whether an account exists (including ones destroyed in this transaction)
    fn exist(&self, address: &Address) -> bool;
    /// Whether an account is empty: no nonce, no balance, no code
    fn empty(&self, address: &Address) -> bool;
    /// Mark the account as destroyed and clear its balance.
    /// Returns `false` when the account does not exist.
    fn suicide(&mut self, address: &Address) -> bool;
    /// Whether the account was destroyed in this transaction
    fn has_suicided(&self, address: &Address) -> bool;

    /// Whether the address is warm
    fn address_in_access_list(&self, address: &Address) -> bool;
    /// Warmth of `(address, slot)`: (address warm, slot warm)
    fn slot_in_access_list(&self, address: &Address, slot: &H256) -> (bool, bool);
    /// Warm an address
    fn add_address_to_access_list(&mut self, address: Address);
    /// Warm a storage slot (and its address)
    fn add_slot_to_access_list(&mut self, address: Address, slot: H256);
    /// Reset the access list for a new transaction
    fn prepare_access_list(
        &mut self,
        sender: Address,
        dest: Option<Address>,
        precompiles: &[Address],
        list: &AccessList,
    );

    /// Checkpoint for a later [`revert_to_snapshot`](StateDb::revert_to_snapshot)
    fn snapshot(&mut self) -> Snapshot;
    /// Undo every mutation made since `snapshot` was taken
    fn revert_to_snapshot(&mut self, snapshot: Snapshot);

    /// Record a log entry
    fn add_log(&mut self, log: Log);
    /// Record the preimage of a KECCAK256 result
    fn add_preimage(&mut self, hash: H256, data: Vec<u8>);

    /// Visit storage slots of `address` until `visit` returns `false`
    fn for_each_storage(
        &self,
        address: &Address,
        visit: &mut dyn FnMut(&H256, &H256) -> bool,
    ) -> StateResult<()>;
}
