//! Journaled in-memory ledger

use crate::error::StateResult;
use crate::traits::{AccessList, Log, Snapshot, StateDb};
use lfvm_crypto::{keccak256, EMPTY_CODE_HASH};
use lfvm_primitives::{Address, H256, U256};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Account record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Transaction count / creation count
    pub nonce: u64,
    /// Balance in wei
    pub balance: U256,
    /// Deployed code
    pub code: Vec<u8>,
    /// Keccak hash of `code`
    pub code_hash: H256,
    /// Current storage
    pub storage: BTreeMap<H256, H256>,
    /// Destroyed in the current transaction
    pub suicided: bool,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            code: Vec::new(),
            code_hash: EMPTY_CODE_HASH,
            storage: BTreeMap::new(),
            suicided: false,
        }
    }
}

impl Account {
    /// Account holding only a balance
    pub fn with_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Contract account with the given code
    pub fn with_code(code: Vec<u8>) -> Self {
        Self {
            code_hash: keccak256(&code),
            code,
            ..Default::default()
        }
    }

    /// Builder: set a storage slot
    pub fn storage_slot(mut self, key: H256, value: H256) -> Self {
        self.storage.insert(key, value);
        self
    }

    /// Empty per EIP-161
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code.is_empty()
    }
}

#[derive(Debug)]
enum JournalEntry {
    Created { address: Address, prev: Option<Account> },
    Balance { address: Address, prev: U256 },
    Nonce { address: Address, prev: u64 },
    Code { address: Address, prev: Vec<u8>, prev_hash: H256 },
    Storage { address: Address, key: H256, prev: Option<H256> },
    Suicide { address: Address, prev: bool, prev_balance: U256 },
    Refund { prev: u64 },
    AccessAddress { address: Address },
    AccessSlot { address: Address, slot: H256 },
    Log,
}

/// In-memory [`StateDb`] with a mutation journal.
///
/// Snapshots are journal positions; reverting replays the journal backwards.
/// Storage values present at the last [`finalise`](MemoryStateDb::finalise)
/// are the committed values reported by `get_committed_state`.
#[derive(Debug, Default)]
pub struct MemoryStateDb {
    accounts: HashMap<Address, Account>,
    committed: HashMap<Address, BTreeMap<H256, H256>>,
    journal: Vec<JournalEntry>,
    refund: u64,
    access_addresses: HashSet<Address>,
    access_slots: HashSet<(Address, H256)>,
    logs: Vec<Log>,
    preimages: HashMap<H256, Vec<u8>>,
}

impl MemoryStateDb {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an account directly, outside the journal.
    /// Its storage also becomes the committed storage.
    pub fn insert_account(&mut self, address: Address, account: Account) {
        self.committed.insert(address, account.storage.clone());
        self.accounts.insert(address, account);
    }

    /// Borrow an account record
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Logs recorded so far
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Recorded KECCAK256 preimages
    pub fn preimage(&self, hash: &H256) -> Option<&[u8]> {
        self.preimages.get(hash).map(Vec::as_slice)
    }

    /// Number of journal entries since the last finalise
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Close the transaction: drop destroyed accounts, make current storage
    /// the committed storage, clear journal, refunds, access list and logs.
    /// Returns the logs of the transaction.
    pub fn finalise(&mut self) -> Vec<Log> {
        self.accounts.retain(|_, account| !account.suicided);
        self.committed = self
            .accounts
            .iter()
            .map(|(address, account)| (*address, account.storage.clone()))
            .collect();
        self.journal.clear();
        self.refund = 0;
        self.access_addresses.clear();
        self.access_slots.clear();
        tracing::debug!(accounts = self.accounts.len(), "ledger finalised");
        std::mem::take(&mut self.logs)
    }

    fn account_mut(&mut self, address: Address) -> &mut Account {
        if !self.accounts.contains_key(&address) {
            self.journal.push(JournalEntry::Created {
                address,
                prev: None,
            });
        }
        self.accounts.entry(address).or_default()
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Created { address, prev } => match prev {
                Some(account) => {
                    self.accounts.insert(address, account);
                }
                None => {
                    self.accounts.remove(&address);
                }
            },
            JournalEntry::Balance { address, prev } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.balance = prev;
                }
            }
            JournalEntry::Nonce { address, prev } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.nonce = prev;
                }
            }
            JournalEntry::Code {
                address,
                prev,
                prev_hash,
            } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.code = prev;
                    account.code_hash = prev_hash;
                }
            }
            JournalEntry::Storage { address, key, prev } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    match prev {
                        Some(value) => account.storage.insert(key, value),
                        None => account.storage.remove(&key),
                    };
                }
            }
            JournalEntry::Suicide {
                address,
                prev,
                prev_balance,
            } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.suicided = prev;
                    account.balance = prev_balance;
                }
            }
            JournalEntry::Refund { prev } => self.refund = prev,
            JournalEntry::AccessAddress { address } => {
                self.access_addresses.remove(&address);
            }
            JournalEntry::AccessSlot { address, slot } => {
                self.access_slots.remove(&(address, slot));
            }
            JournalEntry::Log => {
                self.logs.pop();
            }
        }
    }
}

impl StateDb for MemoryStateDb {
    fn create_account(&mut self, address: Address) -> bool {
        let prev = self.accounts.get(&address).cloned();
        let fresh = prev.is_none();
        let balance = prev.as_ref().map(|a| a.balance).unwrap_or_default();
        self.journal.push(JournalEntry::Created { address, prev });
        self.accounts.insert(address, Account::with_balance(balance));
        fresh
    }

    fn get_balance(&self, address: &Address) -> U256 {
        self.accounts
            .get(address)
            .map(|a| a.balance)
            .unwrap_or_default()
    }

    fn set_balance(&mut self, address: Address, amount: U256) {
        let account = self.account_mut(address);
        let prev = std::mem::replace(&mut account.balance, amount);
        self.journal.push(JournalEntry::Balance { address, prev });
    }

    fn add_balance(&mut self, address: Address, amount: U256) {
        let current = self.get_balance(&address);
        self.set_balance(address, current.overflowing_add(amount).0);
    }

    fn sub_balance(&mut self, address: Address, amount: U256) {
        let current = self.get_balance(&address);
        self.set_balance(address, current.overflowing_sub(amount).0);
    }

    fn get_nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map(|a| a.nonce).unwrap_or(0)
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        let account = self.account_mut(address);
        let prev = std::mem::replace(&mut account.nonce, nonce);
        self.journal.push(JournalEntry::Nonce { address, prev });
    }

    fn get_code(&self, address: &Address) -> Vec<u8> {
        self.accounts
            .get(address)
            .map(|a| a.code.clone())
            .unwrap_or_default()
    }

    fn set_code(&mut self, address: Address, code: Vec<u8>) {
        let code_hash = keccak256(&code);
        let account = self.account_mut(address);
        let prev = std::mem::replace(&mut account.code, code);
        let prev_hash = std::mem::replace(&mut account.code_hash, code_hash);
        self.journal.push(JournalEntry::Code {
            address,
            prev,
            prev_hash,
        });
    }

    fn get_code_hash(&self, address: &Address) -> H256 {
        self.accounts
            .get(address)
            .map(|a| a.code_hash)
            .unwrap_or(H256::ZERO)
    }

    fn get_code_size(&self, address: &Address) -> usize {
        self.accounts.get(address).map(|a| a.code.len()).unwrap_or(0)
    }

    fn get_state(&self, address: &Address, key: &H256) -> H256 {
        self.accounts
            .get(address)
            .and_then(|a| a.storage.get(key).copied())
            .unwrap_or(H256::ZERO)
    }

    fn set_state(&mut self, address: Address, key: H256, value: H256) {
        let account = self.account_mut(address);
        let prev = account.storage.insert(key, value);
        self.journal.push(JournalEntry::Storage { address, key, prev });
    }

    fn get_committed_state(&self, address: &Address, key: &H256) -> H256 {
        self.committed
            .get(address)
            .and_then(|s| s.get(key).copied())
            .unwrap_or(H256::ZERO)
    }

    fn add_refund(&mut self, gas: u64) {
        self.journal.push(JournalEntry::Refund { prev: self.refund });
        self.refund = self.refund.saturating_add(gas);
    }

    fn sub_refund(&mut self, gas: u64) {
        if gas > self.refund {
            tracing::warn!(refund = self.refund, gas, "refund counter below zero");
        }
        self.journal.push(JournalEntry::Refund { prev: self.refund });
        self.refund = self.refund.saturating_sub(gas);
    }

    fn get_refund(&self) -> u64 {
        self.refund
    }

    fn exist(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn empty(&self, address: &Address) -> bool {
        self.accounts.get(address).map_or(true, Account::is_empty)
    }

    fn suicide(&mut self, address: &Address) -> bool {
        let Some(account) = self.accounts.get_mut(address) else {
            return false;
        };
        let prev = std::mem::replace(&mut account.suicided, true);
        let prev_balance = std::mem::take(&mut account.balance);
        self.journal.push(JournalEntry::Suicide {
            address: *address,
            prev,
            prev_balance,
        });
        true
    }

    fn has_suicided(&self, address: &Address) -> bool {
        self.accounts.get(address).map_or(false, |a| a.suicided)
    }

    fn address_in_access_list(&self, address: &Address) -> bool {
        self.access_addresses.contains(address)
    }

    fn slot_in_access_list(&self, address: &Address, slot: &H256) -> (bool, bool) {
        (
            self.access_addresses.contains(address),
            self.access_slots.contains(&(*address, *slot)),
        )
    }

    fn add_address_to_access_list(&mut self, address: Address) {
        if self.access_addresses.insert(address) {
            self.journal.push(JournalEntry::AccessAddress { address });
        }
    }

    fn add_slot_to_access_list(&mut self, address: Address, slot: H256) {
        self.add_address_to_access_list(address);
        if self.access_slots.insert((address, slot)) {
            self.journal.push(JournalEntry::AccessSlot { address, slot });
        }
    }

    fn prepare_access_list(
        &mut self,
        sender: Address,
        dest: Option<Address>,
        precompiles: &[Address],
        list: &AccessList,
    ) {
        self.access_addresses.clear();
        self.access_slots.clear();
        self.access_addresses.insert(sender);
        if let Some(dest) = dest {
            self.access_addresses.insert(dest);
        }
        self.access_addresses.extend(precompiles.iter().copied());
        for (address, slots) in list {
            self.access_addresses.insert(*address);
            for slot in slots {
                self.access_slots.insert((*address, *slot));
            }
        }
    }

    fn snapshot(&mut self) -> Snapshot {
        Snapshot(self.journal.len())
    }

    fn revert_to_snapshot(&mut self, snapshot: Snapshot) {
        while self.journal.len() > snapshot.0 {
            if let Some(entry) = self.journal.pop() {
                self.undo(entry);
            }
        }
    }

    fn add_log(&mut self, log: Log) {
        self.logs.push(log);
        self.journal.push(JournalEntry::Log);
    }

    fn add_preimage(&mut self, hash: H256, data: Vec<u8>) {
        self.preimages.entry(hash).or_insert(data);
    }

    fn for_each_storage(
        &self,
        address: &Address,
        visit: &mut dyn FnMut(&H256, &H256) -> bool,
    ) -> StateResult<()> {
        if let Some(account) = self.accounts.get(address) {
            for (key, value) in &account.storage {
                if !visit(key, value) {
                    break;
                }
            }
        }
        Ok(())
    }
}
