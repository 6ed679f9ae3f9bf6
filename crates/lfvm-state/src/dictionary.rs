//! Contract address dictionary
//!
//! Maps account identifiers to dense indices in insertion order. The file
//! form is the bare sequence of 20-byte records, no header, no length
//! prefix.

use crate::error::{DictionaryError, DictionaryResult};
use lfvm_primitives::Address;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

#[derive(Debug, Default)]
struct Table {
    addresses: Vec<Address>,
    indices: HashMap<Address, u32>,
}

impl Table {
    fn from_bytes(bytes: &[u8]) -> DictionaryResult<Self> {
        let mut table = Table::default();
        let records = bytes.chunks_exact(Address::LEN);
        let trailing = records.remainder().len();
        for (position, record) in records.enumerate() {
            let mut raw = [0u8; 20];
            raw.copy_from_slice(record);
            let address = Address::from_bytes(raw);
            if table.indices.contains_key(&address) {
                return Err(DictionaryError::Corrupted {
                    offset: position * Address::LEN,
                    reason: format!("duplicate record {}", address),
                });
            }
            table.indices.insert(address, table.addresses.len() as u32);
            table.addresses.push(address);
        }
        if trailing != 0 {
            return Err(DictionaryError::Corrupted {
                offset: bytes.len() - trailing,
                reason: format!(
                    "truncated record of {} bytes, expected {}",
                    trailing,
                    Address::LEN
                ),
            });
        }
        Ok(table)
    }
}

/// Bijective address <-> index table, safe to share between threads
#[derive(Debug)]
pub struct ContractDictionary {
    table: RwLock<Table>,
    limit: u32,
}

impl Default for ContractDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractDictionary {
    /// Create an empty dictionary with the full `u32` index space
    pub fn new() -> Self {
        Self::with_limit(u32::MAX)
    }

    /// Create an empty dictionary holding at most `limit` entries
    pub fn with_limit(limit: u32) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            limit,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.table.read().addresses.len()
    }

    /// Whether no entry was added yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of `address`, assigning the next free one on first sight
    pub fn encode(&self, address: &Address) -> DictionaryResult<u32> {
        if let Some(index) = self.table.read().indices.get(address) {
            return Ok(*index);
        }

        let mut table = self.table.write();
        // another writer may have won the race
        if let Some(index) = table.indices.get(address) {
            return Ok(*index);
        }
        let next = table.addresses.len();
        if next >= self.limit as usize {
            return Err(DictionaryError::Exhausted { limit: self.limit });
        }
        let index = next as u32;
        table.addresses.push(*address);
        table.indices.insert(*address, index);
        Ok(index)
    }

    /// Address stored at `index`
    pub fn decode(&self, index: u32) -> DictionaryResult<Address> {
        let table = self.table.read();
        table
            .addresses
            .get(index as usize)
            .copied()
            .ok_or(DictionaryError::OutOfRange {
                index,
                len: table.addresses.len(),
            })
    }

    /// Snapshot of all entries in index order
    pub fn addresses(&self) -> Vec<Address> {
        self.table.read().addresses.clone()
    }

    /// Persist all entries to `path`, replacing its content
    pub fn write(&self, path: impl AsRef<Path>) -> DictionaryResult<()> {
        let table = self.table.read();
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for address in &table.addresses {
            writer.write_all(address.as_bytes())?;
        }
        writer.flush()?;
        tracing::debug!(
            path = %path.as_ref().display(),
            entries = table.addresses.len(),
            "dictionary written"
        );
        Ok(())
    }

    /// Replace the table with the content of `path`.
    ///
    /// A missing file yields an empty table. On error the current table is
    /// left untouched.
    pub fn read(&self, path: impl AsRef<Path>) -> DictionaryResult<()> {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if bytes.len() / Address::LEN > self.limit as usize {
            return Err(DictionaryError::Exhausted { limit: self.limit });
        }
        let loaded = Table::from_bytes(&bytes).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "rejecting dictionary file");
            e
        })?;
        *self.table.write() = loaded;
        Ok(())
    }
}
