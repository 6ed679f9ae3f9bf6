//! # lfvm-state
//!
//! The ledger seen by the interpreter.
//!
//! - [`StateDb`]: the capability interface every frame mutates through
//! - [`MemoryStateDb`]: journaled in-memory ledger with snapshot/revert
//! - [`TracingStateDb`]: forwarding proxy that traces each ledger call
//! - [`ContractDictionary`]: address <-> dense index table with file persistence

#![warn(missing_docs)]
#![warn(clippy::all)]

mod dictionary;
mod error;
mod memory;
mod proxy;
mod traits;

pub use dictionary::ContractDictionary;
pub use error::{DictionaryError, DictionaryResult, StateError, StateResult};
pub use memory::{Account, MemoryStateDb};
pub use proxy::TracingStateDb;
pub use traits::{AccessList, Log, Snapshot, StateDb};
