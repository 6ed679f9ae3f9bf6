//! # lfvm-crypto
//!
//! Hashing and contract address derivation.
//!
//! - Keccak-256 hashing
//! - CREATE address derivation (`keccak256(rlp([sender, nonce]))`)
//! - CREATE2 address derivation (`keccak256(0xff ++ sender ++ salt ++ keccak256(init_code))`)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{create2_address, create_address};
pub use hash::{keccak256, EMPTY_CODE_HASH};
