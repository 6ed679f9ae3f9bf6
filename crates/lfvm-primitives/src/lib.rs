//! # lfvm-primitives
//!
//! Value types shared by the interpreter, the ledger and the tooling.
//!
//! The interpreter's native value is the 256-bit [`U256`] word. Account
//! identifiers ([`Address`]) and storage keys/values ([`H256`]) are byte
//! arrays with lossless conversions to and from words.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};

pub use primitive_types::{U256, U512};

/// Gas amount type
pub type Gas = u64;

/// Account nonce type
pub type Nonce = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_wraps() {
        let (sum, overflow) = U256::MAX.overflowing_add(U256::one());
        assert!(overflow);
        assert_eq!(sum, U256::zero());
    }

    #[test]
    fn test_address_word_hash_agree() {
        let addr = Address::from_bytes([0x5a; 20]);
        let hash = H256::from_word(&addr.to_word());
        assert_eq!(&hash.as_bytes()[12..], addr.as_bytes());
        assert_eq!(Address::from_word(&hash.to_word()), addr);
    }
}
