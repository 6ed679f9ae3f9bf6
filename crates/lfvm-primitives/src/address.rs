//! 20-byte account identifier

use primitive_types::U256;
use std::fmt;
use thiserror::Error;

/// Address parsing error
#[derive(Debug, Error)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Account identifier (20 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 20;

    /// Zero address (0x0000...0000)
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create address from bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Create address from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        if slice.len() != Self::LEN {
            return Err(AddressError::InvalidLength(slice.len()));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Address(bytes))
    }

    /// Parse address from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Take the low-order 20 bytes of a word
    pub fn from_word(word: &U256) -> Self {
        let mut buf = [0u8; 32];
        word.to_big_endian(&mut buf);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&buf[12..]);
        Address(bytes)
    }

    /// Zero-extend into a word
    pub fn to_word(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Get as byte array
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Address;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Address::from_hex(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_hex() {
        let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        assert!(!addr.is_zero());

        let addr2 = Address::from_hex("742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        assert_eq!(addr, addr2);
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(
            Address::ZERO.to_hex(),
            "0x0000000000000000000000000000000000000000"
        );
        assert_eq!(Address::default(), Address::ZERO);
    }

    #[test]
    fn test_address_from_hex_invalid() {
        assert!(matches!(
            Address::from_hex("0xzz2d35Cc6634C0532925a3b844Bc9e7595f0aB3d"),
            Err(AddressError::InvalidHex(_))
        ));
        assert!(matches!(
            Address::from_hex("0x1234"),
            Err(AddressError::InvalidLength(2))
        ));
    }

    #[test]
    fn test_address_from_slice_lengths() {
        assert!(Address::from_slice(&[0u8; 19]).is_err());
        assert!(Address::from_slice(&[0u8; 21]).is_err());
        assert!(Address::from_slice(&[]).is_err());
        assert_eq!(Address::from_slice(&[7u8; 20]).unwrap(), Address::from_bytes([7u8; 20]));
    }

    // ==================== Word conversion ====================

    #[test]
    fn test_address_from_word_truncates_high_bytes() {
        let mut buf = [0xffu8; 32];
        buf[31] = 0x01;
        let addr = Address::from_word(&U256::from_big_endian(&buf));
        let mut expected = [0xffu8; 20];
        expected[19] = 0x01;
        assert_eq!(addr, Address::from_bytes(expected));
    }

    #[test]
    fn test_address_to_word() {
        let mut bytes = [0u8; 20];
        bytes[19] = 0x2a;
        assert_eq!(Address::from_bytes(bytes).to_word(), U256::from(42u64));
    }

    #[test]
    fn test_address_display_and_debug() {
        let addr = Address::from_bytes([0xab; 20]);
        assert_eq!(format!("{}", addr), format!("0x{}", "ab".repeat(20)));
        assert!(format!("{:?}", addr).starts_with("Address(0x"));
    }

    #[test]
    fn test_address_ordering() {
        let low = Address::from_bytes([0x01; 20]);
        let high = Address::from_bytes([0x02; 20]);
        assert!(low < high);
    }
}
