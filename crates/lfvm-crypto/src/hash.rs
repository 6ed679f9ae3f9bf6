//! Keccak-256 hashing

use lfvm_primitives::H256;
use sha3::{Digest, Keccak256};

/// Keccak-256 of the empty byte string, the code hash of accounts without code
pub const EMPTY_CODE_HASH: H256 = H256::from_bytes([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    H256::from_bytes(result.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Known vectors ====================

    #[test]
    fn test_keccak256_empty() {
        let hash = keccak256(&[]);
        assert_eq!(
            hash.to_hex(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(hash, EMPTY_CODE_HASH);
    }

    #[test]
    fn test_keccak256_hello() {
        let hash = keccak256(b"hello");
        assert_eq!(
            hash.to_hex(),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_keccak256_quick_brown_fox() {
        let hash = keccak256(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(
            hash.to_hex(),
            "0x4d741b6f1eb29cb2a9b9911c82f56fa8d73b04959d3d9d222895df6c0b28aa15"
        );
    }

    #[test]
    fn test_keccak256_deterministic() {
        let data = vec![0x5au8; 1000];
        assert_eq!(keccak256(&data), keccak256(&data));
        assert_ne!(keccak256(&data), keccak256(&data[..999]));
    }
}
