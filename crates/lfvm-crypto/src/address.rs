//! Contract address derivation

use crate::hash::keccak256;
use lfvm_primitives::{Address, H256};
use rlp::RlpStream;

fn address_from_hash(hash: &H256) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

/// Address of a contract created by `sender` with account nonce `nonce`
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(&sender.as_bytes().to_vec());
    stream.append(&nonce);
    address_from_hash(&keccak256(&stream.out()))
}

/// Address of a contract created through CREATE2
pub fn create2_address(sender: &Address, salt: &H256, init_code_hash: &H256) -> Address {
    let mut preimage = [0u8; 85];
    preimage[0] = 0xff;
    preimage[1..21].copy_from_slice(sender.as_bytes());
    preimage[21..53].copy_from_slice(salt.as_bytes());
    preimage[53..85].copy_from_slice(init_code_hash.as_bytes());
    address_from_hash(&keccak256(&preimage))
}
