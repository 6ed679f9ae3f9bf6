//! Execution context for EVM

use lfvm_primitives::{Address, H256, U256};
use std::collections::HashMap;

/// Call context information
#[derive(Clone, Debug)]
pub struct CallContext {
    /// Account whose storage and balance the frame acts on
    pub address: Address,
    /// Caller address
    pub caller: Address,
    /// Account the executed code was loaded from
    pub code_address: Address,
    /// Call value in wei
    pub value: U256,
    /// Call data
    pub input: Vec<u8>,
    /// Gas limit
    pub gas: u64,
    /// Whether this is a static call (no state modifications)
    pub is_static: bool,
    /// Call depth
    pub depth: usize,
}

impl CallContext {
    /// Create a new call context
    pub fn new(address: Address, caller: Address, value: U256, input: Vec<u8>, gas: u64) -> Self {
        Self {
            address,
            caller,
            code_address: address,
            value,
            input,
            gas,
            is_static: false,
            depth: 0,
        }
    }

    /// Create a static call context
    pub fn new_static(address: Address, caller: Address, input: Vec<u8>, gas: u64) -> Self {
        Self {
            is_static: true,
            ..Self::new(address, caller, U256::zero(), input, gas)
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(Address::ZERO, Address::ZERO, U256::zero(), Vec::new(), 0)
    }
}

/// Block environment information
#[derive(Clone, Debug)]
pub struct BlockContext {
    /// Block number
    pub number: u64,
    /// Block timestamp
    pub timestamp: u64,
    /// Block gas limit
    pub gas_limit: u64,
    /// Block coinbase (miner/validator)
    pub coinbase: Address,
    /// Block prevrandao
    pub prevrandao: H256,
    /// Chain ID
    pub chain_id: u64,
    /// Base fee (EIP-1559)
    pub base_fee: U256,
    /// Hashes of recent blocks by number
    pub block_hashes: HashMap<u64, H256>,
}

impl BlockContext {
    /// Hash of block `number` if it is one of the 256 most recent ones
    pub fn block_hash(&self, number: &U256) -> H256 {
        if number.bits() > 64 {
            return H256::ZERO;
        }
        let number = number.low_u64();
        let lowest = self.number.saturating_sub(256);
        if number >= self.number || number < lowest {
            return H256::ZERO;
        }
        self.block_hashes.get(&number).copied().unwrap_or(H256::ZERO)
    }
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            gas_limit: 30_000_000,
            coinbase: Address::ZERO,
            prevrandao: H256::ZERO,
            chain_id: 1,
            base_fee: U256::zero(),
            block_hashes: HashMap::new(),
        }
    }
}

/// Transaction environment information
#[derive(Clone, Debug, Default)]
pub struct TxContext {
    /// Transaction origin (original sender)
    pub origin: Address,
    /// Gas price
    pub gas_price: U256,
}
