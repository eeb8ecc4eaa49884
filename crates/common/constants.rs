use ethereum_types::{Address, H160, H256};
use hex_literal::hex;

// === Well known words ===

pub const NULL_BYTES32: H256 = H256([0u8; 32]);
pub const NON_NULL_BYTES32: H256 = H256([0x11; 32]);

pub const ZERO_ADDRESS: Address = H160([0u8; 20]);
pub const NON_ZERO_ADDRESS: Address = H160([0x11; 20]);

/// Stored values are XORed with this word so a verified zero can be told apart from an empty slot.
pub const STORAGE_XOR_VALUE: H256 = H256(hex!(
    "feedfacecafebeeffeedfacecafebeeffeedfacecafebeeffeedfacecafebeef"
));

// === Execution defaults ===

/// Gas limit of a single OVM transaction. Also the default nuisance gas budget of a message.
pub const OVM_TX_GAS_LIMIT: u64 = 10_000_000;

pub const DEFAULT_CHAIN_ID: u64 = 420;

// === Fixture addresses ===

pub const DUMMY_OVM_ADDRESS_1: Address = H160([0x12; 20]);
pub const DUMMY_OVM_ADDRESS_2: Address = H160([0x21; 20]);
pub const DUMMY_OVM_ADDRESS_3: Address = H160([0x31; 20]);

/// Prefix of placeholder tokens in test definitions, e.g. `$DUMMY_OVM_ADDRESS_1`.
pub const PLACEHOLDER_PREFIX: char = '$';
