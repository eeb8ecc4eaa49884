use crate::{Address, H256, U256, constants::STORAGE_XOR_VALUE, errors::HexError};
use alloy_rlp::{Encodable, Header};
use bytes::Bytes;

pub use keccak_hash::keccak;

/// XORs a word with [`STORAGE_XOR_VALUE`]. The operation is its own inverse.
pub fn storage_xor(value: H256) -> H256 {
    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = value.0[i] ^ STORAGE_XOR_VALUE.0[i];
    }
    H256(out)
}

/// Left pads an address into a 32 byte ABI word.
pub fn address_to_word(address: Address) -> H256 {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    H256(word)
}

/// Takes the low 20 bytes of a word.
pub fn word_to_address(word: H256) -> Address {
    Address::from_slice(&word.0[12..])
}

pub fn u256_to_word(value: U256) -> H256 {
    H256(value.to_big_endian())
}

pub fn u64_to_word(value: u64) -> H256 {
    u256_to_word(U256::from(value))
}

/// Address of a contract deployed with CREATE: `keccak(rlp([deployer, nonce]))[12..]`.
pub fn calculate_create_address(deployer: Address, nonce: u64) -> Address {
    let deployer_bytes: [u8; 20] = deployer.0;
    let payload_length = deployer_bytes.length() + nonce.length();
    let mut encoded = Vec::with_capacity(payload_length + 1);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut encoded);
    deployer_bytes.encode(&mut encoded);
    nonce.encode(&mut encoded);
    Address::from_slice(&keccak(encoded).0[12..])
}

/// Address of a contract deployed with CREATE2: `keccak(0xff ++ deployer ++ salt ++ keccak(code))[12..]`.
pub fn calculate_create2_address(deployer: Address, salt: H256, init_code: &[u8]) -> Address {
    let mut preimage = Vec::with_capacity(85);
    preimage.push(0xff);
    preimage.extend_from_slice(deployer.as_bytes());
    preimage.extend_from_slice(salt.as_bytes());
    preimage.extend_from_slice(keccak(init_code).as_bytes());
    Address::from_slice(&keccak(preimage).0[12..])
}

pub fn decode_hex(value: &str) -> Result<Bytes, HexError> {
    let trimmed = value.trim_start_matches("0x");
    hex::decode(trimmed)
        .map(Bytes::from)
        .map_err(|err| HexError::InvalidHex(value.to_string(), err))
}

pub fn decode_h256(value: &str) -> Result<H256, HexError> {
    let bytes = decode_hex(value)?;
    if bytes.len() != 32 {
        return Err(HexError::InvalidLength {
            value: value.to_string(),
            expected: 32,
            actual: bytes.len(),
        });
    }
    Ok(H256::from_slice(&bytes))
}

pub fn decode_address(value: &str) -> Result<Address, HexError> {
    let bytes = decode_hex(value)?;
    if bytes.len() != 20 {
        return Err(HexError::InvalidLength {
            value: value.to_string(),
            expected: 20,
            actual: bytes.len(),
        });
    }
    Ok(Address::from_slice(&bytes))
}

pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}
