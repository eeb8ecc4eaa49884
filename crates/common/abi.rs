//! Minimal Solidity ABI encoding, enough for hashing batch headers, packing OVM transactions and
//! building `Error(string)` revert payloads.

use crate::{Address, H256, U256, utils::keccak};
use bytes::Bytes;

/// `bytes4(keccak256("Error(string)"))`
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Value {
    Address(Address),
    Uint(U256),
    Bool(bool),
    Bytes(Bytes),
    String(String),
    FixedBytes(H256),
}

/// Computes the 4 byte selector of a normalized function signature such as `transfer(address,uint256)`.
pub fn compute_function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.0[..4]);
    selector
}

/// `abi.encode(values...)`: static heads followed by the dynamic tails.
pub fn encode(values: &[Value]) -> Vec<u8> {
    let head_size = values.len() * 32;
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for value in values {
        match value {
            Value::Address(address) => head.extend_from_slice(&address_word(*address)),
            Value::Uint(number) => head.extend_from_slice(&number.to_big_endian()),
            Value::Bool(boolean) => {
                head.extend_from_slice(&U256::from(u8::from(*boolean)).to_big_endian())
            }
            Value::FixedBytes(word) => head.extend_from_slice(word.as_bytes()),
            Value::Bytes(bytes) => {
                head.extend_from_slice(&U256::from(head_size + tail.len()).to_big_endian());
                tail.extend_from_slice(&encode_bytes(bytes));
            }
            Value::String(string) => {
                head.extend_from_slice(&U256::from(head_size + tail.len()).to_big_endian());
                tail.extend_from_slice(&encode_bytes(string.as_bytes()));
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// `abi.encodePacked(values...)`: every value in its minimal, unpadded form.
pub fn encode_packed(values: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for value in values {
        match value {
            Value::Address(address) => out.extend_from_slice(address.as_bytes()),
            Value::Uint(number) => out.extend_from_slice(&number.to_big_endian()),
            Value::Bool(boolean) => out.push(u8::from(*boolean)),
            Value::FixedBytes(word) => out.extend_from_slice(word.as_bytes()),
            Value::Bytes(bytes) => out.extend_from_slice(bytes),
            Value::String(string) => out.extend_from_slice(string.as_bytes()),
        }
    }
    out
}

/// Payload produced by `revert("reason")` / `require(cond, "reason")`.
pub fn encode_revert_reason(reason: &str) -> Bytes {
    let mut payload = ERROR_STRING_SELECTOR.to_vec();
    payload.extend_from_slice(&encode(&[Value::String(reason.to_string())]));
    Bytes::from(payload)
}

/// Extracts the reason of an `Error(string)` payload, if the payload is one.
pub fn decode_revert_reason(payload: &[u8]) -> Option<String> {
    let body = payload.strip_prefix(&ERROR_STRING_SELECTOR)?;
    let offset = U256::from_big_endian(body.get(..32)?);
    let offset = usize::try_from(offset).ok()?;
    let length_word = body.get(offset..offset.checked_add(32)?)?;
    let length = usize::try_from(U256::from_big_endian(length_word)).ok()?;
    let start = offset.checked_add(32)?;
    let bytes = body.get(start..start.checked_add(length)?)?;
    String::from_utf8(bytes.to_vec()).ok()
}

fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(32) * 32;
    let mut out = Vec::with_capacity(32 + padded_len);
    out.extend_from_slice(&U256::from(bytes.len()).to_big_endian());
    out.extend_from_slice(bytes);
    out.resize(32 + padded_len, 0);
    out
}
