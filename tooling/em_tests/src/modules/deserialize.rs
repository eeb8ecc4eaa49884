use bytes::Bytes;
use ovmrex_common::{
    Address,
    constants::PLACEHOLDER_PREFIX,
    utils::{address_to_word, decode_hex, u64_to_word},
};
use serde_json::Value;

/// Converts an `expectedReturnValue` into the bytes the engine returns.
///
/// A hex string is taken verbatim, except for 20-byte strings which denote
/// an address and are widened to a word. A JSON integer is a uint256 word.
pub fn expected_return_value(value: &Value) -> Result<Bytes, String> {
    match value {
        Value::String(hex) => {
            if hex.starts_with(PLACEHOLDER_PREFIX) {
                return Err(format!("unresolved placeholder `{hex}`"));
            }
            let bytes = decode_hex(hex).map_err(|err| err.to_string())?;
            if bytes.len() == Address::len_bytes() {
                let word = address_to_word(Address::from_slice(&bytes));
                return Ok(Bytes::copy_from_slice(word.as_bytes()));
            }
            Ok(bytes)
        }
        Value::Number(number) => number
            .as_u64()
            .map(|n| Bytes::copy_from_slice(u64_to_word(n).as_bytes()))
            .ok_or_else(|| format!("{number} is not an unsigned integer")),
        other => Err(format!("expected a hex string or an integer, got {other}")),
    }
}
