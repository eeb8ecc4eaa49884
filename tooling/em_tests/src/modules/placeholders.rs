//! `$NAME` placeholder resolution.
//!
//! Definitions refer to addresses and well-known words by name. Every string
//! value and every object key that starts with `$` is replaced through an
//! [`AliasTable`] before the definition is turned into typed structs.

use std::collections::BTreeMap;

use ovmrex_common::{
    Address, H256,
    constants::{
        DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2, DUMMY_OVM_ADDRESS_3, NON_NULL_BYTES32,
        NON_ZERO_ADDRESS, NULL_BYTES32, PLACEHOLDER_PREFIX, STORAGE_XOR_VALUE, ZERO_ADDRESS,
    },
    utils::{encode_hex, keccak, word_to_address},
};
use serde_json::{Map, Value};

use crate::modules::error::FixtureError;

/// Roles whose address is chosen by the harness rather than the definition.
pub const SYSTEM_ROLES: [&str; 6] = [
    "OVM_EXECUTION_MANAGER",
    "OVM_STATE_MANAGER",
    "OVM_SAFETY_CHECKER",
    "OVM_CALL_HELPER",
    "OVM_REVERT_HELPER",
    "OVM_ADDRESS_MANAGER",
];

/// Deterministic address of a harness role.
pub fn role_address(role: &str) -> Address {
    word_to_address(keccak(role))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.aliases.insert(name.into(), value.into());
    }

    pub fn insert_address(&mut self, name: impl Into<String>, address: Address) {
        self.insert(name, encode_hex(address));
    }

    pub fn insert_word(&mut self, name: impl Into<String>, word: H256) {
        self.insert(name, encode_hex(word));
    }

    /// Replacement for `token`, with or without the leading `$`.
    pub fn get(&self, token: &str) -> Option<&str> {
        let name = token.strip_prefix(PLACEHOLDER_PREFIX).unwrap_or(token);
        self.aliases.get(name).map(String::as_str)
    }

    /// Returns `value` with every placeholder replaced.
    pub fn resolve(&self, value: Value) -> Result<Value, FixtureError> {
        self.resolve_at(value, "$")
    }

    fn resolve_at(&self, value: Value, path: &str) -> Result<Value, FixtureError> {
        match value {
            Value::String(string) => self.resolve_str(string, path).map(Value::String),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| self.resolve_at(item, &format!("{path}[{index}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(object) => {
                let mut resolved = Map::with_capacity(object.len());
                for (key, item) in object {
                    let item_path = format!("{path}.{key}");
                    let key = self.resolve_str(key, &item_path)?;
                    let item = self.resolve_at(item, &item_path)?;
                    resolved.insert(key, item);
                }
                Ok(Value::Object(resolved))
            }
            other => Ok(other),
        }
    }

    fn resolve_str(&self, string: String, path: &str) -> Result<String, FixtureError> {
        if !string.starts_with(PLACEHOLDER_PREFIX) {
            return Ok(string);
        }
        self.get(&string)
            .map(str::to_string)
            .ok_or_else(|| FixtureError::UnresolvedPlaceholder {
                token: string.clone(),
                path: path.to_string(),
            })
    }
}

impl FromIterator<(String, String)> for AliasTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            aliases: iter.into_iter().collect(),
        }
    }
}

/// Aliases every shipped definition may rely on.
pub fn default_aliases() -> AliasTable {
    let mut table = AliasTable::new();
    table.insert_address("DUMMY_OVM_ADDRESS_1", DUMMY_OVM_ADDRESS_1);
    table.insert_address("DUMMY_OVM_ADDRESS_2", DUMMY_OVM_ADDRESS_2);
    table.insert_address("DUMMY_OVM_ADDRESS_3", DUMMY_OVM_ADDRESS_3);
    table.insert_address("ZERO_ADDRESS", ZERO_ADDRESS);
    table.insert_address("NON_ZERO_ADDRESS", NON_ZERO_ADDRESS);
    table.insert_word("NULL_BYTES32", NULL_BYTES32);
    table.insert_word("NON_NULL_BYTES32", NON_NULL_BYTES32);
    table.insert_word("STORAGE_XOR_VALUE", STORAGE_XOR_VALUE);
    for role in SYSTEM_ROLES {
        table.insert_address(role, role_address(role));
    }
    table
}
