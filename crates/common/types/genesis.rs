use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Address, H256, constants::DEFAULT_CHAIN_ID};

/// Chain-wide parameters passed explicitly to every component that needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Current chain identifier
    pub chain_id: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvmGlobalContext {
    #[serde(rename = "ovmCHAINID")]
    pub ovm_chain_id: u64,
}

/// Deployment parameters for the genesis state of the rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupDeployConfig {
    pub ovm_global_context: OvmGlobalContext,
}

impl RollupDeployConfig {
    pub fn with_chain_id(chain_id: u64) -> Self {
        Self {
            ovm_global_context: OvmGlobalContext {
                ovm_chain_id: chain_id,
            },
        }
    }

    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            chain_id: self.ovm_global_context.ovm_chain_id,
        }
    }
}

/// One account of a state dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpAccount {
    pub code_hash: H256,
    #[serde(with = "crate::serde_utils::bytes")]
    pub code: Bytes,
    pub storage: BTreeMap<H256, H256>,
}

/// Genesis state export: address -> account. Keys are ordered so the JSON output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDump {
    pub accounts: BTreeMap<Address, DumpAccount>,
}

impl StateDump {
    /// Serializes the dump with four space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only emits valid utf8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
