use std::collections::BTreeMap;

use ovmrex_common::{Address, constants::OVM_TX_GAS_LIMIT, types::ChainConfig};
use serde::{Deserialize, Serialize};

use crate::{
    call_frame::OperationKind,
    constants::{
        DEFAULT_ENTRYPOINT, MAX_CALL_DEPTH, MIN_NUISANCE_GAS_PER_CONTRACT,
        NUISANCE_GAS_PER_CONTRACT_BYTE, NUISANCE_GAS_SSTORE,
    },
};

/// What a reverting child does to the call that ran it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevertPropagation {
    /// The parent records the failure and keeps running its remaining children.
    Catch,
    /// The parent stops and reverts with the child's return data.
    Propagate,
}

impl OperationKind {
    pub fn default_revert_propagation(&self) -> RevertPropagation {
        match self {
            OperationKind::Revert => RevertPropagation::Propagate,
            _ => RevertPropagation::Catch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NuisanceGasSchedule {
    pub sstore: u64,
    pub min_per_contract: u64,
    pub per_contract_byte: u64,
}

impl Default for NuisanceGasSchedule {
    fn default() -> Self {
        Self {
            sstore: NUISANCE_GAS_SSTORE,
            min_per_contract: MIN_NUISANCE_GAS_PER_CONTRACT,
            per_contract_byte: NUISANCE_GAS_PER_CONTRACT_BYTE,
        }
    }
}

impl NuisanceGasSchedule {
    /// Charge for bringing a contract of `code_len` bytes into the execution.
    pub fn contract_cost(&self, code_len: usize) -> u64 {
        self.min_per_contract
            .saturating_add(self.per_contract_byte.saturating_mul(code_len as u64))
    }
}

/// Transaction-level values served by the context getters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalContext {
    pub timestamp: u64,
    pub block_number: u64,
    pub gas_limit: u64,
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self {
            timestamp: 0,
            block_number: 0,
            gas_limit: OVM_TX_GAS_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OvmConfig {
    pub chain: ChainConfig,
    pub max_call_depth: usize,
    pub nuisance_gas: NuisanceGasSchedule,
    pub global_context: GlobalContext,
    /// Overrides of [`OperationKind::default_revert_propagation`].
    pub revert_propagation: BTreeMap<OperationKind, RevertPropagation>,
    pub entrypoint: Address,
    pub default_nuisance_gas: u64,
}

impl Default for OvmConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            max_call_depth: MAX_CALL_DEPTH,
            nuisance_gas: NuisanceGasSchedule::default(),
            global_context: GlobalContext::default(),
            revert_propagation: BTreeMap::new(),
            entrypoint: DEFAULT_ENTRYPOINT,
            default_nuisance_gas: OVM_TX_GAS_LIMIT,
        }
    }
}

impl OvmConfig {
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain.chain_id = chain_id;
        self
    }

    pub fn revert_propagation_for(&self, kind: OperationKind) -> RevertPropagation {
        self.revert_propagation
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_revert_propagation())
    }
}
