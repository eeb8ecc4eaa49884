use std::{collections::BTreeMap, path::PathBuf};

use bytes::Bytes;
use ovmrex_common::{Address, H256, serde_utils};
use serde::Deserialize;
use serde_json::Value;

/// A test definition as read from disk, placeholders still unresolved.
#[derive(Debug, Clone)]
pub struct RawTest {
    pub path: PathBuf,
    pub name: String,
    pub definition: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinition {
    pub name: String,
    #[serde(default)]
    pub pre_state: PreState,
    pub parameters: Vec<TestParameter>,
}

/// Seeds keyed by the role of the contract they initialize.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreState {
    #[serde(rename = "ExecutionManager", default)]
    pub execution_manager: ExecutionManagerSeed,
    #[serde(rename = "StateManager", default)]
    pub state_manager: StateManagerSeed,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionManagerSeed {
    #[serde(default)]
    pub message_record: Option<MessageRecordSeed>,
    #[serde(default)]
    pub global_context: Option<GlobalContextSeed>,
    #[serde(default)]
    pub transaction_context: Option<TransactionContextSeed>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecordSeed {
    #[serde(default, deserialize_with = "serde_utils::u64::opt::deser_number_or_str")]
    pub nuisance_gas_left: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalContextSeed {
    #[serde(
        rename = "ovmCHAINID",
        default,
        deserialize_with = "serde_utils::u64::opt::deser_number_or_str"
    )]
    pub ovm_chain_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionContextSeed {
    #[serde(
        rename = "ovmTIMESTAMP",
        default,
        deserialize_with = "serde_utils::u64::opt::deser_number_or_str"
    )]
    pub ovm_timestamp: Option<u64>,
    #[serde(
        rename = "ovmNUMBER",
        default,
        deserialize_with = "serde_utils::u64::opt::deser_number_or_str"
    )]
    pub ovm_number: Option<u64>,
    #[serde(
        rename = "ovmGASLIMIT",
        default,
        deserialize_with = "serde_utils::u64::opt::deser_number_or_str"
    )]
    pub ovm_gas_limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateManagerSeed {
    #[serde(default)]
    pub accounts: BTreeMap<Address, AccountSeed>,
    /// Raw (XOR-encoded) slot values.
    #[serde(default)]
    pub contract_storage: BTreeMap<Address, BTreeMap<H256, H256>>,
    #[serde(default)]
    pub verified_contract_storage: BTreeMap<Address, BTreeMap<H256, bool>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSeed {
    pub code_hash: H256,
    pub eth_address: Address,
    #[serde(default, deserialize_with = "serde_utils::u64::deser_number_or_str")]
    pub nonce: u64,
}

/// One independent scenario: a fresh state and an ordered list of root steps.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestParameter {
    pub name: String,
    #[serde(default)]
    pub skip: bool,
    pub steps: Vec<TestStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    pub function_name: String,
    #[serde(default)]
    pub function_params: Value,
    pub expected_return_status: bool,
    #[serde(default)]
    pub expected_return_value: Option<Value>,
}

// ================== Function parameters =====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CallStepParams {
    #[serde(deserialize_with = "serde_utils::u64::deser_number_or_str")]
    pub gas_limit: u64,
    pub target: Address,
    #[serde(default)]
    pub sub_steps: Vec<TestStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateStepParams {
    #[serde(with = "serde_utils::bytes")]
    pub bytecode: Bytes,
    #[serde(default)]
    pub sub_steps: Vec<TestStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Create2StepParams {
    pub salt: H256,
    #[serde(with = "serde_utils::bytes")]
    pub bytecode: Bytes,
    #[serde(default)]
    pub sub_steps: Vec<TestStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SloadStepParams {
    pub key: H256,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SstoreStepParams {
    pub key: H256,
    pub value: H256,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RevertStepParams {
    #[serde(default, with = "serde_utils::bytes")]
    pub revert_data: Bytes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtCodeHashStepParams {
    pub address: Address,
}
