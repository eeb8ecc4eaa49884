//! Genesis deployment of the system contracts and state dump export.

use std::collections::BTreeMap;

use hex_literal::hex;
use ovmrex_common::{
    Address, H160, H256,
    types::{DumpAccount, RollupDeployConfig, StateDump},
    utils::{calculate_create_address, keccak, storage_xor, u64_to_word},
};
use tracing::{debug, info};

use crate::{
    errors::StateError,
    state_store::{OvmAccount, StateStore},
    verification::{
        AddressManager, AddressManagerError, StateTransitionerFactory,
        address_manager::ADDRESS_MANAGER_NAME,
        state_transitioner_factory::STATE_TRANSITIONER_FACTORY_NAME,
    },
};

/// Account that deploys and owns the system contracts.
pub const GENESIS_DEPLOYER: Address = H160(hex!("4200000000000000000000000000000000000000"));

pub const EXECUTION_MANAGER_NAME: &str = "OVM_ExecutionManager";

/// Contracts deployed after the address manager, in deployment order.
pub const SYSTEM_CONTRACTS: [&str; 7] = [
    EXECUTION_MANAGER_NAME,
    "OVM_StateManager",
    "OVM_StateManagerFactory",
    "OVM_SafetyChecker",
    STATE_TRANSITIONER_FACTORY_NAME,
    "OVM_FraudVerifier",
    "OVM_StateCommitmentChain",
];

// Execution manager slot holding the chain id.
const CHAIN_ID_SLOT: H256 = H256([0u8; 32]);

#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    AddressManager(#[from] AddressManagerError),
}

#[derive(Debug, Clone)]
pub struct SystemDeployment {
    pub store: StateStore,
    pub address_manager: AddressManager,
    /// Contract name -> deployed address, address manager included.
    pub addresses: BTreeMap<String, Address>,
}

impl SystemDeployment {
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.addresses.get(name).copied()
    }

    pub fn state_transitioner_factory(&self) -> Option<StateTransitionerFactory> {
        self.address_of(STATE_TRANSITIONER_FACTORY_NAME)
            .map(StateTransitionerFactory::at)
    }
}

fn next_create_address(store: &mut StateStore) -> Result<Address, StateError> {
    let nonce = store.increment_nonce(GENESIS_DEPLOYER)?;
    Ok(calculate_create_address(GENESIS_DEPLOYER, nonce))
}

/// Deploys the address manager and every system contract, registering each
/// one by name. The returned store has no pending changes.
pub fn deploy_system(config: &RollupDeployConfig) -> Result<SystemDeployment, GenesisError> {
    let mut store = StateStore::default();
    store.put_account(GENESIS_DEPLOYER, OvmAccount::default());

    let mut addresses = BTreeMap::new();
    let manager_address = next_create_address(&mut store)?;
    let address_manager = AddressManager::deploy(&mut store, manager_address, GENESIS_DEPLOYER);
    addresses.insert(ADDRESS_MANAGER_NAME.to_string(), manager_address);

    for name in SYSTEM_CONTRACTS {
        let address = next_create_address(&mut store)?;
        store.put_account(
            address,
            OvmAccount {
                code_hash: keccak(name),
                eth_address: address,
                nonce: 0,
            },
        );
        address_manager.set_address(&mut store, GENESIS_DEPLOYER, name, address)?;
        debug!(name, ?address, "Deployed system contract");
        addresses.insert(name.to_string(), address);
    }

    if let Some(execution_manager) = addresses.get(EXECUTION_MANAGER_NAME) {
        store.put_storage(
            *execution_manager,
            CHAIN_ID_SLOT,
            storage_xor(u64_to_word(config.ovm_global_context.ovm_chain_id)),
            true,
        );
    }
    store.commit();

    Ok(SystemDeployment {
        store,
        address_manager,
        addresses,
    })
}

/// Snapshot of every account in `store`. Storage values are exported raw.
pub fn dump_state(store: &StateStore) -> StateDump {
    let accounts = store
        .accounts()
        .map(|(address, account)| {
            let storage = store
                .storage_of(*address)
                .map(|(key, slot)| (*key, slot.value))
                .collect();
            let code = store
                .get_code(account.code_hash)
                .cloned()
                .unwrap_or_default();
            (
                *address,
                DumpAccount {
                    code_hash: account.code_hash,
                    code,
                    storage,
                },
            )
        })
        .collect();
    StateDump { accounts }
}

pub fn make_state_dump(config: &RollupDeployConfig) -> Result<StateDump, GenesisError> {
    let deployment = deploy_system(config)?;
    let dump = dump_state(&deployment.store);
    info!(
        chain_id = config.ovm_global_context.ovm_chain_id,
        accounts = dump.accounts.len(),
        "Built genesis state dump"
    );
    Ok(dump)
}
