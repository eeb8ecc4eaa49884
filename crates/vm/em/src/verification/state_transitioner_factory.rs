use bytes::Bytes;
use ovmrex_common::{
    Address, H256, U256,
    abi::encode_revert_reason,
    utils::{address_to_word, calculate_create_address, keccak, storage_xor, u256_to_word},
};
use tracing::{debug, warn};

use crate::{
    call_frame::OperationKind,
    errors::{ExecutionOutcome, RevertReason, StateError, Status},
    state_store::{OvmAccount, StateStore},
    verification::AddressManager,
};

pub const FRAUD_VERIFIER_NAME: &str = "OVM_FraudVerifier";
pub const STATE_TRANSITIONER_FACTORY_NAME: &str = "OVM_StateTransitionerFactory";
pub const STATE_TRANSITIONER_NAME: &str = "OVM_StateTransitioner";

pub const UNAUTHORIZED_CREATE_REASON: &str = "Create can only be done by the OVM_FraudVerifier.";

// Storage layout of a deployed transitioner.
const STATE_TRANSITION_INDEX_SLOT: u64 = 0;
const PRE_STATE_ROOT_SLOT: u64 = 1;
const POST_STATE_ROOT_SLOT: u64 = 2;
const TRANSACTION_HASH_SLOT: u64 = 3;
const ADDRESS_MANAGER_SLOT: u64 = 4;

/// Deploys one state transitioner per disputed state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransitionerFactory {
    address: Address,
}

impl StateTransitionerFactory {
    pub fn deploy(store: &mut StateStore, address: Address) -> Self {
        store.put_account(
            address,
            OvmAccount {
                code_hash: keccak(STATE_TRANSITIONER_FACTORY_NAME),
                eth_address: address,
                nonce: 0,
            },
        );
        Self { address }
    }

    pub fn at(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Deploys a transitioner for `state_transition_index`. Only the fraud
    /// verifier registered in `address_manager` may call this; any other
    /// sender gets an `Error(string)` revert and the store is left untouched.
    pub fn create(
        &self,
        store: &mut StateStore,
        sender: Address,
        address_manager: &AddressManager,
        state_transition_index: U256,
        pre_state_root: H256,
        transaction_hash: H256,
    ) -> ExecutionOutcome {
        let fraud_verifier = address_manager.get_address(store, FRAUD_VERIFIER_NAME);
        if sender != fraud_verifier {
            warn!(?sender, ?fraud_verifier, "Unauthorized state transitioner creation");
            return reverted(
                RevertReason::IntentionalRevert,
                encode_revert_reason(UNAUTHORIZED_CREATE_REASON),
            );
        }

        let nonce = match store.increment_nonce(self.address) {
            Ok(nonce) => nonce,
            Err(StateError::AccountNotFound(address)) => {
                return reverted(RevertReason::MissingAccount(address), Bytes::new());
            }
        };
        let address = calculate_create_address(self.address, nonce);
        if store.has_account(address) {
            return reverted(RevertReason::CreateCollision(address), Bytes::new());
        }

        store.put_account(
            address,
            OvmAccount {
                code_hash: keccak(STATE_TRANSITIONER_NAME),
                eth_address: address,
                nonce: 0,
            },
        );
        let mut record = |slot: u64, value: H256| {
            store.put_storage(
                address,
                H256::from_low_u64_be(slot),
                storage_xor(value),
                true,
            )
        };
        record(
            STATE_TRANSITION_INDEX_SLOT,
            u256_to_word(state_transition_index),
        );
        record(PRE_STATE_ROOT_SLOT, pre_state_root);
        record(POST_STATE_ROOT_SLOT, pre_state_root);
        record(TRANSACTION_HASH_SLOT, transaction_hash);
        record(
            ADDRESS_MANAGER_SLOT,
            address_to_word(address_manager.address()),
        );
        debug!(?address, %state_transition_index, "Deployed state transitioner");

        ExecutionOutcome {
            kind: OperationKind::Create,
            status: Status::Succeeded,
            value: Bytes::copy_from_slice(address_to_word(address).as_bytes()),
            nuisance_gas_used: 0,
            context: None,
            children: Vec::new(),
        }
    }
}

fn reverted(reason: RevertReason, value: Bytes) -> ExecutionOutcome {
    ExecutionOutcome {
        kind: OperationKind::Create,
        status: Status::Reverted(reason),
        value,
        nuisance_gas_used: 0,
        context: None,
        children: Vec::new(),
    }
}

/// Record of a disputed transition as stored by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransitioner {
    pub address: Address,
    pub state_transition_index: U256,
    pub pre_state_root: H256,
    pub post_state_root: H256,
    pub transaction_hash: H256,
}

impl StateTransitioner {
    pub fn load(store: &StateStore, address: Address) -> Result<Self, StateError> {
        store.get_account(address)?;
        let read = |slot: u64| {
            store
                .get_storage(address, H256::from_low_u64_be(slot))
                .filter(|slot| slot.verified)
                .map(|slot| storage_xor(slot.value))
                .unwrap_or_default()
        };
        Ok(Self {
            address,
            state_transition_index: U256::from_big_endian(
                read(STATE_TRANSITION_INDEX_SLOT).as_bytes(),
            ),
            pre_state_root: read(PRE_STATE_ROOT_SLOT),
            post_state_root: read(POST_STATE_ROOT_SLOT),
            transaction_hash: read(TRANSACTION_HASH_SLOT),
        })
    }
}
