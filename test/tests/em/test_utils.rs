use bytes::Bytes;
use ovmrex_common::{Address, H256, constants::NON_NULL_BYTES32};
use ovmrex_em::{
    call_frame::{CallFrame, CallParams, Create2Params, CreateParams, Operation},
    environment::OvmConfig,
    errors::{ExecutionOutcome, VMError},
    message_record::MessageRecord,
    state_store::{OvmAccount, StateStore},
    vm::Engine,
};

pub const NUISANCE_GAS: u64 = 10_000_000;

/// Committed store holding an empty contract at each address.
pub fn store_with(addresses: &[Address]) -> StateStore {
    let mut store = StateStore::default();
    for address in addresses {
        store.put_account(
            *address,
            OvmAccount {
                code_hash: NON_NULL_BYTES32,
                eth_address: *address,
                nonce: 0,
            },
        );
    }
    store.commit();
    store
}

pub fn execute(store: &mut StateStore, root: &CallFrame) -> Result<ExecutionOutcome, VMError> {
    execute_with(&OvmConfig::default(), store, root)
}

pub fn execute_with(
    config: &OvmConfig,
    store: &mut StateStore,
    root: &CallFrame,
) -> Result<ExecutionOutcome, VMError> {
    Engine::new(config, store, MessageRecord::new(NUISANCE_GAS)).execute(root)
}

pub fn call(target: Address, sub_steps: Vec<CallFrame>) -> CallFrame {
    call_with_limit(target, NUISANCE_GAS, sub_steps)
}

pub fn call_with_limit(target: Address, gas_limit: u64, sub_steps: Vec<CallFrame>) -> CallFrame {
    CallFrame::new(Operation::Call(CallParams { gas_limit, target })).with_sub_steps(sub_steps)
}

pub fn static_call(target: Address, sub_steps: Vec<CallFrame>) -> CallFrame {
    CallFrame::new(Operation::StaticCall(CallParams {
        gas_limit: NUISANCE_GAS,
        target,
    }))
    .with_sub_steps(sub_steps)
}

pub fn create(bytecode: &'static [u8], sub_steps: Vec<CallFrame>) -> CallFrame {
    CallFrame::new(Operation::Create(CreateParams {
        bytecode: Bytes::from_static(bytecode),
    }))
    .with_sub_steps(sub_steps)
}

pub fn create2(salt: H256, bytecode: &'static [u8], sub_steps: Vec<CallFrame>) -> CallFrame {
    CallFrame::new(Operation::Create2(Create2Params {
        salt,
        bytecode: Bytes::from_static(bytecode),
    }))
    .with_sub_steps(sub_steps)
}

pub fn sstore(key: H256, value: H256) -> CallFrame {
    CallFrame::new(Operation::Sstore { key, value })
}

pub fn sload(key: H256) -> CallFrame {
    CallFrame::new(Operation::Sload { key })
}

pub fn revert(data: &'static [u8]) -> CallFrame {
    CallFrame::new(Operation::Revert {
        revert_data: Bytes::from_static(data),
    })
}

pub fn word(value: u64) -> H256 {
    H256::from_low_u64_be(value)
}
