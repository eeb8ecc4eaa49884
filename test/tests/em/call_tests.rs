use bytes::Bytes;
use hex_literal::hex;
use ovmrex_common::{
    constants::{DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2, DUMMY_OVM_ADDRESS_3},
    utils::address_to_word,
};
use ovmrex_em::{
    call_frame::{CallFrame, CallParams, Operation, OperationKind},
    constants::DEFAULT_ENTRYPOINT,
    environment::{OvmConfig, RevertPropagation},
    errors::{RevertReason, Status, VMError},
};

use super::test_utils::{
    call, create, execute, execute_with, revert, sload, sstore, static_call, store_with, word,
};

const REVERT_DATA: [u8; 2] = hex!("dead");

#[test]
fn nested_revert_only_undoes_its_own_subtree() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2]);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            sstore(word(1), word(1)),
            call(
                DUMMY_OVM_ADDRESS_2,
                vec![
                    sstore(word(2), word(2)),
                    call(DUMMY_OVM_ADDRESS_1, vec![sstore(word(3), word(3))]),
                    revert(&REVERT_DATA),
                ],
            ),
            sstore(word(4), word(4)),
        ],
    );

    let outcome = execute(&mut store, &root).unwrap();

    assert!(outcome.is_success());
    let reverted = &outcome.children[1];
    assert_eq!(
        reverted.status,
        Status::Reverted(RevertReason::ChildReverted(OperationKind::Revert))
    );
    assert_eq!(reverted.value, Bytes::from_static(&REVERT_DATA));
    // The grandchild succeeded on its own but went down with its parent.
    assert!(reverted.children[1].is_success());

    assert!(store.get_storage(DUMMY_OVM_ADDRESS_1, word(1)).is_some());
    assert!(store.get_storage(DUMMY_OVM_ADDRESS_2, word(2)).is_none());
    assert!(store.get_storage(DUMMY_OVM_ADDRESS_1, word(3)).is_none());
    assert!(store.get_storage(DUMMY_OVM_ADDRESS_1, word(4)).is_some());
}

#[test]
fn root_revert_discards_the_whole_step() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let outcome = execute(
        &mut store,
        &call(
            DUMMY_OVM_ADDRESS_1,
            vec![sstore(word(1), word(1)), revert(b""), sstore(word(2), word(2))],
        ),
    )
    .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.children.len(), 2);
    assert!(store.get_storage(DUMMY_OVM_ADDRESS_1, word(1)).is_none());
    assert_eq!(store.pending_changes(), 0);
}

#[test]
fn call_sets_caller_and_address() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2]);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            CallFrame::new(Operation::Caller),
            call(
                DUMMY_OVM_ADDRESS_2,
                vec![CallFrame::new(Operation::Caller), CallFrame::new(Operation::Address)],
            ),
            CallFrame::new(Operation::DelegateCall(CallParams {
                gas_limit: 1_000_000,
                target: DUMMY_OVM_ADDRESS_2,
            }))
            .with_sub_steps(vec![
                CallFrame::new(Operation::Caller),
                CallFrame::new(Operation::Address),
            ]),
        ],
    );

    let outcome = execute(&mut store, &root).unwrap();

    let word_of = |address| Bytes::copy_from_slice(address_to_word(address).as_bytes());
    assert_eq!(outcome.children[0].value, word_of(DEFAULT_ENTRYPOINT));
    let nested = &outcome.children[1].children;
    assert_eq!(nested[0].value, word_of(DUMMY_OVM_ADDRESS_1));
    assert_eq!(nested[1].value, word_of(DUMMY_OVM_ADDRESS_2));
    let delegated = &outcome.children[2].children;
    assert_eq!(delegated[0].value, word_of(DEFAULT_ENTRYPOINT));
    assert_eq!(delegated[1].value, word_of(DUMMY_OVM_ADDRESS_1));
}

#[test]
fn call_to_missing_account_reverts() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let outcome = execute(&mut store, &call(DUMMY_OVM_ADDRESS_3, vec![sload(word(1))])).unwrap();

    assert_eq!(
        outcome.status,
        Status::Reverted(RevertReason::MissingAccount(DUMMY_OVM_ADDRESS_3))
    );
    assert!(outcome.children.is_empty());
}

#[test]
fn static_context_rejects_writes_all_the_way_down() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2]);
    let root = static_call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            sstore(word(1), word(1)),
            create(&[0x00], vec![]),
            call(DUMMY_OVM_ADDRESS_2, vec![sstore(word(1), word(1))]),
        ],
    );

    let outcome = execute(&mut store, &root).unwrap();

    assert!(outcome.is_success());
    let violation = Status::Reverted(RevertReason::StaticContextViolation);
    assert_eq!(outcome.children[0].status, violation);
    assert_eq!(outcome.children[1].status, violation);
    assert_eq!(outcome.children[2].children[0].status, violation);
    assert_eq!(store.get_account(DUMMY_OVM_ADDRESS_1).unwrap().nonce, 0);
}

#[test]
fn depth_limit_aborts_the_whole_step() {
    let config = OvmConfig {
        max_call_depth: 2,
        ..Default::default()
    };
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    store.put_storage(DUMMY_OVM_ADDRESS_1, word(9), word(9), true);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            sstore(word(1), word(1)),
            call(DUMMY_OVM_ADDRESS_1, vec![sload(word(1))]),
        ],
    );

    let error = execute_with(&config, &mut store, &root).unwrap_err();

    assert_eq!(error, VMError::CallDepthExceeded { depth: 3, max: 2 });
    assert!(!error.is_internal());
    assert!(store.get_storage(DUMMY_OVM_ADDRESS_1, word(1)).is_none());
    // Uncommitted changes from before the step are untouched.
    assert!(store.get_storage(DUMMY_OVM_ADDRESS_1, word(9)).is_some());
}

#[test]
fn propagating_kinds_stop_the_parent() {
    let mut config = OvmConfig::default();
    config
        .revert_propagation
        .insert(OperationKind::Call, RevertPropagation::Propagate);
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            call(DUMMY_OVM_ADDRESS_3, vec![]),
            sstore(word(1), word(1)),
        ],
    );

    let outcome = execute_with(&config, &mut store, &root).unwrap();

    assert_eq!(
        outcome.status,
        Status::Reverted(RevertReason::ChildReverted(OperationKind::Call))
    );
    assert_eq!(outcome.children.len(), 1);

    let outcome = execute(&mut store, &root).unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.children.len(), 2);
}
