use bytes::Bytes;
use hex_literal::hex;
use ovmrex_common::{
    Address, H256,
    constants::{DUMMY_OVM_ADDRESS_1, NON_NULL_BYTES32},
    utils::{address_to_word, calculate_create_address, calculate_create2_address, keccak},
};
use ovmrex_em::{
    call_frame::{CallFrame, Operation},
    errors::{RevertReason, Status},
};

use super::test_utils::{call, create, create2, execute, revert, sload, sstore, store_with, word};

const INIT_CODE: &[u8] = &hex!("60006000");
const STOP: &[u8] = &hex!("00");

#[test]
fn create_deploys_at_the_nonce_address() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            create(
                INIT_CODE,
                vec![
                    CallFrame::new(Operation::Caller),
                    sstore(word(1), word(1)),
                ],
            ),
            create(INIT_CODE, vec![]),
        ],
    );

    let outcome = execute(&mut store, &root).unwrap();

    let first = calculate_create_address(DUMMY_OVM_ADDRESS_1, 0);
    let second = calculate_create_address(DUMMY_OVM_ADDRESS_1, 1);
    assert_eq!(
        outcome.children[0].value.as_ref(),
        address_to_word(first).as_bytes()
    );
    assert_eq!(
        outcome.children[0].children[0].value.as_ref(),
        address_to_word(DUMMY_OVM_ADDRESS_1).as_bytes()
    );
    assert_eq!(
        outcome.children[1].value.as_ref(),
        address_to_word(second).as_bytes()
    );

    let deployed = store.get_account(first).unwrap();
    assert_eq!(deployed.code_hash, keccak(INIT_CODE));
    assert_eq!(deployed.nonce, 0);
    assert_eq!(
        store.get_code(deployed.code_hash),
        Some(&Bytes::from_static(INIT_CODE))
    );
    assert!(store.get_storage(first, word(1)).is_some());
    assert_eq!(store.get_account(DUMMY_OVM_ADDRESS_1).unwrap().nonce, 2);
}

#[test]
fn reverted_create_keeps_only_the_nonce_bump() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![create(INIT_CODE, vec![sstore(word(1), word(1)), revert(b"no")])],
    );

    let outcome = execute(&mut store, &root).unwrap();

    let failed = &outcome.children[0];
    assert!(!failed.is_success());
    assert_eq!(failed.value, Bytes::from_static(b"no"));
    assert!(!store.has_account(calculate_create_address(DUMMY_OVM_ADDRESS_1, 0)));
    assert_eq!(store.get_account(DUMMY_OVM_ADDRESS_1).unwrap().nonce, 1);
}

#[test]
fn create2_collides_on_reused_salt() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            create2(NON_NULL_BYTES32, INIT_CODE, vec![]),
            create2(NON_NULL_BYTES32, INIT_CODE, vec![]),
            create2(H256::zero(), INIT_CODE, vec![sload(word(1))]),
        ],
    );

    let outcome = execute(&mut store, &root).unwrap();

    let expected = calculate_create2_address(
        DUMMY_OVM_ADDRESS_1,
        NON_NULL_BYTES32,
        &Bytes::from_static(INIT_CODE),
    );
    assert_eq!(
        outcome.children[0].value.as_ref(),
        address_to_word(expected).as_bytes()
    );
    assert_eq!(
        outcome.children[1].status,
        Status::Reverted(RevertReason::CreateCollision(expected))
    );
    assert!(outcome.children[2].is_success());
    // The fresh contract has no verified storage yet.
    assert!(!outcome.children[2].children[0].is_success());
    assert_eq!(store.get_account(DUMMY_OVM_ADDRESS_1).unwrap().nonce, 3);
}

#[test]
fn create2_matches_the_reference_address() {
    let mut store = store_with(&[Address::zero()]);
    let root = call(Address::zero(), vec![create2(H256::zero(), STOP, vec![])]);

    let outcome = execute(&mut store, &root).unwrap();

    let expected = Address::from(hex!("4d1a2e2bb4f88f0250f26ffff098b0b30b26bf38"));
    assert_eq!(
        outcome.children[0].value.as_ref(),
        address_to_word(expected).as_bytes()
    );
    assert!(store.has_account(expected));
}
