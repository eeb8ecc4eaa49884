use ovmrex_common::{
    H256,
    constants::{DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2, STORAGE_XOR_VALUE},
    utils::storage_xor,
};
use ovmrex_em::{
    errors::{RevertReason, Status},
    genesis::dump_state,
};
use proptest::{prelude::*, proptest};

use super::test_utils::{call, execute, sload, sstore, store_with, word};

fn any_word() -> impl Strategy<Value = H256> {
    any::<[u8; 32]>().prop_map(H256)
}

proptest! {
    #[test]
    fn sstore_then_sload_returns_the_value(key in any_word(), value in any_word()) {
        let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
        let outcome = execute(
            &mut store,
            &call(DUMMY_OVM_ADDRESS_1, vec![sstore(key, value), sload(key)]),
        )
        .unwrap();

        prop_assert!(outcome.is_success());
        prop_assert_eq!(outcome.children[1].value.as_ref(), value.as_bytes());

        let slot = store.get_storage(DUMMY_OVM_ADDRESS_1, key).unwrap();
        prop_assert!(slot.verified);
        prop_assert_eq!(slot.value, storage_xor(value));
    }

    #[test]
    fn unverified_slot_never_loads(key in any_word(), raw in any_word()) {
        let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
        store.put_storage(DUMMY_OVM_ADDRESS_1, key, raw, false);
        store.commit();

        let outcome = execute(&mut store, &call(DUMMY_OVM_ADDRESS_1, vec![sload(key)])).unwrap();

        prop_assert!(outcome.is_success());
        prop_assert_eq!(
            &outcome.children[0].status,
            &Status::Reverted(RevertReason::UnverifiedStorage {
                address: DUMMY_OVM_ADDRESS_1,
                key,
            })
        );
        prop_assert!(outcome.children[0].value.is_empty());
    }
}

#[test]
fn verified_seed_is_decoded_on_load() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    store.put_storage(DUMMY_OVM_ADDRESS_1, word(1), STORAGE_XOR_VALUE, true);
    store.put_storage(DUMMY_OVM_ADDRESS_1, word(2), storage_xor(word(7)), true);
    store.commit();

    let outcome = execute(
        &mut store,
        &call(DUMMY_OVM_ADDRESS_1, vec![sload(word(1)), sload(word(2))]),
    )
    .unwrap();

    assert_eq!(outcome.children[0].value.as_ref(), H256::zero().as_bytes());
    assert_eq!(outcome.children[1].value.as_ref(), word(7).as_bytes());
}

#[test]
fn storage_is_scoped_per_account() {
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2]);
    execute(
        &mut store,
        &call(DUMMY_OVM_ADDRESS_1, vec![sstore(word(1), word(1))]),
    )
    .unwrap();

    let outcome = execute(&mut store, &call(DUMMY_OVM_ADDRESS_2, vec![sload(word(1))])).unwrap();
    assert!(!outcome.children[0].is_success());
    assert!(store.get_storage(DUMMY_OVM_ADDRESS_2, word(1)).is_none());
}

#[test]
fn same_steps_on_same_state_give_same_result() {
    let base = store_with(&[DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2]);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            sstore(word(1), word(2)),
            call(DUMMY_OVM_ADDRESS_2, vec![sstore(word(3), word(4)), sload(word(3))]),
            sload(word(1)),
        ],
    );

    let mut first = base.clone();
    let mut second = base.clone();
    let first_outcome = execute(&mut first, &root).unwrap();
    let second_outcome = execute(&mut second, &root).unwrap();

    assert_eq!(first_outcome, second_outcome);
    assert_eq!(dump_state(&first), dump_state(&second));
    assert_ne!(dump_state(&first), dump_state(&base));
}
