use ovmrex_common::constants::{DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2};
use ovmrex_em::{
    constants::{MIN_NUISANCE_GAS_PER_CONTRACT, NUISANCE_GAS_SSTORE},
    environment::OvmConfig,
    errors::{RevertReason, Status},
    message_record::MessageRecord,
    vm::Engine,
};
use proptest::{prelude::*, proptest};

use super::test_utils::{NUISANCE_GAS, call, call_with_limit, sload, sstore, store_with, word};

proptest! {
    #[test]
    fn spending_never_exceeds_the_allowance(gas_limit in 0u64..200_000, writes in 0u64..4) {
        let config = OvmConfig::default();
        let mut store = store_with(&[DUMMY_OVM_ADDRESS_1, DUMMY_OVM_ADDRESS_2]);
        let sub_steps = (0..writes)
            .map(|key| sstore(word(key), word(key)))
            .chain([call(DUMMY_OVM_ADDRESS_2, vec![sload(word(0))])])
            .collect();
        let root = call_with_limit(DUMMY_OVM_ADDRESS_1, gas_limit, sub_steps);

        let mut engine = Engine::new(&config, &mut store, MessageRecord::new(NUISANCE_GAS));
        let outcome = engine.execute(&root).unwrap();

        prop_assert!(outcome.nuisance_gas_used <= gas_limit);
        prop_assert_eq!(
            engine.message_record.remaining(),
            NUISANCE_GAS - outcome.nuisance_gas_used
        );
        for child in &outcome.children {
            prop_assert!(child.nuisance_gas_used <= outcome.nuisance_gas_used);
        }
    }
}

#[test]
fn repeated_touches_are_charged_once() {
    let config = OvmConfig::default();
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let root = call(
        DUMMY_OVM_ADDRESS_1,
        vec![
            sstore(word(1), word(1)),
            sstore(word(1), word(2)),
            sstore(word(2), word(2)),
            call(DUMMY_OVM_ADDRESS_1, vec![]),
        ],
    );

    let outcome = Engine::new(&config, &mut store, MessageRecord::new(NUISANCE_GAS))
        .execute(&root)
        .unwrap();

    // One account load, one account change and two distinct slots.
    assert_eq!(
        outcome.nuisance_gas_used,
        2 * MIN_NUISANCE_GAS_PER_CONTRACT + 2 * NUISANCE_GAS_SSTORE
    );
    assert_eq!(outcome.children[1].nuisance_gas_used, 0);
    assert_eq!(outcome.children[3].nuisance_gas_used, 0);
}

#[test]
fn charges_survive_a_revert() {
    let config = OvmConfig::default();
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let mut engine = Engine::new(&config, &mut store, MessageRecord::new(NUISANCE_GAS));

    let first = engine
        .execute(&call(
            DUMMY_OVM_ADDRESS_1,
            vec![sstore(word(1), word(1)), super::test_utils::revert(b"")],
        ))
        .unwrap();
    assert!(!first.is_success());
    assert!(first.nuisance_gas_used > 0);

    // Same message record: the reverted write is not charged again.
    let second = engine
        .execute(&call(DUMMY_OVM_ADDRESS_1, vec![sstore(word(1), word(1))]))
        .unwrap();
    assert!(second.is_success());
    assert_eq!(second.nuisance_gas_used, 0);
    assert_eq!(
        engine.message_record.remaining(),
        NUISANCE_GAS - first.nuisance_gas_used
    );
}

#[test]
fn running_out_reverts_only_the_frame() {
    let config = OvmConfig::default();
    let mut store = store_with(&[DUMMY_OVM_ADDRESS_1]);
    let budget = MIN_NUISANCE_GAS_PER_CONTRACT + NUISANCE_GAS_SSTORE;

    let outcome = Engine::new(&config, &mut store, MessageRecord::new(budget))
        .execute(&call(DUMMY_OVM_ADDRESS_1, vec![sstore(word(1), word(1))]))
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(
        outcome.children[0].status,
        Status::Reverted(RevertReason::NuisanceGasExhausted)
    );
    assert_eq!(outcome.nuisance_gas_used, budget);
    assert!(store.get_storage(DUMMY_OVM_ADDRESS_1, word(1)).is_none());
}
