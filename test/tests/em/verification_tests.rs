use em_tests::modules::helpers::dummy::{DUMMY_BATCH_HEADERS, DUMMY_OVM_TRANSACTIONS};
use ovmrex_common::{
    H256, U256,
    abi::decode_revert_reason,
    constants::{DEFAULT_CHAIN_ID, DUMMY_OVM_ADDRESS_1, NULL_BYTES32},
    types::{ChainInclusionProof, RollupDeployConfig, get_merkle_root},
    utils::{keccak, word_to_address},
};
use ovmrex_em::{
    errors::{RevertReason, Status},
    genesis::{SYSTEM_CONTRACTS, deploy_system, dump_state, make_state_dump},
    verification::{
        StateTransitioner,
        state_transitioner_factory::{FRAUD_VERIFIER_NAME, UNAUTHORIZED_CREATE_REASON},
    },
};
use rayon::prelude::*;

fn deployment() -> ovmrex_em::genesis::SystemDeployment {
    deploy_system(&RollupDeployConfig::with_chain_id(DEFAULT_CHAIN_ID)).unwrap()
}

#[test]
fn factory_rejects_everyone_but_the_fraud_verifier() {
    let mut deployment = deployment();
    let factory = deployment.state_transitioner_factory().unwrap();
    let before = dump_state(&deployment.store);

    let outcome = factory.create(
        &mut deployment.store,
        DUMMY_OVM_ADDRESS_1,
        &deployment.address_manager,
        U256::zero(),
        NULL_BYTES32,
        NULL_BYTES32,
    );

    assert_eq!(
        outcome.status,
        Status::Reverted(RevertReason::IntentionalRevert)
    );
    assert_eq!(
        decode_revert_reason(&outcome.value).as_deref(),
        Some(UNAUTHORIZED_CREATE_REASON)
    );
    assert_eq!(deployment.store.pending_changes(), 0);
    assert_eq!(dump_state(&deployment.store), before);
}

#[test]
fn fraud_verifier_from_genesis_can_create() {
    let mut deployment = deployment();
    let factory = deployment.state_transitioner_factory().unwrap();
    let fraud_verifier = deployment.address_of(FRAUD_VERIFIER_NAME).unwrap();
    assert_eq!(
        deployment
            .address_manager
            .get_address(&deployment.store, FRAUD_VERIFIER_NAME),
        fraud_verifier
    );

    let pre_state_root = DUMMY_BATCH_HEADERS[0].hash();
    let transaction_hash = keccak(&DUMMY_OVM_TRANSACTIONS[0].data);
    let outcome = factory.create(
        &mut deployment.store,
        fraud_verifier,
        &deployment.address_manager,
        U256::from(3),
        pre_state_root,
        transaction_hash,
    );
    assert!(outcome.is_success());

    let address = word_to_address(H256::from_slice(&outcome.value));
    let transitioner = StateTransitioner::load(&deployment.store, address).unwrap();
    assert_eq!(transitioner.state_transition_index, U256::from(3));
    assert_eq!(transitioner.pre_state_root, pre_state_root);
    assert_eq!(transitioner.transaction_hash, transaction_hash);
}

#[test]
fn genesis_registers_every_system_contract() {
    let deployment = deployment();
    for name in SYSTEM_CONTRACTS {
        let address = deployment.address_of(name).unwrap();
        assert_eq!(
            deployment
                .address_manager
                .get_address(&deployment.store, name),
            address
        );
        assert_eq!(
            deployment.store.get_account(address).unwrap().code_hash,
            keccak(name)
        );
    }
}

#[test]
fn state_dump_is_deterministic() {
    let config = RollupDeployConfig::with_chain_id(DEFAULT_CHAIN_ID);
    let first = make_state_dump(&config).unwrap();
    let second = make_state_dump(&config).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.to_json_pretty().unwrap(),
        second.to_json_pretty().unwrap()
    );

    let other_chain = make_state_dump(&RollupDeployConfig::with_chain_id(69)).unwrap();
    assert_ne!(first, other_chain);
}

#[test]
fn batch_fixtures_are_shared_read_only() {
    let expected_root = DUMMY_BATCH_HEADERS[1].hash();

    let roots: Vec<H256> = (0..16u64)
        .into_par_iter()
        .map(|index| {
            let mut deployment = deployment();
            let factory = deployment.state_transitioner_factory().unwrap();
            let fraud_verifier = deployment.address_of(FRAUD_VERIFIER_NAME).unwrap();

            // Local edits must not leak into the shared fixture.
            let mut header = DUMMY_BATCH_HEADERS[1].clone();
            header.batch_size = U256::from(index + 1);
            assert_ne!(header, DUMMY_BATCH_HEADERS[1]);

            let outcome = factory.create(
                &mut deployment.store,
                fraud_verifier,
                &deployment.address_manager,
                U256::from(index),
                DUMMY_BATCH_HEADERS[1].hash(),
                NULL_BYTES32,
            );
            let address = word_to_address(H256::from_slice(&outcome.value));
            StateTransitioner::load(&deployment.store, address)
                .unwrap()
                .pre_state_root
        })
        .collect();

    assert!(roots.iter().all(|root| *root == expected_root));
    assert_eq!(DUMMY_BATCH_HEADERS[1].batch_size, U256::zero());
}

#[test]
fn inclusion_proof_matches_the_batch_root() {
    let leaves: Vec<H256> = DUMMY_OVM_TRANSACTIONS
        .iter()
        .take(2)
        .enumerate()
        .map(|(index, transaction)| {
            let mut preimage = transaction.data.to_vec();
            preimage.push(index as u8);
            keccak(preimage)
        })
        .collect();
    let root = get_merkle_root(&leaves).unwrap();

    let proof = ChainInclusionProof {
        index: 1,
        siblings: vec![leaves[0]],
    };
    assert_eq!(proof.verify(root, leaves[1], 2), Ok(true));
    assert_eq!(proof.verify(root, leaves[0], 2), Ok(false));
}
