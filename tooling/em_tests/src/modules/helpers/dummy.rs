//! Canned chain data shared by fraud-proof fixtures.

use std::sync::LazyLock;

use bytes::Bytes;
use ovmrex_common::{
    U256,
    abi::{self, Value},
    constants::{NON_ZERO_ADDRESS, NULL_BYTES32, ZERO_ADDRESS},
    types::{ChainBatchHeader, ChainInclusionProof, OvmTransaction, QueueOrigin},
};

fn dummy_batch_header(batch_index: u64) -> ChainBatchHeader {
    ChainBatchHeader {
        batch_index: U256::from(batch_index),
        batch_root: NULL_BYTES32,
        batch_size: U256::zero(),
        prev_total_elements: U256::zero(),
        extra_data: Bytes::from(abi::encode(&[
            Value::Uint(U256::from_big_endian(NULL_BYTES32.as_bytes())),
            Value::Address(NON_ZERO_ADDRESS),
        ])),
    }
}

pub static DUMMY_BATCH_HEADERS: LazyLock<[ChainBatchHeader; 2]> =
    LazyLock::new(|| [dummy_batch_header(0), dummy_batch_header(1)]);

pub static DUMMY_BATCH_PROOFS: LazyLock<[ChainInclusionProof; 2]> = LazyLock::new(|| {
    [0, 1].map(|index| ChainInclusionProof {
        index,
        siblings: vec![NULL_BYTES32],
    })
});

pub static DUMMY_OVM_TRANSACTIONS: LazyLock<Vec<OvmTransaction>> = LazyLock::new(|| {
    (0..10)
        .map(|_| OvmTransaction {
            timestamp: 0,
            block_number: 0,
            l1_queue_origin: QueueOrigin::Sequencer,
            l1_tx_origin: ZERO_ADDRESS,
            entrypoint: ZERO_ADDRESS,
            gas_limit: 0,
            data: Bytes::copy_from_slice(NULL_BYTES32.as_bytes()),
        })
        .collect()
});
