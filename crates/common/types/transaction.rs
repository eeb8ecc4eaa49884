use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{
    Address, H256, U256,
    abi::{self, Value},
    utils::keccak,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueOrigin {
    #[default]
    Sequencer = 0,
    L1ToL2 = 1,
}

/// A transaction as seen by the execution manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvmTransaction {
    pub timestamp: u64,
    pub block_number: u64,
    pub l1_queue_origin: QueueOrigin,
    pub l1_tx_origin: Address,
    pub entrypoint: Address,
    pub gas_limit: u64,
    #[serde(with = "crate::serde_utils::bytes")]
    pub data: Bytes,
}

impl OvmTransaction {
    /// Packed encoding: `(uint256, uint256, uint8, address, address, uint256, bytes)`.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = abi::encode_packed(&[
            Value::Uint(U256::from(self.timestamp)),
            Value::Uint(U256::from(self.block_number)),
        ]);
        encoded.push(self.l1_queue_origin as u8);
        encoded.extend(abi::encode_packed(&[
            Value::Address(self.l1_tx_origin),
            Value::Address(self.entrypoint),
            Value::Uint(U256::from(self.gas_limit)),
            Value::Bytes(self.data.clone()),
        ]));
        encoded
    }

    pub fn hash(&self) -> H256 {
        keccak(self.encode())
    }
}
