use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{
    H256, U256,
    abi::{self, Value},
    utils::keccak,
};

/// Header of a batch appended to one of the chain commitment contracts.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainBatchHeader {
    pub batch_index: U256,
    pub batch_root: H256,
    pub batch_size: U256,
    pub prev_total_elements: U256,
    #[serde(with = "crate::serde_utils::bytes")]
    pub extra_data: Bytes,
}

impl ChainBatchHeader {
    /// `keccak256(abi.encode(batchRoot, batchSize, prevTotalElements, extraData))`.
    /// The index is not part of the hash, the position in the chain already commits to it.
    pub fn hash(&self) -> H256 {
        keccak(abi::encode(&[
            Value::FixedBytes(self.batch_root),
            Value::Uint(self.batch_size),
            Value::Uint(self.prev_total_elements),
            Value::Bytes(self.extra_data.clone()),
        ]))
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct ChainInclusionProof {
    pub index: u64,
    pub siblings: Vec<H256>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Merkle tree must have at least one leaf")]
    Empty,
    #[error("Index {index} out of bounds for a tree of {total_leaves} leaves")]
    IndexOutOfBounds { index: u64, total_leaves: u64 },
    #[error("Expected {expected} siblings, got {actual}")]
    InvalidSiblingCount { expected: usize, actual: usize },
}

impl ChainInclusionProof {
    /// Checks that `leaf` sits at `self.index` of the tree committed to by `root`.
    pub fn verify(&self, root: H256, leaf: H256, total_leaves: u64) -> Result<bool, MerkleError> {
        if total_leaves == 0 {
            return Err(MerkleError::Empty);
        }
        if self.index >= total_leaves {
            return Err(MerkleError::IndexOutOfBounds {
                index: self.index,
                total_leaves,
            });
        }
        let expected = ceil_log2(total_leaves);
        if self.siblings.len() != expected {
            return Err(MerkleError::InvalidSiblingCount {
                expected,
                actual: self.siblings.len(),
            });
        }

        let mut index = self.index;
        let mut computed = leaf;
        for sibling in &self.siblings {
            computed = if index & 1 == 1 {
                hash_pair(*sibling, computed)
            } else {
                hash_pair(computed, *sibling)
            };
            index >>= 1;
        }
        Ok(computed == root)
    }
}

/// Root of a binary keccak tree. Odd levels are completed with the default node of that level,
/// where the default leaf is `keccak256(bytes32(0))`.
pub fn get_merkle_root(elements: &[H256]) -> Result<H256, MerkleError> {
    if elements.is_empty() {
        return Err(MerkleError::Empty);
    }

    let mut level: Vec<H256> = elements.to_vec();
    let mut default_node = keccak(H256::zero());
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(default_node);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| hash_pair(pair[0], pair[1]))
            .collect();
        default_node = hash_pair(default_node, default_node);
    }
    Ok(level[0])
}

fn hash_pair(left: H256, right: H256) -> H256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(left.as_bytes());
    preimage[32..].copy_from_slice(right.as_bytes());
    keccak(preimage)
}

fn ceil_log2(value: u64) -> usize {
    if value <= 1 {
        return 0;
    }
    (u64::BITS - (value - 1).leading_zeros()) as usize
}
