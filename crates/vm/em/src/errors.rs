use bytes::Bytes;
use ovmrex_common::{Address, H256};
use serde::{Deserialize, Serialize};

use crate::call_frame::{ExecutionContext, OperationKind};

/// Errors that abort a whole execution. Semantic failures are reported as
/// [`Status::Reverted`] instead and never show up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum VMError {
    #[error("Call depth {depth} exceeds the maximum of {max}")]
    CallDepthExceeded { depth: usize, max: usize },
    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),
}

impl VMError {
    pub fn is_internal(&self) -> bool {
        matches!(self, VMError::Internal(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum InternalError {
    #[error(
        "Checkpoint from generation {checkpoint} is stale, the store is at generation {current}"
    )]
    StaleCheckpoint { checkpoint: u64, current: u64 },
    #[error("Checkpoint at journal length {checkpoint} is ahead of the journal ({journal_len})")]
    CheckpointAheadOfJournal { checkpoint: usize, journal_len: usize },
    #[error("Could not pop callframe")]
    CouldNotPopCallframe,
    #[error("Child frame returned to a parent that runs no sub-steps")]
    MissingFrameBody,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StateError {
    #[error("Account {0:#x} not found")]
    AccountNotFound(Address),
}

/// Why a frame reverted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum RevertReason {
    #[error("Nuisance gas exhausted")]
    NuisanceGasExhausted,
    #[error("Storage slot {key:#x} of {address:#x} is not verified")]
    UnverifiedStorage { address: Address, key: H256 },
    #[error("Account {0:#x} does not exist")]
    MissingAccount(Address),
    #[error("State modification attempted in a static context")]
    StaticContextViolation,
    #[error("An account already exists at {0:#x}")]
    CreateCollision(Address),
    #[error("Intentional revert")]
    IntentionalRevert,
    #[error("Child {0} reverted")]
    ChildReverted(OperationKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Succeeded,
    Reverted(RevertReason),
}

/// Result of one executed frame, together with the outcomes of the children
/// that actually ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub kind: OperationKind,
    pub status: Status,
    pub value: Bytes,
    pub nuisance_gas_used: u64,
    /// Context the sub-steps ran in, for frames of the call and create families.
    pub context: Option<ExecutionContext>,
    pub children: Vec<ExecutionOutcome>,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Succeeded)
    }

    pub fn revert_reason(&self) -> Option<&RevertReason> {
        match &self.status {
            Status::Succeeded => None,
            Status::Reverted(reason) => Some(reason),
        }
    }

    /// Number of frames in this outcome tree, root included.
    pub fn frame_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ExecutionOutcome::frame_count)
            .sum::<usize>()
    }
}
