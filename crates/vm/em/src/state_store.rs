use bytes::Bytes;
use ovmrex_common::{Address, H256};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::{InternalError, StateError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvmAccount {
    pub code_hash: H256,
    /// Linked eth address used as the code address of calls into this account.
    pub eth_address: Address,
    pub nonce: u64,
}

/// A storage entry. `value` is the raw, XOR-encoded word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSlot {
    pub value: H256,
    pub verified: bool,
}

/// Previous value of whatever a mutation overwrote.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StateChange {
    Account {
        address: Address,
        previous: Option<OvmAccount>,
    },
    Storage {
        address: Address,
        key: H256,
        previous: Option<StorageSlot>,
    },
    Code {
        code_hash: H256,
        previous: Option<Bytes>,
    },
}

/// Opaque handle to a point of the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    generation: u64,
    journal_len: usize,
}

/// In-memory OVM state. Every mutation is journaled so that a frame can be
/// rolled back to the checkpoint taken when it was entered.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    accounts: FxHashMap<Address, OvmAccount>,
    storage: FxHashMap<Address, FxHashMap<H256, StorageSlot>>,
    codes: FxHashMap<H256, Bytes>,
    journal: Vec<StateChange>,
    generation: u64,
}

impl StateStore {
    // ================== Account related functions =====================

    pub fn get_account(&self, address: Address) -> Result<&OvmAccount, StateError> {
        self.accounts
            .get(&address)
            .ok_or(StateError::AccountNotFound(address))
    }

    pub fn has_account(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    pub fn put_account(&mut self, address: Address, account: OvmAccount) {
        let previous = self.accounts.insert(address, account);
        self.journal.push(StateChange::Account { address, previous });
    }

    /// Bumps the nonce of an existing account and returns the value it had before.
    pub fn increment_nonce(&mut self, address: Address) -> Result<u64, StateError> {
        let mut account = *self.get_account(address)?;
        let nonce = account.nonce;
        account.nonce = nonce.saturating_add(1);
        self.put_account(address, account);
        Ok(nonce)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &OvmAccount)> {
        self.accounts.iter()
    }

    // ================== Storage related functions =====================

    pub fn get_storage(&self, address: Address, key: H256) -> Option<StorageSlot> {
        self.storage
            .get(&address)
            .and_then(|slots| slots.get(&key))
            .copied()
    }

    pub fn put_storage(&mut self, address: Address, key: H256, value: H256, verified: bool) {
        let previous = self
            .storage
            .entry(address)
            .or_default()
            .insert(key, StorageSlot { value, verified });
        self.journal.push(StateChange::Storage {
            address,
            key,
            previous,
        });
    }

    pub fn storage_of(&self, address: Address) -> impl Iterator<Item = (&H256, &StorageSlot)> {
        self.storage
            .get(&address)
            .into_iter()
            .flat_map(|slots| slots.iter())
    }

    // ================== Code related functions =====================

    pub fn put_code(&mut self, code_hash: H256, code: Bytes) {
        let previous = self.codes.insert(code_hash, code);
        self.journal.push(StateChange::Code {
            code_hash,
            previous,
        });
    }

    pub fn get_code(&self, code_hash: H256) -> Option<&Bytes> {
        self.codes.get(&code_hash)
    }

    /// Size of the code linked to `address`, zero when unknown.
    pub fn code_len(&self, address: Address) -> usize {
        self.accounts
            .get(&address)
            .and_then(|account| self.codes.get(&account.code_hash))
            .map_or(0, Bytes::len)
    }

    // ================== Journal =====================

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            generation: self.generation,
            journal_len: self.journal.len(),
        }
    }

    /// Undoes every mutation made after `checkpoint`, newest first.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) -> Result<(), InternalError> {
        if checkpoint.generation != self.generation {
            return Err(InternalError::StaleCheckpoint {
                checkpoint: checkpoint.generation,
                current: self.generation,
            });
        }
        if checkpoint.journal_len > self.journal.len() {
            return Err(InternalError::CheckpointAheadOfJournal {
                checkpoint: checkpoint.journal_len,
                journal_len: self.journal.len(),
            });
        }

        trace!(
            undone = self.journal.len() - checkpoint.journal_len,
            "Reverting state store"
        );
        for change in self.journal.drain(checkpoint.journal_len..).rev() {
            match change {
                StateChange::Account { address, previous } => match previous {
                    Some(account) => {
                        self.accounts.insert(address, account);
                    }
                    None => {
                        self.accounts.remove(&address);
                    }
                },
                StateChange::Storage {
                    address,
                    key,
                    previous,
                } => {
                    let slots = self.storage.entry(address).or_default();
                    match previous {
                        Some(slot) => {
                            slots.insert(key, slot);
                        }
                        None => {
                            slots.remove(&key);
                        }
                    }
                    if slots.is_empty() {
                        self.storage.remove(&address);
                    }
                }
                StateChange::Code {
                    code_hash,
                    previous,
                } => match previous {
                    Some(code) => {
                        self.codes.insert(code_hash, code);
                    }
                    None => {
                        self.codes.remove(&code_hash);
                    }
                },
            }
        }
        Ok(())
    }

    /// Makes every journaled mutation permanent. Checkpoints taken before
    /// this call become stale.
    pub fn commit(&mut self) {
        self.journal.clear();
        self.generation += 1;
    }

    /// Number of mutations since the last commit.
    pub fn pending_changes(&self) -> usize {
        self.journal.len()
    }
}
