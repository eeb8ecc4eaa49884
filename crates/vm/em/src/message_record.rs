//! Nuisance gas accounting for a single message.
//!
//! Nuisance gas is a budget separate from ordinary gas that pays for the
//! operations which make a fraud proof more expensive: loading contracts and
//! changing storage. Each frame receives an allowance carved out of its
//! parent's budget; what the frame spends is deducted from the parent when
//! the frame exits.

use ovmrex_common::{Address, H256};
use rustc_hash::FxHashSet;

use crate::errors::InternalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Insufficient nuisance gas: requested {requested}, remaining {remaining}")]
pub struct InsufficientNuisanceGas {
    pub requested: u64,
    pub remaining: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameAllowance {
    /// Budget of the parent at the moment the frame was entered.
    parent_remaining: u64,
    allowance: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRecord {
    nuisance_gas_left: u64,
    frames: Vec<FrameAllowance>,
    loaded_accounts: FxHashSet<Address>,
    changed_accounts: FxHashSet<Address>,
    changed_slots: FxHashSet<(Address, H256)>,
}

impl MessageRecord {
    pub fn new(nuisance_gas_left: u64) -> Self {
        Self {
            nuisance_gas_left,
            ..Default::default()
        }
    }

    /// Budget left in the current frame.
    pub fn remaining(&self) -> u64 {
        self.nuisance_gas_left
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn charge_nuisance_gas(&mut self, amount: u64) -> Result<(), InsufficientNuisanceGas> {
        self.nuisance_gas_left = self.nuisance_gas_left.checked_sub(amount).ok_or(
            InsufficientNuisanceGas {
                requested: amount,
                remaining: self.nuisance_gas_left,
            },
        )?;
        Ok(())
    }

    /// Opens a frame whose allowance is `gas_limit` capped by the current
    /// budget, or the whole budget when there is no limit. Returns the new depth.
    pub fn enter_call(&mut self, gas_limit: Option<u64>) -> usize {
        let parent_remaining = self.nuisance_gas_left;
        let allowance = gas_limit.map_or(parent_remaining, |limit| limit.min(parent_remaining));
        self.frames.push(FrameAllowance {
            parent_remaining,
            allowance,
        });
        self.nuisance_gas_left = allowance;
        self.frames.len()
    }

    /// Closes the innermost frame and charges its consumption to the parent.
    /// A frame that ran out of nuisance gas forfeits its whole allowance.
    pub fn exit_call(&mut self, exhausted: bool) -> Result<u64, InternalError> {
        let frame = self.frames.pop().ok_or(InternalError::CouldNotPopCallframe)?;
        let used = if exhausted {
            frame.allowance
        } else {
            frame.allowance.saturating_sub(self.nuisance_gas_left)
        };
        self.nuisance_gas_left = frame.parent_remaining.saturating_sub(used);
        Ok(used)
    }

    // ================== First-touch bookkeeping =====================
    // These sets survive reverts: a charge is never refunded, so a re-touch
    // after a revert must not be charged again.

    /// Records that `address` was loaded. Returns `true` on the first touch.
    pub fn touch_account(&mut self, address: Address) -> bool {
        self.loaded_accounts.insert(address)
    }

    /// Records that `address` was changed. Returns `true` on the first change.
    pub fn touch_account_change(&mut self, address: Address) -> bool {
        self.changed_accounts.insert(address)
    }

    /// Records that the slot was written. Returns `true` on the first write.
    pub fn touch_slot(&mut self, address: Address, key: H256) -> bool {
        self.changed_slots.insert((address, key))
    }

    pub fn is_account_touched(&self, address: Address) -> bool {
        self.loaded_accounts.contains(&address)
    }

    pub fn is_account_changed(&self, address: Address) -> bool {
        self.changed_accounts.contains(&address)
    }

    pub fn is_slot_touched(&self, address: Address, key: H256) -> bool {
        self.changed_slots.contains(&(address, key))
    }
}
