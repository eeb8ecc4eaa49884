use ovmrex_common::{
    Address, H256,
    utils::{address_to_word, keccak, storage_xor, word_to_address},
};
use tracing::debug;

use crate::state_store::{OvmAccount, StateStore};

pub const ADDRESS_MANAGER_NAME: &str = "Lib_AddressManager";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressManagerError {
    #[error("{sender:#x} is not the owner of the address manager ({owner:#x})")]
    NotOwner { sender: Address, owner: Address },
}

/// Owner-gated name registry. Entries live in the storage of the manager's
/// account, keyed by `keccak(name)`, so the engine can read them like any
/// other verified slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressManager {
    address: Address,
    owner: Address,
}

impl AddressManager {
    /// Creates the manager account at `address`.
    pub fn deploy(store: &mut StateStore, address: Address, owner: Address) -> Self {
        store.put_account(
            address,
            OvmAccount {
                code_hash: keccak(ADDRESS_MANAGER_NAME),
                eth_address: address,
                nonce: 0,
            },
        );
        Self { address, owner }
    }

    /// Handle to a manager that already lives at `address`.
    pub fn at(address: Address, owner: Address) -> Self {
        Self { address, owner }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn name_key(name: &str) -> H256 {
        keccak(name)
    }

    pub fn set_address(
        &self,
        store: &mut StateStore,
        sender: Address,
        name: &str,
        address: Address,
    ) -> Result<(), AddressManagerError> {
        self.ensure_owner(sender)?;
        debug!(name, ?address, "Registering address");
        store.put_storage(
            self.address,
            Self::name_key(name),
            storage_xor(address_to_word(address)),
            true,
        );
        Ok(())
    }

    /// Registered address for `name`, the zero address when unset.
    pub fn get_address(&self, store: &StateStore, name: &str) -> Address {
        store
            .get_storage(self.address, Self::name_key(name))
            .filter(|slot| slot.verified)
            .map(|slot| word_to_address(storage_xor(slot.value)))
            .unwrap_or_default()
    }

    pub fn transfer_ownership(
        &mut self,
        sender: Address,
        new_owner: Address,
    ) -> Result<(), AddressManagerError> {
        self.ensure_owner(sender)?;
        self.owner = new_owner;
        Ok(())
    }

    fn ensure_owner(&self, sender: Address) -> Result<(), AddressManagerError> {
        if sender != self.owner {
            return Err(AddressManagerError::NotOwner {
                sender,
                owner: self.owner,
            });
        }
        Ok(())
    }
}
