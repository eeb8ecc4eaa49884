use hex_literal::hex;
use ovmrex_common::{Address, H160};

// Nuisance gas costs, mirroring the deployed execution manager.
pub const NUISANCE_GAS_SSTORE: u64 = 20000;
pub const MIN_NUISANCE_GAS_PER_CONTRACT: u64 = 30000;
pub const NUISANCE_GAS_PER_CONTRACT_BYTE: u64 = 100;

pub const MAX_CALL_DEPTH: usize = 1024;

/// Default address of the root execution context (the sequencer entrypoint predeploy).
pub const DEFAULT_ENTRYPOINT: Address = H160(hex!("4200000000000000000000000000000000000005"));
