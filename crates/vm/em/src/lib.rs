//! # ovmrex-em - OVM Execution Manager
//!
//! A nested call-frame engine that reproduces the observable semantics of the
//! OVM execution manager: verified storage, nuisance gas metering and
//! catch-and-continue revert handling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                              │
//! │  ┌─────────────┐  ┌───────────────┐  ┌───────────────────┐  │
//! │  │  CallFrame  │  │ MessageRecord │  │     OvmConfig     │  │
//! │  └─────────────┘  └───────────────┘  └───────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        StateStore                            │
//! │         (accounts, verified storage, code, journal)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`vm`] | Frame execution engine |
//! | [`execution_handlers`] | Per-operation dispatch |
//! | [`call_frame`] | Operation tree and execution context |
//! | [`environment`] | Engine configuration and global context |
//! | [`message_record`] | Nuisance gas accounting and first-touch sets |
//! | [`state_store`] | Journaled account and storage state |
//! | [`errors`] | Outcomes, revert reasons and fatal errors |
//! | [`verification`] | Address manager and state transitioner factory |
//! | [`genesis`] | System contract deployment and state dumps |
//!
//! ## Quick Start
//!
//! ```ignore
//! use ovmrex_em::{vm::Engine, message_record::MessageRecord, state_store::StateStore};
//!
//! let mut store = StateStore::default();
//! let record = MessageRecord::new(config.default_nuisance_gas);
//! let outcome = Engine::new(&config, &mut store, record).execute(&frame)?;
//!
//! if outcome.is_success() {
//!     println!("Nuisance gas used: {}", outcome.nuisance_gas_used);
//! }
//! ```

pub mod call_frame;
pub mod constants;
pub mod environment;
pub mod errors;
pub mod execution_handlers;
pub mod genesis;
pub mod message_record;
pub mod state_store;
pub mod verification;
pub mod vm;
pub use environment::*;
