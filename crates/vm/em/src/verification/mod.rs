//! Native models of the contracts that take part in fraud verification.

pub mod address_manager;
pub mod state_transitioner_factory;

pub use address_manager::{AddressManager, AddressManagerError};
pub use state_transitioner_factory::{StateTransitioner, StateTransitionerFactory};
