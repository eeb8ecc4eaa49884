mod batch;
mod genesis;
mod transaction;

pub use batch::*;
pub use genesis::*;
pub use transaction::*;
