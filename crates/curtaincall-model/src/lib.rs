pub mod review;
pub mod ledger;
pub mod text;

pub use review::*;
pub use ledger::*;
