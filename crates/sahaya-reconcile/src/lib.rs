mod errors;
pub use errors::*;

pub mod store;
pub use store::Store;

// Engine components
pub mod diff;
pub mod eligibility;
pub mod ledger;
pub mod counter;
pub mod recalculation;
pub mod settings;

// Roster edits
pub mod meetings;
pub mod funerals;
pub mod common_works;

#[cfg(test)]
mod testing;
