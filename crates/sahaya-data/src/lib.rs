// Operations
mod operations;
pub use operations::*;

// Identifiers and rosters
mod roster;
pub use roster::*;

// Models
mod settings;
pub use settings::*;

mod members;
pub use members::*;

mod fines;
pub use fines::*;

mod meetings;
pub use meetings::*;

mod funerals;
pub use funerals::*;

mod common_works;
pub use common_works::*;
